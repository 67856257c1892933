use std::io::Write;

/// Trait for formatting CLI output
pub trait OutputFormatter: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
    /// Whether live progress lines should be drawn
    fn shows_progress(&self) -> bool;
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
    fn shows_progress(&self) -> bool {
        true
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, _message: &str) {}
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
    fn shows_progress(&self) -> bool {
        false
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

// ============================================================================
// ProgressLine
// ============================================================================

/// A single terminal line rewritten in place with `\r`
///
/// Shorter updates are padded so no characters of a previous, longer
/// update remain visible.
#[derive(Debug, Default)]
pub struct ProgressLine {
    width: usize,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, text: &str) {
        let width = self.width.max(text.chars().count());
        print!("\r{text:<width$}");
        let _ = std::io::stdout().flush();
        self.width = width;
    }

    /// Ends the line if anything was drawn
    pub fn finish(&mut self) {
        if self.width > 0 {
            println!();
            self.width = 0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.width > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_selection() {
        assert!(get_formatter(false).shows_progress());
        assert!(!get_formatter(true).shows_progress());
    }

    #[test]
    fn test_progress_line_tracks_widest_update() {
        let mut line = ProgressLine::new();
        assert!(!line.is_active());

        line.update("Found 10 files (0.0001Gb), continuing...");
        line.update("short");
        assert!(line.is_active());
        assert_eq!(line.width, 40);

        line.finish();
        assert!(!line.is_active());
    }
}
