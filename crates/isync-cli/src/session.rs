//! Session token lookup
//!
//! The drive session is established outside isync. Its bearer token is read
//! from `ISYNC_SESSION_TOKEN` or, failing that, from the session file in the
//! config directory.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Environment variable holding the session token
pub const SESSION_ENV: &str = "ISYNC_SESSION_TOKEN";

/// Resolves the session token
///
/// `from_env` is the value of [`SESSION_ENV`], if set. Surrounding
/// whitespace is stripped from either source; a blank value counts as
/// missing.
pub fn resolve_token(from_env: Option<String>, session_file: &Path) -> Result<String> {
    if let Some(token) = from_env.map(|t| t.trim().to_string()) {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    let content = match std::fs::read_to_string(session_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read session file {}", session_file.display())
            })
        }
    };

    let token = content.trim();
    if token.is_empty() {
        bail!(
            "Not authenticated. Set {SESSION_ENV} or save a session token to {}",
            session_file.display()
        );
    }
    Ok(token.to_string())
}
