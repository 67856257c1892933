//! Sync command - Mirror the remote drive into the sync directory
//!
//! Runs the whole `isync` flow:
//! 1. Resolves and validates the sync directory
//! 2. Reads the session token and builds the HTTP drive adapter
//! 3. Decides whether the cached file list is reused (flag, config or prompt)
//! 4. Runs the SyncService with Ctrl+C cancellation, drawing progress
//! 5. Prints the summary and returns the process exit status

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use isync_core::config::{expand_tilde, Config};
use isync_core::domain::{IgnoreList, SyncStats};
use isync_core::ports::IRemoteDrive;
use isync_drive::{DriveClient, HttpDrive};
use isync_sync::service::validate_target;
use isync_sync::{
    ListingCache, ListingSource, SyncEvent, SyncOutcome, SyncReport, SyncRequest, SyncService,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::output::{OutputFormatter, ProgressLine};
use crate::session;

const ALREADY_IN_SYNC: &str =
    "You are already in sync! Use '--update' to download changes to existing files.";

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Local directory to mirror the drive into [default: sync.root from the config]
    #[arg(value_name = "SYNC_DIR", env = "ISYNC_DIR")]
    pub sync_dir: Option<PathBuf>,

    /// Download every file again, even when the local size already matches
    #[arg(short, long)]
    pub update: bool,

    /// Reuse the cached file list without asking
    #[arg(long, conflicts_with = "no_cache")]
    pub use_cache: bool,

    /// Walk the drive even if a cached file list exists
    #[arg(long)]
    pub no_cache: bool,
}

/// Whether the cached file list is reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Use,
    Skip,
    /// Ask the operator on the terminal
    Ask,
}

impl SyncCommand {
    /// Sync directory from the argument (or `ISYNC_DIR`), else `sync.root`
    pub fn target_dir(&self, config: &Config) -> PathBuf {
        expand_tilde(self.sync_dir.as_deref().unwrap_or(&config.sync.root))
    }

    /// Decides cached-listing reuse
    ///
    /// `configured` is `sync.use_cached_listing`; `interactive` is whether
    /// stdin is a terminal.
    pub fn cache_decision(
        &self,
        cache_exists: bool,
        configured: bool,
        interactive: bool,
    ) -> CacheDecision {
        if self.no_cache || !cache_exists {
            CacheDecision::Skip
        } else if self.use_cache || configured {
            CacheDecision::Use
        } else if interactive {
            CacheDecision::Ask
        } else {
            CacheDecision::Skip
        }
    }

    /// Runs the sync and returns the exit status
    pub async fn execute(
        &self,
        config: &Config,
        verbose: bool,
        formatter: &dyn OutputFormatter,
    ) -> Result<i32> {
        let target_dir = self.target_dir(config);
        validate_target(&target_dir).await?;

        let session_file = expand_tilde(&config.paths.session_file);
        let token = session::resolve_token(std::env::var(session::SESSION_ENV).ok(), &session_file)?;

        let client = DriveClient::new(&config.remote.base_url, token)
            .with_timeout(Duration::from_secs(config.remote.timeout_secs));
        let drive: Arc<dyn IRemoteDrive> = Arc::new(HttpDrive::new(client));

        let ignore = load_ignore_list(&expand_tilde(&config.paths.ignore_file), formatter);
        let cache = ListingCache::new(expand_tilde(&config.paths.listing_cache));

        let use_cached_listing = match self.cache_decision(
            cache.exists(),
            config.sync.use_cached_listing,
            std::io::stdin().is_terminal(),
        ) {
            CacheDecision::Use => true,
            CacheDecision::Skip => false,
            CacheDecision::Ask => ask_use_cache().await?,
        };

        let request = SyncRequest {
            target_dir: target_dir.clone(),
            update_mode: self.update || config.sync.update,
            use_cached_listing,
        };
        info!(
            dir = %target_dir.display(),
            update = request.update_mode,
            cached = request.use_cached_listing,
            "Starting sync"
        );

        // Installed after the prompt so Ctrl+C still aborts a pending answer.
        let cancel = CancellationToken::new();
        tokio::spawn(shutdown_signal(cancel.clone()));

        let service = SyncService::new(drive, ignore, cache)
            .verbose(verbose)
            .with_cancellation(cancel);

        let show_progress = formatter.shows_progress() && !verbose;
        let mut progress = ProgressLine::new();
        let outcome = service
            .run_with_observer(&request, |event| {
                if show_progress {
                    if let Some(text) = progress_text(&event) {
                        progress.update(&text);
                    }
                }
                match event {
                    SyncEvent::ListingRestored { files } => {
                        formatter.info(&format!("Using cached file list ({files} files)"));
                    }
                    SyncEvent::WalkCompleted(stats) => {
                        progress.finish();
                        formatter.info(&walk_summary(&stats));
                    }
                    _ => {}
                }
            })
            .await;
        progress.finish();

        let outcome = outcome?;
        let exit_code = outcome.exit_code();
        match outcome {
            SyncOutcome::Completed(report) => render_report(&report, formatter),
            SyncOutcome::Stopped => {
                formatter.warn("Stopped before completion");
                formatter.print_json(&serde_json::json!({ "stopped": true }));
            }
        }
        Ok(exit_code)
    }
}

/// Loads the ignore list; an unreadable file is reported and treated as empty
fn load_ignore_list(path: &Path, formatter: &dyn OutputFormatter) -> IgnoreList {
    match IgnoreList::load(path) {
        Ok(ignore) => {
            debug!(path = %path.display(), folders = ignore.len(), "Loaded ignore list");
            ignore
        }
        Err(e) => {
            formatter.warn(&format!(
                "Could not read ignore list {}: {e}",
                path.display()
            ));
            IgnoreList::new()
        }
    }
}

async fn ask_use_cache() -> Result<bool> {
    tokio::task::spawn_blocking(|| -> std::io::Result<bool> {
        print!("Found cached file list, do you want to use it? [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read answer")
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Cancels `token` on Ctrl+C
async fn shutdown_signal(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received SIGINT (Ctrl+C)");
            token.cancel();
        }
        Err(e) => debug!(error = %e, "Ctrl+C handler unavailable"),
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn progress_text(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::WalkProgress(stats) => Some(format!(
            "Found {} files ({}Gb), continuing...",
            stats.files_found, stats.size_gb
        )),
        SyncEvent::MirrorProgress { done, total, .. } => {
            Some(format!("Syncing files... {done}/{total}"))
        }
        _ => None,
    }
}

fn walk_summary(stats: &SyncStats) -> String {
    format!("Found {} files ({:.3} Gb)", stats.files_found, stats.size_gb)
}

/// Final message for a completed run
pub fn summary_message(report: &SyncReport) -> String {
    let written = report.mirror.files_written;
    if written == 0 {
        ALREADY_IN_SYNC.to_string()
    } else if report.update_mode {
        format!("Update completed! {written} files are now up-to-date.")
    } else {
        format!("Syncing completed! Downloaded {written} new files.")
    }
}

fn report_json(report: &SyncReport) -> serde_json::Value {
    let stats = report.stats.as_ref();
    serde_json::json!({
        "success": true,
        "message": summary_message(report),
        "listing_source": match report.listing_source {
            ListingSource::Walked => "walked",
            ListingSource::Cached => "cached",
        },
        "files_found": report.files_found,
        "total_bytes": stats.map(|s| s.total_bytes),
        "size_gb": stats.map(|s| s.size_gb),
        "traversal_secs": stats.map(|s| s.traversal_time.as_secs_f64()),
        "update_mode": report.update_mode,
        "files_written": report.mirror.files_written,
        "files_in_sync": report.mirror.files_in_sync,
        "files_unresolved": report.mirror.files_unresolved,
        "errors": report.mirror.errors,
    })
}

fn render_report(report: &SyncReport, formatter: &dyn OutputFormatter) {
    formatter.success(&summary_message(report));

    if report.mirror.files_unresolved > 0 {
        formatter.info(&format!(
            "{} listed file{} no longer found on the drive",
            report.mirror.files_unresolved,
            if report.mirror.files_unresolved == 1 { "" } else { "s" }
        ));
    }
    if !report.mirror.errors.is_empty() {
        formatter.warn(&format!(
            "{} file{} could not be written:",
            report.mirror.errors.len(),
            if report.mirror.errors.len() == 1 { "" } else { "s" }
        ));
        for err in &report.mirror.errors {
            formatter.info(&format!("  - {}", err));
        }
    }

    formatter.print_json(&report_json(report));
}
