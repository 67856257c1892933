//! isync CLI - Mirror a remote drive into a local directory
//!
//! Parses arguments, loads the configuration, installs logging and runs
//! the sync command. The process exits with `0` on success, `1` on any
//! error and `130` when stopped with Ctrl+C.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use isync_core::config::{ensure_config_dir, expand_tilde, Config};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod session;

use commands::sync::SyncCommand;
use output::{get_formatter, OutputFormatter};

#[derive(Debug, Parser)]
#[command(
    name = "isync",
    version,
    about = "Mirror your cloud drive into a local folder"
)]
pub struct Cli {
    #[command(flatten)]
    sync: SyncCommand,

    /// Log every folder with its listing time instead of a progress line
    #[arg(short, long, env = "ISYNC_VERBOSE")]
    verbose: bool,

    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output the final report in JSON format
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Loads the config file; an explicit `--config` must exist
    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => {
                let path = expand_tilde(path);
                Config::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))
            }
            None => Ok(Config::load_or_default(&Config::default_path())),
        }
    }
}

/// Default log level when `RUST_LOG` is unset
fn default_log_level(verbose: bool, configured: &str) -> &str {
    if verbose {
        "debug"
    } else {
        configured
    }
}

async fn run(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<i32> {
    let config = cli.load_config()?;

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            formatter.error(&problem.to_string());
        }
        anyhow::bail!("Invalid configuration ({} problems)", problems.len());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(default_log_level(cli.verbose, &config.logging.level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = ensure_config_dir() {
        tracing::warn!(error = %e, "Could not create config directory");
    }

    cli.sync.execute(&config, cli.verbose, formatter).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let formatter = get_formatter(cli.json);

    match run(&cli, formatter.as_ref()).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            formatter.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
