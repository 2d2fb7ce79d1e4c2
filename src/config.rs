//! Command-line and environment configuration.
//!
//! `.env` is loaded by `main` before parsing, so every `env = ...` setting
//! below can also live there.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::catalog::ListingMode;
use crate::controller::ControllerConfig;

#[derive(Debug, Parser)]
#[command(name = "livescroll-catalog")]
#[command(version, about = "Browse a product catalog with infinite scroll")]
pub struct Cli {
    /// Origin of the catalog API (e.g. https://api.example.com).
    #[arg(long, env = "CATALOG_API_URL")]
    pub api_url: String,

    /// Start on the search results for this keyword instead of the full feed.
    #[arg(long)]
    pub keyword: Option<String>,

    /// Rows of slack for the "reached the bottom" test. The web feed page
    /// triggered at the exact bottom (0) while its search page used 20; one
    /// value now applies to both.
    #[arg(long, env = "CATALOG_SCROLL_TOLERANCE", default_value_t = 0)]
    pub tolerance: u32,

    /// Pause after each loaded page before another one may be requested.
    #[arg(long, default_value_t = 2000)]
    pub settle_ms: u64,

    /// Per-request HTTP timeout.
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Write logs to this file (the terminal is taken by the UI).
    #[arg(long, env = "CATALOG_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Listing to open at startup. A blank `--keyword` falls back to the
    /// full feed.
    pub fn initial_mode(&self) -> ListingMode {
        self.keyword
            .as_deref()
            .and_then(ListingMode::search)
            .unwrap_or(ListingMode::All)
    }

    pub fn controller_config(&self, mode: &ListingMode) -> ControllerConfig {
        ControllerConfig {
            tolerance: self.tolerance,
            settle: Duration::from_millis(self.settle_ms),
            ..ControllerConfig::for_mode(mode)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Install the global tracing subscriber writing to `path`.
///
/// Without a path nothing is installed and log events are discarded.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
