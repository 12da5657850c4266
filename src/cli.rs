// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two ways to start:
//   slug-scout <START> <END> [options]     fresh scan of START..=END
//   slug-scout -c <FILE> [options]         resume from a saved snapshot
//
// The two are mutually exclusive; clap enforces that, and we check the
// identifiers themselves in `Cli::entry()`.
// =============================================================================

use crate::checker::DEFAULT_CONTENT_MARKER;
use crate::error::Result;
use crate::scan::{
    ScanConfig, DEFAULT_BASE_URL, DEFAULT_ID_WIDTH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_WORKERS,
};
use crate::sequence::{Identifier, ScanBounds};
use crate::store::DEFAULT_DISCOVERY_FILE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "slug-scout",
    version,
    about = "Probe a range of short-link identifiers and record the ones that resolve",
    long_about = "slug-scout walks every identifier between two bounds (e.g. aaaaaaaaaa to aaaaaaaazz), \
                  requests <base-url><identifier>, and records each identifier whose redirect lands on real \
                  content. Press Ctrl-C to stop; the scan saves a snapshot you can resume with -c."
)]
pub struct Cli {
    /// First identifier of the range (lowercase a-z)
    #[arg(required_unless_present = "resume")]
    pub start: Option<String>,

    /// Last identifier of the range, same length as START
    #[arg(required_unless_present = "resume")]
    pub end: Option<String>,

    /// Resume from a snapshot file written by an interrupted scan
    #[arg(short = 'c', long, value_name = "FILE", conflicts_with_all = ["start", "end"])]
    pub resume: Option<PathBuf>,

    /// Number of concurrent probe workers
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = DEFAULT_WORKERS as u32,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub threads: u32,

    /// User-Agent header sent with every probe
    #[arg(short = 'u', long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// URL prefix each identifier is appended to
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Substring a redirect target must contain to count as valid
    #[arg(long, default_value = DEFAULT_CONTENT_MARKER)]
    pub content_marker: String,

    /// Discovery file (merged with, then rewritten on every find)
    #[arg(short = 'o', long, default_value = DEFAULT_DISCOVERY_FILE)]
    pub output: PathBuf,

    /// Directory for snapshot files written on Ctrl-C
    #[arg(long, default_value = ".")]
    pub state_dir: PathBuf,

    /// Required identifier length for a fresh scan
    #[arg(long, default_value_t = DEFAULT_ID_WIDTH)]
    pub width: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable debug logging (every probe, not just finds)
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// How this invocation wants to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Fresh(ScanBounds),
    Resume(PathBuf),
}

impl Cli {
    pub fn entry(&self) -> Result<Entry> {
        if let Some(path) = &self.resume {
            return Ok(Entry::Resume(path.clone()));
        }

        // clap guarantees both are present when --resume is absent
        let start = self.start.as_deref().unwrap_or_default();
        let end = self.end.as_deref().unwrap_or_default();

        let start = Identifier::parse_with_width(start, self.width)?;
        let end = Identifier::parse_with_width(end, self.width)?;
        Ok(Entry::Fresh(ScanBounds::new(start, end)?))
    }

    pub fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = ScanConfig::default().with_base_url(&self.base_url)?;

        config.user_agent.clone_from(&self.user_agent);
        config.workers = self.threads as usize;
        config.timeout = Duration::from_secs(self.timeout);
        config.discovery_path.clone_from(&self.output);
        config.state_dir.clone_from(&self.state_dir);
        config.id_width = self.width;
        config.rules.content_marker.clone_from(&self.content_marker);

        Ok(config)
    }
}
