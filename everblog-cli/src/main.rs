//! everblog: publish a notebook of remote notes as a static blog.
//!
//! # Usage
//!
//! ```text
//! everblog init [--site DIR] (--notebook NAME | --tag NAME) --note-store-url URL
//! everblog sync [--site DIR] [--dry-run] [--last-build MS | --full]
//! everblog url-prefix [--site DIR]
//! everblog share <NOTE_GUID> [--site DIR]
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{init::InitArgs, share::ShareArgs, sync::SyncArgs, url_prefix::UrlPrefixArgs};
use everblog_core::{config, Settings};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "everblog",
    version,
    about = "Sync a notebook of notes into a Hexo blog",
    long_about = None,
)]
struct Cli {
    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter everblog.yaml into the site directory.
    Init(InitArgs),

    /// Fetch changed notes, write posts and delete posts no longer published.
    Sync(SyncArgs),

    /// Print the account's web API URL prefix.
    UrlPrefix(UrlPrefixArgs),

    /// Share a note and print its note key.
    Share(ShareArgs),
}

/// `--site`, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SiteArg {
    /// Blog site directory (holds everblog.yaml and source/).
    #[arg(long, default_value = ".")]
    pub site: PathBuf,
}

impl SiteArg {
    pub fn path(&self) -> &Path {
        &self.site
    }

    /// Load and validate `<site>/everblog.yaml`.
    pub fn settings(&self) -> Result<Settings> {
        let settings = config::settings_at(&self.site)
            .with_context(|| format!("cannot load settings for '{}'", self.site.display()))?;
        tracing::debug!("loaded settings: {settings:?}");
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::UrlPrefix(args) => args.run(),
        Commands::Share(args) => args.run(),
    }
}
