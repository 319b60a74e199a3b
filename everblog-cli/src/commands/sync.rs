//! `everblog sync`: write changed posts and delete unpublished ones.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use everblog_core::Timestamp;
use everblog_sync::{pipeline, DeleteResult, SyncOptions, SyncReport, WriteResult};

use crate::SiteArg;

/// Arguments for `everblog sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub site: SiteArg,

    /// Show what would change without sharing, writing or deleting anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Treat notes updated before this time (ms since epoch) as built.
    #[arg(long, value_name = "MS", conflicts_with = "full")]
    pub last_build: Option<i64>,

    /// Refetch every note, ignoring the recorded last build.
    #[arg(long)]
    pub full: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.site.settings()?;
        let last_build = if self.full {
            Some(Timestamp::EPOCH)
        } else {
            self.last_build.map(Timestamp)
        };
        let options = SyncOptions {
            dry_run: self.dry_run,
            last_build,
        };

        let report = pipeline::run(&settings, &options)
            .with_context(|| format!("sync failed for {}", settings.target))?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let written = report
        .writes
        .iter()
        .filter(|r| matches!(r, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
        .count();
    let unchanged = report.writes.len() - written;

    println!(
        "{prefix}{} {} synced ({written} written, {unchanged} unchanged, {} skipped, {} deleted)",
        "✓".green().bold(),
        report.target,
        report.skipped.len(),
        report.deletions.len(),
    );

    for r in &report.writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
    for d in &report.deletions {
        let mark = match d {
            DeleteResult::Deleted { .. } => "✗".red().to_string(),
            DeleteResult::WouldDelete { .. } => "~".to_string(),
        };
        println!("  {mark}  {}", d.path().display());
        if let Some(images) = d.images() {
            println!("  {mark}  {}", images.display());
        }
    }
}
