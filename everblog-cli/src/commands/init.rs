//! `everblog init [--site DIR] (--notebook NAME | --tag NAME) --note-store-url URL`

use anyhow::{Context, Result};
use clap::Args;

use everblog_core::{config, SiteConfig};

use crate::SiteArg;

/// Write a starter `everblog.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub site: SiteArg,

    /// Publish every note in this notebook.
    #[arg(long, required_unless_present = "tag", conflicts_with = "tag")]
    pub notebook: Option<String>,

    /// Publish every note carrying this tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Note store endpoint of the account.
    #[arg(long, value_name = "URL")]
    pub note_store_url: String,

    /// Auth token to store in the config. Prefer the EVERBLOG_TOKEN variable.
    #[arg(long)]
    pub token: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let site = self.site.path().to_path_buf();
        let cfg = SiteConfig {
            note_store_url: self.note_store_url,
            token: self.token,
            notebook: self.notebook,
            tag: self.tag,
            ..SiteConfig::default()
        };
        let path = config::init_at(&site, &cfg)
            .with_context(|| format!("failed to init site '{}'", site.display()))?;

        println!("✓ Wrote {}", path.display());
        if cfg.token.is_none() {
            println!("  Set EVERBLOG_TOKEN (or `token:` in the file) before syncing.");
        }
        Ok(())
    }
}
