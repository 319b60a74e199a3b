//! `everblog url-prefix`

use anyhow::{Context, Result};
use clap::Args;

use everblog_sync::pipeline;

use crate::SiteArg;

#[derive(Args, Debug)]
pub struct UrlPrefixArgs {
    #[command(flatten)]
    pub site: SiteArg,
}

impl UrlPrefixArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.site.settings()?;
        let prefix =
            pipeline::web_api_url_prefix(&settings).context("cannot fetch web API URL prefix")?;
        println!("{prefix}");
        Ok(())
    }
}
