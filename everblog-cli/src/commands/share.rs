//! `everblog share <NOTE_GUID>`

use anyhow::{Context, Result};
use clap::Args;

use everblog_core::Guid;
use everblog_sync::pipeline;

use crate::SiteArg;

/// Make a note public and print its note key.
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Guid of the note to share.
    pub note_guid: String,

    #[command(flatten)]
    pub site: SiteArg,
}

impl ShareArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.site.settings()?;
        let guid = Guid::from(self.note_guid);
        let key = pipeline::share(&settings, &guid)
            .with_context(|| format!("cannot share note {guid}"))?;
        println!("{key}");
        Ok(())
    }
}
