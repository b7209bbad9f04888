//! Init command

use clap::Args;
use sispoll_core::errors::Result;
use sispoll_engine::{run_init, RunOutcome};
use sispoll_remote::HttpListingProvider;

use crate::config::{SourceArgs, StoreArgs};

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Create (or reset) the baseline from the current snapshot.
pub fn execute(args: InitArgs) -> Result<RunOutcome> {
    let timeout = args.sources.http.timeout()?;
    let sources = args.sources.load()?;
    let provider = HttpListingProvider::new(timeout)?;
    let target = args.store.target()?;

    let mut store = target.create()?;
    let outcome = run_init(&provider, store.as_mut(), &sources)?;
    super::print_summary(&outcome);
    Ok(outcome)
}
