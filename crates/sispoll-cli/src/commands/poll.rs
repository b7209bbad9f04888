//! Poll command

use clap::Args;
use sispoll_core::errors::Result;
use sispoll_engine::{run_poll, RunOutcome};
use sispoll_remote::HttpListingProvider;

use crate::config::{NotifyArgs, SourceArgs, StoreArgs};

#[derive(Debug, Args)]
pub struct PollArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub notify: NotifyArgs,
}

/// Poll all sources and notify about changes.
///
/// All configuration is validated before the database is opened or any
/// source is fetched.
pub fn execute(args: PollArgs) -> Result<RunOutcome> {
    let timeout = args.sources.http.timeout()?;
    let sources = args.sources.load()?;
    let notifier = args.notify.notifier(timeout)?;
    let provider = HttpListingProvider::new(timeout)?;
    let target = args.store.target()?;

    let mut store = target.open()?;

    let outcome = run_poll(
        &provider,
        store.as_mut(),
        &notifier,
        &sources,
        &args.notify.email_topic,
    )?;
    super::print_summary(&outcome);
    Ok(outcome)
}
