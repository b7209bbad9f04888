//! Test-notify command

use clap::Args;
use sispoll_core::errors::Result;
use sispoll_engine::{run_test_notify, RunOutcome};

use crate::config::{HttpArgs, NotifyArgs};

#[derive(Debug, Args)]
pub struct TestNotifyArgs {
    #[command(flatten)]
    pub notify: NotifyArgs,

    #[command(flatten)]
    pub http: HttpArgs,
}

/// Send the canned test message.
pub fn execute(args: TestNotifyArgs) -> Result<RunOutcome> {
    let notifier = args.notify.notifier(args.http.timeout()?)?;
    let outcome = run_test_notify(&notifier, &args.notify.email_topic)?;
    println!("Sent test message {}", outcome.notified.as_ref().map(|m| m.as_str()).unwrap_or("-"));
    Ok(outcome)
}
