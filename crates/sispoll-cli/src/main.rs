//! SIS Poller CLI
//!
//! Checks the SIS StationXML listings for metadata updates and e-mails a
//! report when anything changed.
//!
//! Exit status: 0 success, 1 failed or aborted run, 2 usage or configuration
//! error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sispoll_core::errors::{ExError, ExErrorKind};
use sispoll_core::logging_facility::{self, level_for_verbosity, LogOptions, Profile};
use sispoll_engine::{RunOutcome, RunStatus};

mod commands;
mod config;

const EXIT_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "sispoll")]
#[command(about = "Poll SIS for StationXML metadata updates", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct LoggingArgs {
    /// Directory receiving poller.log; logs go to stderr when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// 1 warnings, 2 info, 3 debug
    #[arg(short, long, global = true, default_value_t = 2)]
    verbosity: u8,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check for updates and notify when something changed
    Poll(commands::poll::PollArgs),
    /// Populate the baseline from the current listings without notifying
    Init(commands::init::InitArgs),
    /// Send a test notification
    TestNotify(commands::test_notify::TestNotifyArgs),
}

fn exit_code(result: &Result<RunOutcome, ExError>) -> u8 {
    match result {
        Ok(outcome) if outcome.status() == RunStatus::Failed => EXIT_FAILED,
        Ok(_) => 0,
        Err(err) if err.kind() == ExErrorKind::InvalidConfig => EXIT_CONFIG,
        Err(_) => EXIT_FAILED,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let profile = if cli.logging.json_logs {
        Profile::Production
    } else {
        Profile::Development
    };
    let options = LogOptions {
        level: level_for_verbosity(cli.logging.verbosity),
        log_dir: cli.logging.log_dir.clone(),
    };
    let guard = match logging_facility::init(profile, &options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = match cli.command {
        Commands::Poll(args) => commands::poll::execute(args),
        Commands::Init(args) => commands::init::execute(args),
        Commands::TestNotify(args) => commands::test_notify::execute(args),
    };

    match &result {
        Ok(outcome) => {
            if let Some(err) = &outcome.notify_error {
                eprintln!("Error: {}", err);
            }
        }
        Err(e) if e.kind().is_fatal() => eprintln!("Run aborted: {}", e),
        Err(e) => eprintln!("Error: {}", e),
    }

    let code = exit_code(&result);
    drop(guard);
    ExitCode::from(code)
}
