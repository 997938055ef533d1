//! mcuprog - command line programmer for AVR, PIC and SAM microcontrollers
//!
//! # Architecture
//!
//! The binary is a thin front end:
//! - [`cli`] turns the process arguments into a `StructuredArguments` record,
//!   with `--literal`/`--direct` values already parsed
//! - [`logging`] configures logging from `logging.yaml` merged with
//!   `--verbose`, falling back to plain console logging
//! - [`dispatch`] hands the record to the tool registry and maps the outcome
//!   to an exit status
//!
//! All device work happens behind the `Engine` trait in `mcuprog-tools`.

mod cli;
mod dispatch;
mod logging;

use logging::LoggingOutcome;
use mcuprog_tools::ToolRegistry;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::parse();

    match logging::bootstrap_logging(args.verbose, None) {
        LoggingOutcome::FromFile { source, root_level } => {
            log::debug!("Logging configured from {} (root level {})", source, root_level)
        }
        LoggingOutcome::Basic { level } => log::debug!("Basic logging at level {}", level),
    }

    let mut registry = ToolRegistry::new();
    dispatch::dispatch(&mut registry, &args).exit_code()
}
