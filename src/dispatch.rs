//! Hand parsed arguments to the engine and report the outcome

use mcuprog_core::{Engine, EngineError, StructuredArguments};
use log::Level;
use std::any::Any;
use std::error::Error as _;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::time::Instant;

/// Outcome of a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command completed
    Success,
    /// The command failed; the reason has been logged
    Failure,
}

impl Status {
    /// Numeric process exit status
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Failure => 1,
        }
    }

    /// Process exit code
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

fn version_line() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn release_info() -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    format!(
        "{}\nbuild profile: {}\ntarget: {}-{}",
        version_line(),
        profile,
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Records describing an engine failure; `detailed` adds the debug
/// representation and the chain of causes
fn failure_records(err: &EngineError, detailed: bool) -> Vec<(Level, String)> {
    let mut records = vec![(
        Level::Error,
        format!("Operation failed with {}: {}", err.kind(), err),
    )];
    if detailed {
        records.push((Level::Debug, format!("{:?}", err)));
        let mut source = err.source();
        while let Some(cause) = source {
            records.push((Level::Debug, format!("caused by: {}", cause)));
            source = cause.source();
        }
    }
    records
}

fn log_failure(err: &EngineError) {
    for (level, message) in failure_records(err, log::log_enabled!(Level::Debug)) {
        log::log!(level, "{}", message);
    }
}

/// Run the command in `args` on `engine`
///
/// Version and release information requests are answered here without
/// touching the engine. Engine errors and panics are logged and turned into
/// [`Status::Failure`].
pub fn dispatch(engine: &mut dyn Engine, args: &StructuredArguments) -> Status {
    if args.version {
        println!("{}", version_line());
    }
    if args.release_info {
        println!("{}", release_info());
    }
    if args.info_only() {
        return Status::Success;
    }

    log::debug!("Running '{}'", args.action);
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| engine.run(args)));
    if args.timing {
        println!("Elapsed time: {:.3}s", start.elapsed().as_secs_f64());
    }

    match result {
        Ok(Ok(())) => {
            log::debug!("'{}' done", args.action);
            Status::Success
        }
        Ok(Err(err)) => {
            log_failure(&err);
            Status::Failure
        }
        Err(payload) => {
            log::error!(
                "Operation failed with InternalError: {}",
                panic_message(payload.as_ref())
            );
            Status::Failure
        }
    }
}
