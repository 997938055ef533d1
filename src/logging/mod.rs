//! Logging bootstrap
//!
//! Logging is configured from a YAML file (see [`config`]) merged with the
//! verbosity requested on the command line. Without an override or a
//! `logging.yaml` next to the executable, the configuration shipped with the
//! program is used. Any problem with the configuration is reported on stdout
//! and logging falls back to a plain console logger, so bootstrapping never
//! fails.

pub mod config;
pub mod paths;
pub mod reconcile;
pub mod sink;

use config::{LoggingConfigDescription, LoggingConfigError};
use mcuprog_core::LogLevel;
use paths::ConfigSource;
use std::path::Path;

/// Configuration compiled into the program
pub const BUILTIN_CONFIG: &str = include_str!("../../logging.yaml");

/// How logging ended up being configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingOutcome {
    /// Configured from a configuration file or the built-in configuration
    FromFile {
        /// Where the configuration came from
        source: ConfigSource,
        /// Global level after reconciliation
        root_level: LogLevel,
    },
    /// Plain console logging at the requested level
    Basic {
        /// Console level
        level: LogLevel,
    },
}

/// Logging setup decided before anything is installed
#[derive(Debug)]
pub enum LoggingPlan {
    /// Use the reconciled configuration
    FromFile {
        /// Where the configuration came from
        source: ConfigSource,
        /// Reconciled configuration
        config: LoggingConfigDescription,
        /// Global level
        root_level: LogLevel,
    },
    /// Fall back to basic logging
    Basic {
        /// Console level
        level: LogLevel,
        /// What went wrong with the configuration
        reason: LoggingConfigError,
    },
}

fn load(source: &ConfigSource) -> Result<LoggingConfigDescription, LoggingConfigError> {
    match source {
        ConfigSource::File(path) => LoggingConfigDescription::from_path(path),
        ConfigSource::Builtin => LoggingConfigDescription::from_yaml(
            BUILTIN_CONFIG,
            Path::new(paths::DEFAULT_CONFIG_FILE),
        ),
    }
}

/// Load and reconcile the configuration from `source` without installing it
pub fn plan_logging(requested: LogLevel, source: &ConfigSource, log_dir: &Path) -> LoggingPlan {
    let prepared = load(source).and_then(|mut config| {
        let root_level = reconcile::reconcile(&mut config, requested, log_dir)?;
        Ok((config, root_level))
    });

    match prepared {
        Ok((config, root_level)) => LoggingPlan::FromFile {
            source: source.clone(),
            config,
            root_level,
        },
        Err(reason) => LoggingPlan::Basic {
            level: requested,
            reason,
        },
    }
}

/// Set up process logging for the `requested` console verbosity
///
/// `config_source` overrides the configuration file lookup.
pub fn bootstrap_logging(requested: LogLevel, config_source: Option<&Path>) -> LoggingOutcome {
    let source = paths::resolve_config_source(config_source, std::env::var_os(paths::CONFIG_ENV));
    bootstrap_from(requested, &source, &paths::log_dir())
}

/// Set up process logging from `source`, keeping log files under `log_dir`
pub fn bootstrap_from(
    requested: LogLevel,
    source: &ConfigSource,
    log_dir: &Path,
) -> LoggingOutcome {
    let (level, reason) = match plan_logging(requested, source, log_dir) {
        LoggingPlan::FromFile {
            source,
            config,
            root_level,
        } => match sink::build_logger(&config) {
            Ok(logger) => {
                let handlers = logger.handler_count();
                sink::install(logger, root_level);
                log::debug!("{} log handlers installed", handlers);
                return LoggingOutcome::FromFile { source, root_level };
            }
            Err(e) => (requested, e),
        },
        LoggingPlan::Basic { level, reason } => (level, reason),
    };

    println!("{}", reason);
    println!("Reverting to basic logging.");
    sink::install_basic(level);
    LoggingOutcome::Basic { level }
}
