//! Locations of the logging configuration and log files

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Vendor component of the per-user log directory
pub const VENDOR: &str = "mcuprog";

/// Application component of the per-user log directory
pub const APP: &str = env!("CARGO_PKG_NAME");

/// Environment variable naming an alternative logging configuration file
pub const CONFIG_ENV: &str = "MCUPROG_LOGGING_CONFIG";

/// Configuration file looked up next to the executable
pub const DEFAULT_CONFIG_FILE: &str = "logging.yaml";

/// Where the logging configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A configuration file on disk
    File(PathBuf),
    /// The configuration compiled into the program
    Builtin,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Builtin => f.write_str("<built-in>"),
        }
    }
}

/// Pick the logging configuration
///
/// An explicit path wins, then a non-empty `MCUPROG_LOGGING_CONFIG` value,
/// then `logging.yaml` in the executable's directory if it exists. Otherwise
/// the built-in configuration is used.
pub fn resolve_config_source(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
) -> ConfigSource {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_in(explicit, env_value, exe_dir.as_deref())
}

fn resolve_in(
    explicit: Option<&Path>,
    env_value: Option<OsString>,
    exe_dir: Option<&Path>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::File(path.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return ConfigSource::File(PathBuf::from(value));
    }
    match exe_dir.map(|dir| dir.join(DEFAULT_CONFIG_FILE)) {
        Some(path) if path.is_file() => ConfigSource::File(path),
        _ => ConfigSource::Builtin,
    }
}

/// Per-user log directory for `vendor`/`app`
///
/// - Linux: `$XDG_STATE_HOME/<vendor>/<app>/log` (or the cache dir)
/// - macOS: `~/Library/Logs/<vendor>/<app>`
/// - Windows: `%LOCALAPPDATA%\<vendor>\<app>\Logs`
pub fn user_log_dir(vendor: &str, app: &str) -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir().map(|home| home.join("Library").join("Logs").join(vendor).join(app))
    }

    #[cfg(windows)]
    {
        dirs::data_local_dir().map(|dir| dir.join(vendor).join(app).join("Logs"))
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|dir| dir.join(vendor).join(app).join("log"))
    }
}

/// Log directory for this program, falling back to the temp directory
pub fn log_dir() -> PathBuf {
    user_log_dir(VENDOR, APP).unwrap_or_else(|| std::env::temp_dir().join(VENDOR).join(APP))
}
