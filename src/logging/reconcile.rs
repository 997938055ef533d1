//! Merge a logging configuration with the requested console verbosity

use super::config::{LoggingConfigDescription, LoggingConfigError};
use mcuprog_core::LogLevel;
use std::fs;
use std::path::Path;

/// Name of the handler that follows the command line verbosity
pub const CONSOLE_HANDLER: &str = "console";

/// Adjust `config` in place and return the effective root level
///
/// - file handler names are moved under `log_dir`, which is created when at
///   least one file handler exists
/// - the console handler takes the `requested` level
/// - the root level becomes the most verbose of `requested`, the declared
///   root level and every file handler level
pub fn reconcile(
    config: &mut LoggingConfigDescription,
    requested: LogLevel,
    log_dir: &Path,
) -> Result<LogLevel, LoggingConfigError> {
    let handlers = config
        .handlers
        .as_mut()
        .ok_or_else(|| LoggingConfigError::missing_key("handlers"))?;

    let mut file_handlers = 0;
    for handler in handlers.values_mut() {
        if let Some(filename) = handler.filename.as_mut() {
            *filename = log_dir.join(&*filename);
            file_handlers += 1;
        }
    }
    if file_handlers > 0 {
        fs::create_dir_all(log_dir).map_err(|source| LoggingConfigError::CreateDir {
            path: log_dir.to_path_buf(),
            source,
        })?;
    }

    handlers
        .get_mut(CONSOLE_HANDLER)
        .ok_or_else(|| LoggingConfigError::missing_key(CONSOLE_HANDLER))?
        .level = Some(requested);

    let root = config
        .root
        .as_mut()
        .ok_or_else(|| LoggingConfigError::missing_key("root"))?;
    let mut effective = root
        .level
        .ok_or_else(|| LoggingConfigError::missing_key("level"))?
        .min(requested);
    for handler in handlers.values().filter(|h| h.is_file()) {
        let level = handler
            .level
            .ok_or_else(|| LoggingConfigError::missing_key("level"))?;
        effective = effective.min(level);
    }
    root.level = Some(effective);

    if let Some(names) = &root.handlers {
        if let Some(unknown) = names.iter().find(|n| !handlers.contains_key(n.as_str())) {
            return Err(LoggingConfigError::missing_key(unknown));
        }
    }
    for handler in handlers.values() {
        if let Some(formatter) = &handler.formatter {
            if !config.formatters.contains_key(formatter) {
                return Err(LoggingConfigError::missing_key(formatter));
            }
        }
    }

    Ok(effective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn load(yaml: &str) -> LoggingConfigDescription {
        LoggingConfigDescription::from_yaml(yaml, Path::new("test.yaml")).unwrap()
    }

    const CONFIG: &str = r#"
handlers:
  console:
    level: WARNING
  error_file:
    level: ERROR
    filename: errors.log
root:
  level: WARNING
  handlers: [console, error_file]
"#;

    #[test]
    fn test_requested_level_wins_when_most_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let mut config = load(CONFIG);

        let effective = reconcile(&mut config, LogLevel::Info, &log_dir).unwrap();

        assert_eq!(effective, LogLevel::Info);
        let root = config.root.as_ref().unwrap();
        assert_eq!(root.level, Some(LogLevel::Info));
        let handlers = config.handlers.as_ref().unwrap();
        assert_eq!(handlers["console"].level, Some(LogLevel::Info));
        // File handler keeps its own level
        assert_eq!(handlers["error_file"].level, Some(LogLevel::Error));
    }

    #[test]
    fn test_file_handler_level_wins_when_most_verbose() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = r#"
handlers:
  console:
    level: WARNING
  debug_file:
    level: DEBUG
    filename: debug.log
root:
  level: ERROR
"#;
        let mut config = load(yaml);
        let effective = reconcile(&mut config, LogLevel::Critical, dir.path()).unwrap();
        assert_eq!(effective, LogLevel::Debug);
        assert_eq!(
            config.handlers.unwrap()["console"].level,
            Some(LogLevel::Critical)
        );
    }

    #[test]
    fn test_effective_level_bounds() {
        let dir = tempfile::tempdir().unwrap();
        for requested in LogLevel::ALL {
            let mut config = load(CONFIG);
            let effective = reconcile(&mut config, requested, dir.path()).unwrap();
            assert!(effective <= requested);
            assert!(effective <= LogLevel::Warning);
            assert!(effective <= LogLevel::Error);
        }
    }

    #[test]
    fn test_reconcile_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = load(CONFIG);
        let mut second = load(CONFIG);
        reconcile(&mut first, LogLevel::Debug, dir.path()).unwrap();
        reconcile(&mut second, LogLevel::Debug, dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_handlers_move_to_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("vendor").join("app").join("log");
        let mut config = load(CONFIG);

        reconcile(&mut config, LogLevel::Warning, &log_dir).unwrap();

        assert!(log_dir.is_dir());
        assert_eq!(
            config.handlers.unwrap()["error_file"].filename,
            Some(log_dir.join("errors.log"))
        );

        // An existing directory is fine
        let mut again = load(CONFIG);
        reconcile(&mut again, LogLevel::Warning, &log_dir).unwrap();
    }

    #[test]
    fn test_no_file_handlers_no_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("unused");
        let mut config = load("handlers:\n  console:\n    level: INFO\nroot:\n  level: INFO\n");

        reconcile(&mut config, LogLevel::Warning, &log_dir).unwrap();

        assert!(!log_dir.exists());
    }

    #[test]
    fn test_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("root:\n  level: INFO\n", "handlers"),
            ("handlers:\n  other:\n    level: INFO\nroot:\n  level: INFO\n", "console"),
            ("handlers:\n  console:\n    level: INFO\n", "root"),
            ("handlers:\n  console:\n    level: INFO\nroot:\n  handlers: [console]\n", "level"),
            (
                "handlers:\n  console: {}\n  f:\n    filename: x.log\nroot:\n  level: INFO\n",
                "level",
            ),
            (
                "handlers:\n  console: {}\nroot:\n  level: INFO\n  handlers: [console, syslog]\n",
                "syslog",
            ),
            (
                "handlers:\n  console:\n    formatter: fancy\nroot:\n  level: INFO\n",
                "fancy",
            ),
        ];

        for (yaml, key) in cases {
            let mut config = load(yaml);
            match reconcile(&mut config, LogLevel::Info, dir.path()) {
                Err(LoggingConfigError::MissingKey(k)) => assert_eq!(k, key, "{}", yaml),
                other => panic!("expected missing key '{}', got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_absolute_filename_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("elsewhere.log");
        let yaml = format!(
            "handlers:\n  console: {{}}\n  f:\n    level: INFO\n    filename: '{}'\nroot:\n  level: INFO\n",
            absolute.display()
        );
        let mut config = load(&yaml);
        reconcile(&mut config, LogLevel::Info, &dir.path().join("logs")).unwrap();
        assert_eq!(
            config.handlers.unwrap()["f"].filename,
            Some(PathBuf::from(&absolute))
        );
    }
}
