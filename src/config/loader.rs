//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `server.hostname`.
pub const ENV_HOST: &str = "TASK_API_HOST";
/// Overrides `server.port`.
pub const ENV_PORT: &str = "TASK_API_PORT";
/// Overrides `storage.database_path`.
pub const ENV_DATABASE: &str = "TASK_API_DATABASE";
/// Overrides `import.tmp_dir`.
pub const ENV_TMP_DIR: &str = "TASK_API_TMP_DIR";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "IO error reading {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => write!(f, "Invalid value for {}: {:?}", var, value),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply overrides looked up through `lookup` (the process environment in
/// production).
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_HOST) {
        config.server.hostname = host;
    }

    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_PORT,
            value: port.clone(),
        })?;
    }

    if let Some(path) = lookup(ENV_DATABASE) {
        config.storage.database_path = PathBuf::from(path);
    }

    if let Some(dir) = lookup(ENV_TMP_DIR) {
        config.import.tmp_dir = PathBuf::from(dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task-api.toml");
        fs::write(
            &path,
            r#"
            [server]
            hostname = "0.0.0.0"
            port = 8080

            [storage]
            database_path = "/var/lib/task-api/db.json"
            "#,
        )
        .unwrap();

        let config = parse_file(&path).unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.storage.database_path,
            PathBuf::from("/var/lib/task-api/db.json")
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.import.tmp_dir, PathBuf::from("tmp"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(parse_file(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_HOST, "10.0.0.5"),
                (ENV_PORT, "4000"),
                (ENV_DATABASE, "data/tasks.json"),
                (ENV_TMP_DIR, "/tmp/uploads"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.bind_address(), "10.0.0.5:4000");
        assert_eq!(config.storage.database_path, PathBuf::from("data/tasks.json"));
        assert_eq!(config.import.tmp_dir, PathBuf::from("/tmp/uploads"));
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_PORT, .. }));
        assert_eq!(config.server.port, 3333);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "a",
                message: "bad".into(),
            },
            ValidationError {
                field: "b",
                message: "worse".into(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: bad, b: worse");
    }
}
