use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "QUEST_JOURNAL_CONFIG";
const DATA_DIR_ENV: &str = "QUEST_JOURNAL_DATA_DIR";
const DB_ENV: &str = "QUEST_JOURNAL_DB";
const TYPES_ENV: &str = "QUEST_JOURNAL_TYPES";
const BIND_ENV: &str = "QUEST_JOURNAL_BIND";
const LOG_DIR_ENV: &str = "QUEST_JOURNAL_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TYPES_PATH: &str = "types.json";
const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub types_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
}

/// Optional YAML overlay; anything left out falls back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    types_path: Option<PathBuf>,
    bind_addr: Option<String>,
    log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Defaults, then the file named by `QUEST_JOURNAL_CONFIG`, then per-field env overrides.
    pub fn from_env() -> AppResult<Self> {
        let file = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(read_config_file(Path::new(&path))?),
            None => None,
        };
        Self::resolve(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn resolve(yaml: Option<&str>, env: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let file: ConfigFile = match yaml {
            Some(raw) if !raw.trim().is_empty() => serde_yaml::from_str(raw)
                .map_err(|error| AppError::Internal(format!("invalid config file: {}", error)))?,
            _ => ConfigFile::default(),
        };

        let data_dir = env(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let database_path = env(DB_ENV)
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(|| data_dir.join("journal.sqlite"));
        let types_path = env(TYPES_ENV)
            .map(PathBuf::from)
            .or(file.types_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TYPES_PATH));
        let log_dir = env(LOG_DIR_ENV)
            .map(PathBuf::from)
            .or(file.log_dir)
            .unwrap_or_else(|| data_dir.join("logs"));
        let raw_bind = env(BIND_ENV)
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = raw_bind
            .parse::<SocketAddr>()
            .map_err(|error| AppError::Internal(format!("invalid bind address '{}': {}", raw_bind, error)))?;

        Ok(Self {
            data_dir,
            database_path,
            types_path,
            bind_addr,
            log_dir,
        })
    }
}

fn read_config_file(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path)
        .map_err(|error| AppError::Io(format!("failed to read config {}: {}", path.display(), error)))
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_hang_off_the_data_dir() {
        let config = AppConfig::resolve(None, no_env).expect("config");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.database_path, PathBuf::from("data").join("journal.sqlite"));
        assert_eq!(config.log_dir, PathBuf::from("data").join("logs"));
        assert_eq!(config.types_path, PathBuf::from("types.json"));
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn env_overrides_the_file() {
        let yaml = "data_dir: /srv/journal\nbind_addr: 0.0.0.0:9000\ntypes_path: /etc/journal/types.json\n";
        let env: HashMap<&str, &str> = HashMap::from([("QUEST_JOURNAL_BIND", "127.0.0.1:7000")]);
        let config = AppConfig::resolve(Some(yaml), |key| env.get(key).map(|value| value.to_string()))
            .expect("config");

        assert_eq!(config.database_path, PathBuf::from("/srv/journal/journal.sqlite"));
        assert_eq!(config.types_path, PathBuf::from("/etc/journal/types.json"));
        assert_eq!(config.bind_addr.port(), 7000);
    }

    #[test]
    fn bad_bind_address_and_unknown_keys_are_rejected() {
        assert!(AppConfig::resolve(Some("bind_addr: nowhere\n"), no_env).is_err());
        assert!(AppConfig::resolve(Some("colour: blue\n"), no_env).is_err());
    }
}
