//! Configuration types for Dialogstore.
//!
//! `AppConfig` mirrors the optional `dialogstore.toml` file. Every value is
//! built once at process start and passed explicitly to the migration runner,
//! the repository and the server.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage engine selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    #[serde(alias = "sqlite3")]
    Sqlite,
    /// Process-local store; nothing survives a restart. Migrations are skipped.
    Memory,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Sqlite => write!(f, "sqlite"),
            Driver::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            "memory" => Ok(Driver::Memory),
            other => Err(format!("unknown driver: '{other}'")),
        }
    }
}

/// Where the dialogs live and where their schema comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub driver: Driver,

    /// Driver-specific locator, e.g. `sqlite://dialogs.db?mode=rwc`.
    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Directory holding `{version}_{title}.up.sql` files.
    #[serde(default = "default_migrations_path")]
    pub migrations_path: PathBuf,
}

fn default_data_source() -> String {
    "sqlite://dialogs.db?mode=rwc".to_string()
}

fn default_migrations_path() -> PathBuf {
    PathBuf::from("migrations")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: Driver::default(),
            data_source: default_data_source(),
            migrations_path: default_migrations_path(),
        }
    }
}

/// Listen address for the RPC server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    50051
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.database.driver, Driver::Sqlite);
        assert_eq!(config.database.migrations_path, PathBuf::from("migrations"));
        assert_eq!(config.server.addr(), "127.0.0.1:50051");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[database]
driver = "memory"

[server]
port = 8080
"#,
        )
        .unwrap();
        assert_eq!(config.database.driver, Driver::Memory);
        assert_eq!(config.database.data_source, default_data_source());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_driver_parse() {
        assert_eq!("sqlite3".parse::<Driver>().unwrap(), Driver::Sqlite);
        assert_eq!("Memory".parse::<Driver>().unwrap(), Driver::Memory);
        assert!("postgres".parse::<Driver>().is_err());
    }
}
