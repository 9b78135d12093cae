//! Service configuration loader - parses climate_api.toml
//!
//! Keeps listener and pool settings out of the code. The database DSN is
//! deliberately not part of the file; it comes from `DATABASE_URL`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "climate_api.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request worker threads
    pub workers: usize,
    /// Verbose logging and error details in 500 bodies
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: 4,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Schema holding the `measurement` and `station` tables
    pub schema: String,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            max_connections: 8,
            connection_timeout_secs: 5,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads the service configuration.
///
/// An explicitly requested file must exist. Without one, `climate_api.toml`
/// is used if present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !required && !path.exists() {
        return Ok(ServiceConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    ServiceConfig::from_toml_str(&contents, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.server.workers, 4);
        assert!(!config.server.debug);
        assert_eq!(config.database.schema, "public");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServiceConfig::from_toml_str(
            "[server]\nport = 8080\n",
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.database.max_connections, 8);
    }

    #[test]
    fn test_full_file() {
        let config = ServiceConfig::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            workers = 16
            debug = true

            [database]
            schema = "hawaii"
            max_connections = 2
            connection_timeout_secs = 1
            "#,
            Path::new("test.toml"),
        )
        .unwrap();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.server.workers, 16);
        assert!(config.server.debug);
        assert_eq!(config.database.schema, "hawaii");
        assert_eq!(config.database.connection_timeout_secs, 1);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let err = ServiceConfig::from_toml_str("[server\nport = ", Path::new("broken.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = load_config(Some(Path::new("definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.database.schema, "public");
    }
}
