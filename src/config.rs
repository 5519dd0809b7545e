use crate::core::{DalError, Result};
use crate::printer::PrinterConfig;
use rusqlite::Connection;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Database used when neither a path nor a config file names one.
pub const MEMORY_DATABASE: &str = ":memory:";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct DalConfig {
    pub connection: ConnectionConfig,
    pub statement_timeout_ms: Option<u64>,
    pub printer: Option<PrinterConfig>,
}

impl DalConfig {
    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }
}

/// Connection settings.
///
/// For the bundled SQLite driver `database` is the database path (or
/// `:memory:`); server and credentials are only carried into the rendered
/// connection string.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub server: String,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ConnectionConfig {
    /// Settings for a local database file with no server or credentials.
    pub fn local(database: impl Into<String>) -> Self {
        ConnectionConfig {
            server: String::new(),
            database: database.into(),
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::local(MEMORY_DATABASE)
    }

    /// Renders `server=<s>;uid=<u>;pwd=<p>;database=<d>;`.
    pub fn connection_string(&self) -> String {
        format!(
            "server={};uid={};pwd={};database={};",
            self.server, self.username, self.password, self.database
        )
    }
}

/// Creates live connections. This is all the connector knows about where its
/// connection comes from.
pub trait ConnectionFactory {
    fn connect(&self) -> Result<Connection>;

    /// Human-readable target, used in log messages.
    fn describe(&self) -> String;
}

impl ConnectionFactory for ConnectionConfig {
    fn connect(&self) -> Result<Connection> {
        let opened = if self.database == MEMORY_DATABASE {
            Connection::open_in_memory()
        } else {
            Connection::open(&self.database)
        };
        opened.map_err(|e| {
            DalError::Connection(format!("unable to open '{}': {}", self.database, e))
        })
    }

    fn describe(&self) -> String {
        if self.server.is_empty() {
            self.database.clone()
        } else {
            format!("{}/{}", self.server, self.database)
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = scholar_dal::config::load_config("config.toml").expect("Failed to load config");
/// println!("{}", config.connection.connection_string());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<DalConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DalConfig> {
    toml::from_str(content).map_err(|e| DalError::Config(e.to_string()))
}

/// `<platform config dir>/scholar-dal/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scholar-dal").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
statement_timeout_ms = 2500

[connection]
server = "records.campus.local"
database = "registrar"
username = "dal"
password = "s3cret"

[printer]
max_width = 20
corner = "*"
"#;

    #[test]
    fn test_load_config_from_str() {
        let config = parse_config(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.connection.server, "records.campus.local");
        assert_eq!(config.statement_timeout(), Some(Duration::from_millis(2500)));
        let printer = config.printer.expect("printer section");
        assert_eq!(printer.max_width, 20);
        assert_eq!(printer.corner, '*');
        assert_eq!(printer.wall, '|');
    }

    #[test]
    fn test_connection_string() {
        let config = parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(
            config.connection.connection_string(),
            "server=records.campus.local;uid=dal;pwd=s3cret;database=registrar;"
        );
    }

    #[test]
    fn test_missing_connection_section() {
        let result = parse_config("statement_timeout_ms = 5");
        assert!(matches!(result, Err(DalError::Config(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/scholar-dal.toml");
        assert!(matches!(result, Err(DalError::Io(_))));
    }

    #[test]
    fn test_in_memory_factory_connects() {
        let config = ConnectionConfig::in_memory();
        assert!(config.connect().is_ok());
        assert_eq!(config.describe(), ":memory:");
    }

    #[test]
    fn test_unopenable_path_is_connection_error() {
        let config = ConnectionConfig::local("/nonexistent/dir/records.db");
        assert!(matches!(config.connect(), Err(DalError::Connection(_))));
    }
}
