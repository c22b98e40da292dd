//! Configuration for the catalog front-end.
//!
//! Settings resolve in layers, later layers winning: built-in defaults, a TOML
//! file, environment variables, then command-line flags (applied by the
//! binary).
//!
//! ```toml
//! [database]
//! url = "postgres://postgres@localhost:5432/aquafarm"
//!
//! [catalog]
//! root = "database"
//!
//! [display]
//! format = "table"   # table, json or csv
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File read when no explicit config path is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "sql-catalog.toml";

/// Overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Overrides `catalog.root`.
pub const CATALOG_ROOT_ENV: &str = "SQL_CATALOG_ROOT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string, URL or key/value form.
    #[serde(default = "default_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory holding `queries/`, `functions/` and `procedures/`.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How result rows are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{other}' (expected table, json or csv)")),
        }
    }
}

fn default_url() -> String {
    "postgres://postgres@localhost:5432/postgres".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("database")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig { url: default_url() }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            root: default_root(),
        }
    }
}

impl Config {
    /// Loads the file layer and the environment layer.
    ///
    /// With `path`, that file must exist. Without it, [`DEFAULT_CONFIG_FILE`]
    /// is read from the working directory when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text; missing sections and keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(root) = lookup(CATALOG_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.catalog.root = PathBuf::from(root);
        }
    }
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").expect("empty toml parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.catalog.root, PathBuf::from("database"));
        assert_eq!(config.display.format, OutputFormat::Table);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml("[display]\nformat = \"csv\"\n").expect("parses");
        assert_eq!(config.display.format, OutputFormat::Csv);
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[database]\nhost = \"x\"\n").is_err());
        assert!(Config::from_toml("[cache]\n").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::from_toml("[database]\nurl = \"postgres://file\"\n").expect("parses");
        config.apply_env(|key| match key {
            DATABASE_URL_ENV => Some("postgres://env".to_string()),
            CATALOG_ROOT_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.database.url, "postgres://env");
        assert_eq!(config.catalog.root, PathBuf::from("database"));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/sql-catalog.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
