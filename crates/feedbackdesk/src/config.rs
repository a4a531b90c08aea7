//! Configuration management for feedbackdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "feedbackdesk";

/// Default local database file name.
const DATABASE_FILE_NAME: &str = "feedback.db";

/// Default session state file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Default remote table name.
pub const DEFAULT_TABLE: &str = "feedback_requests";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables prefixed with `FEEDBACKDESK_` (`__` separates sections)
/// 2. `SUPABASE_URL` / `SUPABASE_ANON_KEY`
/// 3. TOML config file at `~/.config/feedbackdesk/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record store configuration.
    pub backend: BackendConfig,
    /// Access gate configuration.
    pub gate: GateConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Which record store to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted PostgREST endpoint.
    #[default]
    Rest,
    /// Local `SQLite` file with the same table layout.
    Sqlite,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend selection.
    pub kind: BackendKind,
    /// Base endpoint of the hosted project, e.g. `https://xyz.supabase.co`.
    pub url: Option<String>,
    /// Public (anon) access key sent with every request.
    pub anon_key: Option<String>,
    /// Table holding the records.
    pub table: String,
    /// Local database path when `kind = "sqlite"`.
    /// Defaults to `~/.local/share/feedbackdesk/feedback.db`
    pub database_path: Option<PathBuf>,
}

/// Access gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Host name this instance is considered to run on.
    ///
    /// Loopback names switch on admin mode without a password. Anyone who can
    /// edit the config or environment can set this; it is not a security
    /// boundary.
    pub origin_host: Option<String>,
    /// Where the remembered admin flag lives.
    /// Defaults to `~/.local/share/feedbackdesk/session.json`
    pub state_path: Option<PathBuf>,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory spreadsheets are written to. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Rest,
            url: None,
            anon_key: None,
            table: DEFAULT_TABLE.to_string(),
            database_path: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing backend url or key is not an error here; see
    /// [`Config::missing_backend_settings`].
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(
                Env::raw()
                    .only(&["SUPABASE_URL", "SUPABASE_ANON_KEY"])
                    .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
                        "supabase_url" => "backend.url".into(),
                        "supabase_anon_key" => "backend.anon_key".into(),
                        other => other.to_string().into(),
                    }),
            )
            .merge(Env::prefixed("FEEDBACKDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let table = &self.backend.table;
        let table_ok = table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !table_ok {
            return Err(Error::ConfigValidation {
                message: format!("table must be a plain identifier, got '{table}'"),
            });
        }

        if let Some(url) = &self.backend.url {
            if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigValidation {
                    message: format!("backend url must start with http:// or https://: {url}"),
                });
            }
        }

        Ok(())
    }

    /// Names of the backend settings that are required but absent.
    ///
    /// Empty when the backend is usable. Only the REST backend needs any.
    #[must_use]
    pub fn missing_backend_settings(&self) -> Vec<&'static str> {
        if self.backend.kind != BackendKind::Rest {
            return Vec::new();
        }
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.backend.url) {
            missing.push("backend.url");
        }
        if blank(&self.backend.anon_key) {
            missing.push("backend.anon_key");
        }
        missing
    }

    /// Get the local database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.backend
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session state path, resolving defaults if not set.
    #[must_use]
    pub fn session_state_path(&self) -> PathBuf {
        self.gate
            .state_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSION_FILE_NAME))
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.kind, BackendKind::Rest);
        assert_eq!(config.backend.table, "feedback_requests");
        assert!(config.backend.url.is_none());
        assert!(config.backend.anon_key.is_none());
        assert!(config.gate.origin_host.is_none());
        assert!(config.export.output_dir.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_table() {
        let mut config = Config::default();
        config.backend.table = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("table"));
    }

    #[test]
    fn test_validate_table_injection() {
        let mut config = Config::default();
        config.backend.table = "feedback?select=*".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_url_scheme() {
        let mut config = Config::default();
        config.backend.url = Some("ftp://example.com".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("http"));
    }

    #[test]
    fn test_missing_backend_settings() {
        let mut config = Config::default();
        assert_eq!(
            config.missing_backend_settings(),
            vec!["backend.url", "backend.anon_key"]
        );

        config.backend.url = Some("https://demo.supabase.co".to_string());
        config.backend.anon_key = Some("  ".to_string());
        assert_eq!(config.missing_backend_settings(), vec!["backend.anon_key"]);

        config.backend.anon_key = Some("anon".to_string());
        assert!(config.missing_backend_settings().is_empty());
    }

    #[test]
    fn test_sqlite_backend_needs_no_remote_settings() {
        let mut config = Config::default();
        config.backend.kind = BackendKind::Sqlite;
        assert!(config.missing_backend_settings().is_empty());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("feedback.db"));
    }

    #[test]
    fn test_session_state_path_custom() {
        let mut config = Config::default();
        config.gate.state_path = Some(PathBuf::from("/tmp/fb/session.json"));
        assert_eq!(
            config.session_state_path(),
            PathBuf::from("/tmp/fb/session.json")
        );
    }

    #[test]
    fn test_export_dir_default() {
        assert_eq!(Config::default().export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("feedbackdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[backend]
kind = "sqlite"
table = "requests"

[gate]
origin_host = "localhost"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(config.backend.table, "requests");
        assert_eq!(config.gate.origin_host.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_supabase_env_fills_backend() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SUPABASE_URL", "https://demo.supabase.co");
            jail.set_env("SUPABASE_ANON_KEY", "anon-key");

            let config =
                Config::load_from(Some(PathBuf::from("absent.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.url.as_deref(), Some("https://demo.supabase.co"));
            assert_eq!(config.backend.anon_key.as_deref(), Some("anon-key"));
            assert!(config.missing_backend_settings().is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_env_layers_override_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[backend]
url = "https://file.supabase.co"
anon_key = "file-key"

[gate]
origin_host = "feedback.example.com"
"#,
            )?;
            jail.set_env("SUPABASE_URL", "https://env.supabase.co");
            jail.set_env("FEEDBACKDESK_GATE__ORIGIN_HOST", "localhost");

            let config =
                Config::load_from(Some(PathBuf::from("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.backend.url.as_deref(), Some("https://env.supabase.co"));
            assert_eq!(config.backend.anon_key.as_deref(), Some("file-key"));
            assert_eq!(config.gate.origin_host.as_deref(), Some("localhost"));
            Ok(())
        });
    }

    #[test]
    fn test_backend_kind_deserialize() {
        let backend: BackendConfig = serde_json::from_str(r#"{"kind": "sqlite"}"#).unwrap();
        assert_eq!(backend.kind, BackendKind::Sqlite);
        assert_eq!(backend.table, DEFAULT_TABLE);
    }
}
