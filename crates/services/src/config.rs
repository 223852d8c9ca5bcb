//! Environment and file configuration for the services layer.

use std::path::{Path, PathBuf};

use mastery_core::ProgressionSettings;
use tracing::debug;

use crate::error::ConfigError;

/// Database URL override.
pub const DB_URL_ENV: &str = "MASTERY_DB_URL";
/// Path to a TOML file with `ProgressionSettings`.
pub const SETTINGS_ENV: &str = "MASTERY_SETTINGS";

pub const DEFAULT_DB_URL: &str = "sqlite://progress.sqlite3";

/// Everything needed to assemble `AppServices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    pub db_url: String,
    pub settings: ProgressionSettings,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_string(),
            settings: ProgressionSettings::default(),
        }
    }
}

impl ServicesConfig {
    /// Read `MASTERY_DB_URL` and `MASTERY_SETTINGS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is blank or the settings file
    /// cannot be read or validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_url = match std::env::var(DB_URL_ENV) {
            Ok(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidEnv {
                    var: DB_URL_ENV,
                    raw,
                });
            }
            Ok(raw) => normalize_sqlite_url(raw),
            Err(_) => DEFAULT_DB_URL.to_string(),
        };

        let settings = match std::env::var(SETTINGS_ENV) {
            Ok(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidEnv {
                    var: SETTINGS_ENV,
                    raw,
                });
            }
            Ok(path) => load_settings(Path::new(path.trim()))?,
            Err(_) => ProgressionSettings::default(),
        };

        debug!(%db_url, ?settings, "services config loaded");
        Ok(Self { db_url, settings })
    }
}

/// Parse and validate settings from a TOML document.
///
/// # Errors
///
/// Returns `ConfigError` on malformed TOML or invalid values.
pub fn parse_settings(contents: &str) -> Result<ProgressionSettings, ConfigError> {
    let settings: ProgressionSettings = toml::from_str(contents)?;
    Ok(settings.validate()?)
}

/// Load settings from a TOML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<ProgressionSettings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&contents)
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}
