//! Runtime settings, read from the environment (and `.env` if present).

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_RECORDS_LIMIT: usize = 10;
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub db_path: PathBuf,
    pub records_limit: usize,
    pub body_limit: usize,
    pub ocr_command: String,
    pub ocr_lang: String,
    pub server_url: String,
}

impl Settings {
    /// Loads `.env` (if any), then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind: get("MILEAGE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            db_path: get("MILEAGE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            records_limit: parse_or(&get, "MILEAGE_RECORDS_LIMIT", DEFAULT_RECORDS_LIMIT)?,
            body_limit: parse_or(&get, "MILEAGE_BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
            ocr_command: get("MILEAGE_OCR_CMD").unwrap_or_else(|| "tesseract".to_string()),
            ocr_lang: get("MILEAGE_OCR_LANG").unwrap_or_else(|| "eng".to_string()),
            server_url: get("MILEAGE_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            db_path: default_db_path(),
            records_limit: DEFAULT_RECORDS_LIMIT,
            body_limit: DEFAULT_BODY_LIMIT,
            ocr_command: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Platform data directory:
///   macOS:   ~/Library/Application Support/mileage-lens/records.db
///   Linux:   ~/.local/share/mileage-lens/records.db
///   Windows: %APPDATA%/mileage-lens/records.db
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mileage-lens")
        .join("records.db")
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}
