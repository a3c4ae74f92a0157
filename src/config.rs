//! Service configuration parsed from environment variables.
//!
//! `main` loads an optional `.env` through `dotenvy` before calling
//! [`Settings::from_env`], so every key below may also live in that file.

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://vme_analyzer.db?mode=rwc";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 70.0;
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 10;
pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_REPORT_LOGO_PATH: &str = "assets/USSBlueBurst.png";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub environment: String,
    /// Percentage (0-100). OS matches scoring below it are flagged low confidence.
    pub fuzzy_match_threshold: f64,
    pub max_upload_size_mb: u64,
    pub assets_dir: PathBuf,
    pub report_logo_path: PathBuf,
}

impl Settings {
    /// Build settings from environment variables.
    ///
    /// Optional:
    /// - `DATABASE_URL`: default `sqlite://vme_analyzer.db?mode=rwc`
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PORT`: default 8000
    /// - `ENVIRONMENT`: default `development`
    /// - `FUZZY_MATCH_THRESHOLD`: default 70.0
    /// - `MAX_UPLOAD_SIZE_MB`: default 10
    /// - `ASSETS_DIR`: default `assets`
    /// - `REPORT_LOGO_PATH`: default `assets/USSBlueBurst.png`
    ///
    /// Values that fail to parse fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            port: env_parse("PORT", DEFAULT_PORT),
            environment: env_string("ENVIRONMENT", DEFAULT_ENVIRONMENT),
            fuzzy_match_threshold: env_parse("FUZZY_MATCH_THRESHOLD", DEFAULT_FUZZY_MATCH_THRESHOLD),
            max_upload_size_mb: env_parse("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB),
            assets_dir: PathBuf::from(env_string("ASSETS_DIR", DEFAULT_ASSETS_DIR)),
            report_logo_path: PathBuf::from(env_string("REPORT_LOGO_PATH", DEFAULT_REPORT_LOGO_PATH)),
        }
    }

    /// Upload limit in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_size_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }

    /// Fuzzy threshold as a 0.0-1.0 ratio.
    #[must_use]
    pub fn confidence_threshold(&self) -> f64 {
        self.fuzzy_match_threshold / 100.0
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            max_upload_size_mb: DEFAULT_MAX_UPLOAD_SIZE_MB,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            report_logo_path: PathBuf::from(DEFAULT_REPORT_LOGO_PATH),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
