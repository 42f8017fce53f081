// ⚙️ Configuration - TOML file plus environment overrides
//
// Priority order:
// 1. `ALT_CHECKER_CONFIG` (path to a TOML file)
// 2. `<config dir>/alt-checker/config.toml`
// 3. Compiled defaults
//
// `ALT_CHECKER_WEBHOOK_URL` and `ALT_CHECKER_OUTPUT_DIR` override the file.

use crate::roots::SourceRoots;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const CONFIG_ENV: &str = "ALT_CHECKER_CONFIG";
pub const WEBHOOK_ENV: &str = "ALT_CHECKER_WEBHOOK_URL";
pub const OUTPUT_DIR_ENV: &str = "ALT_CHECKER_OUTPUT_DIR";

/// Base URLs of the identity services (overridable for mirrors and tests)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    pub mojang: String,
    pub mojang_session: String,
    pub ashcon: String,
    pub minetools: String,
    pub playerdb: String,
    pub laby: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        ServiceEndpoints {
            mojang: "https://api.mojang.com".to_string(),
            mojang_session: "https://api.mojang.com".to_string(),
            ashcon: "https://api.ashcon.app".to_string(),
            minetools: "https://api.minetools.eu".to_string(),
            playerdb: "https://playerdb.co".to_string(),
            laby: "https://laby.net".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where found_accounts.{json,txt,csv} are written
    pub output_dir: PathBuf,

    /// Report endpoint; no notification is sent when absent
    pub webhook_url: Option<String>,

    pub lookup_timeout_secs: u64,
    pub notify_timeout_secs: u64,

    /// Max identity lookups in flight at once
    pub lookup_concurrency: usize,

    /// How long the embedded-store scanner waits on a write lock
    pub db_busy_timeout_secs: u64,

    pub wait_for_keypress: bool,

    pub roots: SourceRoots,
    pub services: ServiceEndpoints,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from("."),
            webhook_url: None,
            lookup_timeout_secs: 5,
            notify_timeout_secs: 10,
            lookup_concurrency: 4,
            db_busy_timeout_secs: 5,
            wait_for_keypress: true,
            roots: SourceRoots::default(),
            services: ServiceEndpoints::default(),
        }
    }
}

impl Config {
    /// Load using the priority order above. A broken file is logged and
    /// replaced by defaults; configuration never stops a sweep.
    pub fn load() -> Self {
        let mut config = match locate_config_file() {
            Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
                warn!("{}; using defaults", e);
                Config::default()
            }),
            None => Config::default(),
        };
        config.apply_env();
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Config::from_toml(&content).map_err(|e| match e {
            Error::Config(reason) => Error::Config(format!("{}: {}", path.display(), reason)),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookup_concurrency == 0 {
            return Err(Error::Config("lookup_concurrency must be at least 1".to_string()));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(Error::Config("lookup_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV) {
            if !url.trim().is_empty() {
                self.webhook_url = Some(url.trim().to_string());
            }
        }
        if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV).filter(|d| !d.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    pub fn db_busy_timeout(&self) -> Duration {
        Duration::from_secs(self.db_busy_timeout_secs)
    }
}

fn locate_config_file() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|d| d.join("alt-checker").join("config.toml"))
        .filter(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.lookup_timeout(), Duration::from_secs(5));
        assert_eq!(config.lookup_concurrency, 4);
        assert!(config.webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            output_dir = "/tmp/out"
            lookup_concurrency = 8

            [roots]
            appdata = "/fixtures/roaming"

            [services]
            mojang = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.lookup_concurrency, 8);
        assert_eq!(config.notify_timeout_secs, 10);
        assert_eq!(config.roots.appdata, Some(PathBuf::from("/fixtures/roaming")));
        assert!(config.roots.local_appdata.is_none());
        assert_eq!(config.services.mojang, "http://localhost:9000");
        assert_eq!(config.services.ashcon, "https://api.ashcon.app");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = Config::from_toml("lookup_concurrency = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_reports_path_on_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "lookup_concurrency = \"many\"").unwrap();

        let message = Config::from_file(&path).unwrap_err().to_string();
        assert!(message.starts_with("Configuration error: "));
        assert!(message.contains("config.toml: "));
        assert_eq!(message.matches("Configuration error").count(), 1);
    }

    #[test]
    fn test_from_file_reports_path_on_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "lookup_concurrency = 0").unwrap();

        let message = Config::from_file(&path).unwrap_err().to_string();
        assert_eq!(
            message,
            format!(
                "Configuration error: {}: lookup_concurrency must be at least 1",
                path.display()
            )
        );
    }
}
