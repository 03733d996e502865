//! Configuration system using TOML files.
//!
//! Config is looked up in this order:
//! 1. An explicit path passed with `--config` (must exist and parse)
//! 2. The OS-standard config directory:
//!    - Windows: %APPDATA%\utmb-enricher\config.toml
//!    - macOS: ~/Library/Application Support/utmb-enricher/config.toml
//!    - Linux: ~/.config/utmb-enricher/config.toml
//! 3. Built-in defaults
//!
//! Every section is optional; missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Runner database access
    pub enrichment: EnrichmentSettings,

    /// Retry policy for runner lookups
    pub retry: RetryConfig,

    /// Fixed-position roster quirks
    pub fixed_format: FixedFormatConfig,
}

/// File locations. Relative file names resolve against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub roster: PathBuf,
    pub country_aliases: PathBuf,
    pub fifa_codes: PathBuf,
    /// Subdirectory of `data_dir` receiving the JSON exports
    pub json_subdir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            roster: PathBuf::from("runners.json"),
            country_aliases: PathBuf::from("unstandard_countries.json"),
            fifa_codes: PathBuf::from("unstandard_fifa_country_codes.json"),
            json_subdir: PathBuf::from("json"),
        }
    }
}

impl PathsConfig {
    pub fn roster_path(&self) -> PathBuf {
        self.data_dir.join(&self.roster)
    }

    pub fn country_aliases_path(&self) -> PathBuf {
        self.data_dir.join(&self.country_aliases)
    }

    pub fn fifa_codes_path(&self) -> PathBuf {
        self.data_dir.join(&self.fifa_codes)
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    pub fn json_dir(&self) -> PathBuf {
        self.data_dir.join(&self.json_subdir)
    }
}

/// Runner database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    /// Runner search endpoint
    pub search_url: String,
    /// Prefix joined with the runner's relative profile path
    pub profile_base_url: String,
    /// Search category parameter
    pub category: String,
    /// Upper bound on in-flight lookups within one batch
    pub max_concurrent_requests: usize,
    pub user_agent: String,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            search_url: "https://api.utmb.world/search/runners".to_string(),
            profile_base_url: "https://utmb.world/en/runner/".to_string(),
            category: "general".to_string(),
            max_concurrent_requests: 16,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// Jittered retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// None retries until a response is obtained
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 100,
            max_delay_ms: 1500,
            max_attempts: None,
        }
    }
}

/// Fixed-position roster settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedFormatConfig {
    /// Federation code prefix found on some bibs instead of a flag image
    pub bib_prefix: String,
    /// ISO2 country the prefix stands for
    pub bib_prefix_country: String,
}

impl Default for FixedFormatConfig {
    fn default() -> Self {
        Self {
            bib_prefix: "AND".to_string(),
            bib_prefix_country: "AD".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("utmb-enricher"))
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, the default location
/// is tried and any problem there logs a warning and yields defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        let config = read(path)?;
        tracing::info!("Loaded config from {:?}", path);
        return Ok(config);
    }

    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Ok(Config::default());
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    match read(&path) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Ok(Config::default())
        }
    }
}

fn read(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

impl Config {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enrichment.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "enrichment.max_concurrent_requests",
                "must be at least 1".to_string(),
            ));
        }
        if self.retry.min_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::Invalid(
                "retry.min_delay_ms",
                format!(
                    "{} exceeds retry.max_delay_ms {}",
                    self.retry.min_delay_ms, self.retry.max_delay_ms
                ),
            ));
        }
        if self.fixed_format.bib_prefix_country.len() != 2 {
            return Err(ConfigError::Invalid(
                "fixed_format.bib_prefix_country",
                "must be an ISO 3166-1 alpha-2 code".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[enrichment]"));
        assert!(toml.contains("[retry]"));
        assert!(toml.contains("[fixed_format]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[enrichment]
max_concurrent_requests = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.enrichment.max_concurrent_requests, 4);
        assert_eq!(config.enrichment.category, "general");
        assert_eq!(config.retry.min_delay_ms, 100);
        assert_eq!(config.retry.max_delay_ms, 1500);
        assert!(config.retry.max_attempts.is_none());
        assert_eq!(config.paths.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let paths = PathsConfig {
            data_dir: PathBuf::from("/srv/race"),
            ..Default::default()
        };
        assert_eq!(paths.roster_path(), PathBuf::from("/srv/race/runners.json"));
        assert_eq!(paths.json_dir(), PathBuf::from("/srv/race/json"));
        assert_eq!(paths.csv_dir(), PathBuf::from("/srv/race"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let result = load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::Read(..))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 3\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.retry.max_attempts, Some(3));
    }

    #[test]
    fn test_load_explicit_invalid_toml_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry\n").unwrap();

        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.enrichment.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let mut config = Config::default();
        config.retry.min_delay_ms = 2000;
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
