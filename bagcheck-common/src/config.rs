//! Configuration loading for bagcheck services
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default HTTP port for the wizard service
pub const DEFAULT_PORT: u16 = 5790;

/// Default primary (remote) classification endpoint
pub const DEFAULT_PRIMARY_URL: &str = "https://fdet.ntq.ai/predict";

/// Default secondary (local) classification endpoint
pub const DEFAULT_SECONDARY_URL: &str = "http://localhost:8000/predict";

pub const ENV_CONFIG_PATH: &str = "BAGCHECK_CONFIG";
pub const ENV_PORT: &str = "BAGCHECK_PORT";
pub const ENV_PRIMARY_URL: &str = "BAGCHECK_PRIMARY_URL";
pub const ENV_SECONDARY_URL: &str = "BAGCHECK_SECONDARY_URL";

/// Wizard service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Port to listen on
    pub port: u16,
    /// Primary classification endpoint (tried first)
    pub primary_url: String,
    /// Secondary classification endpoint (fallback)
    pub secondary_url: String,
    /// Interval between simulated progress ticks
    pub progress_interval_ms: u64,
    /// Percentage points added per progress tick
    pub progress_step: u8,
    /// Highest value progress may reach while classification is outstanding
    pub progress_ceiling: u8,
    /// Delay between closing the wizard and clearing its session
    pub dismiss_reset_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            progress_interval_ms: 500,
            progress_step: 10,
            progress_ceiling: 98,
            dismiss_reset_delay_ms: 300,
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub primary_url: Option<String>,
    pub secondary_url: Option<String>,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment, TOML file and defaults
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let explicit_path = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

        let mut config = match explicit_path {
            // An explicitly named file must exist
            Some(path) => Self::from_toml_file(&path)?,
            None => match default_config_file() {
                Some(path) => Self::from_toml_file(&path)?,
                None => {
                    debug!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        if let Some(port) = env_value(ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, port)))?;
        }
        if let Some(url) = env_value(ENV_PRIMARY_URL) {
            config.primary_url = url;
        }
        if let Some(url) = env_value(ENV_SECONDARY_URL) {
            config.secondary_url = url;
        }

        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(url) = overrides.primary_url {
            config.primary_url = url;
        }
        if let Some(url) = overrides.secondary_url {
            config.secondary_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file; absent keys take their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        let config: ServiceConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Check endpoint URLs and progress parameters
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("primary_url", &self.primary_url), ("secondary_url", &self.secondary_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }
        if self.progress_step == 0 {
            return Err(Error::Config("progress_step must be greater than 0".to_string()));
        }
        if self.progress_ceiling >= 100 {
            return Err(Error::Config(
                "progress_ceiling must be below 100 (100 is reserved for completion)".to_string(),
            ));
        }
        if self.progress_interval_ms == 0 {
            return Err(Error::Config("progress_interval_ms must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn dismiss_reset_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_reset_delay_ms)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Find the platform config file, if one exists
///
/// Linux checks `~/.config/bagcheck/config.toml` then `/etc/bagcheck/config.toml`.
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bagcheck").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bagcheck/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
