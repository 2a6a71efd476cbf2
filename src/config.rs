use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scheduling::OffsetBasis;

/// Default server the CLI talks to
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the revisit client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the item service
    pub server_url: String,
    /// How pattern intervals turn into day offsets
    pub offset_basis: OffsetBasis,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Directory for JSON log files; no file logging when unset
    pub log_dir: Option<PathBuf>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub offset_basis: Option<OffsetBasis>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Configuration flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Server URL to connect to
    #[clap(long, env = "REVISIT_URL", global = true)]
    pub server_url: Option<String>,

    /// Offset basis for schedules: cumulative or from-learned-date
    #[clap(long, env = "REVISIT_OFFSET_BASIS", global = true)]
    pub offset_basis: Option<OffsetBasis>,

    /// Request timeout in seconds
    #[clap(long = "timeout-secs", env = "REVISIT_TIMEOUT_SECS", global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Write JSON logs to this directory
    #[clap(long, env = "REVISIT_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Debug logging
    #[clap(long, env = "REVISIT_DEBUG", default_value_t = false, global = true)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            server_url: update.server_url.unwrap_or(self.server_url),
            offset_basis: update.offset_basis.unwrap_or(self.offset_basis),
            request_timeout_secs: update.request_timeout_secs.unwrap_or(self.request_timeout_secs),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Returns the base (default) configuration
pub fn base_config() -> Config {
    Config {
        server_url: DEFAULT_SERVER_URL.to_string(),
        offset_basis: OffsetBasis::default(),
        request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        log_dir: None,
    }
}

/// Returns the platform config directory, if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "revisit", "revisit") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Loads configuration from a TOML file
///
/// A missing path or missing file is not an error; it yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        warn!("Failed to read config file: {}", e);
        format!("Failed to read config file: {}", e)
    })?;

    toml::from_str::<ConfigUpdate>(&content)
        .map(|config| {
            info!("Loaded configuration from {:?}", config_path);
            config
        })
        .map_err(|e| {
            warn!("Failed to parse config file: {}", e);
            format!("Failed to parse config file: {}", e)
        })
}

/// Loads configuration from command line arguments and environment variables
pub fn config_from_args(args: &ConfigArgs) -> ConfigUpdate {
    ConfigUpdate {
        server_url: args.server_url.clone(),
        offset_basis: args.offset_basis,
        request_timeout_secs: args.request_timeout_secs,
        log_dir: args.log_dir.clone(),
    }
}

/// Gets the complete configuration by combining defaults with
/// values from the config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: &ConfigArgs) -> Config {
    let config_file = get_config_dir_path().map(|dir| dir.join("config.toml"));

    let config = base_config()
        .apply_update(config_from_file(config_file).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: server_url={}, offset_basis={}, timeout={}s",
        config.server_url, config.offset_basis, config.request_timeout_secs
    );

    config
}
