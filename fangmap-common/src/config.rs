//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. A missing file is not an
//! error: the service logs a warning and starts with built-in defaults.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `FANGMAP_ROOT_FOLDER` environment variable
//! 3. TOML `root_folder`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "FANGMAP_ROOT_FOLDER";

/// Environment variable pointing at an explicit config file
pub const CONFIG_FILE_ENV: &str = "FANGMAP_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Relative file paths are resolved against the root folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    /// HTTP server port
    pub port: u16,
    pub logging: LoggingConfig,
    /// Reference dataset (JSON array of artists)
    pub dataset_file: PathBuf,
    /// Tag taxonomy (JSON categories)
    pub taxonomy_file: PathBuf,
    /// Directory served as static files
    pub public_dir: PathBuf,
    /// Per-request timeout for outbound HTTP calls
    pub http_timeout_secs: u64,
    pub lastfm: LastFmConfig,
    pub musicbrainz: MusicBrainzConfig,
    pub listenbrainz: ListenBrainzConfig,
    pub inference: InferenceConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: 5740,
            logging: LoggingConfig::default(),
            dataset_file: PathBuf::from("public/data.json"),
            taxonomy_file: PathBuf::from("public/tag_data.json"),
            public_dir: PathBuf::from("public"),
            http_timeout_secs: 15,
            lastfm: LastFmConfig::default(),
            musicbrainz: MusicBrainzConfig::default(),
            listenbrainz: ListenBrainzConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastFmConfig {
    /// Overridden by `FANGMAP_LASTFM_API_KEY`
    pub api_key: Option<String>,
    pub requests_per_second: u32,
}

impl Default for LastFmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            requests_per_second: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzConfig {
    /// MusicBrainz rejects requests without a descriptive User-Agent
    pub user_agent: Option<String>,
    pub requests_per_second: u32,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            requests_per_second: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenBrainzConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    /// Similar-artists dataset name on the ListenBrainz labs API
    pub algorithm: String,
}

impl Default for ListenBrainzConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 1,
            algorithm: "session_based_days_7500_session_300_contribution_5_threshold_10_limit_100_filter_True_skip_30".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// How many top tags to request per artist
    pub top_tag_count: usize,
    /// Upper bound on concurrent inferences in a batch request
    pub max_concurrent: usize,
    /// Largest artist list accepted by one batch request
    pub max_batch_size: usize,
    /// Treat a similarity centroid of exactly (0, 0) as "no signal"
    pub origin_is_no_signal: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            top_tag_count: 10,
            max_concurrent: 4,
            max_batch_size: 200,
            origin_is_no_signal: true,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// An explicit path (argument or `FANGMAP_CONFIG`) must exist. The default
    /// per-user location may be absent, in which case defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from));

        if let Some(path) = explicit {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Read TOML {} failed: {}", path.display(), e))
            })?;
            info!("Configuration loaded from {}", path.display());
            return Self::from_toml_str(&content);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                info!("Configuration loaded from {}", path.display());
                Self::from_toml_str(&content)
            }
            _ => {
                warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolve a configured path against the root folder
    pub fn resolve_path(&self, root_folder: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root_folder.join(path)
        }
    }

    /// User-Agent sent to external services
    pub fn user_agent(&self) -> String {
        self.musicbrainz
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent)
    }
}

/// Standard User-Agent for fangmap HTTP clients
pub fn default_user_agent() -> String {
    format!(
        "fangmap/{} ( https://github.com/fangmap/fangmap )",
        env!("CARGO_PKG_VERSION")
    )
}

/// Per-user configuration file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fangmap").join("config.toml"))
}

/// Platform defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("fangmap"))
            .unwrap_or_else(|| PathBuf::from("./fangmap_data"));
        Self { root_folder }
    }
}

/// Resolves the root folder holding the dataset, taxonomy and public files
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_root: config.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        let defaults = CompiledDefaults::for_current_platform();
        info!("Root folder from compiled default: {}", defaults.root_folder.display());
        defaults.root_folder
    }
}
