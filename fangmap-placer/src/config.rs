//! Configuration resolution for fangmap-placer
//!
//! Provides Last.fm API key resolution with ENV → TOML priority.

use fangmap_common::config::TomlConfig;
use tracing::{info, warn};

/// Environment variable holding the Last.fm API key
pub const LASTFM_API_KEY_ENV: &str = "FANGMAP_LASTFM_API_KEY";

/// Resolve the Last.fm API key
///
/// **Priority:** ENV → TOML
///
/// Returns `None` when neither source holds a usable key. The service still
/// starts; Last.fm similarity and tags are then unavailable.
pub fn resolve_lastfm_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(LASTFM_API_KEY_ENV)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = toml_config
        .lastfm
        .api_key
        .as_ref()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Last.fm API key found in both environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Last.fm API key loaded from environment variable");
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("Last.fm API key loaded from TOML config");
        return Some(key.trim().to_string());
    }

    warn!(
        "Last.fm API key not configured; similar artists and tags from Last.fm are disabled. \
         Set {} or [lastfm] api_key in the TOML config.",
        LASTFM_API_KEY_ENV
    );
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
