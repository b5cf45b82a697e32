//! fangmap-placer library interface
//!
//! Places artists on the two-axis "fang map" from their similarity to a
//! curated reference dataset and from their folksonomy tags. Exposes the
//! inference engine, the provider clients and the HTTP router for the binary
//! and for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod knowledge;
pub mod models;
pub mod providers;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use fangmap_common::config::TomlConfig;
use inference::CoordinateEngine;
use knowledge::KnowledgeBase;
use providers::{
    LastFmClient, ListenBrainzClient, MergedSimilarity, MusicBrainzClient, ProviderResult,
    SimilarArtistProvider, TopTagProvider, Unconfigured,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CoordinateEngine>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Concurrent inferences per batch request
    pub max_concurrent: usize,
    /// Largest accepted batch request
    pub max_batch_size: usize,
    /// Front-end directory served for non-API paths
    pub public_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(engine: Arc<CoordinateEngine>) -> Self {
        let defaults = fangmap_common::config::InferenceConfig::default();
        Self {
            engine,
            startup_time: Utc::now(),
            max_concurrent: defaults.max_concurrent,
            max_batch_size: defaults.max_batch_size,
            public_dir: None,
        }
    }

    pub fn with_limits(mut self, max_concurrent: usize, max_batch_size: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self.max_batch_size = max_batch_size;
        self
    }

    pub fn with_public_dir(mut self, public_dir: PathBuf) -> Self {
        self.public_dir = Some(public_dir);
        self
    }
}

/// Build application router
///
/// API routes take precedence; every other path is looked up in the public
/// directory when one is configured.
pub fn build_router(state: AppState) -> Router {
    let public_dir = state.public_dir.clone();

    let router = Router::new()
        .merge(api::health_routes())
        .merge(api::coordinate_routes())
        .merge(api::dataset_routes())
        .with_state(state);

    let router = match public_dir {
        Some(dir) => {
            router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Wire the provider clients named by `config` into an engine
///
/// Last.fm supplies both similar artists and tags when an API key is
/// configured. ListenBrainz adds a second similarity source, resolved through
/// MusicBrainz. Whatever is missing is replaced by [`Unconfigured`].
pub fn build_engine(
    config: &TomlConfig,
    lastfm_api_key: Option<String>,
    knowledge: Arc<KnowledgeBase>,
) -> ProviderResult<CoordinateEngine> {
    let user_agent = config.user_agent();
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let mut similarity_sources: Vec<Arc<dyn SimilarArtistProvider>> = Vec::new();
    let tags: Arc<dyn TopTagProvider> = match lastfm_api_key {
        Some(api_key) => {
            let lastfm = Arc::new(LastFmClient::new(
                api_key,
                &user_agent,
                config.lastfm.requests_per_second,
                timeout,
                config.inference.top_tag_count,
            )?);
            similarity_sources.push(lastfm.clone());
            lastfm
        }
        None => Arc::new(Unconfigured),
    };

    if config.listenbrainz.enabled {
        let musicbrainz = Arc::new(MusicBrainzClient::new(
            &user_agent,
            config.musicbrainz.requests_per_second,
            timeout,
        )?);
        similarity_sources.push(Arc::new(ListenBrainzClient::new(
            musicbrainz,
            config.listenbrainz.algorithm.clone(),
            &user_agent,
            config.listenbrainz.requests_per_second,
            timeout,
        )?));
    }

    let similarity: Arc<dyn SimilarArtistProvider> = if similarity_sources.is_empty() {
        Arc::new(Unconfigured)
    } else {
        let names: Vec<&str> = similarity_sources.iter().map(|p| p.name()).collect();
        info!("Similarity providers: {}", names.join(", "));
        Arc::new(MergedSimilarity::new(similarity_sources))
    };
    info!("Tag provider: {}", tags.name());

    Ok(CoordinateEngine::new(knowledge, similarity, tags)
        .with_origin_is_no_signal(config.inference.origin_is_no_signal))
}
