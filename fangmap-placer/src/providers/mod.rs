//! External metadata providers
//!
//! Inference only sees two capabilities: "who sounds like this artist" and
//! "what is this artist tagged with". Each HTTP client implements one or both
//! behind the traits below, so tests and the orchestrator can swap them freely.
//!
//! Every client rate-limits itself with a `governor` token bucket and never
//! retries; a failed call surfaces as [`ProviderError`] and the caller decides
//! how to degrade.

pub mod lastfm_client;
pub mod listenbrainz_client;
pub mod musicbrainz_client;

pub use lastfm_client::LastFmClient;
pub use listenbrainz_client::ListenBrainzClient;
pub use musicbrainz_client::MusicBrainzClient;

use async_trait::async_trait;
use fangmap_common::dataset::normalize_name;
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or timeout
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: &'static str, message: String },

    /// Non-success HTTP status
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// Payload did not have the expected shape
    #[error("{provider} returned a malformed response: {message}")]
    Malformed { provider: &'static str, message: String },

    /// Artist unknown to the provider
    #[error("{provider} has no entry for '{artist}'")]
    NotFound { provider: &'static str, artist: String },

    /// Client could not be constructed
    #[error("{provider} client setup failed: {message}")]
    Setup { provider: &'static str, message: String },
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One edge of the similar-artist graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityCandidate {
    pub name: String,
    /// Match strength, 0 when the provider gave none
    pub weight: f64,
}

impl SimilarityCandidate {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight: sanitize_weight(weight),
        }
    }
}

/// Negative, NaN or infinite weights count as "no weight"
fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Source of similar artists
#[async_trait]
pub trait SimilarArtistProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    async fn similar_artists(&self, artist: &str) -> ProviderResult<Vec<SimilarityCandidate>>;
}

/// Source of an artist's top folksonomy tags
#[async_trait]
pub trait TopTagProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Top tags, lowercased, most relevant first
    async fn top_tags(&self, artist: &str) -> ProviderResult<Vec<String>>;
}

/// Resolves an artist name to its MusicBrainz artist MBID
#[async_trait]
pub trait ArtistIdResolver: Send + Sync {
    async fn resolve_mbid(&self, artist: &str) -> ProviderResult<Uuid>;
}

/// Queries several similarity providers and merges their candidates
///
/// Candidates are deduplicated by case-insensitive name, keeping the highest
/// weight, in first-seen order. A failing provider is logged and skipped; the
/// merge only fails when every provider fails.
pub struct MergedSimilarity {
    providers: Vec<Arc<dyn SimilarArtistProvider>>,
}

impl MergedSimilarity {
    pub fn new(providers: Vec<Arc<dyn SimilarArtistProvider>>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Deduplicate candidates by normalized name, keeping the highest weight
pub fn merge_candidates(lists: Vec<Vec<SimilarityCandidate>>) -> Vec<SimilarityCandidate> {
    let mut merged: Vec<SimilarityCandidate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for candidate in lists.into_iter().flatten() {
        let key = normalize_name(&candidate.name);
        match positions.get(&key) {
            Some(&position) => {
                if candidate.weight > merged[position].weight {
                    merged[position].weight = candidate.weight;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }
    merged
}

#[async_trait]
impl SimilarArtistProvider for MergedSimilarity {
    fn name(&self) -> &'static str {
        "merged"
    }

    async fn similar_artists(&self, artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
        let mut lists = Vec::with_capacity(self.providers.len());
        let mut last_error = None;

        for provider in &self.providers {
            match provider.similar_artists(artist).await {
                Ok(candidates) => lists.push(candidates),
                Err(e) => {
                    warn!("Similar artists from {} failed for '{}': {}", provider.name(), artist, e);
                    last_error = Some(e);
                }
            }
        }

        match (lists.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(merge_candidates(lists)),
        }
    }
}

/// Stand-in for a provider that is not configured (e.g. no Last.fm API key)
///
/// Always answers with an empty list, so inference degrades to whatever the
/// remaining providers offer.
pub struct Unconfigured;

#[async_trait]
impl SimilarArtistProvider for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn similar_artists(&self, _artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl TopTagProvider for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn top_tags(&self, _artist: &str) -> ProviderResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Direct (unkeyed) token bucket used by every client
pub type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Token bucket allowing `per_second` requests per second (minimum 1)
pub fn rate_limiter(per_second: u32) -> DirectRateLimiter {
    let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_second(per_second))
}

/// Shared HTTP client settings
pub fn http_client(
    provider: &'static str,
    user_agent: &str,
    timeout: Duration,
) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .build()
        .map_err(|e| ProviderError::Setup {
            provider,
            message: e.to_string(),
        })
}

/// Map a reqwest failure onto the provider taxonomy
pub(crate) fn request_error(provider: &'static str, error: reqwest::Error) -> ProviderError {
    if error.is_decode() {
        ProviderError::Malformed {
            provider,
            message: error.to_string(),
        }
    } else {
        ProviderError::Unavailable {
            provider,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-memory providers for tests

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed candidate list (or an error) and counts calls
    #[derive(Default)]
    pub struct FakeSimilarity {
        pub candidates: Vec<SimilarityCandidate>,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FakeSimilarity {
        pub fn with(candidates: &[(&str, f64)]) -> Self {
            Self {
                candidates: candidates
                    .iter()
                    .map(|(name, weight)| SimilarityCandidate::new(*name, *weight))
                    .collect(),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SimilarArtistProvider for FakeSimilarity {
        fn name(&self) -> &'static str {
            "fake-similarity"
        }

        async fn similar_artists(&self, _artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Unavailable {
                    provider: "fake-similarity",
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.candidates.clone())
        }
    }

    /// Resolves every name to a fixed MBID, or fails
    pub struct FakeResolver {
        pub mbid: Option<Uuid>,
    }

    #[async_trait]
    impl ArtistIdResolver for FakeResolver {
        async fn resolve_mbid(&self, artist: &str) -> ProviderResult<Uuid> {
            self.mbid.ok_or_else(|| ProviderError::NotFound {
                provider: "fake-resolver",
                artist: artist.to_string(),
            })
        }
    }

    /// Returns fixed tags (or an error) and counts calls
    #[derive(Default)]
    pub struct FakeTags {
        pub tags: Vec<String>,
        pub fail: bool,
        pub calls: AtomicUsize,
    }

    impl FakeTags {
        pub fn with(tags: &[&str]) -> Self {
            Self {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TopTagProvider for FakeTags {
        fn name(&self) -> &'static str {
            "fake-tags"
        }

        async fn top_tags(&self, _artist: &str) -> ProviderResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Malformed {
                    provider: "fake-tags",
                    message: "unexpected payload".to_string(),
                });
            }
            Ok(self.tags.clone())
        }
    }
}
