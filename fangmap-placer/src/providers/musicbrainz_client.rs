//! MusicBrainz API client
//!
//! Resolves an artist name to its MusicBrainz artist MBID. ListenBrainz
//! similarity is keyed by MBID, and the enrichment job stores MBIDs in the
//! reference dataset.
//!
//! API Documentation: https://musicbrainz.org/doc/MusicBrainz_API

use super::{
    http_client, rate_limiter, request_error, ArtistIdResolver, DirectRateLimiter, ProviderError,
    ProviderResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

const PROVIDER: &str = "MusicBrainz";
const MUSICBRAINZ_API_URL: &str = "https://musicbrainz.org/ws/2";

#[derive(Debug, Deserialize)]
struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<MBArtist>,
}

#[derive(Debug, Deserialize)]
struct MBArtist {
    id: String,
    #[allow(dead_code)]
    name: String,
}

/// MusicBrainz artist search client
///
/// Rate limited to the configured requests per second (MusicBrainz asks for
/// at most one). Every request carries the descriptive User-Agent MusicBrainz
/// requires.
pub struct MusicBrainzClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: DirectRateLimiter,
}

impl MusicBrainzClient {
    pub fn new(user_agent: &str, requests_per_second: u32, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER, user_agent, timeout)?,
            base_url: MUSICBRAINZ_API_URL.to_string(),
            rate_limiter: rate_limiter(requests_per_second),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// MBID of the best search match for `artist`
    ///
    /// Takes the first search hit, which MusicBrainz orders by score.
    pub async fn find_artist_mbid(&self, artist: &str) -> ProviderResult<Uuid> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/artist/", self.base_url);
        tracing::debug!("Querying MusicBrainz artist search: '{}'", artist);

        let response = self
            .client
            .get(&url)
            .query(&[("query", artist), ("fmt", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| request_error(PROVIDER, e))?;
        let mbid = parse_first_mbid(&body, artist)?;

        tracing::debug!("MusicBrainz: '{}' -> {}", artist, mbid);
        Ok(mbid)
    }
}

#[async_trait]
impl ArtistIdResolver for MusicBrainzClient {
    async fn resolve_mbid(&self, artist: &str) -> ProviderResult<Uuid> {
        self.find_artist_mbid(artist).await
    }
}

fn parse_first_mbid(body: &str, artist: &str) -> ProviderResult<Uuid> {
    let response: ArtistSearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let first = response.artists.into_iter().next().ok_or_else(|| ProviderError::NotFound {
        provider: PROVIDER,
        artist: artist.to_string(),
    })?;

    Uuid::parse_str(&first.id).map_err(|e| ProviderError::Malformed {
        provider: PROVIDER,
        message: format!("invalid MBID '{}': {}", first.id, e),
    })
}
