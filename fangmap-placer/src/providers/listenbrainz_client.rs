//! ListenBrainz similar-artists client
//!
//! ListenBrainz labs computes artist similarity from listening sessions. It is
//! keyed by MusicBrainz artist MBID, so each lookup first resolves the name
//! through an [`ArtistIdResolver`] (normally the MusicBrainz client).
//!
//! Scores are raw co-listen counts. They are divided by the largest score in
//! the response so weights land in [0, 1], the same range as Last.fm matches.

use super::{
    http_client, rate_limiter, request_error, ArtistIdResolver, DirectRateLimiter, ProviderError,
    ProviderResult, SimilarArtistProvider, SimilarityCandidate,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const PROVIDER: &str = "ListenBrainz";
const LISTENBRAINZ_LABS_URL: &str = "https://labs.api.listenbrainz.org/similar-artists/json";

/// The labs endpoint has answered both a bare array and `{"artists": [...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SimilarPayload {
    Bare(Vec<LbArtist>),
    Wrapped {
        #[serde(default)]
        artists: Vec<LbArtist>,
    },
}

#[derive(Debug, Deserialize)]
struct LbArtist {
    name: String,
    #[serde(default)]
    score: Option<f64>,
}

pub struct ListenBrainzClient {
    client: reqwest::Client,
    base_url: String,
    algorithm: String,
    resolver: Arc<dyn ArtistIdResolver>,
    rate_limiter: DirectRateLimiter,
}

impl ListenBrainzClient {
    pub fn new(
        resolver: Arc<dyn ArtistIdResolver>,
        algorithm: String,
        user_agent: &str,
        requests_per_second: u32,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER, user_agent, timeout)?,
            base_url: LISTENBRAINZ_LABS_URL.to_string(),
            algorithm,
            resolver,
            rate_limiter: rate_limiter(requests_per_second),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Similar artists for a known MBID
    pub async fn similar_by_mbid(&self, mbid: Uuid) -> ProviderResult<Vec<SimilarityCandidate>> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Querying ListenBrainz similar artists: mbid={}", mbid);

        let mbid = mbid.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("artist_mbids", mbid.as_str()),
                ("algorithm", self.algorithm.as_str()),
            ])
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
        parse_similar(&body)
    }
}

fn parse_similar(body: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
    let payload: SimilarPayload =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let artists = match payload {
        SimilarPayload::Bare(artists) => artists,
        SimilarPayload::Wrapped { artists } => artists,
    };

    let max_score = artists
        .iter()
        .filter_map(|a| a.score)
        .filter(|s| s.is_finite())
        .fold(0.0_f64, f64::max);

    Ok(artists
        .into_iter()
        .map(|artist| {
            let weight = match artist.score {
                Some(score) if max_score > 0.0 => score / max_score,
                _ => 0.0,
            };
            SimilarityCandidate::new(artist.name, weight)
        })
        .collect())
}

#[async_trait]
impl SimilarArtistProvider for ListenBrainzClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn similar_artists(&self, artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
        let mbid = self.resolver.resolve_mbid(artist).await?;
        let candidates = self.similar_by_mbid(mbid).await?;
        tracing::debug!("ListenBrainz: {} similar artists for '{}'", candidates.len(), artist);
        Ok(candidates)
    }
}
