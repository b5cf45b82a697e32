//! Last.fm API client
//!
//! Supplies both similar artists (`artist.getsimilar`, weighted by the
//! `match` score) and top tags (`artist.gettoptags`).
//!
//! API Documentation: https://www.last.fm/api

use super::{
    http_client, rate_limiter, request_error, DirectRateLimiter, ProviderError, ProviderResult,
    SimilarArtistProvider, SimilarityCandidate, TopTagProvider,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "Last.fm";
const LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";

const METHOD_SIMILAR: &str = "artist.getsimilar";
const METHOD_TOP_TAGS: &str = "artist.gettoptags";

/// Last.fm error code for an unknown artist
const ERROR_INVALID_PARAMETERS: i64 = 6;

/// Last.fm collapses single-element lists into a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimilarResponse {
    similarartists: SimilarArtists,
}

#[derive(Debug, Deserialize)]
struct SimilarArtists {
    #[serde(default)]
    artist: OneOrMany<LfmArtist>,
}

#[derive(Debug, Deserialize)]
struct LfmArtist {
    name: String,
    /// Sent as a string ("0.873"), occasionally as a number
    #[serde(rename = "match", default)]
    match_score: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    toptags: TopTags,
}

#[derive(Debug, Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: OneOrMany<LfmTag>,
}

#[derive(Debug, Deserialize)]
struct LfmTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: i64,
    #[serde(default)]
    message: String,
}

/// Last.fm client
pub struct LastFmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// How many top tags to keep
    tag_limit: usize,
    rate_limiter: DirectRateLimiter,
}

impl LastFmClient {
    pub fn new(
        api_key: String,
        user_agent: &str,
        requests_per_second: u32,
        timeout: Duration,
        tag_limit: usize,
    ) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(PROVIDER, user_agent, timeout)?,
            base_url: LASTFM_API_URL.to_string(),
            api_key,
            tag_limit,
            rate_limiter: rate_limiter(requests_per_second),
        })
    }

    /// Point the client at a different endpoint (local mirrors, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, method: &str, artist: &str) -> ProviderResult<String> {
        self.rate_limiter.until_ready().await;

        debug!("Querying Last.fm: method={} artist='{}'", method, artist);

        let response = self
            .client
            .get(&self.base_url)
            .query(&query_params(method, artist, &self.api_key))
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(PROVIDER, e))?;

        // Last.fm reports API errors in a JSON envelope, sometimes with a 4xx status
        if let Some(error) = check_error_envelope(&body, artist) {
            return Err(error);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }
        Ok(body)
    }
}

/// Query string for one call
///
/// Only `artist.gettoptags` asks for autocorrection; a corrected name on
/// `artist.getsimilar` would return neighbours of a different artist.
fn query_params<'a>(method: &'a str, artist: &'a str, api_key: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![("method", method), ("artist", artist)];
    if method == METHOD_TOP_TAGS {
        params.push(("autocorrect", "1"));
    }
    params.push(("api_key", api_key));
    params.push(("format", "json"));
    params
}

fn check_error_envelope(body: &str, artist: &str) -> Option<ProviderError> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    if envelope.error == ERROR_INVALID_PARAMETERS {
        Some(ProviderError::NotFound {
            provider: PROVIDER,
            artist: artist.to_string(),
        })
    } else {
        Some(ProviderError::Malformed {
            provider: PROVIDER,
            message: format!("error {}: {}", envelope.error, envelope.message),
        })
    }
}

fn malformed(e: serde_json::Error) -> ProviderError {
    ProviderError::Malformed {
        provider: PROVIDER,
        message: e.to_string(),
    }
}

/// Parse an `artist.getsimilar` body; a missing or unparsable match counts as 0
fn parse_similar(body: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
    let response: SimilarResponse = serde_json::from_str(body).map_err(malformed)?;
    Ok(response
        .similarartists
        .artist
        .into_vec()
        .into_iter()
        .map(|artist| {
            let weight = match artist.match_score {
                Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                _ => 0.0,
            };
            SimilarityCandidate::new(artist.name, weight)
        })
        .collect())
}

/// Parse an `artist.gettoptags` body into at most `limit` lowercase tags
fn parse_top_tags(body: &str, limit: usize) -> ProviderResult<Vec<String>> {
    let response: TopTagsResponse = serde_json::from_str(body).map_err(malformed)?;
    Ok(response
        .toptags
        .tag
        .into_vec()
        .into_iter()
        .take(limit)
        .map(|tag| tag.name.to_lowercase())
        .collect())
}

#[async_trait]
impl SimilarArtistProvider for LastFmClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn similar_artists(&self, artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
        let body = self.call(METHOD_SIMILAR, artist).await?;
        let candidates = parse_similar(&body)?;
        debug!("Last.fm: {} similar artists for '{}'", candidates.len(), artist);
        Ok(candidates)
    }
}

#[async_trait]
impl TopTagProvider for LastFmClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn top_tags(&self, artist: &str) -> ProviderResult<Vec<String>> {
        let body = self.call(METHOD_TOP_TAGS, artist).await?;
        parse_top_tags(&body, self.tag_limit)
    }
}
