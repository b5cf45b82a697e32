//! Coordinate inference orchestration
//!
//! For one artist:
//! 1. Dataset hit: return the stored position untouched.
//! 2. Similarity path: weighted centroid of similar dataset artists.
//! 3. Tag fallback path: only when similarity gave no signal.
//! 4. Adjust the base with the artist's tags, clamp, round.
//!
//! Top tags are fetched at most once per call and shared by steps 3 and 4.
//! Provider failures degrade to empty results; inference always produces a
//! coordinate.

use super::adjustment::adjust;
use super::similarity::estimate_from_similarity;
use super::tag_fallback::estimate_from_tags;
use crate::knowledge::KnowledgeBase;
use crate::models::{Coordinate, Placement, PlacementSource};
use crate::providers::{SimilarArtistProvider, TopTagProvider};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Places artists on the map
pub struct CoordinateEngine {
    knowledge: Arc<KnowledgeBase>,
    similarity: Arc<dyn SimilarArtistProvider>,
    tags: Arc<dyn TopTagProvider>,
    /// Treat a similarity centroid of exactly (0, 0) as "no signal"
    origin_is_no_signal: bool,
}

impl CoordinateEngine {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        similarity: Arc<dyn SimilarArtistProvider>,
        tags: Arc<dyn TopTagProvider>,
    ) -> Self {
        Self {
            knowledge,
            similarity,
            tags,
            origin_is_no_signal: true,
        }
    }

    pub fn with_origin_is_no_signal(mut self, origin_is_no_signal: bool) -> Self {
        self.origin_is_no_signal = origin_is_no_signal;
        self
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Coordinate for `artist`
    pub async fn infer_coordinates(&self, artist: &str) -> Coordinate {
        self.place(artist).await.coordinate
    }

    /// Coordinate for `artist` together with the path that produced it
    pub async fn place(&self, artist: &str) -> Placement {
        let snapshot = self.knowledge.snapshot().await;

        if let Some(record) = snapshot.dataset.lookup(artist) {
            debug!(
                "Existing artist found: {} -> ({}, {})",
                artist, record.x, record.y
            );
            return Placement {
                artist: artist.to_string(),
                coordinate: Coordinate::new(record.x, record.y),
                source: PlacementSource::Dataset,
            };
        }

        let signal = estimate_from_similarity(artist, self.similarity.as_ref(), &snapshot.dataset)
            .await
            .filter(|signal| !(self.origin_is_no_signal && signal.centroid.is_origin()));

        let tags = self.fetch_tags(artist).await;

        let (base, source) = match signal {
            Some(signal) => (signal.centroid, PlacementSource::Similarity),
            None => {
                let base = estimate_from_tags(&tags, &snapshot.categorizer, &snapshot.influence);
                debug!(
                    "Base from tags for '{}': ({:.2}, {:.2})",
                    artist, base.x, base.y
                );
                (base, PlacementSource::TagFallback)
            }
        };

        let coordinate = adjust(base, &tags, &snapshot.categorizer, &snapshot.influence);
        info!(
            "Placed '{}' at ({}, {}) via {:?}",
            artist, coordinate.x, coordinate.y, source
        );

        Placement {
            artist: artist.to_string(),
            coordinate,
            source,
        }
    }

    /// Place several artists, at most `concurrency` at a time, in input order
    pub async fn infer_many(&self, artists: &[String], concurrency: usize) -> Vec<Placement> {
        stream::iter(artists.iter().cloned())
            .map(|artist| async move { self.place(&artist).await })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    async fn fetch_tags(&self, artist: &str) -> Vec<String> {
        match self.tags.top_tags(artist).await {
            Ok(tags) => {
                debug!("Tags for '{}': {:?}", artist, tags);
                tags
            }
            Err(e) => {
                warn!("Top tags unavailable for '{}': {}", artist, e);
                Vec::new()
            }
        }
    }
}
