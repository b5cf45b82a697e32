//! Shared fixtures: in-test providers and a small reference world
//!
//! Dataset: X(5,5,[vamp]), Y(-5,-5,[carn]) with Vampire = {vamp} and
//! Carnival = {carn}, so the anchors are Vampire=(5,5) and Carnival=(-5,-5).

#![allow(dead_code)]

use async_trait::async_trait;
use fangmap_common::{ArtistRecord, Category, CategoryDefinition, ReferenceDataset, Taxonomy};
use fangmap_placer::inference::CoordinateEngine;
use fangmap_placer::knowledge::{DataSources, KnowledgeBase, Snapshot};
use fangmap_placer::providers::{
    ProviderError, ProviderResult, SimilarArtistProvider, SimilarityCandidate, TopTagProvider,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const DATASET_JSON: &str = r#"[
  {"artist": "X", "x": 5, "y": 5, "tags": ["vamp"]},
  {"artist": "Y", "x": -5, "y": -5, "tags": ["carn"]}
]"#;

pub const TAXONOMY_JSON: &str = r#"{"categories": [
  {"name": "Vampire", "tags": ["vamp"]},
  {"name": "Carnival", "tags": ["carn"]}
]}"#;

/// Similar artists keyed by queried artist; unknown artists get an empty list
#[derive(Default)]
pub struct StubSimilarity {
    pub answers: HashMap<String, Vec<SimilarityCandidate>>,
    pub fail: bool,
}

impl StubSimilarity {
    pub fn answer(mut self, artist: &str, candidates: &[(&str, f64)]) -> Self {
        self.answers.insert(
            artist.to_string(),
            candidates
                .iter()
                .map(|(name, weight)| SimilarityCandidate::new(*name, *weight))
                .collect(),
        );
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SimilarArtistProvider for StubSimilarity {
    fn name(&self) -> &'static str {
        "stub-similarity"
    }

    async fn similar_artists(&self, artist: &str) -> ProviderResult<Vec<SimilarityCandidate>> {
        if self.fail {
            return Err(ProviderError::Unavailable {
                provider: "stub-similarity",
                message: "timed out".to_string(),
            });
        }
        Ok(self.answers.get(artist).cloned().unwrap_or_default())
    }
}

/// Tags keyed by artist; counts every call
#[derive(Default)]
pub struct StubTags {
    pub answers: HashMap<String, Vec<String>>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubTags {
    pub fn answer(mut self, artist: &str, tags: &[&str]) -> Self {
        self.answers
            .insert(artist.to_string(), tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopTagProvider for StubTags {
    fn name(&self) -> &'static str {
        "stub-tags"
    }

    async fn top_tags(&self, artist: &str) -> ProviderResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Status {
                provider: "stub-tags",
                status: 503,
            });
        }
        Ok(self.answers.get(artist).cloned().unwrap_or_default())
    }
}

pub fn reference_dataset() -> ReferenceDataset {
    ReferenceDataset::new(vec![
        ArtistRecord::new("X", 5.0, 5.0, &["vamp"]),
        ArtistRecord::new("Y", -5.0, -5.0, &["carn"]),
    ])
}

pub fn reference_taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        CategoryDefinition::new(Category::Vampire, ["vamp"]),
        CategoryDefinition::new(Category::Carnival, ["carn"]),
    ])
}

/// In-memory knowledge base (reload unavailable)
pub fn in_memory_knowledge() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::new(Snapshot::build(
        reference_dataset(),
        &reference_taxonomy(),
    )))
}

/// Write the reference files into `dir` and load a knowledge base from them
pub fn on_disk_knowledge(dir: &Path) -> (Arc<KnowledgeBase>, DataSources) {
    let sources = DataSources::new(dir.join("data.json"), dir.join("tag_data.json"));
    std::fs::write(&sources.dataset_file, DATASET_JSON).unwrap();
    std::fs::write(&sources.taxonomy_file, TAXONOMY_JSON).unwrap();
    let knowledge = KnowledgeBase::load(sources.clone()).unwrap();
    (Arc::new(knowledge), sources)
}

pub fn engine(
    knowledge: Arc<KnowledgeBase>,
    similarity: StubSimilarity,
    tags: Arc<StubTags>,
) -> Arc<CoordinateEngine> {
    Arc::new(CoordinateEngine::new(knowledge, Arc::new(similarity), tags))
}
