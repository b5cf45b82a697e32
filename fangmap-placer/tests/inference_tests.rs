//! Coordinate inference integration tests
//!
//! Exercise the engine end to end through the public API with stub providers.

mod helpers;

use fangmap_common::{ArtistRecord, Category, ReferenceDataset};
use fangmap_placer::inference::{calibrate_with_taxonomy, CoordinateEngine};
use fangmap_placer::knowledge::{KnowledgeBase, Snapshot};
use fangmap_placer::models::{Coordinate, PlacementSource, DISPLAY_BOUND};
use helpers::{engine, in_memory_knowledge, reference_taxonomy, StubSimilarity, StubTags};
use std::sync::Arc;

#[test]
fn test_calibration_worked_example() {
    let influence =
        calibrate_with_taxonomy(helpers::reference_dataset().records(), &reference_taxonomy());

    assert_eq!(influence.get(Category::Vampire), Coordinate::new(5.0, 5.0));
    assert_eq!(influence.get(Category::Carnival), Coordinate::new(-5.0, -5.0));
    assert_eq!(influence.get(Category::Sexy), Coordinate::ORIGIN);
    assert_eq!(influence.get(Category::NotSexy), Coordinate::ORIGIN);
}

#[test]
fn test_calibration_is_deterministic_and_idempotent() {
    let dataset = helpers::reference_dataset();
    let taxonomy = reference_taxonomy();

    let first = calibrate_with_taxonomy(dataset.records(), &taxonomy);
    let second = calibrate_with_taxonomy(dataset.records(), &taxonomy);
    assert_eq!(first, second);

    let mut reversed = dataset.records().to_vec();
    reversed.reverse();
    assert_eq!(calibrate_with_taxonomy(&reversed, &taxonomy), first);
}

#[tokio::test]
async fn test_worked_example_end_to_end() {
    let tags = Arc::new(StubTags::default().answer("Z", &["vamp"]));
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::default().answer("Z", &[("X", 1.0)]),
        tags.clone(),
    );

    assert_eq!(engine.infer_coordinates("Z").await, Coordinate::new(6.25, 6.25));
    assert_eq!(tags.calls(), 1, "tags are fetched once per inference");
}

#[tokio::test]
async fn test_dataset_artists_keep_stored_coordinates() {
    let dataset = ReferenceDataset::new(vec![
        ArtistRecord::new("Far Out", 40.123, -33.0, &["vamp"]),
        ArtistRecord::new("X", 5.0, 5.0, &["vamp"]),
    ]);
    let knowledge = Arc::new(KnowledgeBase::new(Snapshot::build(
        dataset,
        &reference_taxonomy(),
    )));
    let tags = Arc::new(StubTags::default());
    let engine = engine(knowledge, StubSimilarity::failing(), tags.clone());

    let placement = engine.place("  FAR OUT ").await;
    assert_eq!(placement.coordinate, Coordinate::new(40.123, -33.0));
    assert_eq!(placement.source, PlacementSource::Dataset);
    assert_eq!(tags.calls(), 0);
}

#[tokio::test]
async fn test_weighted_centroid() {
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::default().answer("Z", &[("X", 3.0), ("Y", 1.0), ("Unknown", 50.0)]),
        Arc::new(StubTags::default()),
    );

    // (3*(5,5) + 1*(-5,-5)) / 4, unknown candidates carry no weight
    let placement = engine.place("Z").await;
    assert_eq!(placement.coordinate, Coordinate::new(2.5, 2.5));
    assert_eq!(placement.source, PlacementSource::Similarity);
}

#[tokio::test]
async fn test_unknown_only_candidates_use_tag_fallback() {
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::default().answer("Z", &[("Nobody", 1.0), ("Noone", 0.5)]),
        Arc::new(StubTags::default().answer("Z", &["vamp", "unrelated"])),
    );

    // base: vamp share 1/2 of Vampire (5,5) = (2.5,2.5); shift (1.25,1.25)
    let placement = engine.place("Z").await;
    assert_eq!(placement.source, PlacementSource::TagFallback);
    assert_eq!(placement.coordinate, Coordinate::new(3.75, 3.75));
}

#[tokio::test]
async fn test_zero_weight_candidates_are_no_signal() {
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::default().answer("Z", &[("X", 0.0)]),
        Arc::new(StubTags::default().answer("Z", &["carn"])),
    );

    let placement = engine.place("Z").await;
    assert_eq!(placement.source, PlacementSource::TagFallback);
    assert_eq!(placement.coordinate, Coordinate::new(-6.25, -6.25));
}

#[tokio::test]
async fn test_provider_outage_degrades_gracefully() {
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::failing(),
        Arc::new(StubTags::failing()),
    );

    let placement = engine.place("Anyone").await;
    assert_eq!(placement.coordinate, Coordinate::ORIGIN);
    assert_eq!(placement.source, PlacementSource::TagFallback);
}

#[tokio::test]
async fn test_computed_results_are_clamped_and_rounded() {
    let tags: Vec<&str> = std::iter::repeat("vamp").take(20).collect();
    let engine = engine(
        in_memory_knowledge(),
        StubSimilarity::default().answer("Z", &[("X", 1.0), ("Y", 2.0)]),
        Arc::new(StubTags::default().answer("Z", &tags).answer("Q", &["vamp", "carn", "vamp"])),
    );

    let clamped = engine.infer_coordinates("Z").await;
    assert_eq!(clamped, Coordinate::new(DISPLAY_BOUND, DISPLAY_BOUND));

    // No similarity for Q; base = (2/3)(5,5) + (1/3)(-5,-5) = (1.666..), shift = (1.25)
    let rounded = engine.infer_coordinates("Q").await;
    assert_eq!(rounded, Coordinate::new(2.92, 2.92));
}

#[tokio::test]
async fn test_origin_policy_is_configurable() {
    let similarity = || StubSimilarity::default().answer("Z", &[("X", 1.0), ("Y", 1.0)]);
    let tags = || Arc::new(StubTags::default().answer("Z", &["vamp"]));

    let compat = engine(in_memory_knowledge(), similarity(), tags());
    assert_eq!(compat.place("Z").await.source, PlacementSource::TagFallback);

    let strict = CoordinateEngine::new(in_memory_knowledge(), Arc::new(similarity()), tags())
        .with_origin_is_no_signal(false);
    let placement = strict.place("Z").await;
    assert_eq!(placement.source, PlacementSource::Similarity);
    assert_eq!(placement.coordinate, Coordinate::new(1.25, 1.25));
}
