//! Similarity aggregation
//!
//! Positions an artist at the weighted centroid of its similar artists that
//! the reference dataset already knows.

use crate::models::Coordinate;
use crate::providers::{SimilarArtistProvider, SimilarityCandidate};
use fangmap_common::ReferenceDataset;
use tracing::{debug, warn};

/// A usable similarity signal
#[derive(Debug, Clone, PartialEq)]
pub struct SimilaritySignal {
    /// Weighted centroid of the matched dataset artists
    pub centroid: Coordinate,
    /// Dataset names of the candidates that contributed
    pub matched: Vec<String>,
    pub total_weight: f64,
}

/// Weighted centroid of the candidates present in the dataset
///
/// `None` means "no signal": no candidate is in the dataset, or every
/// surviving candidate has zero weight.
pub fn aggregate(
    candidates: &[SimilarityCandidate],
    dataset: &ReferenceDataset,
) -> Option<SimilaritySignal> {
    let mut sum = Coordinate::ORIGIN;
    let mut total_weight = 0.0;
    let mut matched = Vec::new();

    for candidate in candidates {
        let Some(record) = dataset.lookup(&candidate.name) else {
            continue;
        };
        sum += Coordinate::new(record.x, record.y) * candidate.weight;
        total_weight += candidate.weight;
        matched.push(record.name.clone());
    }

    if matched.is_empty() {
        return None;
    }
    if total_weight <= 0.0 {
        debug!("Similar artists {:?} all carry zero weight", matched);
        return None;
    }

    Some(SimilaritySignal {
        centroid: sum * (1.0 / total_weight),
        matched,
        total_weight,
    })
}

/// Ask the provider for similar artists and aggregate them
///
/// Provider failures are logged and treated as an empty candidate list.
pub async fn estimate_from_similarity(
    artist: &str,
    provider: &dyn SimilarArtistProvider,
    dataset: &ReferenceDataset,
) -> Option<SimilaritySignal> {
    let candidates = match provider.similar_artists(artist).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Similar artists unavailable for '{}': {}", artist, e);
            Vec::new()
        }
    };

    let signal = aggregate(&candidates, dataset);
    match &signal {
        Some(signal) => debug!(
            "Found similar artists in dataset for '{}': {:?} -> ({:.2}, {:.2})",
            artist, signal.matched, signal.centroid.x, signal.centroid.y
        ),
        None => debug!(
            "No valid similar artists found for '{}' ({} candidates)",
            artist,
            candidates.len()
        ),
    }
    signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fakes::FakeSimilarity;
    use fangmap_common::ArtistRecord;

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::new(vec![
            ArtistRecord::new("X", 5.0, 5.0, &["vamp"]),
            ArtistRecord::new("Y", -5.0, -5.0, &["carn"]),
            ArtistRecord::new("W", 2.0, -8.0, &[]),
        ])
    }

    fn candidates(list: &[(&str, f64)]) -> Vec<SimilarityCandidate> {
        list.iter()
            .map(|(name, weight)| SimilarityCandidate::new(*name, *weight))
            .collect()
    }

    #[test]
    fn test_single_candidate() {
        let signal = aggregate(&candidates(&[("X", 1.0)]), &dataset()).unwrap();
        assert_eq!(signal.centroid, Coordinate::new(5.0, 5.0));
        assert_eq!(signal.matched, vec!["X".to_string()]);
    }

    #[test]
    fn test_weighted_mean_ignores_unknown_names() {
        let signal = aggregate(
            &candidates(&[("x", 0.75), ("Unknown", 1.0), ("W", 0.25)]),
            &dataset(),
        )
        .unwrap();

        // (0.75*5 + 0.25*2, 0.75*5 + 0.25*-8) / 1.0
        assert_eq!(signal.centroid, Coordinate::new(4.25, 1.75));
        assert_eq!(signal.total_weight, 1.0);
    }

    #[test]
    fn test_no_dataset_matches_is_no_signal() {
        assert!(aggregate(&candidates(&[("Nobody", 1.0)]), &dataset()).is_none());
        assert!(aggregate(&[], &dataset()).is_none());
    }

    #[test]
    fn test_zero_total_weight_is_no_signal() {
        assert!(aggregate(&candidates(&[("X", 0.0), ("Y", 0.0)]), &dataset()).is_none());
    }

    #[test]
    fn test_centroid_at_origin_is_still_a_signal() {
        let signal = aggregate(&candidates(&[("X", 1.0), ("Y", 1.0)]), &dataset()).unwrap();
        assert!(signal.centroid.is_origin());
    }

    #[tokio::test]
    async fn test_provider_failure_is_no_signal() {
        let provider = FakeSimilarity::failing();
        assert!(estimate_from_similarity("Z", &provider, &dataset()).await.is_none());
    }

    #[tokio::test]
    async fn test_estimate_uses_provider() {
        let provider = FakeSimilarity::with(&[("Y", 2.0)]);
        let signal = estimate_from_similarity("Z", &provider, &dataset()).await.unwrap();
        assert_eq!(signal.centroid, Coordinate::new(-5.0, -5.0));
    }
}
