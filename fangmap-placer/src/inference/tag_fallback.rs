//! Tag-based fallback estimation
//!
//! Used when no similar artist is in the dataset: the artist is placed at a
//! blend of the anchors of its own tags' categories.

use super::TagCategorizer;
use crate::models::{CategoryInfluence, Coordinate};

/// Base coordinate from the artist's tags alone
///
/// Every tag gets weight `1 / len(tags)` and adds that share of each of its
/// categories' anchors. Uncategorized tags keep their share: it is dropped,
/// not redistributed to the categorized ones.
///
/// Always followed by [`adjust`](super::adjust) on the same tags, which does
/// the counted lookup, so misses are not counted here.
pub fn estimate_from_tags(
    tags: &[String],
    categorizer: &TagCategorizer,
    influence: &CategoryInfluence,
) -> Coordinate {
    let weight = 1.0 / tags.len().max(1) as f64;

    let mut base = Coordinate::ORIGIN;
    for tag in tags {
        for &category in categorizer.lookup(tag) {
            base += influence.get(category) * weight;
        }
    }
    base
}
