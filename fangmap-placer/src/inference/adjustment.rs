//! Tag-driven adjustment and clamping
//!
//! The final step for every computed position: nudge the base coordinate
//! toward the categories the artist's tags hit, then clamp to the display
//! range and round.

use super::TagCategorizer;
use crate::models::{CategoryInfluence, Coordinate};
use fangmap_common::Category;
use tracing::debug;

/// How many tags resolve to each category (indexed by [`Category::index`])
///
/// A tag in several categories counts once for each.
pub fn category_counts(tags: &[String], categorizer: &TagCategorizer) -> [usize; Category::COUNT] {
    let mut counts = [0; Category::COUNT];
    for tag in tags {
        for category in categorizer.categories_for(tag) {
            counts[category.index()] += 1;
        }
    }
    counts
}

/// Shift implied by the tags
///
/// `Σ count[c] · anchor[c]` divided by the number of enumerated categories,
/// regardless of how many categories the tags actually hit.
pub fn tag_shift(
    tags: &[String],
    categorizer: &TagCategorizer,
    influence: &CategoryInfluence,
) -> Coordinate {
    let counts = category_counts(tags, categorizer);
    let normalizer = 1.0 / Category::COUNT.max(1) as f64;

    let mut shift = Coordinate::ORIGIN;
    for category in Category::ALL {
        shift += influence.get(category) * counts[category.index()] as f64;
    }
    shift * normalizer
}

/// Apply the tag shift, clamp to the display range, round to 2 decimals
pub fn adjust(
    base: Coordinate,
    tags: &[String],
    categorizer: &TagCategorizer,
    influence: &CategoryInfluence,
) -> Coordinate {
    let shift = tag_shift(tags, categorizer, influence);
    let adjusted = (base + shift).clamped().rounded();
    debug!(
        "Shift ({:.2}, {:.2}) moves ({:.2}, {:.2}) to ({}, {})",
        shift.x, shift.y, base.x, base.y, adjusted.x, adjusted.y
    );
    adjusted
}
