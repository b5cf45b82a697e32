//! Category influence calibration
//!
//! Each category's anchor is the per-axis median position of the dataset
//! artists tagged with it. Medians keep a single oddly placed artist from
//! dragging a whole category across the map.

use super::TagCategorizer;
use crate::models::{CategoryInfluence, Coordinate};
use fangmap_common::{ArtistRecord, Category, Taxonomy};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Compute the anchor of every category from the reference dataset
///
/// An artist counts once per category no matter how many of its tags map
/// there. Categories without supporting artists stay at the origin.
pub fn calibrate(dataset: &[ArtistRecord], categorizer: &TagCategorizer) -> CategoryInfluence {
    if dataset.is_empty() {
        warn!("Calibrating against an empty dataset, all category anchors are (0, 0)");
        return CategoryInfluence::new();
    }

    let mut xs: [Vec<f64>; Category::COUNT] = Default::default();
    let mut ys: [Vec<f64>; Category::COUNT] = Default::default();
    let mut uncategorized = BTreeSet::new();

    for artist in dataset {
        let mut hit = [false; Category::COUNT];
        for tag in &artist.tags {
            if !categorizer.is_categorized(tag) {
                uncategorized.insert(tag.to_lowercase());
                continue;
            }
            for category in categorizer.categories_for(tag) {
                hit[category.index()] = true;
            }
        }

        for category in Category::ALL {
            if hit[category.index()] {
                xs[category.index()].push(artist.x);
                ys[category.index()].push(artist.y);
            }
        }
    }

    if !uncategorized.is_empty() {
        warn!("Uncategorized tags: {:?}", uncategorized);
    }

    let mut influence = CategoryInfluence::new();
    for category in Category::ALL {
        let i = category.index();
        let anchor = Coordinate::new(median(&mut xs[i]), median(&mut ys[i]));
        debug!(
            "Category {} anchor ({:.2}, {:.2}) from {} artists",
            category,
            anchor.x,
            anchor.y,
            xs[i].len()
        );
        influence.set(category, anchor);
    }
    influence
}

/// Convenience wrapper building a throwaway categorizer
pub fn calibrate_with_taxonomy(dataset: &[ArtistRecord], taxonomy: &Taxonomy) -> CategoryInfluence {
    calibrate(dataset, &TagCategorizer::new(taxonomy))
}

/// Median of the values, 0 for an empty slice (sorts in place)
///
/// Even-length input averages the two middle values.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let half = values.len() / 2;
    if values.len() % 2 == 1 {
        values[half]
    } else {
        (values[half - 1] + values[half]) / 2.0
    }
}
