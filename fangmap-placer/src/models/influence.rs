//! Per-category anchor coordinates

use super::Coordinate;
use fangmap_common::Category;
use serde::{Serialize, Serializer};

/// Anchor coordinate for every [`Category`]
///
/// Always complete: a category without supporting data sits at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryInfluence {
    anchors: [Coordinate; Category::COUNT],
}

impl CategoryInfluence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> Coordinate {
        self.anchors[category.index()]
    }

    pub fn set(&mut self, category: Category, anchor: Coordinate) {
        self.anchors[category.index()] = anchor;
    }

    pub fn with(mut self, category: Category, anchor: Coordinate) -> Self {
        self.set(category, anchor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Coordinate)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

impl Serialize for CategoryInfluence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(category, anchor)| (category.as_str(), anchor)))
    }
}
