//! Tag → category lookup

use fangmap_common::{Category, Taxonomy};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Maps raw folksonomy tags to taxonomy categories
///
/// Built once from a [`Taxonomy`]. Lookups are case-insensitive. A tag outside
/// the taxonomy is normal and yields no categories; such lookups are only
/// counted for diagnostics.
#[derive(Debug, Default)]
pub struct TagCategorizer {
    /// Lowercase tag → categories containing it, in taxonomy order
    index: HashMap<String, Vec<Category>>,
    unmatched_lookups: AtomicU64,
}

impl TagCategorizer {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let mut index: HashMap<String, Vec<Category>> = HashMap::new();
        for definition in taxonomy.categories() {
            for tag in &definition.tags {
                let categories = index.entry(tag.clone()).or_default();
                if !categories.contains(&definition.category) {
                    categories.push(definition.category);
                }
            }
        }

        Self {
            index,
            unmatched_lookups: AtomicU64::new(0),
        }
    }

    /// Categories the tag belongs to; empty when the taxonomy does not know it
    ///
    /// An unknown tag is counted in [`unmatched_lookups`](Self::unmatched_lookups).
    pub fn categories_for(&self, tag: &str) -> &[Category] {
        let categories = self.lookup(tag);
        if categories.is_empty() {
            self.unmatched_lookups.fetch_add(1, Ordering::Relaxed);
        }
        categories
    }

    /// Same as [`categories_for`](Self::categories_for) without counting misses
    ///
    /// For a second pass over tags that were already resolved once in the
    /// same inference call.
    pub fn lookup(&self, tag: &str) -> &[Category] {
        self.index
            .get(&tag.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the tag maps to at least one category (not counted)
    pub fn is_categorized(&self, tag: &str) -> bool {
        self.index.contains_key(&tag.trim().to_lowercase())
    }

    /// Number of lookups that found no category since construction
    pub fn unmatched_lookups(&self) -> u64 {
        self.unmatched_lookups.load(Ordering::Relaxed)
    }

    /// Number of distinct categorized tags
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fangmap_common::CategoryDefinition;

    fn categorizer() -> TagCategorizer {
        TagCategorizer::new(&Taxonomy::new(vec![
            CategoryDefinition::new(Category::Vampire, ["gothic rock", "darkwave"]),
            CategoryDefinition::new(Category::Sexy, ["darkwave", "rnb"]),
            CategoryDefinition::new(Category::Carnival, ["ska"]),
        ]))
    }

    #[test]
    fn test_lookup_normalizes_case() {
        let categorizer = categorizer();
        assert_eq!(categorizer.categories_for("Gothic Rock"), &[Category::Vampire]);
        assert_eq!(categorizer.categories_for(" SKA "), &[Category::Carnival]);
    }

    #[test]
    fn test_tag_in_multiple_categories() {
        let categorizer = categorizer();
        assert_eq!(
            categorizer.categories_for("darkwave"),
            &[Category::Vampire, Category::Sexy]
        );
    }

    #[test]
    fn test_unmatched_tags_are_counted() {
        let categorizer = categorizer();
        assert!(categorizer.categories_for("polka").is_empty());
        assert!(categorizer.categories_for("seen live").is_empty());
        assert!(!categorizer.categories_for("rnb").is_empty());

        assert_eq!(categorizer.unmatched_lookups(), 2);
        assert!(!categorizer.is_categorized("polka"));
        assert_eq!(categorizer.unmatched_lookups(), 2, "is_categorized does not count");
        assert!(categorizer.lookup("polka").is_empty());
        assert_eq!(categorizer.lookup("RnB"), categorizer.categories_for("rnb"));
        assert_eq!(categorizer.unmatched_lookups(), 2, "lookup does not count");
        assert_eq!(categorizer.len(), 4);
    }
}
