//! Tag taxonomy: the fixed set of thematic categories and the tags mapped to them
//!
//! On disk the taxonomy is `{"categories": [{"name": "Vampire", "tags": [...]}]}`.
//! A tag may belong to several categories.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Thematic category
///
/// The map's two axes are spanned by these four poles. Adding a variant is a
/// compile-time-checked change: every `match` and [`Category::ALL`] must cover it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sexy,
    NotSexy,
    Vampire,
    Carnival,
}

impl Category {
    /// Every category, in a stable order
    pub const ALL: [Category; 4] = [
        Category::Sexy,
        Category::NotSexy,
        Category::Vampire,
        Category::Carnival,
    ];

    /// Number of enumerated categories
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`Category::ALL`], usable as an array index
    pub fn index(self) -> usize {
        match self {
            Category::Sexy => 0,
            Category::NotSexy => 1,
            Category::Vampire => 2,
            Category::Carnival => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sexy => "Sexy",
            Category::NotSexy => "NotSexy",
            Category::Vampire => "Vampire",
            Category::Carnival => "Carnival",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("Unknown category '{}'", s)))
    }
}

/// A category together with the lowercase tags that map to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub category: Category,
    pub tags: BTreeSet<String>,
}

impl CategoryDefinition {
    pub fn new<I, S>(category: Category, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTaxonomy {
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Read-only taxonomy of category definitions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<CategoryDefinition>,
}

impl Taxonomy {
    /// Build a taxonomy, merging repeated definitions of the same category
    pub fn new(definitions: Vec<CategoryDefinition>) -> Self {
        let mut categories: Vec<CategoryDefinition> = Vec::new();
        for definition in definitions {
            match categories
                .iter_mut()
                .find(|existing| existing.category == definition.category)
            {
                Some(existing) => existing.tags.extend(definition.tags),
                None => categories.push(definition),
            }
        }
        Self { categories }
    }

    /// Parse the taxonomy JSON; unknown category names are skipped with a warning
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawTaxonomy = serde_json::from_str(json)?;
        let definitions = raw
            .categories
            .into_iter()
            .filter_map(|raw_category| match raw_category.name.parse::<Category>() {
                Ok(category) => Some(CategoryDefinition::new(category, raw_category.tags)),
                Err(_) => {
                    warn!("Skipping unknown taxonomy category '{}'", raw_category.name);
                    None
                }
            })
            .collect();
        Ok(Self::new(definitions))
    }

    /// Load a taxonomy file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read taxonomy {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Total number of (tag, category) pairs
    pub fn tag_count(&self) -> usize {
        self.categories.iter().map(|c| c.tags.len()).sum()
    }
}
