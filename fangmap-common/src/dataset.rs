//! Reference dataset of pre-positioned artists
//!
//! The dataset is the ground truth for inference: artists with human-assigned
//! coordinates and their folksonomy tags. It is loaded once per snapshot and
//! never mutated by inference. Only the enrichment job rewrites it, by building
//! a new dataset and saving it back to disk.
//!
//! On disk it is a JSON array of `{"artist", "x", "y", "tags", "mbid"}` objects.
//! Any other keys on an entry are carried through untouched so a rewrite
//! never loses hand-curated fields.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// One artist with a known position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    /// Display name; lookups compare it case-insensitively
    #[serde(rename = "artist")]
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Ordered top tags, most relevant first
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// MusicBrainz artist MBID, when known
    #[serde(rename = "mbid", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Keys fangmap does not interpret, written back as they were read
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArtistRecord {
    pub fn new(name: impl Into<String>, x: f64, y: f64, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            external_id: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Accept a missing, null or non-array `tags` field as "no tags"
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Normalize an artist name for case-insensitive lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only collection of [`ArtistRecord`]s with a case-insensitive name index
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    records: Vec<ArtistRecord>,
    /// Normalized name → position of the first record with that name
    index: HashMap<String, usize>,
}

impl ReferenceDataset {
    pub fn new(records: Vec<ArtistRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.tags.is_empty() {
                warn!("Missing or empty tags for artist: {}", record.name);
            }
            let key = normalize_name(&record.name);
            if index.contains_key(&key) {
                debug!("Duplicate dataset artist '{}', keeping first entry", record.name);
                continue;
            }
            index.insert(key, position);
        }

        Self { records, index }
    }

    /// Parse a dataset from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ArtistRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Load a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;
        let dataset = Self::from_json_str(&content)?;
        debug!("Loaded {} artists from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Write the dataset back as pretty-printed JSON
    ///
    /// Writes to a sibling temp file first and renames it over the target,
    /// so a crash mid-write never leaves a truncated dataset behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Case-insensitive lookup by artist name
    pub fn lookup(&self, name: &str) -> Option<&ArtistRecord> {
        self.index
            .get(&normalize_name(name))
            .map(|&position| &self.records[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    pub fn records(&self) -> &[ArtistRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ArtistRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dataset = ReferenceDataset::new(vec![ArtistRecord::new(
            "Siouxsie and the Banshees",
            3.5,
            -7.0,
            &["post-punk"],
        )]);

        let record = dataset.lookup("SIOUXSIE AND THE BANSHEES").unwrap();
        assert_eq!(record.x, 3.5);
        assert_eq!(record.y, -7.0);
        assert!(dataset.contains("siouxsie and the banshees"));
        assert!(dataset.lookup("Bauhaus").is_none());
    }

    #[test]
    fn test_duplicate_names_keep_first_record() {
        let dataset = ReferenceDataset::new(vec![
            ArtistRecord::new("Ghost", 1.0, 1.0, &["metal"]),
            ArtistRecord::new("ghost", 9.0, 9.0, &["metal"]),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.lookup("GHOST").unwrap().x, 1.0);
    }

    #[test]
    fn test_parse_front_end_file_shape() {
        let json = r#"[
            {"artist": "Type O Negative", "x": 8.5, "y": -9, "tags": ["gothic metal", "doom metal"], "mbid": "abc"},
            {"artist": "Gogol Bordello", "x": -2, "y": 10},
            {"artist": "Broken", "x": 0, "y": 0, "tags": "not-a-list"}
        ]"#;

        let dataset = ReferenceDataset::from_json_str(json).unwrap();
        assert_eq!(dataset.len(), 3);

        let ton = dataset.lookup("type o negative").unwrap();
        assert_eq!(ton.tags, vec!["gothic metal", "doom metal"]);
        assert_eq!(ton.external_id.as_deref(), Some("abc"));

        assert!(dataset.lookup("Gogol Bordello").unwrap().tags.is_empty());
        assert!(dataset.lookup("Broken").unwrap().tags.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let dataset = ReferenceDataset::new(vec![ArtistRecord::new(
            "The Cramps",
            -4.25,
            6.0,
            &["psychobilly"],
        )]);
        dataset.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"artist\": \"The Cramps\""));
        assert!(!text.contains("mbid"), "absent MBID should not be written");
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = ReferenceDataset::load(&path).unwrap();
        assert_eq!(reloaded.records(), dataset.records());
    }

    #[test]
    fn test_rewrite_keeps_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"[{"artist": "Ghost", "x": 1, "y": 2, "genre": "metal", "spotify_id": "abc", "links": {"web": "x"}}]"#,
        )
        .unwrap();

        let mut records = ReferenceDataset::load(&path).unwrap().into_records();
        records[0].tags = vec!["occult rock".to_string()];
        ReferenceDataset::new(records).save(&path).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &saved[0];
        assert_eq!(entry["genre"], "metal");
        assert_eq!(entry["spotify_id"], "abc");
        assert_eq!(entry["links"]["web"], "x");
        assert_eq!(entry["tags"], serde_json::json!(["occult rock"]));
        assert_eq!(entry["x"], 1.0);

        let reloaded = ReferenceDataset::load(&path).unwrap();
        let ghost = reloaded.lookup("ghost").unwrap();
        assert_eq!(ghost.extra.len(), 3);
        assert!(!ghost.extra.contains_key("artist"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = ReferenceDataset::load(Path::new("/nonexistent/data.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
