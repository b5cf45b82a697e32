//! Reference knowledge snapshot
//!
//! Dataset, categorizer and calibrated influence travel together as one
//! immutable [`Snapshot`]. Inference clones the current `Arc<Snapshot>` once
//! and works on it for the whole call. A reload builds a complete new
//! snapshot before swapping it in, so readers never observe a dataset paired
//! with anchors calibrated from a different one.

use crate::inference::{calibrate, TagCategorizer};
use crate::models::CategoryInfluence;
use chrono::{DateTime, Utc};
use fangmap_common::{ReferenceDataset, Result, Taxonomy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Dataset, taxonomy and the anchors calibrated from them
#[derive(Debug)]
pub struct Snapshot {
    pub dataset: ReferenceDataset,
    pub categorizer: TagCategorizer,
    pub influence: CategoryInfluence,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Calibrate the taxonomy against the dataset
    pub fn build(dataset: ReferenceDataset, taxonomy: &Taxonomy) -> Self {
        let categorizer = TagCategorizer::new(taxonomy);
        let influence = calibrate(dataset.records(), &categorizer);
        info!(
            "Calibrated {} categories from {} artists ({} categorized tags)",
            fangmap_common::Category::COUNT,
            dataset.len(),
            categorizer.len()
        );

        Self {
            dataset,
            categorizer,
            influence,
            loaded_at: Utc::now(),
        }
    }
}

/// Where the dataset and taxonomy live on disk
#[derive(Debug, Clone)]
pub struct DataSources {
    pub dataset_file: PathBuf,
    pub taxonomy_file: PathBuf,
}

impl DataSources {
    pub fn new(dataset_file: impl Into<PathBuf>, taxonomy_file: impl Into<PathBuf>) -> Self {
        Self {
            dataset_file: dataset_file.into(),
            taxonomy_file: taxonomy_file.into(),
        }
    }

    /// Read both files and build a snapshot
    pub fn load(&self) -> Result<Snapshot> {
        let dataset = ReferenceDataset::load(&self.dataset_file)?;
        let taxonomy = Taxonomy::load(&self.taxonomy_file)?;
        Ok(Snapshot::build(dataset, &taxonomy))
    }

    pub fn dataset_file(&self) -> &Path {
        &self.dataset_file
    }
}

/// Holder of the current snapshot
pub struct KnowledgeBase {
    current: RwLock<Arc<Snapshot>>,
    /// Serializes reloads; readers only ever take the read lock briefly
    reload_lock: Mutex<()>,
    sources: Option<DataSources>,
}

impl KnowledgeBase {
    /// In-memory knowledge base without on-disk sources (reload unavailable)
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
            sources: None,
        }
    }

    /// Load the initial snapshot from disk
    pub fn load(sources: DataSources) -> Result<Self> {
        let snapshot = sources.load()?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
            sources: Some(sources),
        })
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Re-read the sources, recalibrate and swap
    ///
    /// On error the current snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<Snapshot>> {
        let sources = self.sources.as_ref().ok_or_else(|| {
            fangmap_common::Error::Config("Knowledge base has no on-disk sources".to_string())
        })?;

        let _guard = self.reload_lock.lock().await;
        let snapshot = Arc::new(sources.load()?);
        *self.current.write().await = snapshot.clone();
        info!("Reference data reloaded: {} artists", snapshot.dataset.len());
        Ok(snapshot)
    }

    pub fn sources(&self) -> Option<&DataSources> {
        self.sources.as_ref()
    }
}
