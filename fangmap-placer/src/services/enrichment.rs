//! Reference dataset enrichment
//!
//! Fills in what hand-curated dataset entries usually lack: top tags (needed
//! for calibration) and MusicBrainz IDs (needed for ListenBrainz lookups).
//! Entries that already carry tags or an MBID are left alone, and a failed
//! lookup leaves the entry unchanged. Artists are processed one at a time so
//! the provider rate limits are the only pacing.

use crate::providers::{ArtistIdResolver, TopTagProvider};
use fangmap_common::ArtistRecord;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of top tags stored per artist unless overridden
pub const DEFAULT_TAG_COUNT: usize = 5;

/// Outcome of one enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    /// Artists that received tags
    pub tagged: usize,
    /// Artists that received an MBID
    pub identified: usize,
    /// Artists whose tag lookup failed or came back empty
    pub tag_failures: Vec<String>,
    /// Artists whose MBID lookup failed
    pub id_failures: Vec<String>,
}

impl EnrichmentReport {
    pub fn changed(&self) -> bool {
        self.tagged > 0 || self.identified > 0
    }
}

pub struct DatasetEnricher {
    tags: Arc<dyn TopTagProvider>,
    resolver: Option<Arc<dyn ArtistIdResolver>>,
    tag_count: usize,
}

impl DatasetEnricher {
    pub fn new(tags: Arc<dyn TopTagProvider>, tag_count: usize) -> Self {
        Self {
            tags,
            resolver: None,
            tag_count,
        }
    }

    /// Also resolve missing MBIDs
    pub fn with_resolver(mut self, resolver: Arc<dyn ArtistIdResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Enrich `records` in place
    pub async fn enrich(&self, records: &mut [ArtistRecord]) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        let pending = records
            .iter()
            .filter(|r| r.tags.is_empty() || (self.resolver.is_some() && r.external_id.is_none()))
            .count();
        info!(
            "Enriching {} of {} artists (tags via {})",
            pending,
            records.len(),
            self.tags.name()
        );

        for record in records.iter_mut() {
            if record.tags.is_empty() {
                self.fill_tags(record, &mut report).await;
            }

            if record.external_id.is_none() {
                if let Some(resolver) = &self.resolver {
                    match resolver.resolve_mbid(&record.name).await {
                        Ok(mbid) => {
                            debug!("MBID for {}: {}", record.name, mbid);
                            record.external_id = Some(mbid.to_string());
                            report.identified += 1;
                        }
                        Err(e) => {
                            warn!("MBID lookup failed for {}: {}", record.name, e);
                            report.id_failures.push(record.name.clone());
                        }
                    }
                }
            }
        }

        info!(
            "Enrichment complete: {} tagged, {} identified, {} tag failures, {} MBID failures",
            report.tagged,
            report.identified,
            report.tag_failures.len(),
            report.id_failures.len()
        );
        report
    }

    async fn fill_tags(&self, record: &mut ArtistRecord, report: &mut EnrichmentReport) {
        info!("Fetching tags for: {}", record.name);
        match self.tags.top_tags(&record.name).await {
            Ok(tags) if !tags.is_empty() => {
                record.tags = tags
                    .into_iter()
                    .take(self.tag_count)
                    .map(|t| t.to_lowercase())
                    .collect();
                debug!("Tags for {}: {:?}", record.name, record.tags);
                report.tagged += 1;
            }
            Ok(_) => {
                warn!("No tags found for {}", record.name);
                report.tag_failures.push(record.name.clone());
            }
            Err(e) => {
                warn!("Tag lookup failed for {}: {}", record.name, e);
                report.tag_failures.push(record.name.clone());
            }
        }
    }
}
