//! Batch jobs over the reference dataset

pub mod enrichment;

pub use enrichment::{DatasetEnricher, EnrichmentReport, DEFAULT_TAG_COUNT};
