//! # fangmap common library
//!
//! Shared code for the fangmap workspace:
//! - Reference dataset model and loading
//! - Tag taxonomy (categories and their tag sets)
//! - Bootstrap configuration and root folder resolution
//! - Common error type

pub mod config;
pub mod dataset;
pub mod error;
pub mod taxonomy;

pub use dataset::{ArtistRecord, ReferenceDataset};
pub use error::{Error, Result};
pub use taxonomy::{Category, CategoryDefinition, Taxonomy};
