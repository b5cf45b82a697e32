//! Coordinate inference engine
//!
//! Leaf-first:
//! - [`categorizer`]: tag → categories
//! - [`calibrator`]: per-category median anchors from the dataset
//! - [`similarity`]: weighted centroid of similar dataset artists
//! - [`tag_fallback`]: base position from the artist's own tags
//! - [`adjustment`]: tag-driven shift, clamp, round
//! - [`orchestrator`]: sequences the stages for one artist

pub mod adjustment;
pub mod calibrator;
pub mod categorizer;
pub mod orchestrator;
pub mod similarity;
pub mod tag_fallback;

pub use adjustment::adjust;
pub use calibrator::{calibrate, calibrate_with_taxonomy};
pub use categorizer::TagCategorizer;
pub use orchestrator::CoordinateEngine;
pub use similarity::{estimate_from_similarity, SimilaritySignal};
pub use tag_fallback::estimate_from_tags;
