//! Data models for coordinate inference

pub mod coordinate;
pub mod influence;

pub use coordinate::{Coordinate, Placement, PlacementSource, DISPLAY_BOUND};
pub use influence::CategoryInfluence;
