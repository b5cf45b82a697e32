//! Positions on the thematic map
//!
//! x runs from "not sexy" (negative) to "sexy" (positive), y from carnival
//! to vampire. Every computed position is clamped to [`DISPLAY_BOUND`] and
//! rounded to two decimals; dataset positions are returned as stored.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul};

/// Computed coordinates are clamped to `[-DISPLAY_BOUND, DISPLAY_BOUND]` on both axes
pub const DISPLAY_BOUND: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Clamp both axes to the display range
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-DISPLAY_BOUND, DISPLAY_BOUND),
            y: self.y.clamp(-DISPLAY_BOUND, DISPLAY_BOUND),
        }
    }

    /// Round both axes to two decimal places
    pub fn rounded(self) -> Self {
        Self {
            x: round2(self.x),
            y: round2(self.y),
        }
    }

    /// Arithmetic mean of a list of coordinates, origin when empty
    pub fn average(coordinates: &[Coordinate]) -> Coordinate {
        if coordinates.is_empty() {
            return Coordinate::ORIGIN;
        }
        let total = coordinates
            .iter()
            .fold(Coordinate::ORIGIN, |acc, &c| acc + c);
        total * (1.0 / coordinates.len() as f64)
    }
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid reporting -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coordinate {
    fn add_assign(&mut self, rhs: Coordinate) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Coordinate {
    type Output = Coordinate;

    fn mul(self, factor: f64) -> Coordinate {
        Coordinate::new(self.x * factor, self.y * factor)
    }
}

/// Which stage produced a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementSource {
    /// Stored position from the reference dataset
    Dataset,
    /// Weighted average of similar dataset artists, then tag adjustment
    Similarity,
    /// Category anchors of the artist's own tags, then tag adjustment
    TagFallback,
}

/// Result of placing one artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub artist: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub source: PlacementSource,
}
