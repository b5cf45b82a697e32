//! HTTP API handlers for fangmap-placer

pub mod coordinates;
pub mod dataset;
pub mod health;

pub use coordinates::coordinate_routes;
pub use dataset::dataset_routes;
pub use health::health_routes;
