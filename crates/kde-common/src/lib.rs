//! Common types and utilities shared across the kde contouring crates.

pub mod bbox;
pub mod config;
pub mod error;
pub mod sample;

pub use bbox::BoundingBox;
pub use config::{
    AccumulatorConfig, KdeConfig, DEFAULT_BANDWIDTH, DEFAULT_GRID_SIZE, DEFAULT_RADIUS,
    DEFAULT_THRESHOLD,
};
pub use error::{KdeError, KdeResult};
pub use sample::{Sample, StoredPoint, WeightedPoint};
