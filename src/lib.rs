//! icedge: sea-ice edge product comparison
//!
//! Aligns a high-resolution reference ice edge product with a coarser
//! operational product in another polar stereographic projection, then
//! measures how far their ice edges lie apart and how well their
//! water/ice classifications agree, overall and per confidence level.

pub mod config;
pub mod core;
pub mod io;
pub mod types;

// Re-export main types and functions for easier access
pub use config::{ProductSpec, ValidationConfig};
pub use crate::core::{EdgeValidator, StatsBundle};
pub use io::ProductReader;
pub use types::{
    BoolGrid, BoundingWindow, ClassCode, ClassGrid, DistanceGrid, GeoTransform, RasterLayer,
    ValidationError, ValidationResult,
};
