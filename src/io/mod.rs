//! Raster input/output

pub mod naming;
pub mod raster;
pub mod writer;

pub use raster::{OperationalLayers, ProductReader};
pub use writer::GridWriter;
