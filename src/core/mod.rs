//! Alignment and comparison stages

pub mod aggregate;
pub mod agreement;
pub mod crop;
pub mod distance;
pub mod edge;
pub mod mask;
pub mod mean_distance;
pub mod pipeline;
pub mod projection;
pub mod reproject;

// Re-export main types
pub use aggregate::{AggregationParams, Aggregator, BlockTally};
pub use agreement::{
    calculate_agreement, calculate_stratified_agreement, AgreementStats,
    ConfidenceStratifiedStats, ContingencyTable, CONFIDENCE_LEVELS,
};
pub use crop::{crop_to_window, CropKind, PixelWindow};
pub use distance::{distance_transform, distance_transform_brute_force};
pub use edge::find_edge;
pub use mask::{generate_mask, generate_nodata_mask};
pub use mean_distance::extract_mean_distance;
pub use pipeline::{ComparisonProducts, EdgeValidator, StatsBundle};
pub use projection::{compute_bounding_window, GdalPointTransform, PointTransform, ProjectionPair};
pub use reproject::Reprojector;
