use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Classified grid of integer class codes (row x column)
pub type ClassGrid = Array2<i16>;

/// Boolean grid: validity masks, no-data masks and edge rasters
pub type BoolGrid = Array2<bool>;

/// Per-cell distances in grid cell units
pub type DistanceGrid = Array2<f32>;

/// No-data sentinel used by the operational product
pub const OPERATIONAL_NODATA: i16 = -1;

/// Classification codes shared by both ice edge products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum ClassCode {
    NoData = 0,
    Water = 1,
    Ice = 2,
    /// Ambiguous edge class, folded into `Ice` on crop
    EdgeVariant = 3,
    Land = 9,
    NoDataAlt = 10,
}

impl ClassCode {
    pub const fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ClassCode::NoData),
            1 => Some(ClassCode::Water),
            2 => Some(ClassCode::Ice),
            3 => Some(ClassCode::EdgeVariant),
            9 => Some(ClassCode::Land),
            10 => Some(ClassCode::NoDataAlt),
            _ => None,
        }
    }

    /// True for both no-data codes
    pub fn is_nodata_code(code: i16) -> bool {
        code == ClassCode::NoData.code() || code == ClassCode::NoDataAlt.code()
    }
}

impl std::fmt::Display for ClassCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassCode::NoData => write!(f, "no-data"),
            ClassCode::Water => write!(f, "water"),
            ClassCode::Ice => write!(f, "ice"),
            ClassCode::EdgeVariant => write!(f, "edge"),
            ClassCode::Land => write!(f, "land"),
            ClassCode::NoDataAlt => write!(f, "no-data (alt)"),
        }
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform with square pixels
    pub fn north_up(top_left_x: f64, top_left_y: f64, pixel_size: f64) -> Self {
        Self {
            top_left_x,
            pixel_width: pixel_size,
            rotation_x: 0.0,
            top_left_y,
            rotation_y: 0.0,
            pixel_height: -pixel_size,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Map fractional pixel coordinates (column, row) to projected coordinates
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            self.top_left_y + col * self.rotation_y + row * self.pixel_height,
        )
    }

    /// Map projected coordinates back to fractional pixel coordinates (column, row)
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> ValidationResult<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y;
        if det.abs() < f64::EPSILON {
            return Err(ValidationError::Projection(format!(
                "Geotransform is not invertible: {:?}",
                self.to_gdal()
            )));
        }

        let dx = x - self.top_left_x;
        let dy = y - self.top_left_y;
        let col = (dx * self.pixel_height - dy * self.rotation_x) / det;
        let row = (dy * self.pixel_width - dx * self.rotation_y) / det;
        Ok((col, row))
    }
}

/// Window in target-projection coordinates covered by the reference product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingWindow {
    pub ulx: f64,
    pub uly: f64,
    pub lrx: f64,
    pub lry: f64,
}

impl BoundingWindow {
    pub fn width(&self) -> f64 {
        self.lrx - self.ulx
    }

    pub fn height(&self) -> f64 {
        self.uly - self.lry
    }
}

/// A single raster band held in memory with its georeferencing
#[derive(Debug, Clone)]
pub struct RasterLayer {
    pub data: ClassGrid,
    /// PROJ.4 definition of the layer's projection
    pub projection: String,
    pub geo_transform: GeoTransform,
    pub nodata: Option<f64>,
}

impl RasterLayer {
    pub fn new(data: ClassGrid, projection: impl Into<String>, geo_transform: GeoTransform) -> Self {
        Self {
            data,
            projection: projection.into(),
            geo_transform,
            nodata: None,
        }
    }

    /// Raster size as (columns, rows), matching GDAL's convention
    pub fn raster_size(&self) -> (usize, usize) {
        let (rows, cols) = self.data.dim();
        (cols, rows)
    }
}

/// Error types for edge validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Bounds error: {0}")]
    Bounds(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Grid shape mismatch: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fail with a `Shape` error unless both grids have the same dimensions
pub(crate) fn ensure_same_shape<A, B>(
    what: &str,
    a: &Array2<A>,
    b: &Array2<B>,
) -> ValidationResult<()> {
    if a.dim() != b.dim() {
        return Err(ValidationError::Shape(format!(
            "{}: {:?} vs {:?}",
            what,
            a.dim(),
            b.dim()
        )));
    }
    Ok(())
}
