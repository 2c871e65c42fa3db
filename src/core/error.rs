use thiserror::Error;

use crate::core::types::GridCoord;

/// Failures raised by grid storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Coordinate {coord} out of range for {width}x{height} grid")]
    OutOfRange {
        coord: GridCoord,
        width: usize,
        height: usize,
    },

    #[error("No cell stored at {0}")]
    NotFound(GridCoord),

    #[error("Grid data has {len} cells but {width}x{height} were declared")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("Grid dimensions must be non-zero, got {width}x{height}")]
    ZeroSize { width: usize, height: usize },

    #[error("A {width}x{height} region at {origin} runs past the coordinate range")]
    CoordinateOverflow {
        origin: GridCoord,
        width: usize,
        height: usize,
    },
}

#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HearthError>;
