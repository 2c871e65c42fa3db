pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{GridError, HearthError, Result};
pub use types::{GridAabb, GridCoord, GridTransform};
