//! Grid storage: the shared contract, dense and sparse backings, and
//! occupancy queries built on top of them.

pub mod dense;
pub mod grid;
pub mod occupancy;
pub mod sparse_hash;

pub use dense::DenseGrid;
pub use grid::{BoundedGrid, Grid, SparseGrid};
pub use occupancy::{is_occupied, ObstacleMap, Occupancy};
pub use sparse_hash::{FullHashGrid, HashGrid, SparseHashGrid};
