//! Time-stepped grids and the windowing that keeps them near the player
//!
//! A [`SimulationGrid`] advances its cells by an elapsed time. A
//! [`SimulationChunk`] is a dense simulation grid covering one tile of a
//! larger world, with its own notion of an empty cell.

pub mod chunks;
pub mod temperature;
pub mod tick;
pub mod window;

use crate::spatial::grid::{BoundedGrid, Grid};

pub use chunks::ChunkedField;
pub use temperature::{DiffusionRule, TemperatureCell, TemperatureGrid};
pub use tick::FixedTimestep;
pub use window::{read_from_dense_grid, write_to_dense_grid, ClipPolicy, SimulationWindow};

/// Grid whose cells evolve over time
pub trait SimulationGrid: Grid {
    /// Advance cell state by `delta_time` seconds
    ///
    /// Repeatable for the grid's whole lifetime. A zero step leaves every
    /// cell unchanged.
    fn step(&mut self, delta_time: f32);
}

/// Dense simulation tile with a per-chunk default cell
pub trait SimulationChunk: SimulationGrid + BoundedGrid {
    /// What "empty" means for this chunk (e.g. regional ambient temperature)
    fn default_cell(&self) -> &Self::Cell;

    fn set_default_cell(&mut self, cell: Self::Cell);

    /// Reset every cell to this chunk's default
    fn fill_default(&mut self) {
        let cell = self.default_cell().clone();
        self.initialize_with(cell);
    }
}
