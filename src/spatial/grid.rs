//! Storage-independent grid contracts
//!
//! Simulation and query code is written against these traits so the same
//! logic runs over an unbounded hash-backed world or a fixed dense window.

use crate::core::error::GridError;
use crate::core::types::{GridAabb, GridCoord};

/// Get/set/remove access over a coordinate space
pub trait Grid {
    type Cell: Clone + Default;

    /// Cell value at `coord`
    ///
    /// Dense storage fails with [`GridError::OutOfRange`] outside its bounds.
    /// Sparse storage either fails with [`GridError::NotFound`] or falls back
    /// to its default cell, depending on the variant.
    fn get_at(&self, coord: GridCoord) -> Result<Self::Cell, GridError>;

    /// Non-failing lookup; `None` when absent or out of range
    fn try_get(&self, coord: GridCoord) -> Option<Self::Cell>;

    fn set_at(&mut self, coord: GridCoord, value: Self::Cell) -> Result<(), GridError>;

    /// Reset a dense cell to `Cell::default()`, or delete a sparse entry
    fn remove_at(&mut self, coord: GridCoord) -> Result<(), GridError>;

    /// Whether `coord` is addressable at all
    fn contains(&self, coord: GridCoord) -> bool;

    fn get_or_default(&self, coord: GridCoord) -> Self::Cell {
        self.try_get(coord).unwrap_or_default()
    }
}

/// Fixed-size rectangular storage with O(1) indexed access
pub trait BoundedGrid: Grid {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Set every cell to `value`
    fn initialize_with(&mut self, value: Self::Cell);

    /// Flattened row-major backing store (index = y * width + x)
    fn data(&self) -> &[Self::Cell];

    fn data_mut(&mut self) -> &mut [Self::Cell];

    /// Reset every cell to the type default
    fn initialize(&mut self) {
        self.initialize_with(Self::Cell::default());
    }

    fn bounds(&self) -> GridAabb {
        GridAabb::from_origin_size(GridCoord::ZERO, self.width(), self.height())
    }

    fn cell_count(&self) -> usize {
        self.width() * self.height()
    }
}

/// Unbounded storage that only keeps explicitly set cells
pub trait SparseGrid: Grid {
    /// Value conceptually present at every unset coordinate
    fn default_cell(&self) -> &Self::Cell;

    fn set_default_cell(&mut self, cell: Self::Cell);

    /// Every explicitly set coordinate, in no particular order
    fn valid_positions(&self) -> impl Iterator<Item = GridCoord> + '_;

    /// Every explicitly set value, in no particular order
    fn values(&self) -> impl Iterator<Item = &Self::Cell> + '_;

    /// Number of stored cells
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
