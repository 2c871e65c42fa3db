//! Sparse hash grids for unbounded worlds
//!
//! Only explicitly set cells are stored. What a direct read of an unset
//! coordinate means is fixed by the grid's type:
//!
//! - [`HashGrid`] reports [`GridError::NotFound`]
//! - [`FullHashGrid`] reports its default cell, for continuous fields such
//!   as temperature where every coordinate has some value
//!
//! Non-failing lookups (`try_get`) return `None` for unset cells in both.

use std::marker::PhantomData;

use ahash::AHashMap;

use crate::core::error::GridError;
use crate::core::types::{GridAabb, GridCoord};
use crate::spatial::grid::{Grid, SparseGrid};

/// Resolves a direct read of an unset coordinate
pub trait AbsentPolicy {
    fn resolve<T: Clone>(coord: GridCoord, default_cell: &T) -> Result<T, GridError>;
}

/// Unset reads fail with `NotFound`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Strict;

/// Unset reads return the default cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filled;

impl AbsentPolicy for Strict {
    fn resolve<T: Clone>(coord: GridCoord, _default_cell: &T) -> Result<T, GridError> {
        Err(GridError::NotFound(coord))
    }
}

impl AbsentPolicy for Filled {
    fn resolve<T: Clone>(_coord: GridCoord, default_cell: &T) -> Result<T, GridError> {
        Ok(default_cell.clone())
    }
}

/// Hash-backed grid that errors on unset cells
pub type HashGrid<T> = SparseHashGrid<T, Strict>;

/// Hash-backed grid that falls back to its default cell
pub type FullHashGrid<T> = SparseHashGrid<T, Filled>;

/// Hash-map cell storage, parameterized by unset-read policy
#[derive(Debug, Clone)]
pub struct SparseHashGrid<T, P> {
    cells: AHashMap<GridCoord, T>,
    default_cell: T,
    _policy: PhantomData<P>,
}

impl<T: Clone + Default, P: AbsentPolicy> SparseHashGrid<T, P> {
    pub fn new() -> Self {
        Self::with_default(T::default())
    }

    pub fn with_default(default_cell: T) -> Self {
        Self {
            cells: AHashMap::new(),
            default_cell,
            _policy: PhantomData,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn contains_key(&self, coord: GridCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    #[inline]
    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        self.cells.get(&coord)
    }

    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut T> {
        self.cells.get_mut(&coord)
    }

    /// Mutable access, inserting the default cell first if unset
    pub fn entry_or_default(&mut self, coord: GridCoord) -> &mut T {
        let default_cell = &self.default_cell;
        self.cells.entry(coord).or_insert_with(|| default_cell.clone())
    }

    /// Remove and return the stored value
    pub fn take(&mut self, coord: GridCoord) -> Option<T> {
        self.cells.remove(&coord)
    }

    /// Stored cells with their coordinates, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &T)> + '_ {
        self.cells.iter().map(|(c, v)| (*c, v))
    }

    /// Tight bounds of the stored cells, `None` when empty
    pub fn bounds(&self) -> Option<GridAabb> {
        let mut positions = self.cells.keys();
        let first = *positions.next()?;
        let mut aabb = GridAabb::new(first, first);
        for &c in positions {
            aabb.include(c);
        }
        Some(aabb)
    }
}

impl<T: Clone + Default, P: AbsentPolicy> Default for SparseHashGrid<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default, P: AbsentPolicy> Grid for SparseHashGrid<T, P> {
    type Cell = T;

    fn get_at(&self, coord: GridCoord) -> Result<T, GridError> {
        match self.cells.get(&coord) {
            Some(v) => Ok(v.clone()),
            None => P::resolve(coord, &self.default_cell),
        }
    }

    fn try_get(&self, coord: GridCoord) -> Option<T> {
        self.cells.get(&coord).cloned()
    }

    fn set_at(&mut self, coord: GridCoord, value: T) -> Result<(), GridError> {
        self.cells.insert(coord, value);
        Ok(())
    }

    fn remove_at(&mut self, coord: GridCoord) -> Result<(), GridError> {
        self.cells.remove(&coord);
        Ok(())
    }

    fn contains(&self, _coord: GridCoord) -> bool {
        true
    }
}

impl<T: Clone + Default, P: AbsentPolicy> SparseGrid for SparseHashGrid<T, P> {
    fn default_cell(&self) -> &T {
        &self.default_cell
    }

    fn set_default_cell(&mut self, cell: T) {
        self.default_cell = cell;
    }

    fn valid_positions(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.cells.keys().copied()
    }

    fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.cells.values()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

impl<T: Clone + Default, P: AbsentPolicy> FromIterator<(GridCoord, T)> for SparseHashGrid<T, P> {
    fn from_iter<I: IntoIterator<Item = (GridCoord, T)>>(iter: I) -> Self {
        let mut grid = Self::new();
        grid.cells.extend(iter);
        grid
    }
}
