//! Occupancy and placement queries over any grid
//!
//! Steering and obstacle placement only need to know whether a cell is
//! taken. These helpers work through the [`Grid`] contract, so the same query
//! runs against a sparse world or a dense window. Unset and out-of-range
//! cells read as free.

use glam::Vec2;

use crate::core::types::{GridAabb, GridCoord, GridTransform};
use crate::spatial::grid::{Grid, SparseGrid};
use crate::spatial::sparse_hash::HashGrid;

/// Cell payloads that can block a cell
pub trait Occupancy {
    fn is_blocking(&self) -> bool;
}

impl Occupancy for bool {
    fn is_blocking(&self) -> bool {
        *self
    }
}

impl<T> Occupancy for Option<T> {
    fn is_blocking(&self) -> bool {
        self.is_some()
    }
}

/// Whether `coord` holds a blocking cell
#[inline]
pub fn is_occupied<G>(grid: &G, coord: GridCoord) -> bool
where
    G: Grid,
    G::Cell: Occupancy,
{
    grid.try_get(coord).is_some_and(|cell| cell.is_blocking())
}

/// Free coordinates inside `area`, row by row
pub fn free_cells<'a, G>(grid: &'a G, area: GridAabb) -> impl Iterator<Item = GridCoord> + 'a
where
    G: Grid,
    G::Cell: Occupancy,
{
    area.iter().filter(move |&c| !is_occupied(grid, c))
}

/// First free coordinate inside `area` in row-major order
pub fn first_free<G>(grid: &G, area: GridAabb) -> Option<GridCoord>
where
    G: Grid,
    G::Cell: Occupancy,
{
    free_cells(grid, area).next()
}

pub fn count_occupied<G>(grid: &G, area: GridAabb) -> usize
where
    G: Grid,
    G::Cell: Occupancy,
{
    area.iter().filter(|&c| is_occupied(grid, c)).count()
}

/// Set of blocked cells for steering and placement
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    cells: HashGrid<bool>,
    transform: GridTransform,
}

impl ObstacleMap {
    pub fn new(transform: GridTransform) -> Self {
        Self {
            cells: HashGrid::new(),
            transform,
        }
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Underlying grid, for the generic queries above
    pub fn grid(&self) -> &HashGrid<bool> {
        &self.cells
    }

    pub fn block(&mut self, coord: GridCoord) {
        *self.cells.entry_or_default(coord) = true;
    }

    pub fn unblock(&mut self, coord: GridCoord) {
        self.cells.take(coord);
    }

    pub fn is_blocked(&self, coord: GridCoord) -> bool {
        is_occupied(&self.cells, coord)
    }

    /// Check if a world position is blocked
    pub fn is_position_blocked(&self, pos: Vec2) -> bool {
        self.is_blocked(self.transform.world_to_cell(pos))
    }

    pub fn block_region(&mut self, area: GridAabb) {
        for c in area.iter() {
            self.block(c);
        }
    }

    /// Block all cells whose center lies inside a polygon footprint
    pub fn block_footprint(&mut self, footprint: &[Vec2]) {
        if footprint.is_empty() {
            return;
        }

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in footprint {
            min = min.min(*p);
            max = max.max(*p);
        }

        let area = GridAabb::new(
            self.transform.world_to_cell(min),
            self.transform.world_to_cell(max),
        );
        for c in area.iter() {
            if point_in_polygon(self.transform.cell_center(c), footprint) {
                self.block(c);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Check if a point is inside a polygon using ray casting algorithm
///
/// Casts a ray from the point to the right and counts intersections.
/// Odd number of intersections means the point is inside.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}
