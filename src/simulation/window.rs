//! Windowed simulation over an unbounded world
//!
//! A small dense window tracks a moving region of a larger world grid. Each
//! tick the window is recentred on an anchor, filled from the world, stepped,
//! and optionally committed back.
//!
//! Transfers are row-major, but no cell read depends on another write within
//! the same transfer.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::error::GridError;
use crate::core::types::{GridAabb, GridCoord, GridTransform};
use crate::simulation::{SimulationChunk, SimulationGrid};
use crate::spatial::grid::{BoundedGrid, Grid, SparseGrid};

/// How a transfer treats window cells that fall outside a bounded world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipPolicy {
    /// Propagate the world's out-of-range error
    #[default]
    Strict,
    /// Skip cells the world cannot address
    Clip,
}

/// Copy world cells into the window: `window(x, y) = world(x + offset.x, y + offset.y)`
///
/// Fails on the first cell the world cannot produce, leaving the window as it was.
pub fn write_to_dense_grid<S, W>(world: &S, window: &mut W, offset: GridCoord) -> Result<usize, GridError>
where
    S: Grid,
    W: BoundedGrid<Cell = S::Cell>,
{
    write_to_dense_grid_with(world, window, offset, ClipPolicy::Strict)
}

/// Copy window cells into the world: `world(x + offset.x, y + offset.y) = window(x, y)`
///
/// Fails without writing anything if any target is outside the world.
pub fn read_from_dense_grid<S, W>(world: &mut S, window: &W, offset: GridCoord) -> Result<usize, GridError>
where
    S: Grid,
    W: BoundedGrid<Cell = S::Cell>,
{
    read_from_dense_grid_with(world, window, offset, ClipPolicy::Strict)
}

/// World-to-window transfer under an explicit clip policy
///
/// Returns the number of cells copied. Every world read happens before the
/// first window write, so a failed transfer leaves the window untouched.
pub fn write_to_dense_grid_with<S, W>(
    world: &S,
    window: &mut W,
    offset: GridCoord,
    policy: ClipPolicy,
) -> Result<usize, GridError>
where
    S: Grid,
    W: BoundedGrid<Cell = S::Cell>,
{
    let width = window.width();
    footprint_at(offset, width, window.height())?;

    let mut staged = Vec::with_capacity(window.cell_count());
    for i in 0..window.cell_count() {
        let source = local_coord(i, width) + offset;
        if policy == ClipPolicy::Clip && !world.contains(source) {
            staged.push(None);
        } else {
            staged.push(Some(world.get_at(source)?));
        }
    }

    let mut copied = 0;
    for (slot, value) in window.data_mut().iter_mut().zip(staged) {
        if let Some(value) = value {
            *slot = value;
            copied += 1;
        }
    }
    trace!(copied, %offset, "world -> window");
    Ok(copied)
}

/// Window-to-world transfer under an explicit clip policy
///
/// Returns the number of cells copied. Under [`ClipPolicy::Strict`] every
/// target is checked before the first world write, so a failed transfer
/// leaves the world untouched.
pub fn read_from_dense_grid_with<S, W>(
    world: &mut S,
    window: &W,
    offset: GridCoord,
    policy: ClipPolicy,
) -> Result<usize, GridError>
where
    S: Grid,
    W: BoundedGrid<Cell = S::Cell>,
{
    let width = window.width();
    footprint_at(offset, width, window.height())?;

    if policy == ClipPolicy::Strict {
        for i in 0..window.cell_count() {
            let target = local_coord(i, width) + offset;
            if !world.contains(target) {
                return Err(world.get_at(target).err().unwrap_or(GridError::NotFound(target)));
            }
        }
    }

    let mut copied = 0;
    for (i, value) in window.data().iter().enumerate() {
        let target = local_coord(i, width) + offset;
        if policy == ClipPolicy::Clip && !world.contains(target) {
            continue;
        }
        world.set_at(target, value.clone())?;
        copied += 1;
    }
    trace!(copied, %offset, "window -> world");
    Ok(copied)
}

/// World rectangle of a `width` x `height` window at `offset`
fn footprint_at(offset: GridCoord, width: usize, height: usize) -> Result<GridAabb, GridError> {
    GridAabb::try_from_origin_size(offset, width, height).ok_or(GridError::CoordinateOverflow {
        origin: offset,
        width,
        height,
    })
}

#[inline]
fn local_coord(index: usize, width: usize) -> GridCoord {
    GridCoord::new((index % width) as i32, (index / width) as i32)
}

/// A world grid plus a dense simulation window positioned inside it
///
/// Window cell (x, y) corresponds to world cell (x + offset.x, y + offset.y).
#[derive(Debug, Clone)]
pub struct SimulationWindow<S, W> {
    world: S,
    window: W,
    offset: GridCoord,
    policy: ClipPolicy,
}

impl<S, W> SimulationWindow<S, W>
where
    S: Grid,
    W: BoundedGrid<Cell = S::Cell> + SimulationGrid,
{
    pub fn new(world: S, window: W) -> Self {
        Self {
            world,
            window,
            offset: GridCoord::ZERO,
            policy: ClipPolicy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: ClipPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ClipPolicy {
        self.policy
    }

    /// World coordinate of the window's (0, 0) cell
    pub fn offset(&self) -> GridCoord {
        self.offset
    }

    /// Move the window's origin
    ///
    /// Fails with [`GridError::CoordinateOverflow`] when the footprint would
    /// run past the `i32` range; the offset is unchanged in that case.
    pub fn set_offset(&mut self, offset: GridCoord) -> Result<(), GridError> {
        footprint_at(offset, self.window.width(), self.window.height())?;
        self.offset = offset;
        Ok(())
    }

    /// Center the window on `anchor`; returns whether the offset moved
    pub fn recenter(&mut self, anchor: GridCoord) -> Result<bool, GridError> {
        let (width, height) = (self.window.width(), self.window.height());
        let half = GridCoord::new((width / 2) as i32, (height / 2) as i32);
        let offset = anchor.checked_sub(half).ok_or(GridError::CoordinateOverflow {
            origin: anchor,
            width,
            height,
        })?;
        if offset == self.offset {
            return Ok(false);
        }
        footprint_at(offset, width, height)?;
        debug!(from = %self.offset, to = %offset, "Recentering simulation window");
        self.offset = offset;
        Ok(true)
    }

    /// Center the window on a world-space position
    pub fn follow(&mut self, position: Vec2, transform: &GridTransform) -> Result<bool, GridError> {
        self.recenter(transform.world_to_cell(position))
    }

    /// World-space rectangle currently covered by the window
    pub fn footprint(&self) -> GridAabb {
        GridAabb::from_origin_size(self.offset, self.window.width(), self.window.height())
    }

    pub fn world_to_window(&self, coord: GridCoord) -> Option<GridCoord> {
        let local = coord.checked_sub(self.offset)?;
        self.window.contains(local).then_some(local)
    }

    /// World coordinate of a window cell, `None` outside the window
    pub fn window_to_world(&self, local: GridCoord) -> Option<GridCoord> {
        self.window.contains(local).then(|| local + self.offset)
    }

    /// Load the window from the world
    pub fn refresh(&mut self) -> Result<usize, GridError> {
        write_to_dense_grid_with(&self.world, &mut self.window, self.offset, self.policy)
    }

    pub fn step(&mut self, delta_time: f32) {
        self.window.step(delta_time);
    }

    /// Write the window back into the world
    pub fn commit(&mut self) -> Result<usize, GridError> {
        read_from_dense_grid_with(&mut self.world, &self.window, self.offset, self.policy)
    }

    /// Recenter, refresh, step, and optionally commit
    pub fn tick(&mut self, anchor: GridCoord, delta_time: f32, commit: bool) -> Result<(), GridError> {
        self.recenter(anchor)?;
        self.refresh()?;
        self.step(delta_time);
        if commit {
            self.commit()?;
        }
        Ok(())
    }

    /// Read through the window where it covers `coord`, else the world
    pub fn sample(&self, coord: GridCoord) -> Result<S::Cell, GridError> {
        match self.world_to_window(coord) {
            Some(local) => self.window.get_at(local),
            None => self.world.get_at(coord),
        }
    }

    pub fn world(&self) -> &S {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut S {
        &mut self.world
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn into_parts(self) -> (S, W, GridCoord) {
        (self.world, self.window, self.offset)
    }
}

impl<S, W> SimulationWindow<S, W>
where
    S: SparseGrid,
    W: SimulationChunk<Cell = S::Cell>,
{
    /// Make the window's edge condition match the world's default cell
    pub fn sync_default_cell(&mut self) {
        self.window.set_default_cell(self.world.default_cell().clone());
    }
}
