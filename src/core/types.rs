//! Core type definitions used throughout the codebase

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::error::{HearthError, Result};

/// Integer cell coordinate on an unbounded 2D lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four edge-adjacent neighbours (W, E, S, N)
    pub fn neighbors4(self) -> [GridCoord; 4] {
        [
            Self::new(self.x - 1, self.y),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x, self.y + 1),
        ]
    }

    /// Component-wise sum, `None` if either axis leaves the `i32` range
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(Self::new(self.x.checked_sub(rhs.x)?, self.y.checked_sub(rhs.y)?))
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for GridCoord {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for GridCoord {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Inclusive integer bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridAabb {
    pub min: GridCoord,
    pub max: GridCoord,
}

impl GridAabb {
    /// Box spanning two corners, in any order
    pub fn new(a: GridCoord, b: GridCoord) -> Self {
        Self {
            min: GridCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: GridCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Box of `width` x `height` cells starting at `origin`
    ///
    /// Both extents must be non-zero.
    pub fn from_origin_size(origin: GridCoord, width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0);
        Self {
            min: origin,
            max: GridCoord::new(
                origin.x + width as i32 - 1,
                origin.y + height as i32 - 1,
            ),
        }
    }

    /// Like [`GridAabb::from_origin_size`], but `None` for an empty extent or
    /// a far corner past the `i32` range
    pub fn try_from_origin_size(origin: GridCoord, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let span = GridCoord::new(i32::try_from(width - 1).ok()?, i32::try_from(height - 1).ok()?);
        Some(Self {
            min: origin,
            max: origin.checked_add(span)?,
        })
    }

    #[inline]
    pub fn contains(&self, c: GridCoord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }

    pub fn width(&self) -> usize {
        (self.max.x - self.min.x) as usize + 1
    }

    pub fn height(&self) -> usize {
        (self.max.y - self.min.y) as usize + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Every coordinate in the box, row by row
    pub fn iter(&self) -> impl Iterator<Item = GridCoord> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| GridCoord::new(x, y)))
    }

    pub fn intersection(&self, other: &GridAabb) -> Option<GridAabb> {
        let min = GridCoord::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = GridCoord::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        (min.x <= max.x && min.y <= max.y).then_some(GridAabb { min, max })
    }

    /// Grow by `n` cells on every side
    pub fn expanded(&self, n: i32) -> GridAabb {
        GridAabb::new(
            GridCoord::new(self.min.x - n, self.min.y - n),
            GridCoord::new(self.max.x + n, self.max.y + n),
        )
    }

    /// Extend to cover `c`
    pub fn include(&mut self, c: GridCoord) {
        self.min = GridCoord::new(self.min.x.min(c.x), self.min.y.min(c.y));
        self.max = GridCoord::new(self.max.x.max(c.x), self.max.y.max(c.y));
    }
}

/// Maps world-space positions onto grid cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    cell_size: f32,
    origin: Vec2,
}

impl GridTransform {
    pub fn new(cell_size: f32, origin: Vec2) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(HearthError::InvalidConfig(format!(
                "cell_size must be positive and finite, got {}",
                cell_size
            )));
        }
        Ok(Self { cell_size, origin })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Convert world position to cell coordinates
    ///
    /// Unclamped: positions left of or below the origin land on negative cells.
    #[inline]
    pub fn world_to_cell(&self, pos: Vec2) -> GridCoord {
        GridCoord::new(
            ((pos.x - self.origin.x) / self.cell_size).floor() as i32,
            ((pos.y - self.origin.y) / self.cell_size).floor() as i32,
        )
    }

    /// Lower-left corner of a cell in world coordinates
    pub fn cell_min(&self, c: GridCoord) -> Vec2 {
        Vec2::new(
            self.origin.x + c.x as f32 * self.cell_size,
            self.origin.y + c.y as f32 * self.cell_size,
        )
    }

    /// Cell center in world coordinates
    pub fn cell_center(&self, c: GridCoord) -> Vec2 {
        self.cell_min(c) + Vec2::splat(self.cell_size * 0.5)
    }
}

impl Default for GridTransform {
    fn default() -> Self {
        Self { cell_size: 1.0, origin: Vec2::ZERO }
    }
}
