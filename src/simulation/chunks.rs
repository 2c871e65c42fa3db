//! Chunked simulation field
//!
//! The world is tiled into fixed-size square chunks, each a
//! [`SimulationChunk`] owned exclusively by the field. Chunks never alias,
//! so stepping runs one chunk per rayon task with no coordination.

use std::collections::hash_map::Entry;

use ahash::AHashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::core::error::GridError;
use crate::core::types::GridCoord;
use crate::simulation::{SimulationChunk, SimulationGrid};
use crate::spatial::grid::{BoundedGrid, Grid};

#[derive(Debug, Clone)]
pub struct ChunkedField<C> {
    chunks: AHashMap<GridCoord, C>,
    chunk_size: usize,
}

impl<C: SimulationChunk> ChunkedField<C> {
    pub fn new(chunk_size: usize) -> Result<Self, GridError> {
        if chunk_size == 0 {
            return Err(GridError::ZeroSize { width: 0, height: 0 });
        }
        Ok(Self {
            chunks: AHashMap::new(),
            chunk_size,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk containing a world cell (floors for negative coordinates)
    #[inline]
    pub fn chunk_coord_of(&self, coord: GridCoord) -> GridCoord {
        let size = self.chunk_size as i32;
        GridCoord::new(coord.x.div_euclid(size), coord.y.div_euclid(size))
    }

    /// Position of a world cell inside its chunk
    #[inline]
    pub fn local_coord_of(&self, coord: GridCoord) -> GridCoord {
        let size = self.chunk_size as i32;
        GridCoord::new(coord.x.rem_euclid(size), coord.y.rem_euclid(size))
    }

    /// World coordinate of a chunk's (0, 0) cell
    pub fn chunk_origin(&self, chunk: GridCoord) -> GridCoord {
        let size = self.chunk_size as i32;
        GridCoord::new(chunk.x * size, chunk.y * size)
    }

    /// Place a chunk, returning any chunk it replaced
    pub fn insert_chunk(&mut self, chunk_coord: GridCoord, chunk: C) -> Result<Option<C>, GridError> {
        check_chunk_size(&chunk, self.chunk_size)?;
        Ok(self.chunks.insert(chunk_coord, chunk))
    }

    /// Existing chunk, or one built by `factory` from the chunk coordinate
    ///
    /// A factory chunk of the wrong size is rejected and nothing is stored.
    pub fn get_or_insert_with<F>(&mut self, chunk_coord: GridCoord, factory: F) -> Result<&mut C, GridError>
    where
        F: FnOnce(GridCoord) -> C,
    {
        match self.chunks.entry(chunk_coord) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let chunk = factory(chunk_coord);
                check_chunk_size(&chunk, self.chunk_size)?;
                debug!(chunk = %chunk_coord, "Creating simulation chunk");
                Ok(entry.insert(chunk))
            }
        }
    }

    pub fn chunk(&self, chunk_coord: GridCoord) -> Option<&C> {
        self.chunks.get(&chunk_coord)
    }

    pub fn chunk_mut(&mut self, chunk_coord: GridCoord) -> Option<&mut C> {
        self.chunks.get_mut(&chunk_coord)
    }

    pub fn remove_chunk(&mut self, chunk_coord: GridCoord) -> Option<C> {
        self.chunks.remove(&chunk_coord)
    }

    pub fn chunk_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Cell value, or `fallback` where no chunk is loaded
    pub fn sample_or(&self, coord: GridCoord, fallback: &C::Cell) -> C::Cell {
        self.try_get(coord).unwrap_or_else(|| fallback.clone())
    }

    fn locate(&self, coord: GridCoord) -> Option<(&C, GridCoord)> {
        let chunk = self.chunks.get(&self.chunk_coord_of(coord))?;
        Some((chunk, self.local_coord_of(coord)))
    }

    /// Step every chunk independently
    pub fn step_all(&mut self, delta_time: f32)
    where
        C: Send,
    {
        let mut chunks: Vec<&mut C> = self.chunks.values_mut().collect();
        chunks.par_iter_mut().for_each(|chunk| chunk.step(delta_time));
    }
}

fn check_chunk_size<C: BoundedGrid>(chunk: &C, size: usize) -> Result<(), GridError> {
    if chunk.width() != size || chunk.height() != size {
        return Err(GridError::DimensionMismatch {
            len: chunk.cell_count(),
            width: size,
            height: size,
        });
    }
    Ok(())
}

impl<C: SimulationChunk> Grid for ChunkedField<C> {
    type Cell = C::Cell;

    /// Unloaded chunks report `NotFound`
    fn get_at(&self, coord: GridCoord) -> Result<C::Cell, GridError> {
        let (chunk, local) = self.locate(coord).ok_or(GridError::NotFound(coord))?;
        chunk.get_at(local)
    }

    fn try_get(&self, coord: GridCoord) -> Option<C::Cell> {
        let (chunk, local) = self.locate(coord)?;
        chunk.try_get(local)
    }

    fn set_at(&mut self, coord: GridCoord, value: C::Cell) -> Result<(), GridError> {
        let local = self.local_coord_of(coord);
        let chunk_coord = self.chunk_coord_of(coord);
        let chunk = self
            .chunks
            .get_mut(&chunk_coord)
            .ok_or(GridError::NotFound(coord))?;
        chunk.set_at(local, value)
    }

    fn remove_at(&mut self, coord: GridCoord) -> Result<(), GridError> {
        let local = self.local_coord_of(coord);
        let chunk_coord = self.chunk_coord_of(coord);
        match self.chunks.get_mut(&chunk_coord) {
            Some(chunk) => chunk.remove_at(local),
            None => Ok(()),
        }
    }

    fn contains(&self, coord: GridCoord) -> bool {
        self.chunks.contains_key(&self.chunk_coord_of(coord))
    }
}
