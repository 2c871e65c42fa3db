//! Temperature diffusion over a dense chunk
//!
//! Heat spreads between edge-adjacent cells using an explicit Euler step on
//! the 4-neighbour Laplacian, and every cell slowly relaxes toward the
//! chunk's ambient default. Cells past the chunk edge read as the default
//! cell, so a chunk behaves like an open region surrounded by ambient air.
//!
//! Uses rayon for row-parallel stepping on large chunks.

use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::SimulationConfig;
use crate::core::error::{GridError, Result};
use crate::core::types::GridCoord;
use crate::simulation::{SimulationChunk, SimulationGrid};
use crate::spatial::dense::DenseGrid;
use crate::spatial::grid::{BoundedGrid, Grid};

/// One temperature sample
///
/// Layout is fixed so a chunk's backing store can be uploaded as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct TemperatureCell {
    pub temperature: f32,
    /// 0.0 exchanges freely, 1.0 is a perfect insulator
    pub insulation: f32,
}

impl TemperatureCell {
    pub fn new(temperature: f32) -> Self {
        Self { temperature, insulation: 0.0 }
    }

    pub fn insulated(temperature: f32, insulation: f32) -> Self {
        Self {
            temperature,
            insulation: insulation.clamp(0.0, 1.0),
        }
    }

    /// Insulation outside [0, 1] is treated as the nearest bound
    #[inline]
    fn openness(&self) -> f32 {
        1.0 - self.insulation.clamp(0.0, 1.0)
    }
}

/// Parameters of the diffusion step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionRule {
    /// Fraction of the neighbour Laplacian applied per second
    pub diffusion_rate: f32,
    /// Fraction of the distance to ambient closed per second
    pub ambient_exchange_rate: f32,
    /// Largest factor per explicit sub-step
    pub max_stable_factor: f32,
    /// Cap on sub-steps for one `step`; longer steps are clamped
    pub max_substeps: u32,
    /// Cell count at which rows are stepped in parallel
    pub parallel_threshold: usize,
}

impl Default for DiffusionRule {
    fn default() -> Self {
        SimulationConfig::default().diffusion()
    }
}

impl DiffusionRule {
    /// Sub-step count and per-sub-step factors for `delta_time`
    ///
    /// Never more than `max_substeps` sub-steps, and never a factor above
    /// `max_stable_factor`; time beyond that budget is dropped.
    fn schedule(&self, delta_time: f32) -> (u32, f32, f32) {
        let max_substeps = self.max_substeps.max(1);
        let needed = (self.diffusion_rate * delta_time / self.max_stable_factor)
            .ceil()
            .max(1.0);

        let (substeps, dt) = if needed > max_substeps as f32 {
            let clamped = max_substeps as f32 * self.max_stable_factor / self.diffusion_rate;
            warn!(
                delta_time,
                clamped,
                max_substeps,
                "Diffusion step exceeds sub-step budget, clamping"
            );
            (max_substeps, clamped)
        } else {
            (needed as u32, delta_time)
        };

        let k = self.diffusion_rate * dt / substeps as f32;
        let relax = (self.ambient_exchange_rate * dt / substeps as f32).min(1.0);
        (substeps, k, relax)
    }
}

/// Dense temperature chunk
#[derive(Debug, Clone)]
pub struct TemperatureGrid {
    cells: DenseGrid<TemperatureCell>,
    default_cell: TemperatureCell,
    rule: DiffusionRule,
    scratch: Vec<f32>,
}

impl TemperatureGrid {
    /// Chunk with every cell at `default_cell`
    pub fn new(
        width: usize,
        height: usize,
        default_cell: TemperatureCell,
        rule: DiffusionRule,
    ) -> std::result::Result<Self, GridError> {
        let cells = DenseGrid::filled(width, height, default_cell)?;
        Ok(Self {
            scratch: vec![0.0; width * height],
            cells,
            default_cell,
            rule,
        })
    }

    /// Window-sized chunk at ambient temperature
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.window_width,
            config.window_height,
            TemperatureCell::new(config.ambient_temperature),
            config.diffusion(),
        )?)
    }

    pub fn cells(&self) -> &DenseGrid<TemperatureCell> {
        &self.cells
    }

    /// Raise (or lower, with a negative amount) one cell's temperature
    pub fn add_heat(&mut self, coord: GridCoord, amount: f32) -> std::result::Result<(), GridError> {
        let (width, height) = (self.cells.width(), self.cells.height());
        let cell = self
            .cells
            .get_mut(coord)
            .ok_or(GridError::OutOfRange { coord, width, height })?;
        cell.temperature += amount;
        Ok(())
    }

    pub fn mean_temperature(&self) -> f32 {
        let total: f32 = self.cells.iter().map(|c| c.temperature).sum();
        total / self.cells.cell_count() as f32
    }

    /// Coldest and hottest temperatures in the chunk
    pub fn min_max(&self) -> (f32, f32) {
        self.cells.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.temperature), hi.max(c.temperature))
        })
    }

    /// Backing store as bytes, for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        self.cells.as_bytes()
    }

    fn substep(&mut self, k: f32, relax: f32) {
        let width = self.cells.width();
        let height = self.cells.height();
        let cells = self.cells.data();
        let outside = self.default_cell;

        let sample = |c: GridCoord| -> TemperatureCell {
            if c.x < 0 || c.y < 0 || c.x as usize >= width || c.y as usize >= height {
                outside
            } else {
                cells[c.y as usize * width + c.x as usize]
            }
        };

        let compute_row = |(y, row): (usize, &mut [f32])| {
            for (x, out) in row.iter_mut().enumerate() {
                let here = cells[y * width + x];
                let mut flux = 0.0;
                for c in GridCoord::new(x as i32, y as i32).neighbors4() {
                    let n = sample(c);
                    flux += here.openness() * n.openness() * (n.temperature - here.temperature);
                }

                let diffused = here.temperature + k * flux;
                *out = diffused + relax * (outside.temperature - diffused);
            }
        };

        if width * height >= self.rule.parallel_threshold {
            self.scratch.par_chunks_mut(width).enumerate().for_each(compute_row);
        } else {
            self.scratch.chunks_mut(width).enumerate().for_each(compute_row);
        }

        for (cell, &t) in self.cells.data_mut().iter_mut().zip(&self.scratch) {
            cell.temperature = t;
        }
    }
}

impl Grid for TemperatureGrid {
    type Cell = TemperatureCell;

    fn get_at(&self, coord: GridCoord) -> std::result::Result<TemperatureCell, GridError> {
        self.cells.get_at(coord)
    }

    fn try_get(&self, coord: GridCoord) -> Option<TemperatureCell> {
        self.cells.try_get(coord)
    }

    fn set_at(&mut self, coord: GridCoord, value: TemperatureCell) -> std::result::Result<(), GridError> {
        self.cells.set_at(coord, value)
    }

    fn remove_at(&mut self, coord: GridCoord) -> std::result::Result<(), GridError> {
        self.cells.remove_at(coord)
    }

    fn contains(&self, coord: GridCoord) -> bool {
        self.cells.contains(coord)
    }
}

impl BoundedGrid for TemperatureGrid {
    fn width(&self) -> usize {
        self.cells.width()
    }

    fn height(&self) -> usize {
        self.cells.height()
    }

    fn initialize_with(&mut self, value: TemperatureCell) {
        self.cells.initialize_with(value);
    }

    fn data(&self) -> &[TemperatureCell] {
        self.cells.data()
    }

    fn data_mut(&mut self) -> &mut [TemperatureCell] {
        self.cells.data_mut()
    }
}

impl SimulationGrid for TemperatureGrid {
    fn step(&mut self, delta_time: f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }

        let (substeps, k, relax) = self.rule.schedule(delta_time);
        for _ in 0..substeps {
            self.substep(k, relax);
        }
    }
}

impl SimulationChunk for TemperatureGrid {
    fn default_cell(&self) -> &TemperatureCell {
        &self.default_cell
    }

    fn set_default_cell(&mut self, cell: TemperatureCell) {
        self.default_cell = cell;
    }
}
