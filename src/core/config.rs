//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Values load from TOML; any key left
//! out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{HearthError, Result};
use crate::simulation::temperature::DiffusionRule;
use crate::simulation::window::ClipPolicy;

/// Configuration for the grid simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SPATIAL ===
    /// Side length of one grid cell in world units
    pub cell_size: f32,

    /// Width of the dense simulation window (cells)
    ///
    /// The window follows the anchor, so this bounds how far from the
    /// player the field is actively simulated.
    pub window_width: usize,

    /// Height of the dense simulation window (cells)
    pub window_height: usize,

    /// Side length of one chunk in a chunked field (cells)
    pub chunk_size: usize,

    // === TEMPERATURE ===
    /// Temperature reported for cells that were never written
    pub ambient_temperature: f32,

    /// Rate at which heat spreads between neighbouring cells (per second)
    ///
    /// Multiplied by delta time to give the fraction of the neighbour
    /// Laplacian applied. Large values are split into sub-steps, so this
    /// only affects speed, never stability.
    pub diffusion_rate: f32,

    /// Rate at which cells relax toward the ambient default (per second)
    ///
    /// At 0.05 a hot cell loses about 5% of its excess heat per second
    /// even with no colder neighbours.
    pub ambient_exchange_rate: f32,

    /// Largest diffusion factor applied in a single explicit sub-step
    ///
    /// 0.25 is the stability bound for a 4-neighbour stencil.
    pub max_stable_factor: f32,

    /// Cap on explicit sub-steps in one diffusion step
    ///
    /// Bounds the work of a single step; time past
    /// `max_substeps * max_stable_factor / diffusion_rate` is dropped.
    pub max_substeps: u32,

    // === STEPPING ===
    /// Length of one fixed simulation step in seconds
    pub fixed_timestep: f32,

    /// Cap on fixed steps run for one frame
    ///
    /// Backlog beyond this is dropped instead of spiralling.
    pub max_steps_per_frame: u32,

    // === TRANSFER ===
    /// How window transfers treat cells outside a bounded world
    pub clip_policy: ClipPolicy,

    // === PARALLELIZATION ===
    /// Minimum cell count before stepping goes parallel
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            window_width: 64,
            window_height: 64,
            chunk_size: 32,

            ambient_temperature: 5.0,
            diffusion_rate: 4.0,
            ambient_exchange_rate: 0.05,
            max_stable_factor: 0.25,
            max_substeps: 64,

            fixed_timestep: 1.0 / 30.0,
            max_steps_per_frame: 5,

            clip_policy: ClipPolicy::Strict,

            parallel_threshold: 4096,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(invalid(format!("cell_size ({}) must be positive", self.cell_size)));
        }

        if self.window_width == 0 || self.window_height == 0 {
            return Err(invalid(format!(
                "window must be non-empty, got {}x{}",
                self.window_width, self.window_height
            )));
        }

        if self.chunk_size == 0 {
            return Err(invalid("chunk_size must be non-zero".into()));
        }

        if !self.ambient_temperature.is_finite() {
            return Err(invalid("ambient_temperature must be finite".into()));
        }

        // Negated comparisons so NaN fails too
        let rate_ok = |r: f32| r.is_finite() && r >= 0.0;
        if !rate_ok(self.diffusion_rate) || !rate_ok(self.ambient_exchange_rate) {
            return Err(invalid(format!(
                "Rates must be finite and non-negative, got diffusion {} and ambient exchange {}",
                self.diffusion_rate, self.ambient_exchange_rate
            )));
        }

        // Stencil weights stop summing below one past 0.25
        if !(self.max_stable_factor > 0.0 && self.max_stable_factor <= 0.25) {
            return Err(invalid(format!(
                "max_stable_factor ({}) must be in (0, 0.25]",
                self.max_stable_factor
            )));
        }

        if self.max_substeps == 0 {
            return Err(invalid("max_substeps must be non-zero".into()));
        }

        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0)
            || self.max_steps_per_frame == 0
        {
            return Err(invalid(format!(
                "fixed_timestep ({}) and max_steps_per_frame ({}) must be positive",
                self.fixed_timestep, self.max_steps_per_frame
            )));
        }

        Ok(())
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Diffusion parameters for temperature grids
    pub fn diffusion(&self) -> DiffusionRule {
        DiffusionRule {
            diffusion_rate: self.diffusion_rate,
            ambient_exchange_rate: self.ambient_exchange_rate,
            max_stable_factor: self.max_stable_factor,
            max_substeps: self.max_substeps,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

fn invalid(msg: String) -> HearthError {
    HearthError::InvalidConfig(msg)
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Get the global simulation config (initializes with defaults if not set)
pub fn config() -> &'static SimulationConfig {
    CONFIG.get_or_init(SimulationConfig::default)
}

/// Set the global simulation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SimulationConfig) -> std::result::Result<(), SimulationConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let toml_content = r#"
            window_width = 16
            window_height = 8
            ambient_temperature = -12.5
            clip_policy = "clip"
        "#;

        let config = SimulationConfig::parse_toml(toml_content).expect("Failed to parse TOML");
        assert_eq!(config.window_width, 16);
        assert_eq!(config.window_height, 8);
        assert_eq!(config.ambient_temperature, -12.5);
        assert_eq!(config.clip_policy, ClipPolicy::Clip);
        assert_eq!(config.chunk_size, SimulationConfig::default().chunk_size);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let result = SimulationConfig::parse_toml("max_stable_factor = 0.5");
        assert!(matches!(result, Err(HearthError::InvalidConfig(_))));

        let result = SimulationConfig::parse_toml("window_width = 0");
        assert!(matches!(result, Err(HearthError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        let result = SimulationConfig::parse_toml("window_width = \"wide\"");
        assert!(matches!(result, Err(HearthError::ConfigParse(_))));
    }

    #[test]
    fn test_negative_rates_rejected() {
        let mut config = SimulationConfig::default();
        config.diffusion_rate = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_values_rejected() {
        for key in [
            "max_stable_factor",
            "diffusion_rate",
            "ambient_exchange_rate",
            "fixed_timestep",
            "cell_size",
        ] {
            let result = SimulationConfig::parse_toml(&format!("{key} = nan"));
            assert!(
                matches!(result, Err(HearthError::InvalidConfig(_))),
                "{key} = nan should be rejected"
            );
        }

        let mut config = SimulationConfig::default();
        config.diffusion_rate = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_substeps_rejected() {
        let result = SimulationConfig::parse_toml("max_substeps = 0");
        assert!(matches!(result, Err(HearthError::InvalidConfig(_))));
    }

    #[test]
    fn test_diffusion_projection() {
        let config = SimulationConfig::default();
        let rule = config.diffusion();
        assert_eq!(rule.diffusion_rate, config.diffusion_rate);
        assert_eq!(rule.max_substeps, config.max_substeps);
        assert_eq!(rule.parallel_threshold, config.parallel_threshold);
    }

    #[test]
    fn test_global_config_defaults() {
        // Never set in tests, so the defaults are returned
        assert_eq!(config().window_width, 64);
    }
}
