//! Hearth Grid - Entry Point
//!
//! Seeds heat sources into an unbounded world, walks an anchor across it,
//! and keeps a dense temperature window centred on the anchor. Each frame
//! the window is refreshed from the world, advanced in fixed steps, and
//! committed back.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hearth_grid::core::error::Result;
use hearth_grid::core::types::{GridCoord, GridTransform};
use hearth_grid::core::config::set_config;
use hearth_grid::core::SimulationConfig;
use hearth_grid::simulation::{FixedTimestep, SimulationWindow, TemperatureCell, TemperatureGrid};
use hearth_grid::spatial::{FullHashGrid, Grid, SparseGrid};

/// Windowed temperature simulation around a moving anchor
#[derive(Parser, Debug)]
#[command(name = "hearth-grid")]
#[command(about = "Run a windowed temperature simulation around a moving anchor")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for heat source placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of frames to run
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Number of heat sources to scatter
    #[arg(long, default_value_t = 24)]
    sources: usize,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_time: f32,

    /// Anchor speed in world units per second
    #[arg(long, default_value_t = 3.0)]
    speed: f32,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    frames: u32,
    steps: u64,
    stored_cells: usize,
    anchor: [f32; 2],
    window_offset: GridCoord,
    window_mean: f32,
    window_min: f32,
    window_max: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hearth_grid=info")),
        )
        .init();

    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    loaded.validate()?;
    if set_config(loaded).is_err() {
        tracing::warn!("Global config already set, keeping the existing one");
    }
    let config = hearth_grid::core::config::config();

    tracing::info!(
        "Hearth Grid starting: {}x{} window, {} sources, seed {}",
        config.window_width,
        config.window_height,
        args.sources,
        args.seed
    );

    let transform = GridTransform::new(config.cell_size, Vec2::ZERO)?;
    let mut world = FullHashGrid::with_default(TemperatureCell::new(config.ambient_temperature));
    seed_heat_sources(&mut world, config, args.seed, args.sources)?;

    let window = TemperatureGrid::from_config(config)?;
    let mut sim = SimulationWindow::new(world, window).with_policy(config.clip_policy);
    sim.sync_default_cell();

    let mut timestep = FixedTimestep::from_config(config);
    let heading = Vec2::new(1.0, 0.35).normalize();
    let mut anchor = Vec2::ZERO;

    for frame in 0..args.frames {
        anchor += heading * args.speed * args.frame_time;
        sim.follow(anchor, &transform)?;
        sim.refresh()?;

        let steps = timestep.run(args.frame_time, |dt| sim.step(dt));
        if steps > 0 {
            sim.commit()?;
        }

        if frame % 60 == 0 {
            let (lo, hi) = sim.window().min_max();
            tracing::debug!(
                frame,
                offset = %sim.offset(),
                mean = sim.window().mean_temperature(),
                lo,
                hi,
                "Window state"
            );
        }
    }

    let (window_min, window_max) = sim.window().min_max();
    let summary = Summary {
        frames: args.frames,
        steps: timestep.total_steps(),
        stored_cells: sim.world().len(),
        anchor: anchor.to_array(),
        window_offset: sim.offset(),
        window_mean: sim.window().mean_temperature(),
        window_min,
        window_max,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n=== HEARTH GRID ===");
        println!("Frames:        {}", summary.frames);
        println!("Fixed steps:   {}", summary.steps);
        println!("Stored cells:  {}", summary.stored_cells);
        println!("Anchor:        ({:.2}, {:.2})", anchor.x, anchor.y);
        println!("Window offset: {}", summary.window_offset);
        println!(
            "Window temp:   mean {:.2}, min {:.2}, max {:.2}",
            summary.window_mean, summary.window_min, summary.window_max
        );
    }

    Ok(())
}

/// Scatter fires and insulated walls around the anchor's starting point
fn seed_heat_sources(
    world: &mut FullHashGrid<TemperatureCell>,
    config: &SimulationConfig,
    seed: u64,
    count: usize,
) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spread = config.window_width.max(config.window_height) as i32;
    let ambient = config.ambient_temperature;

    for i in 0..count {
        let coord = GridCoord::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread));
        let cell = if i % 4 == 3 {
            TemperatureCell::insulated(ambient, 0.9)
        } else {
            TemperatureCell::new(rng.gen_range(40.0..120.0))
        };
        world.set_at(coord, cell)?;
    }

    tracing::info!("Seeded {} cells around the origin", world.len());
    Ok(())
}
