//! Integration tests for windowed temperature simulation
//!
//! These tests verify the full refresh -> step -> commit cycle:
//! - A window following an anchor through a sparse world
//! - Heat committed by the window persisting after the window moves on
//! - Chunked fields stepping independently
//! - Configuration loaded from TOML driving the whole pipeline

use glam::Vec2;
use hearth_grid::core::types::{GridCoord, GridTransform};
use hearth_grid::core::SimulationConfig;
use hearth_grid::simulation::{
    ChunkedField, ClipPolicy, DiffusionRule, FixedTimestep, SimulationChunk, SimulationGrid,
    SimulationWindow, TemperatureCell, TemperatureGrid,
};
use hearth_grid::spatial::occupancy::{first_free, is_occupied};
use hearth_grid::spatial::{BoundedGrid, DenseGrid, FullHashGrid, Grid, ObstacleMap, SparseGrid};

fn small_config() -> SimulationConfig {
    SimulationConfig {
        window_width: 8,
        window_height: 8,
        ambient_temperature: 5.0,
        diffusion_rate: 2.0,
        ambient_exchange_rate: 0.0,
        ..SimulationConfig::default()
    }
}

fn temperature_window(
    config: &SimulationConfig,
) -> SimulationWindow<FullHashGrid<TemperatureCell>, TemperatureGrid> {
    let world = FullHashGrid::with_default(TemperatureCell::new(config.ambient_temperature));
    let window = TemperatureGrid::from_config(config).unwrap();
    SimulationWindow::new(world, window)
}

// ============================================================================
// Window lifecycle
// ============================================================================

#[test]
fn test_heat_spreads_and_persists_in_world() {
    let config = small_config();
    let mut sim = temperature_window(&config);
    sim.world_mut()
        .set_at(GridCoord::new(20, 20), TemperatureCell::new(100.0))
        .unwrap();

    let anchor = GridCoord::new(20, 20);
    for _ in 0..10 {
        sim.tick(anchor, 0.05, true).unwrap();
    }

    let neighbor = sim.world().get_at(GridCoord::new(21, 20)).unwrap().temperature;
    let source = sim.world().get_at(anchor).unwrap().temperature;
    assert!(neighbor > 5.0, "heat should reach the neighbour, got {}", neighbor);
    assert!(source < 100.0);

    // Move far away; the committed state stays in the world
    sim.tick(GridCoord::new(500, 500), 0.05, true).unwrap();
    assert_eq!(sim.world().get_at(GridCoord::new(21, 20)).unwrap().temperature, neighbor);
    assert!(!sim.footprint().contains(anchor));
}

#[test]
fn test_uncommitted_ticks_leave_world_untouched() {
    let config = small_config();
    let mut sim = temperature_window(&config);
    sim.world_mut()
        .set_at(GridCoord::new(0, 0), TemperatureCell::new(50.0))
        .unwrap();

    for _ in 0..5 {
        sim.tick(GridCoord::ZERO, 0.1, false).unwrap();
    }

    assert_eq!(sim.world().get_at(GridCoord::ZERO).unwrap().temperature, 50.0);
    assert_eq!(sim.world().len(), 1);
    assert!(sim.sample(GridCoord::ZERO).unwrap().temperature < 50.0);
}

#[test]
fn test_zero_delta_tick_round_trips_world() {
    let config = small_config();
    let mut sim = temperature_window(&config);
    for (i, c) in [GridCoord::new(-1, -1), GridCoord::new(2, 3), GridCoord::new(0, 1)]
        .into_iter()
        .enumerate()
    {
        sim.world_mut().set_at(c, TemperatureCell::new(10.0 * i as f32)).unwrap();
    }

    sim.recenter(GridCoord::ZERO).unwrap();
    let before: Vec<_> = sim.footprint().iter().map(|c| sim.world().get_at(c)).collect();
    sim.tick(GridCoord::ZERO, 0.0, true).unwrap();
    let after: Vec<_> = sim.footprint().iter().map(|c| sim.world().get_at(c)).collect();

    assert_eq!(before.len(), 64);
    assert_eq!(before, after);
}

#[test]
fn test_window_follows_world_position() {
    let config = small_config();
    let transform = GridTransform::new(0.5, Vec2::ZERO).unwrap();
    let mut sim = temperature_window(&config);

    assert!(sim.follow(Vec2::new(10.2, -3.1), &transform).unwrap());
    // Anchor cell (20, -7), half window (4, 4)
    assert_eq!(sim.offset(), GridCoord::new(16, -11));
    assert_eq!(sim.world_to_window(GridCoord::new(20, -7)), Some(GridCoord::new(4, 4)));
}

#[test]
fn test_fixed_timestep_drives_window() {
    let config = small_config();
    let mut sim = temperature_window(&config);
    sim.world_mut()
        .set_at(GridCoord::new(3, 3), TemperatureCell::new(90.0))
        .unwrap();
    sim.recenter(GridCoord::new(3, 3)).unwrap();

    let mut timestep = FixedTimestep::new(0.25, 4);
    let mut total = 0;
    for _ in 0..4 {
        sim.refresh().unwrap();
        total += timestep.run(0.125, |dt| sim.step(dt));
        sim.commit().unwrap();
    }

    assert_eq!(total, 2);
    assert!(sim.world().get_at(GridCoord::new(3, 3)).unwrap().temperature < 90.0);
}

#[test]
fn test_clipped_window_over_dense_world() {
    let world = DenseGrid::filled(4, 4, TemperatureCell::new(30.0)).unwrap();
    let window =
        TemperatureGrid::new(4, 4, TemperatureCell::new(30.0), DiffusionRule::default()).unwrap();
    let mut sim = SimulationWindow::new(world, window).with_policy(ClipPolicy::Clip);

    // Window hangs off the world's lower-left corner
    sim.set_offset(GridCoord::new(-2, -2)).unwrap();
    assert_eq!(sim.refresh().unwrap(), 4);
    assert_eq!(sim.commit().unwrap(), 4);

    let mut strict = SimulationWindow::new(sim.world().clone(), sim.window().clone());
    strict.set_offset(GridCoord::new(-2, -2)).unwrap();
    assert!(strict.refresh().is_err());

    // A rejected commit must not leave a partial write behind
    strict.window_mut().initialize_with(TemperatureCell::new(99.0));
    let before = strict.world().clone();
    assert!(strict.commit().is_err());
    assert_eq!(strict.world(), &before);
}

// ============================================================================
// Chunked fields
// ============================================================================

#[test]
fn test_chunked_field_regions_keep_their_climate() {
    let config = small_config();
    let mut field = ChunkedField::new(config.chunk_size).unwrap();
    let size = config.chunk_size;

    for (chunk_coord, ambient) in [(GridCoord::new(0, 0), 20.0), (GridCoord::new(-1, 0), -15.0)] {
        field
            .get_or_insert_with(chunk_coord, |_| {
                TemperatureGrid::new(size, size, TemperatureCell::new(ambient), config.diffusion())
                    .unwrap()
            })
            .unwrap();
    }

    field.set_at(GridCoord::new(-1, 4), TemperatureCell::new(40.0)).unwrap();
    for _ in 0..20 {
        field.step_all(0.1);
    }

    let cold = field.chunk(GridCoord::new(-1, 0)).unwrap();
    let warm = field.chunk(GridCoord::new(0, 0)).unwrap();
    assert_eq!(cold.default_cell().temperature, -15.0);
    assert!((warm.mean_temperature() - 20.0).abs() < 1e-3);
    assert!(field.get_at(GridCoord::new(-1, 4)).unwrap().temperature < 40.0);
    assert!(field.get_at(GridCoord::new(-1, 4)).unwrap().temperature > -15.0);
}

#[test]
fn test_chunk_zero_step_invariant() {
    let config = small_config();
    let mut chunk = TemperatureGrid::from_config(&config).unwrap();
    chunk.add_heat(GridCoord::new(1, 6), 33.0).unwrap();
    let before = chunk.data().to_vec();
    chunk.step(0.0);
    assert_eq!(chunk.data(), before.as_slice());
}

// ============================================================================
// Configuration and occupancy
// ============================================================================

#[test]
fn test_pipeline_from_toml_config() {
    let config = SimulationConfig::parse_toml(
        r#"
            window_width = 6
            window_height = 4
            ambient_temperature = -2.0
            clip_policy = "strict"
        "#,
    )
    .expect("Failed to parse TOML");

    let mut sim = temperature_window(&config).with_policy(config.clip_policy);
    sim.sync_default_cell();
    sim.tick(GridCoord::new(100, 100), config.fixed_timestep, true).unwrap();

    assert_eq!(sim.window().width(), 6);
    assert_eq!(sim.world().len(), 24);
    for value in sim.world().values() {
        assert!((value.temperature + 2.0).abs() < 1e-5);
    }
}

#[test]
fn test_obstacles_through_grid_contract() {
    let mut obstacles = ObstacleMap::default();
    obstacles.block_footprint(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ]);

    // The same query over a dense snapshot of the same region
    let mut snapshot: DenseGrid<bool> = DenseGrid::new(3, 3).unwrap();
    hearth_grid::simulation::window::write_to_dense_grid_with(
        obstacles.grid(),
        &mut snapshot,
        GridCoord::ZERO,
        ClipPolicy::Strict,
    )
    .expect_err("plain hash grid has no value for free cells");

    for c in snapshot.bounds().iter() {
        snapshot.set_at(c, obstacles.is_blocked(c)).unwrap();
    }
    assert!(is_occupied(&snapshot, GridCoord::new(1, 1)));
    assert!(!is_occupied(&snapshot, GridCoord::new(2, 2)));
    assert_eq!(
        first_free(obstacles.grid(), snapshot.bounds()),
        first_free(&snapshot, snapshot.bounds())
    );
}
