//! Hearth Grid - grid storage and windowed field simulation
//!
//! Dense and sparse grids behind one access contract, plus the time-stepped
//! simulations (temperature diffusion) that run on a small dense window
//! tracking the player through an unbounded world.

pub mod core;
pub mod simulation;
pub mod spatial;
