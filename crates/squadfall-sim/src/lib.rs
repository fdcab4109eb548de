//! Mission session engine for squadfall.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate and produces
//! `SessionSnapshot`s, events and the final `MissionOutcome`. Headless and
//! deterministic for a given seed and command stream.

pub mod engine;
pub mod mission_state;
pub mod resolver;
pub mod scenario;
pub mod session;
pub mod systems;
pub mod world_setup;

pub use squadfall_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
