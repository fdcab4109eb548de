//! ECS systems that operate on the session each tick.
//!
//! Systems are free functions over `&mut Session`. They do not own state;
//! actor state lives in components and mission state in `MissionState`.

pub mod ai;
pub mod channel;
pub mod combat;
pub mod extraction;
pub mod movement;
pub mod objectives;
pub mod orders;
pub mod outcome;
pub mod overwatch;
pub mod perception;
pub mod phase;
pub mod snapshot;
pub mod status;
pub mod suppression;
pub mod waves;
