//! Core types and definitions for the squadfall tactical simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! ids, tile geometry, components, commands, events, the mission input
//! contract, outcome/snapshot types, error taxonomy and constants.
//! It has no dependency on the engine or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod mission;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
