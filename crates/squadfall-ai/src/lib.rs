//! Enemy decision making for squadfall.
//!
//! Role weight profiles, pure position/target scoring and per-role
//! policies. Operates on plain-data contexts; no ECS dependency.

pub mod context;
pub mod decision;
pub mod profiles;
pub mod scoring;

pub use context::{ActorSnapshot, DecisionContext, OverwatchZone};
pub use decision::{decide, Decision};
pub use profiles::{get_profile, RoleProfile};

pub use squadfall_core as core;

#[cfg(test)]
mod tests;
