//! Map model for squadfall.
//!
//! Tile grid construction from mission templates, grid line-of-sight,
//! directional cover lookup and path search.

pub use squadfall_core as core;

pub mod cover;
pub mod grid;
pub mod los;
pub mod path;

// Re-export key types for convenience.
pub use cover::cover_against;
pub use grid::{Tile, TileGrid};
pub use los::{has_line_of_sight, line};
pub use path::find_path;
