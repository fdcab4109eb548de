//! Directional cover lookup.

use squadfall_core::enums::CoverLevel;
use squadfall_core::types::TilePos;

use crate::grid::TileGrid;

/// Cover the defender's tile offers against fire coming from `attacker`.
///
/// The attacker-relative vector is bucketed into one of eight directions and
/// looked up in the defender tile's cover table. Attacks from the same tile
/// get no cover.
pub fn cover_against(grid: &TileGrid, defender: TilePos, attacker: TilePos) -> CoverLevel {
    match defender.direction_to(&attacker) {
        Some(dir) => grid.cover_toward(defender, dir),
        None => CoverLevel::None,
    }
}

/// Mean cover quality at `pos` against several threat positions, in [0, 1].
pub fn average_cover_quality(grid: &TileGrid, pos: TilePos, threats: &[TilePos]) -> f64 {
    if threats.is_empty() {
        return 0.0;
    }
    let total: f64 = threats
        .iter()
        .map(|t| cover_against(grid, pos, *t).quality())
        .sum();
    total / threats.len() as f64
}
