//! Combat resolver: pure hit-chance, damage and attack-validity functions.
//!
//! Inputs are immutable snapshots. Only the hit/miss roll made by callers is
//! random; everything here is deterministic.

use squadfall_core::constants::*;
use squadfall_core::enums::ArmorClass;
use squadfall_core::error::AttackBlock;
use squadfall_core::types::TilePos;
use squadfall_map::cover::cover_against;
use squadfall_map::grid::TileGrid;
use squadfall_map::los::has_line_of_sight;

/// Flat armor reduction with a guaranteed minimum.
pub fn calculate_damage(weapon_damage: i32, armor: ArmorClass) -> i32 {
    (weapon_damage - armor.value()).max(MIN_DAMAGE)
}

/// Accuracy scale from distance: 1.0 up to half range, then linear down to
/// `RANGE_FALLOFF_MIN` at max range.
pub fn range_factor(distance: f64, range: f64) -> f64 {
    if range <= 0.0 {
        return 0.0;
    }
    let frac = distance / range;
    if frac <= RANGE_FALLOFF_START {
        1.0
    } else {
        let t = ((frac - RANGE_FALLOFF_START) / (1.0 - RANGE_FALLOFF_START)).min(1.0);
        1.0 - t * (1.0 - RANGE_FALLOFF_MIN)
    }
}

/// Probability that a shot from `attacker` hits `target`.
///
/// `accuracy_mult` carries status modifiers and shot-type scaling.
pub fn hit_chance(
    grid: &TileGrid,
    attacker: TilePos,
    target: TilePos,
    accuracy: f64,
    range: f64,
    accuracy_mult: f64,
) -> f64 {
    let distance = attacker.distance_to(&target);
    if distance > range {
        return 0.0;
    }
    let cover = cover_against(grid, target, attacker);
    let chance = accuracy * accuracy_mult * range_factor(distance, range) - cover.hit_reduction();
    chance.clamp(MIN_HIT_CHANCE, MAX_HIT_CHANCE)
}

/// Range and LOS preconditions of any shot.
pub fn check_shot(
    grid: &TileGrid,
    attacker: TilePos,
    target: TilePos,
    range: f64,
) -> Result<(), AttackBlock> {
    if attacker.distance_to(&target) > range {
        return Err(AttackBlock::OutOfRange);
    }
    if !has_line_of_sight(grid, attacker, target) {
        return Err(AttackBlock::NoLineOfSight);
    }
    Ok(())
}

/// Chance that a missed suppressive burst landing `miss_distance` tiles away
/// still pins the target.
pub fn near_miss_chance(miss_distance: f64) -> f64 {
    if miss_distance <= SUPPRESS_NEAR_MISS_TILES {
        SUPPRESS_NEAR_MISS_CHANCE
    } else if miss_distance <= SUPPRESS_FAR_MISS_TILES {
        SUPPRESS_FAR_MISS_CHANCE
    } else {
        0.0
    }
}
