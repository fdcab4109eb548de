//! Plain-data inputs to the decision policies.

use std::collections::BTreeSet;

use glam::Vec2;

use squadfall_core::constants::OVERWATCH_CONE_HALF_ANGLE_DEG;
use squadfall_core::enums::{EnemyRole, Faction};
use squadfall_core::types::{ActorId, Direction8, TilePos};
use squadfall_map::grid::TileGrid;
use squadfall_map::los::can_see;

/// Area watched by an actor on overwatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverwatchZone {
    pub origin: TilePos,
    pub range: f64,
    /// `None` means all directions.
    pub facing: Option<Direction8>,
}

impl OverwatchZone {
    /// Whether `pos` lies inside the cone, ignoring range and LOS.
    pub fn in_cone(&self, pos: TilePos) -> bool {
        let Some(facing) = self.facing else {
            return true;
        };
        if pos == self.origin {
            return true;
        }
        let (fx, fy) = facing.delta();
        let facing_vec = Vec2::new(fx as f32, fy as f32);
        let to_pos = Vec2::new((pos.x - self.origin.x) as f32, (pos.y - self.origin.y) as f32);
        // `angle_between` is signed; the cone is symmetric around the facing.
        let angle = facing_vec.angle_between(to_pos).abs().to_degrees();
        angle <= OVERWATCH_CONE_HALF_ANGLE_DEG as f32 + 1e-3
    }

    /// Range, cone and LOS all satisfied.
    pub fn covers(&self, grid: &TileGrid, pos: TilePos) -> bool {
        self.in_cone(pos) && can_see(grid, self.origin, pos, self.range)
    }
}

/// What the AI knows about one actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub faction: Faction,
    pub pos: TilePos,
    pub hp: i32,
    pub max_hp: i32,
    pub weapon_range: f64,
    /// Rounds in the magazine.
    pub magazine: u32,
    pub can_suppress: bool,
    pub suppressed: bool,
    pub overwatch: Option<OverwatchZone>,
    /// Actor this one is currently shooting at.
    pub attacking: Option<ActorId>,
}

impl ActorSnapshot {
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f64 / self.max_hp as f64
        }
    }
}

/// Everything one enemy's think step may look at.
pub struct DecisionContext<'a> {
    pub grid: &'a TileGrid,
    pub me: ActorSnapshot,
    pub role: EnemyRole,
    pub home: TilePos,
    /// Crew this enemy knows about, at their last-known positions.
    pub known_crew: Vec<ActorSnapshot>,
    /// Subset of `known_crew` currently in sight.
    pub visible: BTreeSet<ActorId>,
    /// Other living enemies.
    pub allies: Vec<ActorSnapshot>,
    /// Active crew overwatch zones.
    pub player_overwatch: Vec<OverwatchZone>,
    /// Tiles taken by other actors.
    pub occupied: BTreeSet<TilePos>,
    pub last_attacker: Option<ActorId>,
}

impl DecisionContext<'_> {
    pub fn crew(&self, id: ActorId) -> Option<&ActorSnapshot> {
        self.known_crew.iter().find(|c| c.id == id)
    }

    /// Known crew positions, used as the threat set for cover scoring.
    pub fn threat_positions(&self) -> Vec<TilePos> {
        self.known_crew.iter().map(|c| c.pos).collect()
    }

    /// Mean of known crew positions.
    pub fn threat_centroid(&self) -> Option<Vec2> {
        if self.known_crew.is_empty() {
            return None;
        }
        let sum: Vec2 = self
            .known_crew
            .iter()
            .map(|c| Vec2::new(c.pos.x as f32, c.pos.y as f32))
            .sum();
        Some(sum / self.known_crew.len() as f32)
    }

    /// Whether `target` is visible and within weapon range from `from`.
    pub fn can_engage_from(&self, from: TilePos, target: &ActorSnapshot) -> bool {
        can_see(self.grid, from, target.pos, self.me.weapon_range)
    }

    pub fn can_engage(&self, target: &ActorSnapshot) -> bool {
        self.visible.contains(&target.id) && self.can_engage_from(self.me.pos, target)
    }
}
