//! ECS components for hecs actor entities.
//!
//! Components are plain data with small accessors. Game logic lives in
//! the sim crate's systems, not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ActorId, Direction8, TilePos};

/// Who an entity is. Every actor carries exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: ActorId,
    pub name: String,
    pub faction: Faction,
}

/// Hit points. Clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn fraction(&self) -> f64 {
        if self.max <= 0 {
            0.0
        } else {
            self.current as f64 / self.max as f64
        }
    }

    /// Apply damage and return the amount actually removed.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current - amount.max(0)).clamp(0, self.max);
        before - self.current
    }
}

/// Equipped weapon with ammunition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: i32,
    /// Maximum range in tiles.
    pub range: f64,
    /// Base hit probability at optimal range against no cover.
    pub accuracy: f64,
    pub magazine: u32,
    pub magazine_size: u32,
    pub reserve: u32,
    /// Ticks between shots.
    pub fire_interval_ticks: u32,
    /// Ticks until the next shot is allowed.
    pub cooldown: u32,
    /// Remaining reload ticks; 0 when not reloading.
    pub reload_remaining: u32,
}

impl Weapon {
    pub fn is_reloading(&self) -> bool {
        self.reload_remaining > 0
    }

    pub fn has_ammo(&self) -> bool {
        self.magazine > 0 || self.reserve > 0
    }

    pub fn ready_to_fire(&self) -> bool {
        !self.is_reloading() && self.cooldown == 0 && self.magazine > 0
    }

    /// Spend up to `rounds` from the magazine, returning how many were spent.
    pub fn consume(&mut self, rounds: u32) -> u32 {
        let spent = rounds.min(self.magazine);
        self.magazine -= spent;
        self.cooldown = self.fire_interval_ticks;
        spent
    }

    /// Begin a reload if the magazine is not full and reserve remains.
    pub fn start_reload(&mut self, reload_ticks: u32) -> bool {
        if self.is_reloading() || self.reserve == 0 || self.magazine >= self.magazine_size {
            return false;
        }
        self.reload_remaining = reload_ticks;
        true
    }

    /// Advance cooldown and reload counters by one tick.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
        if self.reload_remaining > 0 {
            self.reload_remaining -= 1;
            if self.reload_remaining == 0 {
                let wanted = self.magazine_size - self.magazine;
                let moved = wanted.min(self.reserve);
                self.reserve -= moved;
                self.magazine += moved;
            }
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.magazine + self.reserve
    }
}

/// Flat armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub class: ArmorClass,
}

/// Movement capability and the fractional progress toward the next tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mobility {
    /// Tiles per second before modifiers.
    pub speed: f64,
    pub progress: f64,
}

/// How far an actor can see.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    pub range: f64,
}

/// Target of a suppressive burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressTarget {
    Actor(ActorId),
    Tile(TilePos),
}

/// The single standing order of an actor. A new order replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Order {
    #[default]
    None,
    Move {
        destination: TilePos,
        /// Remaining steps, next step first.
        path: Vec<TilePos>,
        blocked_ticks: u32,
        retreating: bool,
    },
    Attack {
        target: ActorId,
    },
    Suppress {
        target: SuppressTarget,
    },
    Interact {
        object_id: String,
    },
}

/// Behavior state plus the order that drives it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub state: BehaviorState,
    pub order: Order,
}

/// Who applied a modifier, so it can be removed by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierSource {
    Actor(ActorId),
    Mission,
}

/// One multiplicative stat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: ModifiedStat,
    pub factor: f64,
}

/// An active status effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub source: ModifierSource,
    /// `None` for effects that last until removed by source.
    pub remaining_ticks: Option<u32>,
    pub modifiers: Vec<StatModifier>,
}

/// Ordered list of status effects, applied multiplicatively at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Product of every modifier that scales `stat`.
    pub fn multiplier(&self, stat: ModifiedStat) -> f64 {
        self.effects
            .iter()
            .flat_map(|e| e.modifiers.iter())
            .filter(|m| m.stat == stat)
            .map(|m| m.factor)
            .product()
    }

    /// Insert an effect, or refresh the existing one of the same kind.
    ///
    /// Timed effects are refreshed, never stacked: the remaining duration
    /// becomes the longer of the two and the source is updated. Untimed
    /// effects are keyed by (kind, source).
    pub fn apply(&mut self, effect: StatusEffect) -> bool {
        let existing = self.effects.iter_mut().find(|e| {
            e.kind == effect.kind && (effect.remaining_ticks.is_some() || e.source == effect.source)
        });
        match existing {
            Some(current) => {
                current.remaining_ticks = match (current.remaining_ticks, effect.remaining_ticks) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (_, b) => b,
                };
                current.source = effect.source;
                current.modifiers = effect.modifiers;
                false
            }
            None => {
                self.effects.push(effect);
                true
            }
        }
    }

    pub fn remove_by_source(&mut self, source: ModifierSource) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.source != source);
        before - self.effects.len()
    }

    /// Remove one (kind, source) pair, leaving the source's other effects.
    pub fn remove(&mut self, kind: EffectKind, source: ModifierSource) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| !(e.kind == kind && e.source == source));
        before != self.effects.len()
    }

    pub fn remove_kind(&mut self, kind: EffectKind) {
        self.effects.retain(|e| e.kind != kind);
    }

    /// Count down timed effects and drop the expired ones. Returns expired kinds.
    pub fn tick(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            if let Some(remaining) = effect.remaining_ticks.as_mut() {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    expired.push(effect.kind);
                }
            }
        }
        self.effects.retain(|e| e.remaining_ticks != Some(0));
        expired
    }
}

/// Overwatch sub-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverwatchState {
    pub active: bool,
    /// `None` means omnidirectional.
    pub facing: Option<Direction8>,
    pub shots_remaining: u32,
    /// Tick the watch was entered.
    pub since_tick: u64,
}

/// Suppression sub-state; the debuff itself lives in `StatusEffects`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuppressionState {
    pub last_suppressed_by: Option<ActorId>,
    pub times_suppressed: u32,
}

/// Multi-tick interaction progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub object_id: String,
    pub progress: u32,
    pub required: u32,
}

/// Per-enemy decision cadence and role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBrain {
    pub role: EnemyRole,
    pub next_think_tick: u64,
    /// Last actor that shot at this enemy.
    pub last_attacker: Option<ActorId>,
    /// Position the enemy was placed at; guards leash to it.
    pub home: TilePos,
}

/// Per-enemy perception memory. Created lazily on the first perception pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub state: DetectionState,
    pub last_known: BTreeMap<ActorId, TilePos>,
    pub changed_at_tick: u64,
}

/// Running combat statistics for one actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub kills: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub rounds_spent: u32,
    pub damage_dealt: u32,
}

/// Optional designer-facing name used by triggers and objectives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag(pub String);

/// Marks an actor that has left the map through evac.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    pub at_tick: u64,
}

/// Loot carried by a crew member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Carrying {
    pub items: Vec<String>,
}

/// Wave an enemy was spawned by, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedBy(pub String);
