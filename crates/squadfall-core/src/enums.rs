//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Side an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Crew,
    Enemy,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// Base tile material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Floor,
    Wall,
    Void,
}

/// Named zone a tile belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    #[default]
    None,
    Entry,
    Evac,
}

/// Tiered defensive bonus, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CoverLevel {
    #[default]
    None,
    Low,
    Half,
    High,
    Full,
}

impl CoverLevel {
    /// Hit-chance reduction in absolute probability points.
    pub fn hit_reduction(self) -> f64 {
        use crate::constants::*;
        match self {
            CoverLevel::None => 0.0,
            CoverLevel::Low => COVER_REDUCTION_LOW,
            CoverLevel::Half => COVER_REDUCTION_HALF,
            CoverLevel::High => COVER_REDUCTION_HIGH,
            CoverLevel::Full => COVER_REDUCTION_FULL,
        }
    }

    /// Normalized quality in [0, 1] for AI scoring.
    pub fn quality(self) -> f64 {
        self as u8 as f64 / CoverLevel::Full as u8 as f64
    }
}

/// Flat damage reduction class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorClass {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

impl ArmorClass {
    pub fn value(self) -> i32 {
        match self {
            ArmorClass::None => 0,
            ArmorClass::Light => 10,
            ArmorClass::Medium => 18,
            ArmorClass::Heavy => 25,
        }
    }
}

/// What an actor is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Channeling,
    Retreating,
    /// Knocked down by a heavy hit; cannot act until it wears off.
    Down,
    Dead,
}

/// Per-enemy perception state. One-way in v1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionState {
    #[default]
    Idle,
    Alerted,
}

/// Mission-wide alarm. Monotonic: never returns to `Quiet`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    #[default]
    Quiet,
    Alerted,
}

/// Forward-only mission phase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MissionPhase {
    #[default]
    Setup,
    Negotiation,
    Contact,
    Pressure,
    Resolution,
    Complete,
}

impl MissionPhase {
    /// Whether `self -> next` is an allowed edge of the fixed transition table.
    pub fn can_advance_to(self, next: MissionPhase) -> bool {
        use MissionPhase::*;
        matches!(
            (self, next),
            (Setup, Negotiation)
                | (Setup, Contact)
                | (Negotiation, Contact)
                | (Contact, Pressure)
                | (Contact, Resolution)
                | (Pressure, Resolution)
                | (Contact, Complete)
                | (Pressure, Complete)
                | (Resolution, Complete)
                | (Negotiation, Complete)
        )
    }

    /// Phases in which the combat systems run.
    pub fn is_live(self) -> bool {
        !matches!(self, MissionPhase::Setup | MissionPhase::Complete)
    }
}

/// Enemy archetype driving the AI weight profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRole {
    Guard,
    Flanker,
    Suppressor,
    Heavy,
    Officer,
    Boss,
}

impl EnemyRole {
    pub const ALL: [EnemyRole; 6] = [
        EnemyRole::Guard,
        EnemyRole::Flanker,
        EnemyRole::Suppressor,
        EnemyRole::Heavy,
        EnemyRole::Officer,
        EnemyRole::Boss,
    ];
}

/// Objective lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveState {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ObjectiveState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ObjectiveState::Completed | ObjectiveState::Failed)
    }
}

/// Graduated mission result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionResult {
    TotalVictory,
    Victory,
    PartialSuccess,
    Retreat,
    Defeat,
}

/// Final per-crew status reported to the campaign layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrewStatus {
    Alive,
    Wounded,
    Critical,
    Dead,
    /// Alive at mission end but never extracted.
    MIA,
}

/// Kind of world object a crew member can interact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractableKind {
    Loot,
    Terminal,
}

/// Stat a status-effect modifier scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifiedStat {
    Accuracy,
    MoveSpeed,
    OverwatchAccuracy,
}

/// Kind of a status effect; one active instance per kind and source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Suppressed,
    KnockedDown,
    CommandAura,
}
