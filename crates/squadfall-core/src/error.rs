//! Error taxonomy.
//!
//! Rejected commands and invalid references are reported to the issuer and
//! leave state unchanged. Inconsistent mission data is a build-time fault.
//! Mission-level failure is data (`MissionResult`), never an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::MissionPhase;
use crate::types::{ActorId, TilePos};

/// Why a runtime command was not applied.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {0} is dead")]
    ActorDead(ActorId),

    #[error("actor {0} has already extracted")]
    ActorExtracted(ActorId),

    #[error("actor {0} is not controllable by the player")]
    NotControllable(ActorId),

    #[error("actor {0} is knocked down")]
    ActorDown(ActorId),

    #[error("tile {0:?} is not walkable")]
    NotWalkable(TilePos),

    #[error("no path from {from:?} to {to:?}")]
    NoPath { from: TilePos, to: TilePos },

    #[error("cannot attack {target}: {reason}")]
    CannotAttack { target: ActorId, reason: AttackBlock },

    #[error("cannot suppress {0:?}: {1}")]
    CannotSuppress(TilePos, AttackBlock),

    #[error("actor {0} is suppressed")]
    Suppressed(ActorId),

    #[error("actor {0} is reloading")]
    Reloading(ActorId),

    #[error("actor {0} is channeling")]
    Channeling(ActorId),

    #[error("actor {0} has no ammunition")]
    NoAmmo(ActorId),

    #[error("unknown interactable {0}")]
    UnknownObject(String),

    #[error("interactable {0} is out of reach")]
    OutOfReach(String),

    #[error("interactable {0} is no longer available")]
    ObjectUnavailable(String),

    #[error("extraction unavailable: {0}")]
    CannotExtract(ExtractBlock),

    #[error("command not valid in phase {0:?}")]
    WrongPhase(MissionPhase),

    #[error("illegal phase transition {from:?} -> {to:?}")]
    IllegalPhaseTransition { from: MissionPhase, to: MissionPhase },
}

impl CommandError {
    /// Orders against dead or nonexistent actors are ignored with a log line
    /// rather than reported as a rejection.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(
            self,
            CommandError::UnknownActor(_)
                | CommandError::ActorDead(_)
                | CommandError::ActorExtracted(_)
        )
    }
}

/// Reason an attack or burst cannot be resolved.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackBlock {
    #[error("out of range")]
    OutOfRange,
    #[error("no line of sight")]
    NoLineOfSight,
    #[error("target not hostile")]
    NotHostile,
    #[error("target not alive")]
    TargetDown,
}

/// Which extraction precondition failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractBlock {
    #[error("evac is not available")]
    EvacUnavailable,
    #[error("actor is outside the evac zone")]
    NotInZone,
    #[error("actor is not alive")]
    NotAlive,
}

/// Inconsistent mission data detected while building a session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MissionBuildError {
    #[error("map template has {found} rows but height is {expected}")]
    RowCount { expected: u32, found: usize },

    #[error("map row {row} has width {found}, expected {expected}")]
    RowWidth { row: usize, expected: u32, found: usize },

    #[error("unknown map glyph {glyph:?} at {pos:?}")]
    UnknownGlyph { glyph: char, pos: TilePos },

    #[error("{what} references tile {pos:?} outside the {width}x{height} grid")]
    OutOfBounds {
        what: String,
        pos: TilePos,
        width: u32,
        height: u32,
    },

    #[error("{what} placed on non-walkable tile {pos:?}")]
    NotWalkable { what: String, pos: TilePos },

    #[error("wave {wave} references unknown spawn point {spawn_point}")]
    UnknownSpawnPoint { wave: String, spawn_point: String },

    #[error("wave {wave} waits for unknown wave {prior}")]
    UnknownWave { wave: String, prior: String },

    #[error("duplicate id {0}")]
    DuplicateId(String),

    #[error("objective {objective} references unknown {what} {id}")]
    UnknownReference {
        objective: String,
        what: String,
        id: String,
    },

    #[error("spawn point {0} has no tiles")]
    EmptySpawnPoint(String),

    #[error("mission has no crew")]
    NoCrew,

    #[error("no free tile near {0:?} for deployment")]
    NoFreeTile(TilePos),
}
