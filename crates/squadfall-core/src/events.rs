//! Events emitted by the simulation for UI, campaign and logging.
//!
//! The engine appends to an outbound queue during a tick; external readers
//! drain it between ticks.

use serde::{Deserialize, Serialize};

use crate::components::SuppressTarget;
use crate::enums::*;
use crate::error::CommandError;
use crate::state::MissionOutcome;
use crate::types::{ActorId, TilePos};

/// Outbound notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    CommandRejected {
        actor: Option<ActorId>,
        error: CommandError,
    },
    AttackResolved {
        attacker: ActorId,
        target: ActorId,
        hit: bool,
        damage: i32,
    },
    UnitDied {
        actor: ActorId,
        killer: Option<ActorId>,
    },
    UnitKnockedDown {
        actor: ActorId,
    },
    EnemyDetectedCrew {
        enemy: ActorId,
        crew: ActorId,
        at: TilePos,
    },
    AlarmRaised {
        by: Option<ActorId>,
    },
    OverwatchEntered {
        actor: ActorId,
    },
    ReactionFired {
        shooter: ActorId,
        target: ActorId,
        hit: bool,
        damage: i32,
        shots_remaining: u32,
    },
    OverwatchEnded {
        actor: ActorId,
    },
    SuppressiveBurst {
        shooter: ActorId,
        target: SuppressTarget,
    },
    SuppressionApplied {
        source: ActorId,
        target: ActorId,
        direct_hit: bool,
    },
    ChannelInterrupted {
        actor: ActorId,
        object_id: String,
    },
    InteractionCompleted {
        actor: ActorId,
        object_id: String,
    },
    PhaseChanged {
        from: MissionPhase,
        to: MissionPhase,
    },
    WaveTriggered {
        wave_id: String,
        spawned: Vec<ActorId>,
    },
    WaveDeferred {
        wave_id: String,
    },
    WaveEliminated {
        wave_id: String,
    },
    EvacAvailable,
    ActorExtracted {
        actor: ActorId,
    },
    ObjectiveUpdated {
        id: String,
        state: ObjectiveState,
    },
    ObjectiveCompleted {
        id: String,
    },
    ObjectiveFailed {
        id: String,
    },
    MissionCompleted {
        outcome: Box<MissionOutcome>,
    },
}
