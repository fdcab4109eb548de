//! Runtime commands sent by the presentation layer to a mission session.
//!
//! Commands are queued and applied at the next running tick boundary.
//! `Pause`/`Resume` take effect immediately.

use serde::{Deserialize, Serialize};

use crate::components::SuppressTarget;
use crate::types::{ActorId, Direction8, TilePos};

/// All player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    // --- Unit orders (override-only) ---
    /// Walk to a tile.
    Move { actor: ActorId, to: TilePos },
    /// Attack a hostile actor until it dies or becomes invalid.
    Attack { actor: ActorId, target: ActorId },
    /// Pick up loot or hack a terminal.
    Interact { actor: ActorId, object_id: String },
    /// Enter overwatch, optionally limited to a facing cone.
    EnterOverwatch {
        actor: ActorId,
        facing: Option<Direction8>,
    },
    /// Fire a suppressive burst at an actor or a tile.
    SuppressiveFire {
        actor: ActorId,
        target: SuppressTarget,
    },
    /// Drop every current order.
    Stop { actor: ActorId },
    /// Leave the map through the evac zone.
    Extract { actor: ActorId },

    // --- Mission control ---
    ConfirmDeployment,
    EndNegotiation,
    InitiateRetreat,
    CancelRetreat,

    // --- Simulation control ---
    Pause,
    Resume,
}

impl Command {
    /// The actor this command orders, if it is a unit order.
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            Command::Move { actor, .. }
            | Command::Attack { actor, .. }
            | Command::Interact { actor, .. }
            | Command::EnterOverwatch { actor, .. }
            | Command::SuppressiveFire { actor, .. }
            | Command::Stop { actor }
            | Command::Extract { actor } => Some(*actor),
            _ => None,
        }
    }

    /// Clock commands are applied even while paused.
    pub fn is_clock_control(&self) -> bool {
        matches!(self, Command::Pause | Command::Resume)
    }
}
