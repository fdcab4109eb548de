//! Read-only views handed to external collaborators: the per-tick session
//! snapshot and the final mission outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ActorId, SimTime, TilePos};

/// Complete visible state after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub phase: MissionPhase,
    pub alarm: AlarmState,
    pub retreating: bool,
    pub evac_available: bool,
    pub actors: Vec<ActorView>,
    pub objectives: Vec<ObjectiveView>,
    pub waves: Vec<WaveView>,
    /// ChaCha word position; identical runs consume identical amounts.
    pub rng_words: u64,
}

/// One actor as seen from outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    pub name: String,
    pub faction: Faction,
    pub position: TilePos,
    pub hp: i32,
    pub max_hp: i32,
    pub state: BehaviorState,
    pub magazine: u32,
    pub reserve: u32,
    pub overwatch: bool,
    pub overwatch_shots: u32,
    pub suppressed: bool,
    pub extracted: bool,
    pub detection: Option<DetectionState>,
    pub role: Option<EnemyRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveView {
    pub id: String,
    pub primary: bool,
    pub state: ObjectiveState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveView {
    pub id: String,
    pub triggered: bool,
    pub cleared: bool,
    pub alive: u32,
}

/// Final report for the campaign layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionOutcome {
    pub mission_id: String,
    pub result: MissionResult,
    pub crew: Vec<CrewOutcome>,
    pub objectives: BTreeMap<String, ObjectiveState>,
    pub stats: MissionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewOutcome {
    pub id: ActorId,
    pub name: String,
    pub status: CrewStatus,
    pub final_hp: i32,
    pub ammo_remaining: u32,
    pub ammo_used: u32,
    pub kills: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub suggested_xp: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionStats {
    pub enemies_killed: u32,
    pub enemies_remaining: u32,
    pub alarm_triggered: bool,
    pub ticks_elapsed: u64,
    pub loot_collected: Vec<String>,
    pub loot_value: u32,
}
