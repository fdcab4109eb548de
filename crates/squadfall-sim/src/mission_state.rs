//! Mission-level state owned by one session: phase, alarm, evac, waves,
//! objectives and interactables.

use std::collections::BTreeMap;

use squadfall_core::constants::{HACK_CHANNEL_TICKS, LOOT_PICKUP_TICKS};
use squadfall_core::enums::*;
use squadfall_core::mission::{
    InteractableSpec, ObjectiveSpec, SpawnPointSpec, TriggerEvent, WaveDefinition,
};
use squadfall_core::state::MissionOutcome;
use squadfall_core::types::{ActorId, TilePos};

/// Where an interactable currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractableStatus {
    Available,
    /// Loot held by a crew member.
    Carried(ActorId),
    /// Loot carried out through evac.
    Secured,
    /// Terminal finished.
    Hacked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interactable {
    pub spec: InteractableSpec,
    /// Current location; dropped loot moves to where its carrier fell.
    pub position: TilePos,
    pub status: InteractableStatus,
    /// Actor currently channeling on it.
    pub claimed_by: Option<ActorId>,
}

impl Interactable {
    pub fn new(spec: InteractableSpec) -> Self {
        Self {
            position: spec.position,
            spec,
            status: InteractableStatus::Available,
            claimed_by: None,
        }
    }

    pub fn channel_ticks(&self) -> u32 {
        self.spec.channel_ticks.unwrap_or(match self.spec.kind {
            InteractableKind::Loot => LOOT_PICKUP_TICKS,
            InteractableKind::Terminal => HACK_CHANNEL_TICKS,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveRuntime {
    pub spec: ObjectiveSpec,
    pub state: ObjectiveState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveRuntime {
    pub def: WaveDefinition,
    pub triggered: bool,
    pub spawned: Vec<ActorId>,
    pub cleared: bool,
    /// First tick the wave was held back by crew line of sight.
    pub deferred_since: Option<u64>,
}

impl WaveRuntime {
    pub fn new(def: WaveDefinition) -> Self {
        Self {
            def,
            triggered: false,
            spawned: Vec::new(),
            cleared: false,
            deferred_since: None,
        }
    }
}

/// Explicit per-session mission flags.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionState {
    pub id: String,
    /// Whether deployment leads into a negotiation phase.
    pub negotiation: bool,
    pub phase: MissionPhase,
    /// Tick each phase was entered.
    pub phase_entered: BTreeMap<MissionPhase, u64>,
    pub alarm: AlarmState,
    pub retreating: bool,
    pub evac_available: bool,
    /// Tick a called evac becomes available.
    pub evac_at: Option<u64>,
    /// Ticks spent in live phases.
    pub live_ticks: u64,
    /// Named events that already happened, for wave triggers.
    pub fired: Vec<TriggerEvent>,
    pub objectives: Vec<ObjectiveRuntime>,
    pub waves: Vec<WaveRuntime>,
    pub spawn_points: BTreeMap<String, SpawnPointSpec>,
    pub interactables: BTreeMap<String, Interactable>,
    pub next_actor_id: u32,
    pub outcome: Option<MissionOutcome>,
}

impl MissionState {
    pub fn new(id: String, negotiation: bool) -> Self {
        Self {
            id,
            negotiation,
            phase: MissionPhase::Setup,
            phase_entered: BTreeMap::from([(MissionPhase::Setup, 0)]),
            alarm: AlarmState::Quiet,
            retreating: false,
            evac_available: false,
            evac_at: None,
            live_ticks: 0,
            fired: Vec::new(),
            objectives: Vec::new(),
            waves: Vec::new(),
            spawn_points: BTreeMap::new(),
            interactables: BTreeMap::new(),
            next_actor_id: 1,
            outcome: None,
        }
    }

    pub fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        id
    }

    /// Tick `phase` began, or the first later phase if it was skipped.
    pub fn entered_at(&self, phase: MissionPhase) -> Option<u64> {
        self.phase_entered.range(phase..).next().map(|(_, tick)| *tick)
    }

    pub fn record(&mut self, event: TriggerEvent) {
        if !self.fired.contains(&event) {
            self.fired.push(event);
        }
    }

    pub fn has_fired(&self, event: &TriggerEvent) -> bool {
        self.fired.contains(event)
    }

    pub fn wave(&self, id: &str) -> Option<&WaveRuntime> {
        self.waves.iter().find(|w| w.def.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// At least one primary objective exists and every primary is completed.
    pub fn primaries_complete(&self) -> bool {
        let mut primaries = self.objectives.iter().filter(|o| o.spec.primary).peekable();
        primaries.peek().is_some() && primaries.all(|o| o.state == ObjectiveState::Completed)
    }

    pub fn primary_failed(&self) -> bool {
        self.objectives
            .iter()
            .any(|o| o.spec.primary && o.state == ObjectiveState::Failed)
    }

    /// Loot ids secured so far, in id order.
    pub fn secured_loot(&self) -> Vec<&Interactable> {
        self.interactables
            .values()
            .filter(|i| i.status == InteractableStatus::Secured)
            .collect()
    }
}
