//! Simulation engine: the mission session's public face.
//!
//! `SimulationEngine` owns the session (hecs world, grid, seeded RNG,
//! mission state), queues player commands, runs all systems in a fixed
//! order and produces `SessionSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use squadfall_core::commands::Command;
use squadfall_core::constants::KNOCKDOWN_DAMAGE_FRACTION;
use squadfall_core::enums::*;
use squadfall_core::error::{CommandError, MissionBuildError};
use squadfall_core::events::SimEvent;
use squadfall_core::mission::MissionSpec;
use squadfall_core::state::{MissionOutcome, SessionSnapshot};
use squadfall_core::types::{ActorId, SimTime, TilePos};
use squadfall_map::grid::TileGrid;

use crate::session::Session;
use crate::systems;
use crate::world_setup;

/// Tuning for one session. Balance numbers live in `core::constants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Overrides the mission seed when set.
    pub seed: Option<u64>,
    /// Ticks between enemy decisions.
    pub think_interval_ticks: u64,
    /// Contact escalates to Pressure after this many ticks.
    pub pressure_after_ticks: Option<u64>,
    /// Negotiation ends on its own after this many ticks.
    pub negotiation_timeout_ticks: Option<u64>,
    /// Delay between calling evac and its arrival.
    pub evac_delay_ticks: u64,
    /// Longest an LOS-gated wave waits before spawning in view.
    pub wave_max_defer_ticks: u64,
    /// Whether any damage interrupts a channel (knockdown always does).
    pub damage_interrupts_channel: bool,
    /// Whether idle crew return fire once the alarm is raised.
    pub crew_auto_engage: bool,
    /// Single-hit fraction of max HP that knocks an actor down.
    pub knockdown_fraction: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            think_interval_ticks: 10,
            pressure_after_ticks: Some(1200),
            negotiation_timeout_ticks: Some(600),
            evac_delay_ticks: 0,
            wave_max_defer_ticks: 100,
            damage_interrupts_channel: true,
            crew_auto_engage: true,
            knockdown_fraction: KNOCKDOWN_DAMAGE_FRACTION,
        }
    }
}

/// The simulation engine. Owns the session and the command queue.
pub struct SimulationEngine {
    session: Session,
    paused: bool,
    command_queue: VecDeque<Command>,
}

impl SimulationEngine {
    /// Validate the mission and build a session in `Setup`.
    pub fn new(spec: MissionSpec, config: SimConfig) -> Result<Self, MissionBuildError> {
        let session = world_setup::build_session(&spec, config)?;
        Ok(Self {
            session,
            paused: false,
            command_queue: VecDeque::new(),
        })
    }

    /// Queue a command for the next running tick. Pause and resume apply
    /// immediately.
    pub fn queue_command(&mut self, command: Command) {
        if !command.is_clock_control() {
            self.command_queue.push_back(command);
            return;
        }
        match command {
            Command::Pause => {
                if !self.paused {
                    debug!(tick = self.session.tick(), "paused");
                }
                self.paused = true;
            }
            Command::Resume => {
                if self.paused {
                    debug!(tick = self.session.tick(), "resumed");
                }
                self.paused = false;
            }
            _ => {}
        }
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.queue_command(command);
        }
    }

    /// Advance by one tick and return the resulting snapshot.
    ///
    /// While paused or after completion nothing changes and queued
    /// commands wait.
    pub fn tick(&mut self) -> SessionSnapshot {
        if !self.paused && !self.is_complete() {
            self.process_commands();
            if self.session.mission.phase.is_live() {
                self.run_systems();
                self.session.time.advance();
            }
        }
        self.snapshot()
    }

    /// Apply every queued command. Rejections become events; invalid
    /// references are only logged.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            let actor = command.actor();
            let summary = format!("{command:?}");
            match systems::orders::apply_player(&mut self.session, command) {
                Ok(()) => debug!(command = %summary, "command applied"),
                Err(error) if error.is_invalid_reference() => {
                    warn!(command = %summary, %error, "command ignored");
                }
                Err(error) => {
                    debug!(command = %summary, %error, "command rejected");
                    self.session.emit(SimEvent::CommandRejected { actor, error });
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let s = &mut self.session;
        s.mission.live_ticks += 1;
        // 1. Status effect timers and auras
        systems::status::run(s);
        // 2. Weapon cooldowns and reloads
        systems::combat::tick_weapons(s);
        // 3. Perception and alarm
        systems::perception::run(s);
        // 4. Enemy decisions
        systems::ai::run(s);
        // 5. Attack and suppression orders
        systems::combat::run(s);
        // 6. Movement with overwatch reactions
        systems::movement::run(s);
        // 7. Channels
        systems::channel::run(s);
        // 8. Phase escalation
        systems::phase::run(s);
        // 9. Waves
        systems::waves::run(s);
        // 10. Evac and retreat extraction
        systems::extraction::run(s);
        // 11. Objectives
        systems::objectives::run(s);
        // 12. Mission end
        systems::outcome::check_completion(s);
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.session.events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        systems::snapshot::build(&self.session, self.paused)
    }

    pub fn phase(&self) -> MissionPhase {
        self.session.mission.phase
    }

    pub fn time(&self) -> SimTime {
        self.session.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn alarm(&self) -> AlarmState {
        self.session.mission.alarm
    }

    pub fn outcome(&self) -> Option<&MissionOutcome> {
        self.session.mission.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.session.mission.is_complete()
    }

    /// Commands still waiting for a running tick.
    pub fn pending_commands(&self) -> usize {
        self.command_queue.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct session access for scripted setups and tests.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.session.world
    }

    pub fn grid(&self) -> &TileGrid {
        &self.session.grid
    }

    // --- Mission scripting ---

    /// Alert one enemy as if it had detected every crew member.
    pub fn alert_enemy(&mut self, enemy: ActorId) -> Result<(), CommandError> {
        let s = &mut self.session;
        match s.faction(enemy) {
            None => return Err(CommandError::UnknownActor(enemy)),
            Some(Faction::Crew) => return Err(CommandError::NotControllable(enemy)),
            Some(Faction::Enemy) => {}
        }
        if !s.is_alive(enemy) {
            return Err(CommandError::ActorDead(enemy));
        }
        let knowledge = systems::perception::crew_positions(s);
        systems::perception::alert(s, enemy, &knowledge);
        Ok(())
    }

    pub fn alert_all_enemies(&mut self) {
        systems::perception::alert_all(&mut self.session);
    }

    /// Force a phase transition along the table.
    pub fn advance_phase(&mut self, to: MissionPhase) -> Result<(), CommandError> {
        systems::phase::advance(&mut self.session, to)
    }

    /// Replace the evac zone.
    pub fn set_evac_zone(&mut self, tiles: &[TilePos]) {
        self.session.grid.set_zone(ZoneKind::Evac, tiles);
    }

    /// Call evac; it arrives after the configured delay.
    pub fn call_evac(&mut self) {
        systems::extraction::call_evac(&mut self.session);
    }

    /// End the mission now and return its outcome.
    pub fn conclude(&mut self) -> MissionOutcome {
        systems::outcome::finish(&mut self.session, "concluded by caller")
    }
}
