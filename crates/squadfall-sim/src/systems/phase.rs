//! Forward-only mission phase machine.
//!
//! Explicit transitions come from commands (deployment, end of
//! negotiation) and mission completion. Automatic ones happen here:
//! the alarm or a timeout ends negotiation, Contact escalates to Pressure
//! after a configured time, and a retreat or finished primaries move the
//! mission into Resolution.

use tracing::{info, warn};

use squadfall_core::enums::*;
use squadfall_core::error::CommandError;
use squadfall_core::events::SimEvent;
use squadfall_core::mission::TriggerEvent;

use crate::session::Session;

/// Take one edge of the transition table.
pub fn advance(s: &mut Session, to: MissionPhase) -> Result<(), CommandError> {
    let from = s.mission.phase;
    if !from.can_advance_to(to) {
        return Err(CommandError::IllegalPhaseTransition { from, to });
    }
    enter(s, from, to);
    Ok(())
}

/// Move to `Complete` from wherever the mission is.
///
/// `Setup -> Complete` is not a table edge; a mission concluded before
/// deployment still has to end.
pub fn complete(s: &mut Session) {
    let from = s.mission.phase;
    if from == MissionPhase::Complete {
        return;
    }
    if !from.can_advance_to(MissionPhase::Complete) {
        warn!(?from, "mission concluded outside the phase table");
    }
    enter(s, from, MissionPhase::Complete);
}

fn enter(s: &mut Session, from: MissionPhase, to: MissionPhase) {
    let tick = s.tick();
    s.mission.phase = to;
    s.mission.phase_entered.insert(to, tick);
    s.mission.record(TriggerEvent::PhaseEntered { phase: to });
    info!(?from, ?to, tick, "phase changed");
    s.emit(SimEvent::PhaseChanged { from, to });
}

/// Automatic escalation.
pub fn run(s: &mut Session) {
    let phase = s.mission.phase;
    let since = s
        .mission
        .entered_at(phase)
        .map_or(0, |entered| s.tick().saturating_sub(entered));

    let next = match phase {
        MissionPhase::Negotiation
            if s.mission.alarm == AlarmState::Alerted
                || s.config.negotiation_timeout_ticks.is_some_and(|t| since >= t) =>
        {
            Some(MissionPhase::Contact)
        }
        MissionPhase::Contact | MissionPhase::Pressure
            if s.mission.retreating || s.mission.primaries_complete() =>
        {
            Some(MissionPhase::Resolution)
        }
        MissionPhase::Contact if s.config.pressure_after_ticks.is_some_and(|t| since >= t) => {
            Some(MissionPhase::Pressure)
        }
        _ => None,
    };

    if let Some(next) = next {
        if let Err(err) = advance(s, next) {
            warn!(%err, "automatic phase change refused");
        }
    }
}
