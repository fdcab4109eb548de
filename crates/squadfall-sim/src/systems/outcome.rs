//! Mission end detection and outcome classification.
//!
//! `collect` freezes the session into a `TerminalState`; `compute` is a pure
//! function of that state, so two equal terminal states always classify the
//! same way. The outcome is computed once and never revised.

use std::collections::BTreeMap;

use tracing::info;

use squadfall_core::components::*;
use squadfall_core::constants::*;
use squadfall_core::enums::*;
use squadfall_core::events::SimEvent;
use squadfall_core::state::{CrewOutcome, MissionOutcome, MissionStats};
use squadfall_core::types::ActorId;

use crate::session::Session;
use crate::systems::phase;

/// One crew member at mission end.
#[derive(Debug, Clone, PartialEq)]
pub struct CrewRecord {
    pub id: ActorId,
    pub name: String,
    pub alive: bool,
    pub extracted: bool,
    pub hp: i32,
    pub max_hp: i32,
    pub ammo_remaining: u32,
    pub stats: CombatStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveRecord {
    pub id: String,
    pub primary: bool,
    pub state: ObjectiveState,
}

/// Everything the outcome depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalState {
    pub mission_id: String,
    pub crew: Vec<CrewRecord>,
    pub objectives: Vec<ObjectiveRecord>,
    pub enemies_killed: u32,
    pub enemies_remaining: u32,
    pub alarm_triggered: bool,
    pub ticks_elapsed: u64,
    /// Secured loot ids and values.
    pub loot: Vec<(String, u32)>,
    pub retreated: bool,
}

pub fn collect(s: &Session) -> TerminalState {
    let crew = s
        .all_of(Faction::Crew)
        .into_iter()
        .filter_map(|id| {
            let identity = s.read::<Identity>(id)?;
            let health = s.read::<Health>(id)?;
            Some(CrewRecord {
                id,
                name: identity.name,
                alive: health.is_alive(),
                extracted: s.is_extracted(id),
                hp: health.current,
                max_hp: health.max,
                ammo_remaining: s.read::<Weapon>(id).map_or(0, |w| w.total_rounds()),
                stats: s.read::<CombatStats>(id).unwrap_or_default(),
            })
        })
        .collect();

    let objectives = s
        .mission
        .objectives
        .iter()
        .map(|o| ObjectiveRecord {
            id: o.spec.id.clone(),
            primary: o.spec.primary,
            state: o.state,
        })
        .collect();

    let enemies = s.all_of(Faction::Enemy);
    let enemies_killed = enemies.iter().filter(|id| !s.is_alive(**id)).count() as u32;

    TerminalState {
        mission_id: s.mission.id.clone(),
        crew,
        objectives,
        enemies_killed,
        enemies_remaining: enemies.len() as u32 - enemies_killed,
        alarm_triggered: s.mission.alarm == AlarmState::Alerted,
        ticks_elapsed: s.tick(),
        loot: s
            .mission
            .secured_loot()
            .into_iter()
            .map(|i| (i.spec.id.clone(), i.spec.value))
            .collect(),
        retreated: s.mission.retreating,
    }
}

pub fn classify(state: &TerminalState) -> MissionResult {
    if state.crew.iter().all(|c| !c.alive) {
        return MissionResult::Defeat;
    }
    let primaries_done = state
        .objectives
        .iter()
        .filter(|o| o.primary)
        .all(|o| o.state == ObjectiveState::Completed);
    if !primaries_done {
        return MissionResult::Retreat;
    }
    let all_extracted = state.crew.iter().all(|c| c.extracted);
    let secondaries_done = state
        .objectives
        .iter()
        .filter(|o| !o.primary)
        .all(|o| o.state == ObjectiveState::Completed);
    if all_extracted && secondaries_done {
        MissionResult::TotalVictory
    } else if state.crew.iter().all(|c| c.alive) {
        MissionResult::Victory
    } else {
        MissionResult::PartialSuccess
    }
}

fn crew_status(crew: &CrewRecord, retreated: bool) -> CrewStatus {
    if !crew.alive {
        return CrewStatus::Dead;
    }
    if retreated && !crew.extracted {
        return CrewStatus::MIA;
    }
    let fraction = if crew.max_hp > 0 {
        crew.hp as f64 / crew.max_hp as f64
    } else {
        0.0
    };
    if fraction <= CRITICAL_HP_FRACTION {
        CrewStatus::Critical
    } else if fraction <= WOUNDED_HP_FRACTION {
        CrewStatus::Wounded
    } else {
        CrewStatus::Alive
    }
}

fn suggested_xp(crew: &CrewRecord) -> u32 {
    let survival = if crew.alive { XP_SURVIVAL } else { 0 };
    let extraction = if crew.extracted { XP_EXTRACTION_BONUS } else { 0 };
    survival + crew.stats.kills * XP_PER_KILL + crew.stats.shots_hit * XP_PER_HIT + extraction
}

/// Classify a terminal state. Pure.
pub fn compute(state: &TerminalState) -> MissionOutcome {
    let crew = state
        .crew
        .iter()
        .map(|c| CrewOutcome {
            id: c.id,
            name: c.name.clone(),
            status: crew_status(c, state.retreated),
            final_hp: c.hp,
            ammo_remaining: c.ammo_remaining,
            ammo_used: c.stats.rounds_spent,
            kills: c.stats.kills,
            shots_fired: c.stats.shots_fired,
            shots_hit: c.stats.shots_hit,
            suggested_xp: suggested_xp(c),
        })
        .collect();

    let objectives: BTreeMap<String, ObjectiveState> = state
        .objectives
        .iter()
        .map(|o| (o.id.clone(), o.state))
        .collect();

    MissionOutcome {
        mission_id: state.mission_id.clone(),
        result: classify(state),
        crew,
        objectives,
        stats: MissionStats {
            enemies_killed: state.enemies_killed,
            enemies_remaining: state.enemies_remaining,
            alarm_triggered: state.alarm_triggered,
            ticks_elapsed: state.ticks_elapsed,
            loot_collected: state.loot.iter().map(|(id, _)| id.clone()).collect(),
            loot_value: state.loot.iter().map(|(_, value)| value).sum(),
        },
    }
}

/// End the mission once a terminal condition holds.
pub fn check_completion(s: &mut Session) {
    if s.mission.outcome.is_some() {
        return;
    }
    if let Some(reason) = completion_reason(s) {
        finish(s, reason);
    }
}

fn completion_reason(s: &Session) -> Option<&'static str> {
    let crew = s.all_of(Faction::Crew);
    if crew.iter().all(|id| !s.is_alive(*id)) {
        return Some("crew lost");
    }
    if s.mission.primary_failed() {
        return Some("primary objective failed");
    }
    if crew.iter().all(|id| !s.is_active(*id)) {
        return Some("no crew left on the map");
    }
    let objectives = &s.mission.objectives;
    let all_resolved = !objectives.is_empty() && objectives.iter().all(|o| o.state.is_terminal());
    if all_resolved && s.grid.zone_tiles(ZoneKind::Evac).is_empty() {
        return Some("objectives resolved with no evac zone");
    }
    None
}

/// Freeze the outcome. Later calls return the stored one.
pub fn finish(s: &mut Session, reason: &str) -> MissionOutcome {
    if let Some(outcome) = &s.mission.outcome {
        return outcome.clone();
    }
    phase::complete(s);
    let outcome = compute(&collect(s));
    info!(
        result = ?outcome.result,
        reason,
        tick = s.tick(),
        "mission complete"
    );
    s.mission.outcome = Some(outcome.clone());
    s.emit(SimEvent::MissionCompleted {
        outcome: Box::new(outcome.clone()),
    });
    outcome
}
