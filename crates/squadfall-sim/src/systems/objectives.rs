//! Objective evaluation.
//!
//! Every non-terminal objective is re-derived each tick from live state.
//! States only move forward: `Pending -> InProgress -> Completed | Failed`.
//! Finishing every primary calls evac.

use tracing::info;

use squadfall_core::components::Health;
use squadfall_core::enums::*;
use squadfall_core::events::SimEvent;
use squadfall_core::mission::{ObjectiveKind, TriggerEvent};

use crate::mission_state::InteractableStatus;
use crate::session::Session;
use crate::systems::extraction;

pub fn run(s: &mut Session) {
    for index in 0..s.mission.objectives.len() {
        let objective = &s.mission.objectives[index];
        let current = objective.state;
        if current.is_terminal() {
            continue;
        }
        let next = evaluate(s, &objective.spec.kind);
        if next == current || (next == ObjectiveState::Pending && current != ObjectiveState::Pending) {
            continue;
        }

        let objective = &mut s.mission.objectives[index];
        objective.state = next;
        let id = objective.spec.id.clone();
        s.emit(SimEvent::ObjectiveUpdated {
            id: id.clone(),
            state: next,
        });
        match next {
            ObjectiveState::Completed => {
                info!(objective = %id, tick = s.tick(), "objective completed");
                s.mission
                    .record(TriggerEvent::ObjectiveCompleted { id: id.clone() });
                s.emit(SimEvent::ObjectiveCompleted { id });
            }
            ObjectiveState::Failed => {
                info!(objective = %id, tick = s.tick(), "objective failed");
                s.emit(SimEvent::ObjectiveFailed { id });
            }
            _ => {}
        }
    }

    if s.mission.primaries_complete() {
        extraction::call_evac(s);
    }
}

/// The state an objective's condition implies right now.
pub fn evaluate(s: &Session, kind: &ObjectiveKind) -> ObjectiveState {
    let crew = s.all_of(Faction::Crew);
    match kind {
        ObjectiveKind::Survive { ticks } => {
            if !crew.iter().any(|id| s.is_alive(*id)) {
                ObjectiveState::Failed
            } else if s.mission.live_ticks >= *ticks {
                ObjectiveState::Completed
            } else {
                ObjectiveState::InProgress
            }
        }
        ObjectiveKind::ExtractAll => {
            let extracted = crew.iter().filter(|id| s.is_extracted(**id)).count();
            if crew.iter().any(|id| !s.is_alive(*id)) {
                ObjectiveState::Failed
            } else if extracted == crew.len() {
                ObjectiveState::Completed
            } else if extracted > 0 {
                ObjectiveState::InProgress
            } else {
                ObjectiveState::Pending
            }
        }
        ObjectiveKind::KillTarget { tag } => {
            let targets = s.find_tagged(tag);
            if targets.is_empty() {
                ObjectiveState::Pending
            } else if targets.iter().all(|id| !s.is_alive(*id)) {
                ObjectiveState::Completed
            } else if targets
                .iter()
                .any(|id| s.read::<Health>(*id).is_some_and(|h| h.current < h.max))
            {
                ObjectiveState::InProgress
            } else {
                ObjectiveState::Pending
            }
        }
        ObjectiveKind::Retrieve { object_id } => {
            match s.mission.interactables.get(object_id).map(|o| (o.status, o.claimed_by)) {
                Some((InteractableStatus::Secured, _)) => ObjectiveState::Completed,
                Some((InteractableStatus::Carried(_), _)) | Some((_, Some(_))) => {
                    ObjectiveState::InProgress
                }
                _ => ObjectiveState::Pending,
            }
        }
        ObjectiveKind::Hack { object_id } => {
            match s.mission.interactables.get(object_id).map(|o| (o.status, o.claimed_by)) {
                Some((InteractableStatus::Hacked, _)) => ObjectiveState::Completed,
                Some((_, Some(_))) => ObjectiveState::InProgress,
                _ => ObjectiveState::Pending,
            }
        }
        ObjectiveKind::EliminateAll => {
            let enemies = s.all_of(Faction::Enemy);
            let waves_pending = s.mission.waves.iter().any(|w| !w.triggered);
            if !waves_pending && enemies.iter().all(|id| !s.is_alive(*id)) {
                ObjectiveState::Completed
            } else if enemies.iter().any(|id| !s.is_alive(*id)) {
                ObjectiveState::InProgress
            } else {
                ObjectiveState::Pending
            }
        }
    }
}
