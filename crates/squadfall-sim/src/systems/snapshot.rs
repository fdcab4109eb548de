//! Snapshot system: builds a `SessionSnapshot` from the session.
//!
//! Read-only; actors are listed in id order so two identical runs
//! serialize to identical bytes.

use squadfall_core::components::*;
use squadfall_core::enums::EffectKind;
use squadfall_core::state::{ActorView, ObjectiveView, SessionSnapshot, WaveView};
use squadfall_core::types::ActorId;

use crate::session::Session;

pub fn build(s: &Session, paused: bool) -> SessionSnapshot {
    let actors = s
        .actor_ids()
        .into_iter()
        .filter_map(|id| actor_view(s, id))
        .collect();

    let objectives = s
        .mission
        .objectives
        .iter()
        .map(|o| ObjectiveView {
            id: o.spec.id.clone(),
            primary: o.spec.primary,
            state: o.state,
        })
        .collect();

    let waves = s
        .mission
        .waves
        .iter()
        .map(|w| WaveView {
            id: w.def.id.clone(),
            triggered: w.triggered,
            cleared: w.cleared,
            alive: w.spawned.iter().filter(|id| s.is_alive(**id)).count() as u32,
        })
        .collect();

    SessionSnapshot {
        time: s.time,
        paused,
        phase: s.mission.phase,
        alarm: s.mission.alarm,
        retreating: s.mission.retreating,
        evac_available: s.mission.evac_available,
        actors,
        objectives,
        waves,
        rng_words: s.rng.get_word_pos() as u64,
    }
}

fn actor_view(s: &Session, id: ActorId) -> Option<ActorView> {
    let identity = s.read::<Identity>(id)?;
    let health = s.read::<Health>(id)?;
    let behavior = s.read::<Behavior>(id).unwrap_or_default();
    let weapon = s.read::<Weapon>(id);
    let overwatch = s.read::<OverwatchState>(id).unwrap_or_default();
    Some(ActorView {
        id,
        name: identity.name,
        faction: identity.faction,
        position: s.position(id)?,
        hp: health.current,
        max_hp: health.max,
        state: behavior.state,
        magazine: weapon.as_ref().map_or(0, |w| w.magazine),
        reserve: weapon.as_ref().map_or(0, |w| w.reserve),
        overwatch: overwatch.active,
        overwatch_shots: if overwatch.active {
            overwatch.shots_remaining
        } else {
            0
        },
        suppressed: s
            .read::<StatusEffects>(id)
            .is_some_and(|fx| fx.has(EffectKind::Suppressed)),
        extracted: s.is_extracted(id),
        detection: s.read::<DetectionRecord>(id).map(|r| r.state),
        role: s.read::<EnemyBrain>(id).map(|b| b.role),
    })
}
