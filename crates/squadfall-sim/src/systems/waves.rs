//! Wave spawning system: triggered reinforcement batches.
//!
//! Each wave fires at most once, after its required phase has begun and
//! its trigger holds. Spawns on LOS-gated points wait while crew can see
//! the point, up to the configured cap. Spawned enemies arrive alerted.

use tracing::{debug, info, warn};

use squadfall_core::components::{Health, Vision};
use squadfall_core::constants::SPAWN_SEARCH_RADIUS;
use squadfall_core::enums::Faction;
use squadfall_core::events::SimEvent;
use squadfall_core::mission::{WaveDefinition, WaveTrigger};
use squadfall_core::types::TilePos;
use squadfall_map::los::can_see;

use crate::session::Session;
use crate::systems::perception;
use crate::world_setup;

pub fn run(s: &mut Session) {
    if !s.mission.phase.is_live() {
        return;
    }
    update_cleared(s);

    for index in 0..s.mission.waves.len() {
        let wave = &s.mission.waves[index];
        if wave.triggered || s.mission.phase < wave.def.required_phase {
            continue;
        }
        if trigger_met(s, &wave.def) {
            try_spawn(s, index);
        }
    }
}

/// A wave is cleared once every enemy it spawned is dead.
fn update_cleared(s: &mut Session) {
    for index in 0..s.mission.waves.len() {
        let wave = &s.mission.waves[index];
        if !wave.triggered || wave.cleared {
            continue;
        }
        if wave.spawned.iter().any(|id| s.is_alive(*id)) {
            continue;
        }
        let wave = &mut s.mission.waves[index];
        wave.cleared = true;
        let wave_id = wave.def.id.clone();
        info!(wave = %wave_id, "wave eliminated");
        s.emit(SimEvent::WaveEliminated { wave_id });
    }
}

pub fn trigger_met(s: &Session, def: &WaveDefinition) -> bool {
    match &def.trigger {
        WaveTrigger::TimeInPhase { ticks } => s
            .mission
            .entered_at(def.required_phase)
            .is_some_and(|entered| s.tick().saturating_sub(entered) >= *ticks),
        WaveTrigger::OnEvent { event } => s.mission.has_fired(event),
        WaveTrigger::ActorHpBelow { tag, threshold } => s
            .find_tagged(tag)
            .into_iter()
            .filter_map(|id| s.read::<Health>(id))
            .any(|h| h.fraction() <= *threshold),
        WaveTrigger::WaveCleared { wave_id } => {
            s.mission.wave(wave_id).is_some_and(|w| w.cleared)
        }
    }
}

/// Whether any active crew member can see any of `tiles`.
fn crew_watching(s: &Session, tiles: &[TilePos]) -> bool {
    s.active_of(Faction::Crew).into_iter().any(|crew| {
        let (Some(pos), Some(vision)) = (s.position(crew), s.read::<Vision>(crew)) else {
            return false;
        };
        tiles.iter().any(|t| can_see(&s.grid, pos, *t, vision.range))
    })
}

fn try_spawn(s: &mut Session, index: usize) {
    let def = s.mission.waves[index].def.clone();
    let Some(point) = s.mission.spawn_points.get(&def.spawn_point).cloned() else {
        warn!(wave = %def.id, spawn_point = %def.spawn_point, "unknown spawn point, wave dropped");
        s.mission.waves[index].triggered = true;
        return;
    };

    if point.los_gated && crew_watching(s, &point.tiles) {
        let tick = s.tick();
        let wave = &mut s.mission.waves[index];
        let first = wave.deferred_since.is_none();
        let since = *wave.deferred_since.get_or_insert(tick);
        if tick.saturating_sub(since) < s.config.wave_max_defer_ticks {
            if first {
                warn!(wave = %def.id, "spawn point in crew view, wave deferred");
                s.emit(SimEvent::WaveDeferred { wave_id: def.id });
            }
            return;
        }
        warn!(wave = %def.id, waited = tick - since, "defer cap reached, spawning in view");
    }

    if let Some(door) = point.door {
        if s.grid.open_door(door) {
            debug!(wave = %def.id, ?door, "door opened");
        }
    }

    let mut anchors = point.tiles.iter().copied().cycle();
    let mut spawned = Vec::new();
    for group in &def.composition {
        for _ in 0..group.count {
            let Some(anchor) = anchors.next() else {
                break;
            };
            let occupancy = s.occupancy();
            let free = s
                .grid
                .nearest_free_tile(anchor, SPAWN_SEARCH_RADIUS, |p| !occupancy.contains_key(&p));
            let Some(pos) = free else {
                warn!(wave = %def.id, ?anchor, "no free tile near spawn point");
                continue;
            };
            spawned.push(world_setup::spawn_enemy(s, &group.template, pos, Some(&def.id)));
        }
    }

    let knowledge = perception::crew_positions(s);
    for &id in &spawned {
        perception::alert(s, id, &knowledge);
    }

    let wave = &mut s.mission.waves[index];
    wave.triggered = true;
    wave.spawned = spawned.clone();
    info!(wave = %def.id, count = spawned.len(), tick = s.time.tick, "wave triggered");
    s.emit(SimEvent::WaveTriggered {
        wave_id: def.id,
        spawned,
    });
}
