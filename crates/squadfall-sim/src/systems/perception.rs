//! Perception: per-enemy detection state machine and the mission alarm.
//!
//! Detection is one-way (`Idle -> Alerted`). The first enemy to become
//! alerted raises the mission alarm, exactly once.

use tracing::{debug, info};

use squadfall_core::components::{DetectionRecord, Vision};
use squadfall_core::enums::*;
use squadfall_core::events::SimEvent;
use squadfall_core::mission::TriggerEvent;
use squadfall_core::types::{ActorId, TilePos};
use squadfall_map::los::can_see;

use crate::session::Session;

/// Test every enemy's sight against every active crew member.
pub fn run(s: &mut Session) {
    // Negotiation is a parley: nobody opens fire on sight.
    if s.mission.phase == MissionPhase::Negotiation {
        return;
    }
    let crew = crew_positions(s);

    for enemy in s.active_of(Faction::Enemy) {
        ensure_record(s, enemy);
        let (Some(pos), Some(vision)) = (s.position(enemy), s.read::<Vision>(enemy)) else {
            continue;
        };
        let seen: Vec<(ActorId, TilePos)> = crew
            .iter()
            .copied()
            .filter(|(_, cpos)| can_see(&s.grid, pos, *cpos, vision.range))
            .collect();
        if seen.is_empty() {
            continue;
        }

        let tick = s.tick();
        let newly: Vec<(ActorId, TilePos)> = s
            .update::<DetectionRecord, _>(enemy, |record| {
                let mut newly = Vec::new();
                for &(id, at) in &seen {
                    if record.last_known.insert(id, at).is_none() {
                        newly.push((id, at));
                    }
                }
                newly
            })
            .unwrap_or_default();
        for (crew_id, at) in newly {
            debug!(enemy = %enemy, crew = %crew_id, ?at, tick, "enemy detected crew");
            s.emit(SimEvent::EnemyDetectedCrew {
                enemy,
                crew: crew_id,
                at,
            });
        }
        alert(s, enemy, &[]);
    }
}

/// Active crew and their tiles, in id order.
pub fn crew_positions(s: &Session) -> Vec<(ActorId, TilePos)> {
    s.active_of(Faction::Crew)
        .into_iter()
        .filter_map(|id| s.position(id).map(|p| (id, p)))
        .collect()
}

/// Records are created lazily on the first perception pass.
fn ensure_record(s: &mut Session, enemy: ActorId) {
    if s.read::<DetectionRecord>(enemy).is_none() {
        s.insert(enemy, DetectionRecord::default());
    }
}

/// Alert one enemy, merging `knowledge` into its last-known positions.
///
/// Returns `true` if the enemy transitioned from `Idle`.
pub fn alert(s: &mut Session, enemy: ActorId, knowledge: &[(ActorId, TilePos)]) -> bool {
    if s.faction(enemy) != Some(Faction::Enemy) || !s.is_active(enemy) {
        return false;
    }
    ensure_record(s, enemy);
    let tick = s.tick();
    let transitioned = s
        .update::<DetectionRecord, _>(enemy, |record| {
            for (id, at) in knowledge {
                record.last_known.insert(*id, *at);
            }
            if record.state == DetectionState::Idle {
                record.state = DetectionState::Alerted;
                record.changed_at_tick = tick;
                true
            } else {
                false
            }
        })
        .unwrap_or(false);

    if transitioned {
        debug!(enemy = %enemy, tick, "enemy alerted");
        raise_alarm(s, Some(enemy));
    }
    transitioned
}

/// Alert every active enemy with the positions of all active crew.
pub fn alert_all(s: &mut Session) {
    let knowledge = crew_positions(s);
    for enemy in s.active_of(Faction::Enemy) {
        alert(s, enemy, &knowledge);
    }
}

/// Alert enemies within `radius` of a noise at `origin`.
pub fn alert_nearby(s: &mut Session, origin: TilePos, radius: f64, heard: &[(ActorId, TilePos)]) {
    for enemy in s.active_of(Faction::Enemy) {
        if s.position(enemy).is_some_and(|p| p.distance_to(&origin) <= radius) {
            alert(s, enemy, heard);
        }
    }
}

/// Flip the mission alarm. Monotonic: later calls do nothing.
pub fn raise_alarm(s: &mut Session, by: Option<ActorId>) {
    if s.mission.alarm == AlarmState::Alerted {
        return;
    }
    s.mission.alarm = AlarmState::Alerted;
    s.mission.record(TriggerEvent::AlarmRaised);
    info!(by = ?by, tick = s.tick(), "alarm raised");
    s.emit(SimEvent::AlarmRaised { by });
}
