//! Overwatch reaction fire.
//!
//! A watcher fires once at every hostile step that lands inside its zone
//! (range, cone, LOS), spending one of its finite shots. The watch ends
//! exactly once, when the last shot is spent or an order supersedes it.
//! Suppression only scales reaction accuracy; it never ends a watch.

use tracing::debug;

use squadfall_ai::context::OverwatchZone;
use squadfall_core::components::{Behavior, OverwatchState, Weapon};
use squadfall_core::enums::BehaviorState;
use squadfall_core::events::SimEvent;
use squadfall_core::types::ActorId;

use crate::session::Session;
use crate::systems::combat::{self, ShotKind};

/// The area an active watcher covers.
pub fn zone_of(s: &Session, id: ActorId) -> Option<OverwatchZone> {
    let watch = s.read::<OverwatchState>(id)?;
    if !watch.active {
        return None;
    }
    Some(OverwatchZone {
        origin: s.position(id)?,
        range: s.read::<Weapon>(id)?.range,
        facing: watch.facing,
    })
}

/// End an active watch. Returns whether one was active.
pub fn end(s: &mut Session, id: ActorId) -> bool {
    let was_active = s
        .update::<OverwatchState, _>(id, |ow| std::mem::replace(&mut ow.active, false))
        .unwrap_or(false);
    if was_active {
        debug!(actor = %id, "overwatch ended");
        s.emit(SimEvent::OverwatchEnded { actor: id });
    }
    was_active
}

/// Fire every qualifying watcher at `mover`, which just entered a new tile.
///
/// Returns `false` once the mover is dead or knocked down, at which point
/// the remaining watchers hold their fire.
pub fn react(s: &mut Session, mover: ActorId) -> bool {
    let (Some(pos), Some(mover_faction)) = (s.position(mover), s.faction(mover)) else {
        return false;
    };

    for watcher in s.actor_ids() {
        if watcher == mover || !s.is_active(watcher) {
            continue;
        }
        if !s.faction(watcher).is_some_and(|f| f.is_hostile_to(mover_faction)) {
            continue;
        }
        if s.read::<Behavior>(watcher).is_some_and(|b| b.state == BehaviorState::Down) {
            continue;
        }
        let Some(zone) = zone_of(s, watcher) else {
            continue;
        };
        let armed = s
            .read::<Weapon>(watcher)
            .is_some_and(|w| !w.is_reloading() && w.magazine > 0);
        if !armed || !zone.covers(&s.grid, pos) {
            continue;
        }

        let Some(shot) = combat::fire_shot(s, watcher, mover, ShotKind::Reaction) else {
            continue;
        };
        let shots_remaining = s
            .update::<OverwatchState, _>(watcher, |ow| {
                ow.shots_remaining = ow.shots_remaining.saturating_sub(1);
                ow.shots_remaining
            })
            .unwrap_or(0);
        s.emit(SimEvent::ReactionFired {
            shooter: watcher,
            target: mover,
            hit: shot.hit,
            damage: shot.damage,
            shots_remaining,
        });
        if shots_remaining == 0 {
            end(s, watcher);
        }

        let mover_standing = s.is_active(mover)
            && s.read::<Behavior>(mover).is_some_and(|b| b.state != BehaviorState::Down);
        if !mover_standing {
            return false;
        }
    }
    true
}
