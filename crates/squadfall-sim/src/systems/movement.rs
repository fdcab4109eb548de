//! Tile-to-tile movement along planned paths.
//!
//! Each tick a moving actor gains `speed * MoveSpeed multiplier * dt` of
//! progress and spends it on steps (1 per orthogonal step, sqrt 2 per
//! diagonal). Every completed step checks hostile overwatch before the
//! next one. An occupied tile holds the mover; after a short wait it
//! re-paths around occupied tiles or gives up.

use tracing::debug;

use squadfall_core::components::*;
use squadfall_core::constants::{BLOCKED_REPATH_TICKS, DIAGONAL_STEP_COST, DT};
use squadfall_core::enums::*;
use squadfall_core::types::{ActorId, TilePos};
use squadfall_map::path::find_path;

use crate::session::Session;
use crate::systems::{orders, overwatch};

/// Advance every actor with a move order.
pub fn run(s: &mut Session) {
    for id in s.actor_ids() {
        if !s.is_active(id) {
            continue;
        }
        let moving = s.read::<Behavior>(id).is_some_and(|b| {
            b.state != BehaviorState::Down && matches!(b.order, Order::Move { .. })
        });
        if moving {
            advance(s, id);
        }
    }
}

fn step_cost(from: TilePos, to: TilePos) -> f64 {
    if from.x != to.x && from.y != to.y {
        DIAGONAL_STEP_COST
    } else {
        1.0
    }
}

fn occupied_by_other(s: &Session, pos: TilePos, id: ActorId) -> bool {
    s.occupancy().get(&pos).is_some_and(|other| *other != id)
}

fn advance(s: &mut Session, id: ActorId) {
    let Some(mobility) = s.read::<Mobility>(id) else {
        return;
    };
    let effects = s.read::<StatusEffects>(id).unwrap_or_default();
    let speed = mobility.speed * effects.multiplier(ModifiedStat::MoveSpeed);
    let mut progress = mobility.progress + speed * DT;

    loop {
        let Some(Order::Move {
            destination,
            path,
            blocked_ticks,
            ..
        }) = s.read::<Behavior>(id).map(|b| b.order)
        else {
            break;
        };
        let Some(pos) = s.position(id) else {
            break;
        };
        let Some(&next) = path.first() else {
            orders::clear_order(s, id);
            progress = 0.0;
            break;
        };

        let cost = step_cost(pos, next);
        if progress < cost {
            break;
        }
        if !s.grid.is_walkable(next) || occupied_by_other(s, next, id) {
            progress = if blocked(s, id, pos, destination, blocked_ticks + 1) {
                progress.min(cost)
            } else {
                0.0
            };
            break;
        }

        progress -= cost;
        s.update::<TilePos, _>(id, |p| *p = next);
        s.update::<Behavior, _>(id, |b| {
            if let Order::Move {
                path,
                blocked_ticks,
                ..
            } = &mut b.order
            {
                path.remove(0);
                *blocked_ticks = 0;
            }
        });

        if !overwatch::react(s, id) {
            // Dead or knocked down mid-path.
            s.update::<Mobility, _>(id, |m| m.progress = 0.0);
            return;
        }
        if path.len() == 1 {
            debug!(actor = %id, at = ?next, "arrived");
            orders::clear_order(s, id);
            progress = 0.0;
            break;
        }
    }

    s.update::<Mobility, _>(id, |m| m.progress = progress);
}

/// Count a blocked tick, re-planning or giving up once the wait runs out.
/// Returns `false` if the move was abandoned.
fn blocked(s: &mut Session, id: ActorId, pos: TilePos, destination: TilePos, waited: u32) -> bool {
    if waited < BLOCKED_REPATH_TICKS {
        s.update::<Behavior, _>(id, |b| {
            if let Order::Move { blocked_ticks, .. } = &mut b.order {
                *blocked_ticks = waited;
            }
        });
        return true;
    }

    let occupancy = s.occupancy();
    let destination_taken = occupancy.get(&destination).is_some_and(|other| *other != id);
    let path = if destination_taken {
        None
    } else {
        find_path(&s.grid, pos, destination, |p| {
            occupancy.get(&p).is_some_and(|other| *other != id)
        })
    };

    match path {
        Some(path) if !path.is_empty() => {
            debug!(actor = %id, ?destination, steps = path.len(), "re-pathed around blocker");
            s.update::<Behavior, _>(id, |b| {
                if let Order::Move {
                    path: current,
                    blocked_ticks,
                    ..
                } = &mut b.order
                {
                    *current = path;
                    *blocked_ticks = 0;
                }
            });
            true
        }
        _ => {
            debug!(actor = %id, ?destination, "move abandoned, path blocked");
            orders::clear_order(s, id);
            false
        }
    }
}
