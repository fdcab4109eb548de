//! Order validation and issuing.
//!
//! Player commands and AI decisions both become an `Intent` and go through
//! `issue`, so both are held to the same rules. Every accepted order
//! supersedes the actor's current movement, channel and overwatch.

use tracing::debug;

use squadfall_core::commands::Command;
use squadfall_core::components::*;
use squadfall_core::constants::{INTERACT_REACH, OVERWATCH_DEFAULT_SHOTS};
use squadfall_core::enums::*;
use squadfall_core::error::{AttackBlock, CommandError};
use squadfall_core::events::SimEvent;
use squadfall_core::types::{ActorId, Direction8, TilePos};
use squadfall_map::path::find_path;

use crate::mission_state::InteractableStatus;
use crate::resolver::check_shot;
use crate::session::Session;
use crate::systems::{extraction, overwatch, phase};

/// A unit order after it has been decoded from a command or AI decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Move(TilePos),
    /// Move flagged as a retreat.
    Retreat(TilePos),
    Attack(ActorId),
    Interact(String),
    Overwatch(Option<Direction8>),
    Suppress(SuppressTarget),
    Stop,
    Extract,
}

/// Apply one non-clock player command.
pub fn apply_player(s: &mut Session, command: Command) -> Result<(), CommandError> {
    let current = s.mission.phase;
    let (actor, intent) = match command {
        Command::ConfirmDeployment => {
            if current != MissionPhase::Setup {
                return Err(CommandError::WrongPhase(current));
            }
            let next = if s.mission.negotiation {
                MissionPhase::Negotiation
            } else {
                MissionPhase::Contact
            };
            return phase::advance(s, next);
        }
        Command::EndNegotiation => {
            if current != MissionPhase::Negotiation {
                return Err(CommandError::WrongPhase(current));
            }
            return phase::advance(s, MissionPhase::Contact);
        }
        Command::InitiateRetreat => return extraction::initiate_retreat(s),
        Command::CancelRetreat => return extraction::cancel_retreat(s),
        // Clock control is handled by the engine before queueing.
        Command::Pause | Command::Resume => return Ok(()),
        Command::Move { actor, to } => (actor, Intent::Move(to)),
        Command::Attack { actor, target } => (actor, Intent::Attack(target)),
        Command::Interact { actor, object_id } => (actor, Intent::Interact(object_id)),
        Command::EnterOverwatch { actor, facing } => (actor, Intent::Overwatch(facing)),
        Command::SuppressiveFire { actor, target } => (actor, Intent::Suppress(target)),
        Command::Stop { actor } => (actor, Intent::Stop),
        Command::Extract { actor } => (actor, Intent::Extract),
    };

    match s.faction(actor) {
        None => return Err(CommandError::UnknownActor(actor)),
        Some(Faction::Enemy) => return Err(CommandError::NotControllable(actor)),
        Some(Faction::Crew) => {}
    }
    if !current.is_live() {
        return Err(CommandError::WrongPhase(current));
    }
    issue(s, actor, intent)
}

/// The actor exists, is alive, on the map and able to act.
pub fn validate_actor(s: &Session, actor: ActorId) -> Result<(), CommandError> {
    if s.entity(actor).is_none() {
        return Err(CommandError::UnknownActor(actor));
    }
    if !s.is_alive(actor) {
        return Err(CommandError::ActorDead(actor));
    }
    if s.is_extracted(actor) {
        return Err(CommandError::ActorExtracted(actor));
    }
    if s.read::<Behavior>(actor).is_some_and(|b| b.state == BehaviorState::Down) {
        return Err(CommandError::ActorDown(actor));
    }
    Ok(())
}

/// Resolve a hostile, targetable actor to its tile.
fn validate_target(s: &Session, actor: ActorId, target: ActorId) -> Result<TilePos, TargetError> {
    let Some(target_faction) = s.faction(target) else {
        return Err(TargetError::Unknown);
    };
    let hostile = s
        .faction(actor)
        .is_some_and(|f| f.is_hostile_to(target_faction));
    if !hostile {
        return Err(TargetError::Blocked(AttackBlock::NotHostile));
    }
    if !s.is_active(target) {
        return Err(TargetError::Blocked(AttackBlock::TargetDown));
    }
    s.position(target).ok_or(TargetError::Unknown)
}

enum TargetError {
    Unknown,
    Blocked(AttackBlock),
}

/// Validate and apply a unit order.
pub fn issue(s: &mut Session, actor: ActorId, intent: Intent) -> Result<(), CommandError> {
    if intent == Intent::Extract {
        return extraction::extract(s, actor);
    }
    validate_actor(s, actor)?;
    let pos = s.position(actor).ok_or(CommandError::UnknownActor(actor))?;
    let weapon = s.read::<Weapon>(actor);

    match intent {
        Intent::Move(to) | Intent::Retreat(to) => {
            let retreating = matches!(intent, Intent::Retreat(_));
            if !s.grid.is_walkable(to) {
                return Err(CommandError::NotWalkable(to));
            }
            let path = if to == pos {
                Vec::new()
            } else {
                find_path(&s.grid, pos, to, |_| false)
                    .ok_or(CommandError::NoPath { from: pos, to })?
            };
            supersede(s, actor);
            if !path.is_empty() {
                let state = if retreating {
                    BehaviorState::Retreating
                } else {
                    BehaviorState::Moving
                };
                set_behavior(
                    s,
                    actor,
                    state,
                    Order::Move {
                        destination: to,
                        path,
                        blocked_ticks: 0,
                        retreating,
                    },
                );
            }
        }
        Intent::Attack(target) => {
            let target_pos = validate_target(s, actor, target).map_err(|e| match e {
                TargetError::Unknown => CommandError::UnknownActor(target),
                TargetError::Blocked(reason) => CommandError::CannotAttack { target, reason },
            })?;
            let weapon = weapon.ok_or(CommandError::NoAmmo(actor))?;
            if !weapon.has_ammo() {
                return Err(CommandError::NoAmmo(actor));
            }
            check_shot(&s.grid, pos, target_pos, weapon.range)
                .map_err(|reason| CommandError::CannotAttack { target, reason })?;
            supersede(s, actor);
            set_behavior(s, actor, BehaviorState::Attacking, Order::Attack { target });
        }
        Intent::Suppress(target) => {
            let tile = match target {
                SuppressTarget::Tile(tile) => tile,
                SuppressTarget::Actor(id) => match validate_target(s, actor, id) {
                    Ok(tile) => tile,
                    Err(TargetError::Unknown) => return Err(CommandError::UnknownActor(id)),
                    Err(TargetError::Blocked(reason)) => {
                        let at = s.position(id).unwrap_or(pos);
                        return Err(CommandError::CannotSuppress(at, reason));
                    }
                },
            };
            let weapon = weapon.ok_or(CommandError::NoAmmo(actor))?;
            if weapon.is_reloading() {
                return Err(CommandError::Reloading(actor));
            }
            if !weapon.has_ammo() {
                return Err(CommandError::NoAmmo(actor));
            }
            check_shot(&s.grid, pos, tile, weapon.range)
                .map_err(|reason| CommandError::CannotSuppress(tile, reason))?;
            supersede(s, actor);
            set_behavior(s, actor, BehaviorState::Attacking, Order::Suppress { target });
        }
        Intent::Overwatch(facing) => {
            let suppressed = s
                .read::<StatusEffects>(actor)
                .is_some_and(|fx| fx.has(EffectKind::Suppressed));
            if suppressed {
                return Err(CommandError::Suppressed(actor));
            }
            if s.read::<Channel>(actor).is_some() {
                return Err(CommandError::Channeling(actor));
            }
            let weapon = weapon.ok_or(CommandError::NoAmmo(actor))?;
            if weapon.is_reloading() {
                return Err(CommandError::Reloading(actor));
            }
            if !weapon.has_ammo() {
                return Err(CommandError::NoAmmo(actor));
            }
            supersede(s, actor);
            let tick = s.tick();
            s.update::<OverwatchState, _>(actor, |ow| {
                *ow = OverwatchState {
                    active: true,
                    facing,
                    shots_remaining: OVERWATCH_DEFAULT_SHOTS,
                    since_tick: tick,
                };
            });
            s.emit(SimEvent::OverwatchEntered { actor });
            debug!(actor = %actor, ?facing, "overwatch entered");
        }
        Intent::Interact(object_id) => {
            if s.read::<Channel>(actor).is_some() {
                return Err(CommandError::Channeling(actor));
            }
            let object = s
                .mission
                .interactables
                .get(&object_id)
                .ok_or_else(|| CommandError::UnknownObject(object_id.clone()))?;
            let claimed_elsewhere = object.claimed_by.is_some_and(|c| c != actor);
            if object.status != InteractableStatus::Available || claimed_elsewhere {
                return Err(CommandError::ObjectUnavailable(object_id));
            }
            if pos.chebyshev_to(&object.position) > INTERACT_REACH {
                return Err(CommandError::OutOfReach(object_id));
            }
            let required = object.channel_ticks();
            supersede(s, actor);
            if let Some(object) = s.mission.interactables.get_mut(&object_id) {
                object.claimed_by = Some(actor);
            }
            s.insert(
                actor,
                Channel {
                    object_id: object_id.clone(),
                    progress: 0,
                    required,
                },
            );
            set_behavior(s, actor, BehaviorState::Channeling, Order::Interact { object_id });
        }
        Intent::Stop => supersede(s, actor),
        Intent::Extract => return extraction::extract(s, actor),
    }
    Ok(())
}

fn set_behavior(s: &Session, actor: ActorId, state: BehaviorState, order: Order) {
    s.update::<Behavior, _>(actor, |b| {
        b.state = state;
        b.order = order;
    });
}

/// Clear the actor's order and end its overwatch and channel.
pub fn supersede(s: &mut Session, actor: ActorId) {
    overwatch::end(s, actor);
    interrupt_channel(s, actor);
    clear_order(s, actor);
}

/// Drop the current order, returning an acting actor to `Idle`.
pub fn clear_order(s: &Session, actor: ActorId) {
    s.update::<Behavior, _>(actor, |b| {
        b.order = Order::None;
        if !matches!(b.state, BehaviorState::Down | BehaviorState::Dead) {
            b.state = BehaviorState::Idle;
        }
    });
}

/// Abort a channel in progress and release the object it was working on.
pub fn interrupt_channel(s: &mut Session, actor: ActorId) {
    let Some(channel) = s.remove::<Channel>(actor) else {
        return;
    };
    if let Some(object) = s.mission.interactables.get_mut(&channel.object_id) {
        if object.claimed_by == Some(actor) {
            object.claimed_by = None;
        }
    }
    clear_order(s, actor);
    debug!(actor = %actor, object = %channel.object_id, "channel interrupted");
    s.emit(SimEvent::ChannelInterrupted {
        actor,
        object_id: channel.object_id,
    });
}
