//! Attack resolution: weapon timers, standing attack and suppress orders,
//! single shots, damage, knockdown and death.

use rand::Rng;
use tracing::{debug, info};

use squadfall_core::components::*;
use squadfall_core::constants::*;
use squadfall_core::enums::*;
use squadfall_core::events::SimEvent;
use squadfall_core::types::{ActorId, TilePos};
use squadfall_map::los::can_see;

use crate::mission_state::InteractableStatus;
use crate::resolver::{calculate_damage, check_shot, hit_chance};
use crate::session::Session;
use crate::systems::{orders, perception, suppression};

/// Which accuracy scaling a shot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Aimed,
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotResult {
    pub hit: bool,
    pub damage: i32,
}

/// Advance cooldowns and reloads; start a reload when a magazine runs dry.
pub fn tick_weapons(s: &mut Session) {
    for (_entity, (weapon, health)) in s.world.query_mut::<(&mut Weapon, &Health)>() {
        if !health.is_alive() {
            continue;
        }
        weapon.tick();
        if weapon.magazine == 0 && weapon.reserve > 0 && !weapon.is_reloading() {
            weapon.start_reload(RELOAD_TICKS);
        }
    }
}

/// Fire standing attack and suppress orders.
pub fn run(s: &mut Session) {
    if s.config.crew_auto_engage && s.mission.alarm == AlarmState::Alerted {
        auto_engage(s);
    }

    for id in s.actor_ids() {
        if !s.is_active(id) {
            continue;
        }
        let Some(behavior) = s.read::<Behavior>(id) else {
            continue;
        };
        if behavior.state == BehaviorState::Down {
            continue;
        }
        match behavior.order {
            Order::Attack { target } => continue_attack(s, id, target),
            Order::Suppress { target } => continue_suppress(s, id, target),
            _ => {}
        }
    }
}

/// Idle crew return fire on the nearest visible enemy in range.
fn auto_engage(s: &mut Session) {
    let enemies: Vec<(ActorId, TilePos)> = s
        .active_of(Faction::Enemy)
        .into_iter()
        .filter_map(|id| s.position(id).map(|p| (id, p)))
        .collect();

    for crew in s.active_of(Faction::Crew) {
        let idle = s
            .read::<Behavior>(crew)
            .is_some_and(|b| b.state == BehaviorState::Idle && b.order == Order::None);
        let watching = s.read::<OverwatchState>(crew).is_some_and(|o| o.active);
        if !idle || watching || s.read::<Channel>(crew).is_some() {
            continue;
        }
        let (Some(pos), Some(weapon), Some(vision)) = (
            s.position(crew),
            s.read::<Weapon>(crew),
            s.read::<Vision>(crew),
        ) else {
            continue;
        };
        if !weapon.has_ammo() {
            continue;
        }
        let reach = weapon.range.min(vision.range);
        let target = enemies
            .iter()
            .filter(|(_, epos)| can_see(&s.grid, pos, *epos, reach))
            .min_by(|a, b| pos.distance_to(&a.1).total_cmp(&pos.distance_to(&b.1)))
            .map(|(id, _)| *id);
        if let Some(target) = target {
            debug!(crew = %crew, target = %target, "auto-engage");
            s.update::<Behavior, _>(crew, |b| {
                b.state = BehaviorState::Attacking;
                b.order = Order::Attack { target };
            });
        }
    }
}

fn continue_attack(s: &mut Session, id: ActorId, target: ActorId) {
    let (Some(pos), Some(weapon)) = (s.position(id), s.read::<Weapon>(id)) else {
        return;
    };
    let hostile = match (s.faction(id), s.faction(target)) {
        (Some(a), Some(b)) => a.is_hostile_to(b),
        _ => false,
    };
    let valid = hostile
        && s.is_active(target)
        && s
            .position(target)
            .is_some_and(|tpos| check_shot(&s.grid, pos, tpos, weapon.range).is_ok());

    if !valid || !weapon.has_ammo() {
        debug!(actor = %id, target = %target, "attack order ended");
        orders::clear_order(s, id);
        return;
    }
    if weapon.ready_to_fire() {
        fire_shot(s, id, target, ShotKind::Aimed);
    }
}

fn continue_suppress(s: &mut Session, id: ActorId, target: SuppressTarget) {
    let (Some(pos), Some(weapon)) = (s.position(id), s.read::<Weapon>(id)) else {
        return;
    };
    let aim = match target {
        SuppressTarget::Tile(tile) => Some(tile),
        SuppressTarget::Actor(t) if s.is_active(t) => s.position(t),
        SuppressTarget::Actor(_) => None,
    };
    let Some(aim) = aim else {
        orders::clear_order(s, id);
        return;
    };
    if !weapon.has_ammo() || check_shot(&s.grid, pos, aim, weapon.range).is_err() {
        orders::clear_order(s, id);
        return;
    }
    if !weapon.ready_to_fire() {
        return;
    }
    suppression::fire_burst(s, id, target, aim);
    orders::clear_order(s, id);
}

/// Resolve one aimed or reaction shot, spending one round.
pub fn fire_shot(s: &mut Session, shooter: ActorId, target: ActorId, kind: ShotKind) -> Option<ShotResult> {
    let from = s.position(shooter)?;
    let to = s.position(target)?;
    let weapon = s.read::<Weapon>(shooter)?;
    let effects = s.read::<StatusEffects>(shooter).unwrap_or_default();
    let armor = s.read::<Armor>(target).map(|a| a.class).unwrap_or_default();

    let accuracy_mult = match kind {
        ShotKind::Aimed => effects.multiplier(ModifiedStat::Accuracy),
        ShotKind::Reaction => {
            OVERWATCH_REACTION_ACCURACY * effects.multiplier(ModifiedStat::OverwatchAccuracy)
        }
    };
    let chance = hit_chance(&s.grid, from, to, weapon.accuracy, weapon.range, accuracy_mult);
    let hit = s.rng.gen::<f64>() < chance;
    let damage = if hit {
        calculate_damage(weapon.damage, armor)
    } else {
        0
    };

    s.update::<Weapon, _>(shooter, |w| w.consume(1));
    s.update::<CombatStats, _>(shooter, |stats| {
        stats.shots_fired += 1;
        stats.rounds_spent += 1;
        if hit {
            stats.shots_hit += 1;
            stats.damage_dealt += damage as u32;
        }
    });
    debug!(
        shooter = %shooter,
        target = %target,
        ?kind,
        chance,
        hit,
        damage,
        "shot resolved"
    );
    if kind == ShotKind::Aimed {
        s.emit(SimEvent::AttackResolved {
            attacker: shooter,
            target,
            hit,
            damage,
        });
    }

    if hit {
        apply_damage(s, target, damage, Some(shooter));
    }
    note_attacker(s, target, shooter);
    gunfire_noise(s, shooter, from);
    Some(ShotResult { hit, damage })
}

/// Remember who shot at an enemy and alert it to the shooter.
pub fn note_attacker(s: &mut Session, target: ActorId, shooter: ActorId) {
    if s.faction(target) != Some(Faction::Enemy) || !s.is_active(target) {
        return;
    }
    s.update::<EnemyBrain, _>(target, |brain| brain.last_attacker = Some(shooter));
    let heard: Vec<(ActorId, TilePos)> = s.position(shooter).map(|p| (shooter, p)).into_iter().collect();
    perception::alert(s, target, &heard);
}

/// Every shot alerts enemies within earshot of the shooter.
pub fn gunfire_noise(s: &mut Session, shooter: ActorId, origin: TilePos) {
    let heard = if s.faction(shooter) == Some(Faction::Crew) {
        vec![(shooter, origin)]
    } else {
        Vec::new()
    };
    perception::alert_nearby(s, origin, GUNFIRE_NOISE_RADIUS, &heard);
}

/// Apply damage after armor, handling knockdown and death.
pub fn apply_damage(s: &mut Session, target: ActorId, amount: i32, source: Option<ActorId>) {
    let Some(removed) = s.update::<Health, _>(target, |h| h.apply_damage(amount)) else {
        return;
    };
    let Some(health) = s.read::<Health>(target) else {
        return;
    };
    debug_assert!(health.current >= 0 && health.current <= health.max);

    if !health.is_alive() {
        kill(s, target, source);
        return;
    }
    let threshold = ((health.max as f64 * s.config.knockdown_fraction).ceil() as i32).max(1);
    if removed >= threshold {
        knock_down(s, target);
    } else if s.config.damage_interrupts_channel {
        orders::interrupt_channel(s, target);
    }
}

fn knock_down(s: &mut Session, id: ActorId) {
    orders::supersede(s, id);
    s.update::<Behavior, _>(id, |b| {
        b.state = BehaviorState::Down;
        b.order = Order::None;
    });
    s.update::<StatusEffects, _>(id, |fx| {
        fx.apply(StatusEffect {
            kind: EffectKind::KnockedDown,
            source: ModifierSource::Mission,
            remaining_ticks: Some(KNOCKDOWN_TICKS),
            modifiers: Vec::new(),
        });
    });
    debug!(actor = %id, "knocked down");
    s.emit(SimEvent::UnitKnockedDown { actor: id });
}

/// Transition an actor to `Dead`. The entity stays in the world for the
/// outcome report but leaves targeting and collision. HP is forced to 0 so
/// `Dead` and an empty health pool always agree.
pub fn kill(s: &mut Session, id: ActorId, killer: Option<ActorId>) {
    s.update::<Health, _>(id, |h| h.current = 0);
    debug_assert!(!s.is_alive(id));
    orders::supersede(s, id);
    s.update::<Behavior, _>(id, |b| {
        b.state = BehaviorState::Dead;
        b.order = Order::None;
    });
    s.remove::<DetectionRecord>(id);
    s.update::<StatusEffects, _>(id, |fx| fx.effects.clear());
    if let Some(killer) = killer {
        s.update::<CombatStats, _>(killer, |stats| stats.kills += 1);
    }

    if let Some(carrying) = s.remove::<Carrying>(id) {
        let at = s.position(id);
        for item in carrying.items {
            if let Some(object) = s.mission.interactables.get_mut(&item) {
                object.status = InteractableStatus::Available;
                if let Some(at) = at {
                    object.position = at;
                }
            }
        }
        s.insert(id, Carrying::default());
    }

    let is_officer = s
        .read::<EnemyBrain>(id)
        .is_some_and(|b| b.role == EnemyRole::Officer);
    if is_officer {
        for other in s.actor_ids() {
            s.update::<StatusEffects, _>(other, |fx| {
                fx.remove(EffectKind::CommandAura, ModifierSource::Actor(id))
            });
        }
    }

    info!(actor = %id, killer = ?killer, "unit died");
    s.emit(SimEvent::UnitDied { actor: id, killer });
}
