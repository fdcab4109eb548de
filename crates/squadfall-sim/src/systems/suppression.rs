//! Suppressive fire.
//!
//! A burst spends a block of ammunition for reduced damage. A direct hit
//! always pins the target; a miss pins it with a chance that falls off with
//! how far the burst landed. Hostiles near the aim point can be pinned too.
//! Pinning refreshes the `Suppressed` effect rather than stacking it.

use rand::Rng;
use tracing::debug;

use squadfall_core::components::*;
use squadfall_core::constants::*;
use squadfall_core::enums::*;
use squadfall_core::events::SimEvent;
use squadfall_core::types::{ActorId, TilePos};
use squadfall_map::los::has_line_of_sight;

use crate::resolver::{calculate_damage, hit_chance, near_miss_chance};
use crate::session::Session;
use crate::systems::combat;

/// Fire one burst at `aim`. `target` names the primary victim, if any.
pub fn fire_burst(s: &mut Session, shooter: ActorId, target: SuppressTarget, aim: TilePos) {
    let (Some(from), Some(weapon), Some(faction)) = (
        s.position(shooter),
        s.read::<Weapon>(shooter),
        s.faction(shooter),
    ) else {
        return;
    };
    let effects = s.read::<StatusEffects>(shooter).unwrap_or_default();
    let accuracy_mult = SUPPRESS_ACCURACY_MULT * effects.multiplier(ModifiedStat::Accuracy);

    let spent = s
        .update::<Weapon, _>(shooter, |w| w.consume(SUPPRESS_AMMO_COST))
        .unwrap_or(0);
    s.update::<CombatStats, _>(shooter, |stats| {
        stats.shots_fired += 1;
        stats.rounds_spent += spent;
    });
    s.emit(SimEvent::SuppressiveBurst { shooter, target });
    debug!(shooter = %shooter, ?aim, spent, "suppressive burst");

    let primary = match target {
        SuppressTarget::Actor(id) => Some(id),
        SuppressTarget::Tile(_) => None,
    };

    if let Some(victim) = primary {
        let chance = hit_chance(&s.grid, from, aim, weapon.accuracy, weapon.range, accuracy_mult);
        if s.rng.gen::<f64>() < chance {
            let armor = s.read::<Armor>(victim).map(|a| a.class).unwrap_or_default();
            let reduced = (weapon.damage as f64 * SUPPRESS_DAMAGE_MULT).round() as i32;
            let damage = calculate_damage(reduced, armor);
            s.update::<CombatStats, _>(shooter, |stats| {
                stats.shots_hit += 1;
                stats.damage_dealt += damage as u32;
            });
            apply_suppressed(s, victim, shooter, true);
            combat::apply_damage(s, victim, damage, Some(shooter));
        } else {
            let scatter = s.rng.gen_range(0..=SUPPRESS_SCATTER_MAX) as f64;
            if s.rng.gen::<f64>() < near_miss_chance(scatter) {
                apply_suppressed(s, victim, shooter, false);
            }
        }
        combat::note_attacker(s, victim, shooter);
    }

    // Splash: hostiles near the aim point with a clear line from it.
    for other in s.actor_ids() {
        if Some(other) == primary || !s.is_active(other) {
            continue;
        }
        if !s.faction(other).is_some_and(|f| f.is_hostile_to(faction)) {
            continue;
        }
        let Some(pos) = s.position(other) else {
            continue;
        };
        let distance = pos.distance_to(&aim);
        if distance > SUPPRESS_AREA_RADIUS || !has_line_of_sight(&s.grid, aim, pos) {
            continue;
        }
        if s.rng.gen::<f64>() < near_miss_chance(distance) {
            apply_suppressed(s, other, shooter, false);
        }
        combat::note_attacker(s, other, shooter);
    }

    combat::gunfire_noise(s, shooter, from);
}

/// Apply or refresh `Suppressed` on an active actor.
pub fn apply_suppressed(s: &mut Session, target: ActorId, source: ActorId, direct_hit: bool) {
    if !s.is_active(target) {
        return;
    }
    s.update::<StatusEffects, _>(target, |fx| {
        fx.apply(StatusEffect {
            kind: EffectKind::Suppressed,
            source: ModifierSource::Actor(source),
            remaining_ticks: Some(SUPPRESSED_DURATION_TICKS),
            modifiers: vec![
                StatModifier {
                    stat: ModifiedStat::Accuracy,
                    factor: SUPPRESSED_ACCURACY_MULT,
                },
                StatModifier {
                    stat: ModifiedStat::MoveSpeed,
                    factor: SUPPRESSED_SPEED_MULT,
                },
                StatModifier {
                    stat: ModifiedStat::OverwatchAccuracy,
                    factor: SUPPRESSED_OVERWATCH_MULT,
                },
            ],
        })
    });
    s.update::<SuppressionState, _>(target, |state| {
        state.last_suppressed_by = Some(source);
        state.times_suppressed += 1;
    });
    debug!(target = %target, source = %source, direct_hit, "suppressed");
    s.emit(SimEvent::SuppressionApplied {
        source,
        target,
        direct_hit,
    });
}
