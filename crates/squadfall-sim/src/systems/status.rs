//! Status effect timers and the officer command aura.

use tracing::debug;

use squadfall_core::components::*;
use squadfall_core::constants::{OFFICER_AURA_ACCURACY_MULT, OFFICER_AURA_RADIUS};
use squadfall_core::enums::*;
use squadfall_core::types::{ActorId, TilePos};

use crate::session::Session;

pub fn run(s: &mut Session) {
    for id in s.actor_ids() {
        if !s.is_alive(id) {
            continue;
        }
        let expired = s
            .update::<StatusEffects, _>(id, |fx| fx.tick())
            .unwrap_or_default();
        if expired.contains(&EffectKind::KnockedDown) {
            s.update::<Behavior, _>(id, |b| {
                if b.state == BehaviorState::Down {
                    b.state = BehaviorState::Idle;
                    b.order = Order::None;
                }
            });
            debug!(actor = %id, "back on feet");
        }
    }
    officer_aura(s);
}

/// Living officers buff allies within the aura radius. The modifier is
/// keyed by the officer's id so leaving the radius or the officer's death
/// removes exactly that officer's contribution.
fn officer_aura(s: &mut Session) {
    let officers: Vec<(ActorId, TilePos)> = s
        .active_of(Faction::Enemy)
        .into_iter()
        .filter(|id| {
            s.read::<EnemyBrain>(*id)
                .is_some_and(|b| b.role == EnemyRole::Officer)
        })
        .filter_map(|id| s.position(id).map(|p| (id, p)))
        .collect();
    if officers.is_empty() {
        return;
    }

    for ally in s.active_of(Faction::Enemy) {
        let Some(pos) = s.position(ally) else {
            continue;
        };
        for &(officer, at) in &officers {
            if officer == ally {
                continue;
            }
            let source = ModifierSource::Actor(officer);
            let in_range = pos.distance_to(&at) <= OFFICER_AURA_RADIUS;
            s.update::<StatusEffects, _>(ally, |fx| {
                if in_range {
                    fx.apply(StatusEffect {
                        kind: EffectKind::CommandAura,
                        source,
                        remaining_ticks: None,
                        modifiers: vec![StatModifier {
                            stat: ModifiedStat::Accuracy,
                            factor: OFFICER_AURA_ACCURACY_MULT,
                        }],
                    });
                } else {
                    fx.remove(EffectKind::CommandAura, source);
                }
            });
        }
    }
}
