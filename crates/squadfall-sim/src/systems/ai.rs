//! Enemy AI system.
//!
//! On each enemy's think tick, builds a plain-data `DecisionContext` from
//! the world, calls the role policy in `squadfall-ai`, and issues the
//! resulting order through the same validation as player commands.
//! Idle (undetecting) and knocked-down enemies are skipped.

use std::collections::BTreeSet;

use tracing::debug;

use squadfall_ai::context::{ActorSnapshot, DecisionContext, OverwatchZone};
use squadfall_ai::decision::{decide, Decision};
use squadfall_core::components::*;
use squadfall_core::constants::SUPPRESS_AMMO_COST;
use squadfall_core::enums::*;
use squadfall_core::types::ActorId;
use squadfall_map::grid::TileGrid;
use squadfall_map::los::can_see;

use crate::session::Session;
use crate::systems::orders::{self, Intent};
use crate::systems::overwatch;

pub fn run(s: &mut Session) {
    let tick = s.tick();
    let interval = s.config.think_interval_ticks.max(1);
    let crew_watch: Vec<OverwatchZone> = s
        .active_of(Faction::Crew)
        .into_iter()
        .filter_map(|id| overwatch::zone_of(s, id))
        .collect();

    for id in s.active_of(Faction::Enemy) {
        let (Some(brain), Some(record), Some(behavior)) = (
            s.read::<EnemyBrain>(id),
            s.read::<DetectionRecord>(id),
            s.read::<Behavior>(id),
        ) else {
            continue;
        };
        if tick < brain.next_think_tick
            || record.state == DetectionState::Idle
            || behavior.state == BehaviorState::Down
        {
            continue;
        }
        s.update::<EnemyBrain, _>(id, |b| b.next_think_tick = tick + interval);

        let Some(ctx) = build_context(s, &s.grid, id, &brain, &record, &crew_watch) else {
            continue;
        };
        let decision = decide(&ctx, &mut s.rng);
        debug!(enemy = %id, role = ?brain.role, ?decision, tick, "ai decision");
        apply(s, id, decision, &behavior);
    }
}

/// What the AI is allowed to know about one actor.
pub fn actor_snapshot(s: &Session, id: ActorId) -> Option<ActorSnapshot> {
    let identity = s.read::<Identity>(id)?;
    let health = s.read::<Health>(id)?;
    let weapon = s.read::<Weapon>(id)?;
    let effects = s.read::<StatusEffects>(id).unwrap_or_default();
    let attacking = match s.read::<Behavior>(id).map(|b| b.order) {
        Some(Order::Attack { target }) => Some(target),
        _ => None,
    };
    Some(ActorSnapshot {
        id,
        faction: identity.faction,
        pos: s.position(id)?,
        hp: health.current,
        max_hp: health.max,
        weapon_range: weapon.range,
        magazine: weapon.magazine,
        can_suppress: weapon.total_rounds() >= SUPPRESS_AMMO_COST,
        suppressed: effects.has(EffectKind::Suppressed),
        overwatch: overwatch::zone_of(s, id),
        attacking,
    })
}

fn build_context<'g>(
    s: &Session,
    grid: &'g TileGrid,
    id: ActorId,
    brain: &EnemyBrain,
    record: &DetectionRecord,
    crew_watch: &[OverwatchZone],
) -> Option<DecisionContext<'g>> {
    let me = actor_snapshot(s, id)?;
    let vision = s.read::<Vision>(id).map_or(0.0, |v| v.range);

    let mut known_crew = Vec::new();
    let mut visible = BTreeSet::new();
    for (&crew_id, &last_known) in &record.last_known {
        if !s.is_active(crew_id) {
            continue;
        }
        let Some(mut snapshot) = actor_snapshot(s, crew_id) else {
            continue;
        };
        if can_see(grid, me.pos, snapshot.pos, vision) {
            visible.insert(crew_id);
        } else {
            snapshot.pos = last_known;
        }
        known_crew.push(snapshot);
    }

    let allies = s
        .active_of(Faction::Enemy)
        .into_iter()
        .filter(|other| *other != id)
        .filter_map(|other| actor_snapshot(s, other))
        .collect();
    let occupied = s
        .occupancy()
        .into_iter()
        .filter(|(_, other)| *other != id)
        .map(|(pos, _)| pos)
        .collect();

    Some(DecisionContext {
        grid,
        me,
        role: brain.role,
        home: brain.home,
        known_crew,
        visible,
        allies,
        player_overwatch: crew_watch.to_vec(),
        occupied,
        last_attacker: brain.last_attacker,
    })
}

fn apply(s: &mut Session, id: ActorId, decision: Decision, behavior: &Behavior) {
    let moving_to = match &behavior.order {
        Order::Move { destination, .. } => Some(*destination),
        _ => None,
    };
    let intent = match decision {
        Decision::Hold => return,
        Decision::MoveTo(to) if moving_to == Some(to) => return,
        Decision::Retreat(to) if moving_to == Some(to) => return,
        Decision::Attack(target) if behavior.order == (Order::Attack { target }) => return,
        Decision::Overwatch(_) if overwatch::zone_of(s, id).is_some() => return,
        Decision::MoveTo(to) => Intent::Move(to),
        Decision::Retreat(to) => Intent::Retreat(to),
        Decision::Attack(target) => Intent::Attack(target),
        Decision::Suppress(target) => Intent::Suppress(SuppressTarget::Actor(target)),
        Decision::Overwatch(facing) => Intent::Overwatch(facing),
    };
    if let Err(err) = orders::issue(s, id, intent) {
        debug!(enemy = %id, %err, "ai order refused");
    }
}
