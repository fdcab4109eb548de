//! Per-role decision policies.
//!
//! `decide` is the single entry point. Retreat is checked first for every
//! role; after that a role-specific policy picks one `Decision`. The
//! simulation validates and applies the decision, so a policy may return
//! something the engine later refuses.

use rand::{Rng, RngCore};

use squadfall_core::enums::{CoverLevel, EnemyRole};
use squadfall_core::types::{ActorId, Direction8, TilePos};
use squadfall_map::cover::cover_against;

use crate::context::{ActorSnapshot, DecisionContext};
use crate::profiles::{get_profile, RoleProfile};
use crate::scoring::{
    approach_position, best_position, position_score, retreat_position, select_target,
};

/// Minimum score gain before a repositioning move is worth it.
const REPOSITION_MARGIN: f64 = 0.15;

/// What an enemy wants to do this think step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Hold,
    MoveTo(TilePos),
    Attack(ActorId),
    Suppress(ActorId),
    Overwatch(Option<Direction8>),
    Retreat(TilePos),
}

type Policy = fn(&DecisionContext<'_>, &RoleProfile, &mut dyn RngCore) -> Decision;

fn policy_for(role: EnemyRole) -> Policy {
    match role {
        EnemyRole::Guard => guard,
        EnemyRole::Flanker => flanker,
        EnemyRole::Suppressor => suppressor,
        EnemyRole::Heavy => heavy,
        EnemyRole::Officer => officer,
        EnemyRole::Boss => boss,
    }
}

/// Choose an action for the enemy described by `ctx`.
pub fn decide(ctx: &DecisionContext<'_>, rng: &mut dyn RngCore) -> Decision {
    let profile = get_profile(ctx.role);

    if ctx.me.hp_fraction() <= profile.retreat_threshold {
        if let Some(to) = retreat_position(ctx) {
            return Decision::Retreat(to);
        }
    }

    if ctx.known_crew.is_empty() {
        return Decision::Hold;
    }

    policy_for(ctx.role)(ctx, &profile, rng)
}

fn target_in_cover(ctx: &DecisionContext<'_>, target: &ActorSnapshot) -> bool {
    cover_against(ctx.grid, target.pos, ctx.me.pos) >= CoverLevel::Half
}

fn wants_suppress(
    ctx: &DecisionContext<'_>,
    target: &ActorSnapshot,
    chance: f64,
    rng: &mut dyn RngCore,
) -> bool {
    ctx.me.can_suppress && target_in_cover(ctx, target) && rng.gen::<f64>() < chance
}

fn facing_toward(ctx: &DecisionContext<'_>, pos: TilePos) -> Option<Direction8> {
    ctx.me.pos.direction_to(&pos)
}

/// Move to the best scored tile if it beats the current one by a margin.
fn reposition(
    ctx: &DecisionContext<'_>,
    profile: &RoleProfile,
    target: Option<&ActorSnapshot>,
) -> Option<TilePos> {
    let here = position_score(ctx, profile, ctx.me.pos, target);
    let (pos, score) = best_position(ctx, profile, target);
    (pos != ctx.me.pos && score > here + REPOSITION_MARGIN).then_some(pos)
}

fn guard(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, false) else {
        return Decision::Hold;
    };
    if ctx.can_engage(target) {
        if wants_suppress(ctx, target, profile.suppression_propensity, rng) {
            return Decision::Suppress(target.id);
        }
        return Decision::Attack(target.id);
    }
    if ctx.me.overwatch.is_none()
        && !ctx.me.suppressed
        && rng.gen::<f64>() < profile.overwatch_propensity
    {
        return Decision::Overwatch(facing_toward(ctx, target.pos));
    }
    match reposition(ctx, profile, Some(target)) {
        Some(pos) => Decision::MoveTo(pos),
        None => Decision::Hold,
    }
}

fn flanker(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, false) else {
        return Decision::Hold;
    };
    let engageable = ctx.can_engage(target);
    if engageable && !target_in_cover(ctx, target) {
        return Decision::Attack(target.id);
    }
    if let Some(pos) = reposition(ctx, profile, Some(target)) {
        return Decision::MoveTo(pos);
    }
    if engageable {
        if wants_suppress(ctx, target, profile.suppression_propensity, rng) {
            return Decision::Suppress(target.id);
        }
        return Decision::Attack(target.id);
    }
    approach_position(ctx, target.pos).map_or(Decision::Hold, Decision::MoveTo)
}

fn suppressor(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, true) else {
        return Decision::Hold;
    };
    if ctx.can_engage(target) {
        if ctx.me.can_suppress && rng.gen::<f64>() < profile.suppression_propensity {
            return Decision::Suppress(target.id);
        }
        return Decision::Attack(target.id);
    }
    if let Some(pos) = reposition(ctx, profile, Some(target)) {
        return Decision::MoveTo(pos);
    }
    approach_position(ctx, target.pos).map_or(Decision::Hold, Decision::MoveTo)
}

fn heavy(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, false) else {
        return Decision::Hold;
    };
    if ctx.can_engage(target) {
        if wants_suppress(ctx, target, profile.suppression_propensity, rng) {
            return Decision::Suppress(target.id);
        }
        return Decision::Attack(target.id);
    }
    approach_position(ctx, target.pos).map_or(Decision::Hold, Decision::MoveTo)
}

fn officer(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, false) else {
        return Decision::Hold;
    };
    if let Some(pos) = reposition(ctx, profile, Some(target)) {
        return Decision::MoveTo(pos);
    }
    if ctx.can_engage(target) {
        return Decision::Attack(target.id);
    }
    if ctx.me.overwatch.is_none()
        && !ctx.me.suppressed
        && rng.gen::<f64>() < profile.overwatch_propensity
    {
        return Decision::Overwatch(facing_toward(ctx, target.pos));
    }
    Decision::Hold
}

fn boss(ctx: &DecisionContext<'_>, profile: &RoleProfile, rng: &mut dyn RngCore) -> Decision {
    let Some(target) = select_target(ctx, false) else {
        return Decision::Hold;
    };
    if ctx.can_engage(target) {
        if wants_suppress(ctx, target, profile.suppression_propensity, rng) {
            return Decision::Suppress(target.id);
        }
        return Decision::Attack(target.id);
    }
    if let Some(pos) = reposition(ctx, profile, Some(target)) {
        return Decision::MoveTo(pos);
    }
    approach_position(ctx, target.pos).map_or(Decision::Hold, Decision::MoveTo)
}
