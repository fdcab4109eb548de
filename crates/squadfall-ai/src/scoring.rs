//! Pure scoring functions for target and position selection.
//!
//! Every function here is a deterministic function of its inputs. Ties are
//! broken by iteration order, which callers keep stable (actor id order for
//! targets, row-major order for tiles).

use glam::Vec2;

use squadfall_core::constants::{AI_CANDIDATE_RADIUS, AI_RETREAT_RADIUS};
use squadfall_core::types::TilePos;
use squadfall_map::cover::{average_cover_quality, cover_against};
use squadfall_map::los::has_line_of_sight;

use crate::context::{ActorSnapshot, DecisionContext, OverwatchZone};
use crate::profiles::RoleProfile;

/// Bonus for a target already in range and in sight.
const IN_RANGE_BONUS: f64 = 1.0;
/// Bonus for the actor that last hurt us or is shooting at us.
const THREAT_BONUS: f64 = 0.75;
/// Weight of missing HP on the target.
const WOUNDED_BONUS: f64 = 0.5;
/// Bonus for crew holding overwatch, used by suppressors.
const OVERWATCH_TARGET_BONUS: f64 = 0.6;
/// Per-tile cost of travelling to a candidate.
const TRAVEL_COST: f64 = 0.04;

fn to_vec(pos: TilePos) -> Vec2 {
    Vec2::new(pos.x as f32, pos.y as f32)
}

/// Score one crew member as a target. Higher is better.
pub fn target_score(ctx: &DecisionContext<'_>, target: &ActorSnapshot, prefer_overwatch: bool) -> f64 {
    let dist = ctx.me.pos.distance_to(&target.pos);
    let mut score = 1.0 / (1.0 + dist);
    if ctx.can_engage(target) {
        score += IN_RANGE_BONUS;
    }
    if ctx.last_attacker == Some(target.id) || target.attacking == Some(ctx.me.id) {
        score += THREAT_BONUS;
    }
    score += (1.0 - target.hp_fraction()).max(0.0) * WOUNDED_BONUS;
    if prefer_overwatch && target.overwatch.is_some() {
        score += OVERWATCH_TARGET_BONUS;
    }
    score
}

/// Pick the best known crew target. Earlier ids win ties.
pub fn select_target<'c>(ctx: &'c DecisionContext<'_>, prefer_overwatch: bool) -> Option<&'c ActorSnapshot> {
    let mut best: Option<(&ActorSnapshot, f64)> = None;
    for crew in &ctx.known_crew {
        let score = target_score(ctx, crew, prefer_overwatch);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((crew, score));
        }
    }
    best.map(|(c, _)| c)
}

/// How close `candidate` is to a 90° flank on `target`, relative to the
/// axis from `axis_origin` to the target. Zero without LOS to the target.
pub fn flank_score(
    ctx: &DecisionContext<'_>,
    candidate: TilePos,
    target: TilePos,
    axis_origin: Vec2,
) -> f64 {
    if candidate == target || !has_line_of_sight(ctx.grid, candidate, target) {
        return 0.0;
    }
    let t = to_vec(target);
    let axis = axis_origin - t;
    let approach = to_vec(candidate) - t;
    if axis.length_squared() < f32::EPSILON {
        return 0.0;
    }
    let angle = axis.angle_between(approach).abs().to_degrees() as f64;
    let angular = (1.0 - (angle - 90.0).abs() / 90.0).max(0.0);
    // A flank is worth more when the target has no cover facing it.
    let exposure = 1.0 - cover_against(ctx.grid, target, candidate).quality();
    angular * (0.5 + 0.5 * exposure)
}

/// Number of player overwatch zones covering `pos`.
pub fn overwatch_exposure(ctx: &DecisionContext<'_>, pos: TilePos) -> usize {
    ctx.player_overwatch
        .iter()
        .filter(|zone: &&OverwatchZone| zone.covers(ctx.grid, pos))
        .count()
}

/// Axis the flank angle is measured against: the centroid of allies
/// engaging `target`, else our own position.
pub fn engagement_axis(ctx: &DecisionContext<'_>, target: &ActorSnapshot) -> Vec2 {
    let engaged: Vec<Vec2> = ctx
        .allies
        .iter()
        .filter(|a| a.attacking == Some(target.id))
        .map(|a| to_vec(a.pos))
        .collect();
    if engaged.is_empty() {
        to_vec(ctx.me.pos)
    } else {
        engaged.iter().copied().sum::<Vec2>() / engaged.len() as f32
    }
}

/// Composite score of standing at `pos`.
pub fn position_score(
    ctx: &DecisionContext<'_>,
    profile: &RoleProfile,
    pos: TilePos,
    target: Option<&ActorSnapshot>,
) -> f64 {
    let threats = ctx.threat_positions();
    let mut score = average_cover_quality(ctx.grid, pos, &threats) * profile.cover_priority;

    if let Some(target) = target {
        if ctx.can_engage_from(pos, target) {
            score += profile.aggression;
        }
        let dist = pos.distance_to(&target.pos);
        score += profile.aggression * 0.5 / (1.0 + dist);
        if profile.flank_tendency > 0.0 {
            let axis = engagement_axis(ctx, target);
            score += flank_score(ctx, pos, target.pos, axis) * profile.flank_tendency;
        }
    }

    score -= overwatch_exposure(ctx, pos) as f64 * profile.overwatch_avoidance;
    score -= ctx.me.pos.distance_to(&pos) * TRAVEL_COST;
    score
}

fn is_candidate(ctx: &DecisionContext<'_>, pos: TilePos) -> bool {
    ctx.grid.is_walkable(pos) && (pos == ctx.me.pos || !ctx.occupied.contains(&pos))
}

/// Walkable, unoccupied tiles within `radius` of `center`, row-major.
pub fn candidate_tiles(ctx: &DecisionContext<'_>, center: TilePos, radius: i32) -> Vec<TilePos> {
    let mut out = Vec::new();
    for y in (center.y - radius)..=(center.y + radius) {
        for x in (center.x - radius)..=(center.x + radius) {
            let pos = TilePos::new(x, y);
            if is_candidate(ctx, pos) {
                out.push(pos);
            }
        }
    }
    out
}

/// Best reachable position around us, honoring the role's leash.
///
/// Returns the tile and its score; the current tile is always a candidate.
pub fn best_position(
    ctx: &DecisionContext<'_>,
    profile: &RoleProfile,
    target: Option<&ActorSnapshot>,
) -> (TilePos, f64) {
    let mut best = (ctx.me.pos, position_score(ctx, profile, ctx.me.pos, target));
    for pos in candidate_tiles(ctx, ctx.me.pos, AI_CANDIDATE_RADIUS) {
        if let Some(leash) = profile.leash {
            if pos.chebyshev_to(&ctx.home) > leash && pos != ctx.me.pos {
                continue;
            }
        }
        let score = position_score(ctx, profile, pos, target);
        if score > best.1 {
            best = (pos, score);
        }
    }
    best
}

/// Score of a retreat destination: distance gained from the threat
/// centroid plus cover, minus overwatch exposure.
pub fn retreat_score(ctx: &DecisionContext<'_>, pos: TilePos, centroid: Vec2) -> f64 {
    let gained = to_vec(pos).distance(centroid) - to_vec(ctx.me.pos).distance(centroid);
    let threats = ctx.threat_positions();
    gained as f64 / AI_RETREAT_RADIUS as f64 + 0.5 * average_cover_quality(ctx.grid, pos, &threats)
        - overwatch_exposure(ctx, pos) as f64
}

/// Furthest safe tile from known threats, or `None` if nothing improves on
/// standing still.
pub fn retreat_position(ctx: &DecisionContext<'_>) -> Option<TilePos> {
    let centroid = ctx.threat_centroid()?;
    let here = to_vec(ctx.me.pos).distance(centroid);
    let mut best: Option<(TilePos, f64)> = None;
    for pos in candidate_tiles(ctx, ctx.me.pos, AI_RETREAT_RADIUS) {
        if to_vec(pos).distance(centroid) <= here {
            continue;
        }
        let score = retreat_score(ctx, pos, centroid);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pos, score));
        }
    }
    best.map(|(p, _)| p)
}

/// Free tile closest to `goal` within our candidate radius.
pub fn approach_position(ctx: &DecisionContext<'_>, goal: TilePos) -> Option<TilePos> {
    let mut best: Option<(TilePos, f64)> = None;
    for pos in candidate_tiles(ctx, ctx.me.pos, AI_CANDIDATE_RADIUS) {
        if pos == goal {
            continue;
        }
        let d = pos.distance_to(&goal);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((pos, d));
        }
    }
    best.filter(|(p, _)| *p != ctx.me.pos).map(|(p, _)| p)
}
