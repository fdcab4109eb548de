use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use squadfall_core::enums::{EnemyRole, Faction};
use squadfall_core::mission::MapSpec;
use squadfall_core::types::{ActorId, Direction8, TilePos};
use squadfall_map::grid::TileGrid;

use crate::context::{ActorSnapshot, DecisionContext, OverwatchZone};
use crate::decision::{decide, Decision};
use crate::profiles::get_profile;
use crate::scoring::{flank_score, overwatch_exposure, select_target};

fn open_grid(width: usize, height: usize) -> TileGrid {
    let rows = vec![".".repeat(width); height];
    TileGrid::from_spec(&MapSpec {
        width: width as u32,
        height: height as u32,
        rows,
        cover: Vec::new(),
    })
    .unwrap()
}

fn grid_from(rows: &[&str]) -> TileGrid {
    TileGrid::from_spec(&MapSpec {
        width: rows[0].len() as u32,
        height: rows.len() as u32,
        rows: rows.iter().map(|r| r.to_string()).collect(),
        cover: Vec::new(),
    })
    .unwrap()
}

/// Open floor with a half-cover obstacle at `obstacle`.
fn grid_with_obstacle(width: usize, height: usize, obstacle: TilePos) -> TileGrid {
    let rows: Vec<String> = (0..height as i32)
        .map(|y| {
            (0..width as i32)
                .map(|x| if TilePos::new(x, y) == obstacle { 'h' } else { '.' })
                .collect()
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    grid_from(&rows)
}

fn actor(id: u32, faction: Faction, pos: TilePos) -> ActorSnapshot {
    ActorSnapshot {
        id: ActorId(id),
        faction,
        pos,
        hp: 100,
        max_hp: 100,
        weapon_range: 12.0,
        magazine: 30,
        can_suppress: true,
        suppressed: false,
        overwatch: None,
        attacking: None,
    }
}

fn context<'a>(grid: &'a TileGrid, role: EnemyRole, me: ActorSnapshot, crew: Vec<ActorSnapshot>) -> DecisionContext<'a> {
    let visible = crew.iter().map(|c| c.id).collect();
    let occupied = crew.iter().map(|c| c.pos).collect();
    DecisionContext {
        grid,
        home: me.pos,
        me,
        role,
        known_crew: crew,
        visible,
        allies: Vec::new(),
        player_overwatch: Vec::new(),
        occupied,
        last_attacker: None,
    }
}

#[test]
fn test_all_profiles_have_unit_weights() {
    for role in EnemyRole::ALL {
        let p = get_profile(role);
        for w in [
            p.aggression,
            p.cover_priority,
            p.flank_tendency,
            p.overwatch_propensity,
            p.suppression_propensity,
            p.retreat_threshold,
            p.overwatch_avoidance,
        ] {
            assert!((0.0..=1.0).contains(&w), "{role:?} weight {w} out of range");
        }
    }
    assert_eq!(get_profile(EnemyRole::Boss).retreat_threshold, 0.0);
    assert!(get_profile(EnemyRole::Flanker).flank_tendency > get_profile(EnemyRole::Guard).flank_tendency);
}

#[test]
fn test_no_known_crew_holds() {
    let grid = open_grid(10, 10);
    let me = actor(10, Faction::Enemy, TilePos::new(5, 5));
    let ctx = context(&grid, EnemyRole::Heavy, me, Vec::new());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert_eq!(decide(&ctx, &mut rng), Decision::Hold);
}

#[test]
fn test_heavy_attacks_visible_target_in_open() {
    let grid = open_grid(12, 12);
    let me = actor(10, Faction::Enemy, TilePos::new(2, 2));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(6, 2))];
    let ctx = context(&grid, EnemyRole::Heavy, me, crew);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    assert_eq!(decide(&ctx, &mut rng), Decision::Attack(ActorId(1)));
}

#[test]
fn test_wounded_guard_retreats_away_from_threat() {
    let grid = open_grid(20, 5);
    let mut me = actor(10, Faction::Enemy, TilePos::new(10, 2));
    me.hp = 10;
    let crew = vec![actor(1, Faction::Crew, TilePos::new(5, 2))];
    let ctx = context(&grid, EnemyRole::Guard, me, crew);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    match decide(&ctx, &mut rng) {
        Decision::Retreat(to) => assert!(to.x > 10, "retreated toward threat: {to:?}"),
        other => panic!("expected retreat, got {other:?}"),
    }
}

#[test]
fn test_boss_never_retreats() {
    let grid = open_grid(20, 5);
    let mut me = actor(10, Faction::Enemy, TilePos::new(10, 2));
    me.hp = 1;
    let crew = vec![actor(1, Faction::Crew, TilePos::new(5, 2))];
    let ctx = context(&grid, EnemyRole::Boss, me, crew);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    assert!(!matches!(decide(&ctx, &mut rng), Decision::Retreat(_)));
}

#[test]
fn test_decisions_are_deterministic_per_seed() {
    let grid = open_grid(16, 16);
    let me = actor(10, Faction::Enemy, TilePos::new(1, 1));
    let crew = vec![
        actor(1, Faction::Crew, TilePos::new(14, 14)),
        actor(2, Faction::Crew, TilePos::new(12, 3)),
    ];
    for role in EnemyRole::ALL {
        let ctx = context(&grid, role, me.clone(), crew.clone());
        let a = decide(&ctx, &mut ChaCha8Rng::seed_from_u64(99));
        let b = decide(&ctx, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b, "{role:?}");
    }
}

#[test]
fn test_overwatch_cone() {
    let grid = open_grid(10, 10);
    let zone = OverwatchZone {
        origin: TilePos::new(2, 5),
        range: 6.0,
        facing: Some(Direction8::E),
    };
    assert!(zone.covers(&grid, TilePos::new(6, 5)));
    assert!(zone.covers(&grid, TilePos::new(5, 3)));
    assert!(!zone.covers(&grid, TilePos::new(0, 5)));
    assert!(!zone.covers(&grid, TilePos::new(2, 1)));
    // Out of range.
    assert!(!zone.covers(&grid, TilePos::new(9, 5)));

    let all_round = OverwatchZone { facing: None, ..zone };
    assert!(all_round.covers(&grid, TilePos::new(0, 5)));
}

#[test]
fn test_overwatch_cone_is_symmetric() {
    let grid = open_grid(12, 12);
    let zone = OverwatchZone {
        origin: TilePos::new(5, 5),
        range: 6.0,
        facing: Some(Direction8::E),
    };
    // Either side of the facing, inside and behind the cone.
    assert!(zone.covers(&grid, TilePos::new(8, 4)));
    assert!(zone.covers(&grid, TilePos::new(8, 6)));
    assert!(!zone.covers(&grid, TilePos::new(1, 4)));
    assert!(!zone.covers(&grid, TilePos::new(1, 6)));
    assert!(!zone.covers(&grid, TilePos::new(5, 1)));
    assert!(!zone.covers(&grid, TilePos::new(5, 9)));
}

#[test]
fn test_overwatch_exposure_counts_zones() {
    let grid = open_grid(10, 10);
    let me = actor(10, Faction::Enemy, TilePos::new(5, 5));
    let mut ctx = context(&grid, EnemyRole::Flanker, me, Vec::new());
    ctx.player_overwatch = vec![
        OverwatchZone { origin: TilePos::new(0, 5), range: 8.0, facing: Some(Direction8::E) },
        OverwatchZone { origin: TilePos::new(9, 5), range: 8.0, facing: None },
    ];
    assert_eq!(overwatch_exposure(&ctx, TilePos::new(5, 5)), 2);
    assert_eq!(overwatch_exposure(&ctx, TilePos::new(3, 9)), 1);
}

#[test]
fn test_flank_prefers_perpendicular() {
    let grid = open_grid(12, 12);
    let me = actor(10, Faction::Enemy, TilePos::new(1, 6));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(6, 6))];
    let ctx = context(&grid, EnemyRole::Flanker, me, crew);
    let axis = Vec2::new(1.0, 6.0);
    let target = TilePos::new(6, 6);
    let side = flank_score(&ctx, TilePos::new(6, 1), target, axis);
    let head_on = flank_score(&ctx, TilePos::new(2, 6), target, axis);
    assert!(side > 0.9, "side {side}");
    assert!(head_on < 0.1, "head on {head_on}");

    let other_side = flank_score(&ctx, TilePos::new(6, 11), target, axis);
    assert!((side - other_side).abs() < 1e-6, "{side} vs {other_side}");
}

#[test]
fn test_flank_score_mirrors_across_axis() {
    let grid = open_grid(11, 11);
    let me = actor(10, Faction::Enemy, TilePos::new(5, 9));
    let ctx = context(&grid, EnemyRole::Flanker, me, Vec::new());
    let axis = Vec2::new(5.0, 9.0);
    let target = TilePos::new(5, 5);
    let east = flank_score(&ctx, TilePos::new(9, 5), target, axis);
    let west = flank_score(&ctx, TilePos::new(1, 5), target, axis);
    assert!(east > 0.9, "east {east}");
    assert!(west > 0.9, "west {west}");
    // Behind the target is as bad as head-on.
    assert!(flank_score(&ctx, TilePos::new(5, 1), target, axis) < 0.1);
}

// ---- Role policies ----

#[test]
fn test_suppressor_pins_covered_target() {
    let grid = grid_with_obstacle(12, 11, TilePos::new(7, 5));
    let me = actor(10, Faction::Enemy, TilePos::new(2, 5));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(8, 5))];
    let ctx = context(&grid, EnemyRole::Suppressor, me.clone(), crew.clone());

    let mut suppress = 0;
    for seed in 0..200 {
        match decide(&ctx, &mut ChaCha8Rng::seed_from_u64(seed)) {
            Decision::Suppress(id) => {
                assert_eq!(id, ActorId(1));
                suppress += 1;
            }
            Decision::Attack(id) => assert_eq!(id, ActorId(1)),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert!(suppress > 130, "suppressed {suppress}/200");

    // Without a suppression-capable weapon it shoots.
    let mut dry = me;
    dry.can_suppress = false;
    let ctx = context(&grid, EnemyRole::Suppressor, dry, crew);
    for seed in 0..20 {
        assert_eq!(
            decide(&ctx, &mut ChaCha8Rng::seed_from_u64(seed)),
            Decision::Attack(ActorId(1))
        );
    }
}

#[test]
fn test_officer_moves_into_cover() {
    let grid = grid_with_obstacle(14, 11, TilePos::new(4, 5));
    let me = actor(10, Faction::Enemy, TilePos::new(2, 5));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(10, 5))];
    let ctx = context(&grid, EnemyRole::Officer, me, crew);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    // The only tile with cover facing the crew is behind the obstacle.
    assert_eq!(decide(&ctx, &mut rng), Decision::MoveTo(TilePos::new(3, 5)));
}

fn flanker_choice(blocked: TilePos) -> TilePos {
    let grid = grid_with_obstacle(14, 15, TilePos::new(6, 7));
    let me = actor(10, Faction::Enemy, TilePos::new(2, 7));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(7, 7))];
    let mut ctx = context(&grid, EnemyRole::Flanker, me, crew);
    ctx.occupied.insert(blocked);
    match decide(&ctx, &mut ChaCha8Rng::seed_from_u64(8)) {
        Decision::MoveTo(pos) => {
            let score = flank_score(&ctx, pos, TilePos::new(7, 7), Vec2::new(2.0, 7.0));
            assert!(score > 0.9, "{pos:?} scored {score}");
            pos
        }
        other => panic!("expected a flanking move, got {other:?}"),
    }
}

#[test]
fn test_flanker_moves_perpendicular_on_either_side() {
    // Target at (7,7) has half cover toward the flanker at (2,7).
    let south = flanker_choice(TilePos::new(7, 6));
    assert!(south.y > 7, "{south:?}");
    let north = flanker_choice(TilePos::new(7, 8));
    assert!(north.y < 7, "{north:?}");
}

#[test]
fn test_target_selection_prefers_attacker() {
    let grid = open_grid(12, 12);
    let me = actor(10, Faction::Enemy, TilePos::new(5, 5));
    let crew = vec![
        actor(1, Faction::Crew, TilePos::new(5, 1)),
        actor(2, Faction::Crew, TilePos::new(5, 9)),
    ];
    let mut ctx = context(&grid, EnemyRole::Guard, me, crew);
    assert_eq!(select_target(&ctx, false).map(|c| c.id), Some(ActorId(1)));
    ctx.last_attacker = Some(ActorId(2));
    assert_eq!(select_target(&ctx, false).map(|c| c.id), Some(ActorId(2)));
}

#[test]
fn test_unseen_target_is_not_attacked() {
    let grid = open_grid(12, 12);
    let me = actor(10, Faction::Enemy, TilePos::new(1, 1));
    let crew = vec![actor(1, Faction::Crew, TilePos::new(4, 1))];
    let mut ctx = context(&grid, EnemyRole::Heavy, me, crew);
    ctx.visible = BTreeSet::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    assert!(matches!(decide(&ctx, &mut rng), Decision::MoveTo(_)));
}
