//! Tests for the mission session: determinism, commands, combat reactions,
//! waves, extraction and outcome classification.

use squadfall_core::commands::Command;
use squadfall_core::components::*;
use squadfall_core::constants::{
    KNOCKDOWN_TICKS, SUPPRESSED_DURATION_TICKS, SUPPRESS_AMMO_COST, SUPPRESS_DAMAGE_MULT,
};
use squadfall_core::enums::*;
use squadfall_core::error::{AttackBlock, CommandError, ExtractBlock, MissionBuildError};
use squadfall_core::events::SimEvent;
use squadfall_core::mission::*;
use squadfall_core::types::{ActorId, Direction8, TilePos};

use crate::engine::{SimConfig, SimulationEngine};
use crate::mission_state::InteractableStatus;
use crate::scenario::{self, ScenarioId};
use crate::systems::orders::{self, Intent};
use crate::systems::outcome::{self, CrewRecord, ObjectiveRecord, TerminalState};
use crate::systems::{combat, suppression};

// ---- Fixtures ----

fn map(rows: &[&str]) -> MapSpec {
    MapSpec {
        width: rows[0].len() as u32,
        height: rows.len() as u32,
        rows: rows.iter().map(|r| r.to_string()).collect(),
        cover: Vec::new(),
    }
}

fn crew_at(name: &str, x: i32, y: i32) -> CrewDeployment {
    CrewDeployment {
        name: name.into(),
        hp: 100,
        armor: ArmorClass::None,
        weapon: WeaponSpec::rifle(),
        speed: 3.0,
        vision: 10.0,
        position: Some(TilePos::new(x, y)),
    }
}

fn template(role: EnemyRole) -> EnemyTemplate {
    EnemyTemplate {
        role,
        hp: 100,
        armor: ArmorClass::None,
        weapon: WeaponSpec::pistol(),
        speed: 2.5,
        vision: 9.0,
        tag: None,
    }
}

fn enemy_at(role: EnemyRole, x: i32, y: i32) -> EnemySpawn {
    EnemySpawn {
        template: template(role),
        position: TilePos::new(x, y),
    }
}

fn mission(rows: &[&str], crew: Vec<CrewDeployment>, enemies: Vec<EnemySpawn>) -> MissionSpec {
    MissionSpec {
        id: "test".into(),
        tags: Vec::new(),
        seed: 42,
        map: map(rows),
        crew,
        enemies,
        interactables: Vec::new(),
        objectives: Vec::new(),
        spawn_points: Vec::new(),
        waves: Vec::new(),
        negotiation: false,
        evac_available_at_start: false,
    }
}

/// Crew on the west side, everything else behind a solid wall.
const WALLED: [&str; 5] = [
    "##############",
    "#...#........#",
    "#...#........#",
    "#...#........#",
    "##############",
];

const OPEN: [&str; 5] = [
    "############",
    "#..........#",
    "#..........#",
    "#..........#",
    "############",
];

const EVAC: [&str; 4] = [
    "########",
    "#XX....#",
    "#XX....#",
    "########",
];

fn quiet() -> SimConfig {
    SimConfig {
        crew_auto_engage: false,
        ..Default::default()
    }
}

/// Build the mission and run the deployment tick.
fn deploy(spec: MissionSpec, config: SimConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(spec, config).unwrap();
    engine.queue_command(Command::ConfirmDeployment);
    engine.tick();
    engine
}

fn run_ticks(engine: &mut SimulationEngine, n: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..n {
        engine.tick();
        events.extend(engine.drain_events());
    }
    events
}

fn rejections(events: &[SimEvent]) -> Vec<(Option<ActorId>, CommandError)> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::CommandRejected { actor, error } => Some((*actor, error.clone())),
            _ => None,
        })
        .collect()
}

/// Keep an enemy from ever deciding on its own.
fn freeze_ai(engine: &mut SimulationEngine, id: ActorId) {
    engine
        .session_mut()
        .update::<EnemyBrain, _>(id, |b| b.next_think_tick = u64::MAX);
}

/// Freeze an enemy and drop whatever it decided on the deployment tick.
fn hold_fire(engine: &mut SimulationEngine, id: ActorId) {
    freeze_ai(engine, id);
    orders::issue(engine.session_mut(), id, Intent::Stop).unwrap();
}

fn pins(events: &[SimEvent], id: ActorId, direct: bool) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(e, SimEvent::SuppressionApplied { target, direct_hit, .. }
                if *target == id && *direct_hit == direct)
        })
        .count()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    for id in [ScenarioId::WarehouseRaid, ScenarioId::Holdout] {
        let mut engine_a = SimulationEngine::new(scenario::build(id), SimConfig::default()).unwrap();
        let mut engine_b = SimulationEngine::new(scenario::build(id), SimConfig::default()).unwrap();
        for engine in [&mut engine_a, &mut engine_b] {
            engine.queue_command(Command::ConfirmDeployment);
            engine.queue_command(Command::EndNegotiation);
        }

        for _ in 0..400 {
            let snap_a = engine_a.tick();
            let snap_b = engine_b.tick();
            let json_a = serde_json::to_string(&snap_a).unwrap();
            let json_b = serde_json::to_string(&snap_b).unwrap();
            assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
            assert_eq!(engine_a.drain_events(), engine_b.drain_events());
        }
    }
}

#[test]
fn test_determinism_different_seeds() {
    let spec = || {
        mission(
            &OPEN,
            vec![crew_at("a", 2, 2)],
            vec![enemy_at(EnemyRole::Heavy, 7, 2)],
        )
    };
    let mut engine_a = deploy(spec(), SimConfig { seed: Some(111), ..Default::default() });
    let mut engine_b = deploy(spec(), SimConfig { seed: Some(222), ..Default::default() });

    // The opening snapshot is identical; the first exchanged shots are not.
    let mut diverged = false;
    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce different firefights");
}

// ---- Clock and commands ----

#[test]
fn test_setup_holds_the_clock() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    let mut engine = SimulationEngine::new(spec, SimConfig::default()).unwrap();
    for _ in 0..5 {
        let snap = engine.tick();
        assert_eq!(snap.time.tick, 0);
        assert_eq!(snap.phase, MissionPhase::Setup);
    }
    engine.queue_command(Command::ConfirmDeployment);
    let snap = engine.tick();
    assert_eq!(snap.phase, MissionPhase::Contact);
    assert_eq!(snap.time.tick, 1);
}

#[test]
fn test_pause_keeps_commands_queued() {
    let mut engine = SimulationEngine::new(scenario::warehouse_raid(), SimConfig::default()).unwrap();
    engine.queue_command(Command::Pause);
    engine.queue_command(Command::ConfirmDeployment);

    for _ in 0..5 {
        let snap = engine.tick();
        assert!(snap.paused);
        assert_eq!(snap.time.tick, 0);
        assert_eq!(snap.phase, MissionPhase::Setup);
    }
    assert_eq!(engine.pending_commands(), 1);

    engine.queue_command(Command::Resume);
    let snap = engine.tick();
    assert!(!snap.paused);
    assert_eq!(snap.phase, MissionPhase::Contact);
    assert_eq!(engine.pending_commands(), 0);
}

#[test]
fn test_unit_orders_rejected_before_deployment() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    let mut engine = SimulationEngine::new(spec, SimConfig::default()).unwrap();
    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(2, 2),
    });
    engine.tick();
    let rejected = rejections(&engine.drain_events());
    assert_eq!(
        rejected,
        vec![(Some(ActorId(1)), CommandError::WrongPhase(MissionPhase::Setup))]
    );
}

#[test]
fn test_invalid_commands() {
    let spec = mission(
        &WALLED,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 10, 2)],
    );
    let mut engine = deploy(spec, quiet());
    engine.drain_events();

    // Unknown actors are only logged.
    engine.queue_command(Command::Move {
        actor: ActorId(99),
        to: TilePos::new(2, 2),
    });
    // Walls are not destinations.
    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(4, 2),
    });
    // The enemy is behind the wall.
    engine.queue_command(Command::Attack {
        actor: ActorId(1),
        target: ActorId(2),
    });
    // Enemies are not player-controlled.
    engine.queue_command(Command::Stop { actor: ActorId(2) });
    engine.tick();

    let rejected = rejections(&engine.drain_events());
    assert_eq!(
        rejected,
        vec![
            (Some(ActorId(1)), CommandError::NotWalkable(TilePos::new(4, 2))),
            (
                Some(ActorId(1)),
                CommandError::CannotAttack {
                    target: ActorId(2),
                    reason: AttackBlock::NoLineOfSight,
                }
            ),
            (Some(ActorId(2)), CommandError::NotControllable(ActorId(2))),
        ]
    );
}

#[test]
fn test_move_order_reaches_destination() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 1)], Vec::new());
    let mut engine = deploy(spec, SimConfig::default());
    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(3, 3),
    });

    // Two diagonal steps at 3 tiles/s take well under a second.
    run_ticks(&mut engine, 30);
    let snap = engine.snapshot();
    let actor = &snap.actors[0];
    assert_eq!(actor.position, TilePos::new(3, 3));
    assert_eq!(actor.state, BehaviorState::Idle);
}

// ---- Perception ----

#[test]
fn test_enemy_without_line_of_sight_stays_idle() {
    let spec = mission(
        &WALLED,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 7, 2)],
    );
    let mut engine = deploy(spec, SimConfig::default());
    for _ in 0..50 {
        let snap = engine.tick();
        assert_eq!(snap.alarm, AlarmState::Quiet);
        let enemy = snap.actors.iter().find(|a| a.id == ActorId(2)).unwrap();
        assert_eq!(enemy.detection, Some(DetectionState::Idle));
        assert_eq!(enemy.position, TilePos::new(7, 2));
    }
}

#[test]
fn test_alarm_is_monotonic() {
    let spec = mission(
        &OPEN,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 6, 2)],
    );
    let mut engine = deploy(spec, SimConfig::default());
    let mut events = engine.drain_events();
    assert_eq!(engine.alarm(), AlarmState::Alerted);

    for _ in 0..100 {
        let snap = engine.tick();
        events.extend(engine.drain_events());
        assert_eq!(snap.alarm, AlarmState::Alerted);
    }
    let raised = events
        .iter()
        .filter(|e| matches!(e, SimEvent::AlarmRaised { .. }))
        .count();
    assert_eq!(raised, 1);
}

#[test]
fn test_negotiation_blocks_perception_until_timeout() {
    let mut spec = mission(
        &OPEN,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 6, 2)],
    );
    spec.negotiation = true;
    let config = SimConfig {
        negotiation_timeout_ticks: Some(5),
        ..Default::default()
    };
    let mut engine = deploy(spec, config);
    assert_eq!(engine.phase(), MissionPhase::Negotiation);
    assert_eq!(engine.alarm(), AlarmState::Quiet);

    run_ticks(&mut engine, 10);
    assert_eq!(engine.phase(), MissionPhase::Contact);
    run_ticks(&mut engine, 1);
    assert_eq!(engine.alarm(), AlarmState::Alerted);
}

// ---- Phases ----

#[test]
fn test_phases_only_move_forward() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    let config = SimConfig {
        pressure_after_ticks: Some(5),
        ..Default::default()
    };
    let mut engine = deploy(spec, config);
    run_ticks(&mut engine, 10);
    assert_eq!(engine.phase(), MissionPhase::Pressure);

    assert_eq!(
        engine.advance_phase(MissionPhase::Contact),
        Err(CommandError::IllegalPhaseTransition {
            from: MissionPhase::Pressure,
            to: MissionPhase::Contact,
        })
    );
    assert_eq!(engine.advance_phase(MissionPhase::Resolution), Ok(()));
    assert_eq!(engine.phase(), MissionPhase::Resolution);
}

// ---- Overwatch and suppression ----

#[test]
fn test_single_shot_overwatch_fires_once() {
    let spec = mission(
        &OPEN,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 9, 2)],
    );
    let mut engine = deploy(spec, quiet());
    let enemy = ActorId(2);
    freeze_ai(&mut engine, enemy);
    {
        let s = engine.session_mut();
        orders::issue(s, enemy, Intent::Overwatch(None)).unwrap();
        s.update::<OverwatchState, _>(enemy, |ow| ow.shots_remaining = 1);
    }
    engine.drain_events();

    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(4, 2),
    });
    let events = run_ticks(&mut engine, 40);

    let reactions = events
        .iter()
        .filter(|e| matches!(e, SimEvent::ReactionFired { shooter, .. } if *shooter == enemy))
        .count();
    let ended = events
        .iter()
        .filter(|e| matches!(e, SimEvent::OverwatchEnded { actor } if *actor == enemy))
        .count();
    assert_eq!(reactions, 1);
    assert_eq!(ended, 1);
    assert!(!engine.session().read::<OverwatchState>(enemy).unwrap().active);
    assert_eq!(engine.snapshot().actors[0].position, TilePos::new(4, 2));
}

#[test]
fn test_suppressed_actor_cannot_enter_overwatch() {
    let spec = mission(
        &WALLED,
        vec![crew_at("a", 1, 1), crew_at("b", 1, 3)],
        vec![enemy_at(EnemyRole::Suppressor, 10, 2)],
    );
    let mut engine = deploy(spec, quiet());
    freeze_ai(&mut engine, ActorId(3));

    // b is already watching when the suppression lands.
    engine.queue_command(Command::EnterOverwatch {
        actor: ActorId(2),
        facing: None,
    });
    engine.tick();
    {
        let s = engine.session_mut();
        suppression::apply_suppressed(s, ActorId(1), ActorId(3), true);
        suppression::apply_suppressed(s, ActorId(2), ActorId(3), false);
    }
    engine.drain_events();

    engine.queue_command(Command::EnterOverwatch {
        actor: ActorId(1),
        facing: Some(Direction8::E),
    });
    let snap = engine.tick();
    let rejected = rejections(&engine.drain_events());
    assert_eq!(rejected, vec![(Some(ActorId(1)), CommandError::Suppressed(ActorId(1)))]);

    let a = &snap.actors[0];
    let b = &snap.actors[1];
    assert!(a.suppressed && !a.overwatch);
    assert!(b.suppressed && b.overwatch, "suppression degrades a watch but never ends it");
}

#[test]
fn test_suppressive_burst_costs_a_block_of_ammo() {
    let mut target = enemy_at(EnemyRole::Guard, 6, 2);
    target.template.hp = 500;
    let spec = mission(&OPEN, vec![crew_at("a", 1, 2)], vec![target]);
    let mut engine = deploy(spec, quiet());
    let enemy = ActorId(2);
    hold_fire(&mut engine, enemy);
    engine.drain_events();

    engine.queue_command(Command::SuppressiveFire {
        actor: ActorId(1),
        target: SuppressTarget::Actor(enemy),
    });
    let events = run_ticks(&mut engine, 30);

    let bursts = events
        .iter()
        .filter(|e| matches!(e, SimEvent::SuppressiveBurst { shooter, .. } if *shooter == ActorId(1)))
        .count();
    assert_eq!(bursts, 1, "one order fires one burst");

    let s = engine.session();
    let weapon = s.read::<Weapon>(ActorId(1)).unwrap();
    assert_eq!(weapon.magazine, weapon.magazine_size - SUPPRESS_AMMO_COST);
    let stats = s.read::<CombatStats>(ActorId(1)).unwrap();
    assert_eq!(stats.shots_fired, 1);
    assert_eq!(stats.rounds_spent, SUPPRESS_AMMO_COST);

    // A hit deals reduced damage and always pins.
    let reduced = (WeaponSpec::rifle().damage as f64 * SUPPRESS_DAMAGE_MULT).round() as i32;
    let hp = s.read::<Health>(enemy).unwrap().current;
    if pins(&events, enemy, true) == 1 {
        assert_eq!(hp, 500 - reduced);
        assert_eq!(stats.shots_hit, 1);
    } else {
        assert_eq!(hp, 500);
        assert_eq!(stats.shots_hit, 0);
    }
}

#[test]
fn test_repeated_suppression_refreshes_the_effect() {
    let mut gunner = crew_at("a", 1, 2);
    gunner.weapon = WeaponSpec::machine_gun();
    let mut target = enemy_at(EnemyRole::Guard, 5, 2);
    target.template.hp = 1_000;
    let spec = mission(&OPEN, vec![gunner], vec![target]);
    let mut engine = deploy(spec, quiet());
    let enemy = ActorId(2);
    hold_fire(&mut engine, enemy);
    engine.drain_events();

    let mut applied = 0;
    for _ in 0..10 {
        while !engine.session().read::<Weapon>(ActorId(1)).unwrap().ready_to_fire() {
            engine.tick();
        }
        engine.queue_command(Command::SuppressiveFire {
            actor: ActorId(1),
            target: SuppressTarget::Actor(enemy),
        });
        engine.tick();
        let events = engine.drain_events();
        let pinned = pins(&events, enemy, true) + pins(&events, enemy, false);

        let effects = engine.session().read::<StatusEffects>(enemy).unwrap();
        let suppressed: Vec<&StatusEffect> = effects
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::Suppressed)
            .collect();
        assert!(suppressed.len() <= 1, "suppression stacked: {suppressed:?}");
        if pinned > 0 {
            applied += pinned as u32;
            assert_eq!(suppressed[0].remaining_ticks, Some(SUPPRESSED_DURATION_TICKS));
        }
    }
    assert!(applied >= 2, "only {applied} bursts pinned");
    let state = engine.session().read::<SuppressionState>(enemy).unwrap();
    assert_eq!(state.times_suppressed, applied);
    assert_eq!(state.last_suppressed_by, Some(ActorId(1)));
}

#[test]
fn test_splash_suppression_falls_off_with_distance() {
    let spec = mission(
        &OPEN,
        vec![crew_at("a", 1, 2), crew_at("b", 7, 1)],
        vec![
            enemy_at(EnemyRole::Guard, 8, 2),
            enemy_at(EnemyRole::Guard, 9, 2),
            enemy_at(EnemyRole::Guard, 10, 2),
        ],
    );
    let mut engine = deploy(spec, quiet());
    for id in 3..=5 {
        hold_fire(&mut engine, ActorId(id));
    }
    engine.drain_events();

    let aim = TilePos::new(7, 2);
    let s = engine.session_mut();
    for _ in 0..400 {
        s.update::<Weapon, _>(ActorId(1), |w| w.magazine = w.magazine_size);
        suppression::fire_burst(s, ActorId(1), SuppressTarget::Tile(aim), aim);
    }
    let events = engine.drain_events();

    // One tile from the aim point pins 75% of the time, two tiles 30%.
    let near = pins(&events, ActorId(3), false);
    let far = pins(&events, ActorId(4), false);
    assert!((250..=350).contains(&near), "near {near}/400");
    assert!((80..=160).contains(&far), "far {far}/400");
    // Outside the splash radius, and never a friendly.
    assert_eq!(pins(&events, ActorId(5), false), 0);
    assert_eq!(pins(&events, ActorId(2), false), 0);
    assert_eq!(pins(&events, ActorId(3), true), 0);
}

#[test]
fn test_killed_actor_leaves_targeting_and_collision() {
    let spec = mission(
        &OPEN,
        vec![crew_at("a", 1, 2)],
        vec![enemy_at(EnemyRole::Guard, 5, 2)],
    );
    let mut engine = deploy(spec, quiet());
    let enemy = ActorId(2);
    combat::kill(engine.session_mut(), enemy, None);

    let s = engine.session();
    assert_eq!(s.read::<Health>(enemy).unwrap().current, 0);
    assert_eq!(s.read::<Behavior>(enemy).unwrap().state, BehaviorState::Dead);
    assert!(!s.is_alive(enemy));
    assert!(!s.is_active(enemy));
    assert!(!s.occupancy().contains_key(&TilePos::new(5, 2)));

    engine.drain_events();
    engine.queue_command(Command::Attack {
        actor: ActorId(1),
        target: enemy,
    });
    engine.tick();
    assert_eq!(
        rejections(&engine.drain_events()),
        vec![(
            Some(ActorId(1)),
            CommandError::CannotAttack {
                target: enemy,
                reason: AttackBlock::TargetDown,
            }
        )]
    );
}

// ---- Status effects ----

#[test]
fn test_knockdown_recovers() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    let mut engine = deploy(spec, SimConfig::default());
    combat::apply_damage(engine.session_mut(), ActorId(1), 50, None);
    assert_eq!(engine.snapshot().actors[0].state, BehaviorState::Down);

    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(2, 2),
    });
    engine.tick();
    let rejected = rejections(&engine.drain_events());
    assert_eq!(rejected, vec![(Some(ActorId(1)), CommandError::ActorDown(ActorId(1)))]);

    run_ticks(&mut engine, KNOCKDOWN_TICKS as usize);
    let actor = &engine.snapshot().actors[0];
    assert_eq!(actor.state, BehaviorState::Idle);
    assert_eq!(actor.hp, 50);
}

#[test]
fn test_officer_aura_follows_radius_and_life() {
    let rows = [
        "####################",
        "#..#...............#",
        "#..#...............#",
        "#..#...............#",
        "####################",
    ];
    let spec = mission(
        &rows,
        vec![crew_at("a", 1, 2)],
        vec![
            enemy_at(EnemyRole::Officer, 8, 2),
            enemy_at(EnemyRole::Guard, 10, 2),
            enemy_at(EnemyRole::Guard, 16, 2),
        ],
    );
    let mut engine = deploy(spec, SimConfig::default());
    let officer = ActorId(2);
    let has_aura = |engine: &SimulationEngine, id: ActorId| {
        engine
            .session()
            .read::<StatusEffects>(id)
            .unwrap()
            .effects
            .iter()
            .any(|e| e.kind == EffectKind::CommandAura && e.source == ModifierSource::Actor(officer))
    };
    assert!(has_aura(&engine, ActorId(3)));
    assert!(!has_aura(&engine, ActorId(4)));
    assert!(!has_aura(&engine, officer));

    combat::kill(engine.session_mut(), officer, None);
    assert!(!has_aura(&engine, ActorId(3)));
    engine.tick();
    assert!(!has_aura(&engine, ActorId(3)));
}

// ---- Waves ----

fn wave_mission(trigger: WaveTrigger, los_gated: bool) -> MissionSpec {
    let mut boss = enemy_at(EnemyRole::Boss, 10, 2);
    boss.template.tag = Some("boss".into());
    let mut spec = mission(&WALLED, vec![crew_at("a", 1, 2)], vec![boss]);
    spec.spawn_points = vec![SpawnPointSpec {
        id: "gate".into(),
        tiles: vec![TilePos::new(12, 1)],
        los_gated,
        door: None,
    }];
    spec.waves = vec![WaveDefinition {
        id: "guards".into(),
        required_phase: MissionPhase::Contact,
        composition: vec![WaveGroup {
            template: template(EnemyRole::Guard),
            count: 1,
        }],
        spawn_point: "gate".into(),
        trigger,
    }];
    spec
}

fn triggered(events: &[SimEvent], wave: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SimEvent::WaveTriggered { wave_id, .. } if wave_id == wave))
        .count()
}

#[test]
fn test_boss_hp_wave_fires_once() {
    let spec = wave_mission(
        WaveTrigger::ActorHpBelow {
            tag: "boss".into(),
            threshold: 0.5,
        },
        false,
    );
    let mut engine = deploy(spec, quiet());
    let mut events = engine.drain_events();
    events.extend(run_ticks(&mut engine, 5));
    assert_eq!(triggered(&events, "guards"), 0);

    let boss = engine.session().find_tagged("boss")[0];
    combat::apply_damage(engine.session_mut(), boss, 50, None);
    let next = run_ticks(&mut engine, 1);
    assert_eq!(triggered(&next, "guards"), 1);

    let later = run_ticks(&mut engine, 50);
    assert_eq!(triggered(&later, "guards"), 0);
    let wave = engine.session().mission.wave("guards").unwrap();
    assert!(wave.triggered);
    assert_eq!(wave.spawned.len(), 1);
}

#[test]
fn test_los_gated_wave_defers_then_spawns() {
    let mut spec = wave_mission(WaveTrigger::TimeInPhase { ticks: 0 }, true);
    spec.map = map(&OPEN);
    spec.enemies.clear();
    spec.spawn_points[0].tiles = vec![TilePos::new(8, 2)];
    let config = SimConfig {
        wave_max_defer_ticks: 20,
        ..quiet()
    };
    let mut engine = deploy(spec, config);
    let mut events = engine.drain_events();
    events.extend(run_ticks(&mut engine, 10));
    let deferred = |events: &[SimEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::WaveDeferred { .. }))
            .count()
    };
    assert_eq!(deferred(&events), 1);
    assert_eq!(triggered(&events, "guards"), 0);

    events.extend(run_ticks(&mut engine, 20));
    assert_eq!(deferred(&events), 1);
    assert_eq!(triggered(&events, "guards"), 1);
}

// ---- Extraction ----

#[test]
fn test_extraction_requires_all_three_conditions() {
    let spec = mission(
        &EVAC,
        vec![crew_at("a", 1, 1), crew_at("b", 5, 2), crew_at("c", 2, 1)],
        Vec::new(),
    );
    let mut engine = deploy(spec, SimConfig::default());

    engine.queue_command(Command::Extract { actor: ActorId(1) });
    engine.tick();
    assert_eq!(
        rejections(&engine.drain_events()),
        vec![(
            Some(ActorId(1)),
            CommandError::CannotExtract(ExtractBlock::EvacUnavailable)
        )]
    );

    engine.call_evac();
    combat::kill(engine.session_mut(), ActorId(3), None);
    engine.drain_events();
    engine.queue_commands([
        Command::Extract { actor: ActorId(2) },
        Command::Extract { actor: ActorId(3) },
        Command::Extract { actor: ActorId(1) },
    ]);
    engine.tick();
    let events = engine.drain_events();
    assert_eq!(
        rejections(&events),
        vec![
            (Some(ActorId(2)), CommandError::CannotExtract(ExtractBlock::NotInZone)),
            (Some(ActorId(3)), CommandError::CannotExtract(ExtractBlock::NotAlive)),
        ]
    );
    assert!(events.contains(&SimEvent::ActorExtracted { actor: ActorId(1) }));
    assert!(engine.session().is_extracted(ActorId(1)));
    assert!(!engine.session().is_extracted(ActorId(2)));
    assert!(!engine.is_complete());
}

#[test]
fn test_retreat_leaves_stragglers_missing() {
    let mut spec = mission(&EVAC, vec![crew_at("a", 1, 1), crew_at("b", 6, 2)], Vec::new());
    spec.objectives = vec![ObjectiveSpec {
        id: "hold".into(),
        kind: ObjectiveKind::Survive { ticks: 10_000 },
        primary: true,
    }];
    let mut engine = deploy(spec, SimConfig::default());
    engine.queue_command(Command::InitiateRetreat);
    let snap = engine.tick();
    assert!(snap.retreating);
    assert!(snap.evac_available);
    assert_eq!(snap.phase, MissionPhase::Resolution);
    assert!(snap.actors[0].extracted);
    assert_eq!(snap.actors[1].state, BehaviorState::Retreating);

    let outcome = engine.conclude();
    assert_eq!(outcome.result, MissionResult::Retreat);
    assert_eq!(outcome.crew[0].status, CrewStatus::Alive);
    assert_eq!(outcome.crew[1].status, CrewStatus::MIA);
    assert_eq!(engine.phase(), MissionPhase::Complete);
}

// ---- Interaction and outcome ----

#[test]
fn test_loot_secured_on_extraction() {
    let mut spec = mission(&EVAC, vec![crew_at("a", 2, 1)], Vec::new());
    spec.evac_available_at_start = true;
    spec.interactables = vec![InteractableSpec {
        id: "case".into(),
        kind: InteractableKind::Loot,
        position: TilePos::new(3, 1),
        value: 250,
        channel_ticks: None,
    }];
    spec.objectives = vec![ObjectiveSpec {
        id: "grab_case".into(),
        kind: ObjectiveKind::Retrieve {
            object_id: "case".into(),
        },
        primary: true,
    }];
    let mut engine = deploy(spec, SimConfig::default());
    engine.queue_command(Command::Interact {
        actor: ActorId(1),
        object_id: "case".into(),
    });
    let events = run_ticks(&mut engine, 25);
    assert!(events.contains(&SimEvent::InteractionCompleted {
        actor: ActorId(1),
        object_id: "case".into(),
    }));
    let case = &engine.session().mission.interactables["case"];
    assert_eq!(case.status, InteractableStatus::Carried(ActorId(1)));
    assert_eq!(engine.snapshot().objectives[0].state, ObjectiveState::InProgress);

    engine.queue_command(Command::Move {
        actor: ActorId(1),
        to: TilePos::new(1, 1),
    });
    run_ticks(&mut engine, 15);
    engine.queue_command(Command::Extract { actor: ActorId(1) });
    engine.tick();

    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.result, MissionResult::TotalVictory);
    assert_eq!(outcome.stats.loot_collected, vec!["case".to_string()]);
    assert_eq!(outcome.stats.loot_value, 250);
    assert_eq!(outcome.objectives["grab_case"], ObjectiveState::Completed);
}

#[test]
fn test_total_victory_when_everyone_extracts() {
    let mut spec = mission(&EVAC, vec![crew_at("a", 1, 1), crew_at("b", 2, 2)], Vec::new());
    spec.evac_available_at_start = true;
    spec.objectives = vec![
        ObjectiveSpec {
            id: "get_out".into(),
            kind: ObjectiveKind::ExtractAll,
            primary: true,
        },
        ObjectiveSpec {
            id: "hold".into(),
            kind: ObjectiveKind::Survive { ticks: 1 },
            primary: false,
        },
    ];
    let mut engine = deploy(spec, SimConfig::default());
    engine.queue_commands([
        Command::Extract { actor: ActorId(1) },
        Command::Extract { actor: ActorId(2) },
    ]);
    engine.tick();

    assert!(engine.is_complete());
    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.result, MissionResult::TotalVictory);
    assert!(outcome.crew.iter().all(|c| c.status == CrewStatus::Alive));

    // Complete sessions no longer advance.
    let tick = engine.time().tick;
    engine.tick();
    assert_eq!(engine.time().tick, tick);
}

#[test]
fn test_defeat_when_all_crew_dead() {
    let spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    let mut engine = deploy(spec, SimConfig::default());
    combat::kill(engine.session_mut(), ActorId(1), None);
    engine.tick();

    let events = engine.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::MissionCompleted { .. })));
    let outcome = engine.outcome().unwrap();
    assert_eq!(outcome.result, MissionResult::Defeat);
    assert_eq!(outcome.crew[0].status, CrewStatus::Dead);
    assert_eq!(engine.phase(), MissionPhase::Complete);
}

fn terminal(crew: Vec<(bool, bool, i32)>, objectives: Vec<(bool, ObjectiveState)>) -> TerminalState {
    TerminalState {
        mission_id: "m".into(),
        crew: crew
            .into_iter()
            .enumerate()
            .map(|(i, (alive, extracted, hp))| CrewRecord {
                id: ActorId(i as u32 + 1),
                name: format!("crew {i}"),
                alive,
                extracted,
                hp,
                max_hp: 100,
                ammo_remaining: 30,
                stats: CombatStats::default(),
            })
            .collect(),
        objectives: objectives
            .into_iter()
            .enumerate()
            .map(|(i, (primary, state))| ObjectiveRecord {
                id: format!("o{i}"),
                primary,
                state,
            })
            .collect(),
        enemies_killed: 0,
        enemies_remaining: 0,
        alarm_triggered: false,
        ticks_elapsed: 100,
        loot: Vec::new(),
        retreated: false,
    }
}

#[test]
fn test_outcome_classification() {
    use ObjectiveState::*;
    let cases = [
        (terminal(vec![(false, false, 0), (false, false, 0)], vec![(true, Completed)]), MissionResult::Defeat),
        (terminal(vec![(true, true, 80)], vec![(true, InProgress)]), MissionResult::Retreat),
        (terminal(vec![(true, true, 80)], vec![(true, Completed), (false, Completed)]), MissionResult::TotalVictory),
        (terminal(vec![(true, false, 80)], vec![(true, Completed), (false, Failed)]), MissionResult::Victory),
        (
            terminal(vec![(true, true, 80), (false, false, 0)], vec![(true, Completed)]),
            MissionResult::PartialSuccess,
        ),
    ];
    for (state, expected) in cases {
        assert_eq!(outcome::classify(&state), expected);
    }
}

#[test]
fn test_outcome_is_pure() {
    let state = terminal(
        vec![(true, true, 30), (true, false, 60), (true, true, 90)],
        vec![(true, ObjectiveState::Completed)],
    );
    let a = outcome::compute(&state);
    let b = outcome::compute(&state.clone());
    assert_eq!(a, b);
    let statuses: Vec<CrewStatus> = a.crew.iter().map(|c| c.status).collect();
    assert_eq!(statuses, vec![CrewStatus::Critical, CrewStatus::Wounded, CrewStatus::Alive]);
}

// ---- Mission build ----

#[test]
fn test_builtin_scenarios_build() {
    for id in [ScenarioId::WarehouseRaid, ScenarioId::Holdout] {
        let engine = SimulationEngine::new(scenario::build(id), SimConfig::default()).unwrap();
        assert_eq!(engine.phase(), MissionPhase::Setup);
        assert!(!engine.snapshot().actors.is_empty());
    }
}

#[test]
fn test_mission_build_errors() {
    let mut spec = wave_mission(WaveTrigger::TimeInPhase { ticks: 0 }, false);
    spec.waves[0].spawn_point = "nowhere".into();
    assert!(matches!(
        SimulationEngine::new(spec, SimConfig::default()),
        Err(MissionBuildError::UnknownSpawnPoint { .. })
    ));

    let mut spec = mission(&WALLED, vec![crew_at("a", 1, 2)], Vec::new());
    spec.interactables = vec![InteractableSpec {
        id: "far".into(),
        kind: InteractableKind::Loot,
        position: TilePos::new(40, 2),
        value: 1,
        channel_ticks: None,
    }];
    assert!(matches!(
        SimulationEngine::new(spec, SimConfig::default()),
        Err(MissionBuildError::OutOfBounds { .. })
    ));

    let spec = mission(&WALLED, vec![crew_at("a", 4, 2)], Vec::new());
    assert!(matches!(
        SimulationEngine::new(spec, SimConfig::default()),
        Err(MissionBuildError::NotWalkable { .. })
    ));

    let spec = mission(&WALLED, Vec::new(), Vec::new());
    assert!(matches!(
        SimulationEngine::new(spec, SimConfig::default()),
        Err(MissionBuildError::NoCrew)
    ));
}
