//! Scenario definitions: built-in missions.
//!
//! Each scenario is a complete `MissionSpec`: map, crew, enemies,
//! objectives and reinforcement waves.

use serde::{Deserialize, Serialize};

use squadfall_core::constants::TICK_RATE;
use squadfall_core::enums::*;
use squadfall_core::mission::*;
use squadfall_core::types::TilePos;

/// Built-in missions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    WarehouseRaid,
    Holdout,
}

/// Build the mission for a given scenario.
pub fn build(scenario: ScenarioId) -> MissionSpec {
    match scenario {
        ScenarioId::WarehouseRaid => warehouse_raid(),
        ScenarioId::Holdout => holdout(),
    }
}

fn secs_to_ticks(secs: f64) -> u64 {
    (secs * TICK_RATE as f64) as u64
}

fn rows(lines: &[&str]) -> MapSpec {
    MapSpec {
        width: lines.first().map_or(0, |l| l.chars().count() as u32),
        height: lines.len() as u32,
        rows: lines.iter().map(|l| l.to_string()).collect(),
        cover: Vec::new(),
    }
}

fn crew(name: &str, hp: i32, armor: ArmorClass, weapon: WeaponSpec) -> CrewDeployment {
    CrewDeployment {
        name: name.into(),
        hp,
        armor,
        weapon,
        speed: 3.0,
        vision: 10.0,
        position: None,
    }
}

fn enemy(role: EnemyRole, hp: i32, armor: ArmorClass, weapon: WeaponSpec) -> EnemyTemplate {
    EnemyTemplate {
        role,
        hp,
        armor,
        weapon,
        speed: 2.5,
        vision: 9.0,
        tag: None,
    }
}

fn tagged(template: EnemyTemplate, tag: &str) -> EnemyTemplate {
    EnemyTemplate {
        tag: Some(tag.into()),
        ..template
    }
}

fn at(template: EnemyTemplate, x: i32, y: i32) -> EnemySpawn {
    EnemySpawn {
        template,
        position: TilePos::new(x, y),
    }
}

/// "Warehouse Raid"
/// Steal the ledger from the east office and get out. The alarm brings a
/// response team through the loading dock; a second team arrives through
/// the office door once the fight drags on.
pub fn warehouse_raid() -> MissionSpec {
    MissionSpec {
        id: "warehouse_raid".into(),
        tags: vec!["heist".into(), "urban".into()],
        seed: 7,
        map: rows(&[
            "####################",
            "#EE.....#..........#",
            "#EE..l..#...h......#",
            "#EE.....D..........#",
            "#.......#....H.....#",
            "#XX.h...#..........#",
            "#XX.....#......l...#",
            "#.......####.#######",
            "#..................#",
            "#......h.......h...#",
            "#..................#",
            "####################",
        ]),
        crew: vec![
            crew("Vance", 100, ArmorClass::Light, WeaponSpec::rifle()),
            crew("Okafor", 90, ArmorClass::Light, WeaponSpec::smg()),
            crew("Reyes", 120, ArmorClass::Medium, WeaponSpec::machine_gun()),
        ],
        enemies: vec![
            at(enemy(EnemyRole::Guard, 60, ArmorClass::Light, WeaponSpec::pistol()), 11, 3),
            at(enemy(EnemyRole::Guard, 60, ArmorClass::Light, WeaponSpec::pistol()), 15, 5),
            at(
                tagged(
                    enemy(EnemyRole::Officer, 80, ArmorClass::Medium, WeaponSpec::rifle()),
                    "foreman",
                ),
                16,
                2,
            ),
            at(enemy(EnemyRole::Flanker, 70, ArmorClass::Light, WeaponSpec::smg()), 10, 9),
        ],
        interactables: vec![
            InteractableSpec {
                id: "ledger".into(),
                kind: InteractableKind::Loot,
                position: TilePos::new(17, 1),
                value: 500,
                channel_ticks: None,
            },
            InteractableSpec {
                id: "vault_console".into(),
                kind: InteractableKind::Terminal,
                position: TilePos::new(18, 4),
                value: 0,
                channel_ticks: None,
            },
        ],
        objectives: vec![
            ObjectiveSpec {
                id: "steal_ledger".into(),
                kind: ObjectiveKind::Retrieve {
                    object_id: "ledger".into(),
                },
                primary: true,
            },
            ObjectiveSpec {
                id: "crack_vault".into(),
                kind: ObjectiveKind::Hack {
                    object_id: "vault_console".into(),
                },
                primary: false,
            },
            ObjectiveSpec {
                id: "remove_foreman".into(),
                kind: ObjectiveKind::KillTarget {
                    tag: "foreman".into(),
                },
                primary: false,
            },
        ],
        spawn_points: vec![
            SpawnPointSpec {
                id: "loading_dock".into(),
                tiles: vec![TilePos::new(17, 9), TilePos::new(18, 9), TilePos::new(18, 10)],
                los_gated: true,
                door: None,
            },
            SpawnPointSpec {
                id: "office".into(),
                tiles: vec![TilePos::new(10, 1), TilePos::new(11, 1)],
                los_gated: false,
                door: Some(TilePos::new(8, 3)),
            },
        ],
        waves: vec![
            WaveDefinition {
                id: "response".into(),
                required_phase: MissionPhase::Contact,
                composition: vec![
                    WaveGroup {
                        template: enemy(EnemyRole::Guard, 60, ArmorClass::Light, WeaponSpec::pistol()),
                        count: 2,
                    },
                    WaveGroup {
                        template: enemy(
                            EnemyRole::Heavy,
                            140,
                            ArmorClass::Heavy,
                            WeaponSpec::machine_gun(),
                        ),
                        count: 1,
                    },
                ],
                spawn_point: "loading_dock".into(),
                trigger: WaveTrigger::OnEvent {
                    event: TriggerEvent::AlarmRaised,
                },
            },
            WaveDefinition {
                id: "second_team".into(),
                required_phase: MissionPhase::Pressure,
                composition: vec![
                    WaveGroup {
                        template: enemy(EnemyRole::Flanker, 70, ArmorClass::Light, WeaponSpec::smg()),
                        count: 1,
                    },
                    WaveGroup {
                        template: enemy(
                            EnemyRole::Suppressor,
                            80,
                            ArmorClass::Medium,
                            WeaponSpec::machine_gun(),
                        ),
                        count: 1,
                    },
                ],
                spawn_point: "office".into(),
                trigger: WaveTrigger::TimeInPhase {
                    ticks: secs_to_ticks(10.0),
                },
            },
        ],
        negotiation: false,
        evac_available_at_start: false,
    }
}

/// "Holdout"
/// Hold the yard until the clock runs out. Wounding the warlord calls in
/// his bodyguards; wiping them out brings a last push.
pub fn holdout() -> MissionSpec {
    MissionSpec {
        id: "holdout".into(),
        tags: vec!["defense".into()],
        seed: 1337,
        map: rows(&[
            "##############",
            "#..........X.#",
            "#.h....h...X.#",
            "#............#",
            "#...EE.......#",
            "#...EE...H...#",
            "#............#",
            "#.l......h...#",
            "#............#",
            "##############",
        ]),
        crew: vec![
            crew("Mercer", 110, ArmorClass::Medium, WeaponSpec::rifle()),
            crew("Ilse", 90, ArmorClass::Light, WeaponSpec::smg()),
        ],
        enemies: vec![
            at(
                tagged(
                    enemy(EnemyRole::Boss, 220, ArmorClass::Medium, WeaponSpec::machine_gun()),
                    "warlord",
                ),
                11,
                7,
            ),
            at(enemy(EnemyRole::Heavy, 140, ArmorClass::Heavy, WeaponSpec::machine_gun()), 12, 4),
        ],
        interactables: Vec::new(),
        objectives: vec![
            ObjectiveSpec {
                id: "hold_the_yard".into(),
                kind: ObjectiveKind::Survive {
                    ticks: secs_to_ticks(60.0),
                },
                primary: true,
            },
            ObjectiveSpec {
                id: "kill_warlord".into(),
                kind: ObjectiveKind::KillTarget {
                    tag: "warlord".into(),
                },
                primary: false,
            },
        ],
        spawn_points: vec![SpawnPointSpec {
            id: "east_gate".into(),
            tiles: vec![TilePos::new(12, 1), TilePos::new(12, 2), TilePos::new(12, 3)],
            los_gated: false,
            door: None,
        }],
        waves: vec![
            WaveDefinition {
                id: "bodyguards".into(),
                required_phase: MissionPhase::Contact,
                composition: vec![WaveGroup {
                    template: enemy(EnemyRole::Guard, 60, ArmorClass::Light, WeaponSpec::rifle()),
                    count: 2,
                }],
                spawn_point: "east_gate".into(),
                trigger: WaveTrigger::ActorHpBelow {
                    tag: "warlord".into(),
                    threshold: 0.5,
                },
            },
            WaveDefinition {
                id: "last_push".into(),
                required_phase: MissionPhase::Contact,
                composition: vec![WaveGroup {
                    template: enemy(EnemyRole::Flanker, 70, ArmorClass::Light, WeaponSpec::smg()),
                    count: 2,
                }],
                spawn_point: "east_gate".into(),
                trigger: WaveTrigger::WaveCleared {
                    wave_id: "bodyguards".into(),
                },
            },
        ],
        negotiation: true,
        evac_available_at_start: false,
    }
}
