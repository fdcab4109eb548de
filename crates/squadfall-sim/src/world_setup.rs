//! Mission build: validation of the input contract and actor spawn
//! factories.
//!
//! Inconsistent mission data is rejected here, before the first tick, so
//! systems can assume every reference resolves.

use std::collections::{BTreeMap, BTreeSet};

use hecs::{EntityBuilder, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use squadfall_core::components::*;
use squadfall_core::enums::*;
use squadfall_core::error::MissionBuildError;
use squadfall_core::mission::*;
use squadfall_core::types::{ActorId, SimTime, TilePos};
use squadfall_map::grid::TileGrid;

use crate::engine::SimConfig;
use crate::mission_state::{Interactable, MissionState, ObjectiveRuntime, WaveRuntime};
use crate::session::Session;

/// Validate `spec` and build a session ready for deployment.
pub fn build_session(spec: &MissionSpec, config: SimConfig) -> Result<Session, MissionBuildError> {
    let grid = TileGrid::from_spec(&spec.map)?;
    validate(spec, &grid)?;

    let mut mission = MissionState::new(spec.id.clone(), spec.negotiation);
    mission.objectives = spec
        .objectives
        .iter()
        .map(|o| ObjectiveRuntime {
            spec: o.clone(),
            state: ObjectiveState::Pending,
        })
        .collect();
    mission.waves = spec.waves.iter().cloned().map(WaveRuntime::new).collect();
    mission.spawn_points = spec
        .spawn_points
        .iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect();
    mission.interactables = spec
        .interactables
        .iter()
        .map(|i| (i.id.clone(), Interactable::new(i.clone())))
        .collect();
    if spec.evac_available_at_start {
        mission.evac_available = true;
        mission.evac_at = Some(0);
    }

    let seed = config.seed.unwrap_or(spec.seed);
    let mut session = Session {
        world: World::new(),
        grid,
        index: BTreeMap::new(),
        time: SimTime::default(),
        rng: ChaCha8Rng::seed_from_u64(seed),
        events: Vec::new(),
        mission,
        config,
    };

    for deployment in &spec.crew {
        let pos = place_crew(&session, deployment)?;
        spawn_crew(&mut session, deployment, pos);
    }
    for enemy in &spec.enemies {
        spawn_enemy(&mut session, &enemy.template, enemy.position, None);
    }

    info!(
        mission = %spec.id,
        seed,
        crew = spec.crew.len(),
        enemies = spec.enemies.len(),
        waves = spec.waves.len(),
        "mission built"
    );
    Ok(session)
}

fn out_of_bounds(grid: &TileGrid, what: String, pos: TilePos) -> MissionBuildError {
    MissionBuildError::OutOfBounds {
        what,
        pos,
        width: grid.width(),
        height: grid.height(),
    }
}

fn check_tile(grid: &TileGrid, what: String, pos: TilePos, walkable: bool) -> Result<(), MissionBuildError> {
    if !grid.in_bounds(pos) {
        return Err(out_of_bounds(grid, what, pos));
    }
    if walkable && !grid.is_walkable(pos) {
        return Err(MissionBuildError::NotWalkable { what, pos });
    }
    Ok(())
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a String>) -> Result<(), MissionBuildError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MissionBuildError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

pub fn validate(spec: &MissionSpec, grid: &TileGrid) -> Result<(), MissionBuildError> {
    if spec.crew.is_empty() {
        return Err(MissionBuildError::NoCrew);
    }
    check_unique(spec.interactables.iter().map(|i| &i.id))?;
    check_unique(spec.objectives.iter().map(|o| &o.id))?;
    check_unique(spec.spawn_points.iter().map(|p| &p.id))?;
    check_unique(spec.waves.iter().map(|w| &w.id))?;

    for point in &spec.spawn_points {
        if point.tiles.is_empty() {
            return Err(MissionBuildError::EmptySpawnPoint(point.id.clone()));
        }
        for tile in &point.tiles {
            check_tile(grid, format!("spawn point {}", point.id), *tile, false)?;
        }
        if let Some(door) = point.door {
            check_tile(grid, format!("door of spawn point {}", point.id), door, false)?;
        }
    }

    for wave in &spec.waves {
        if !spec.spawn_points.iter().any(|p| p.id == wave.spawn_point) {
            return Err(MissionBuildError::UnknownSpawnPoint {
                wave: wave.id.clone(),
                spawn_point: wave.spawn_point.clone(),
            });
        }
        if let WaveTrigger::WaveCleared { wave_id } = &wave.trigger {
            if !spec.waves.iter().any(|w| &w.id == wave_id) {
                return Err(MissionBuildError::UnknownWave {
                    wave: wave.id.clone(),
                    prior: wave_id.clone(),
                });
            }
        }
    }

    for object in &spec.interactables {
        check_tile(grid, format!("interactable {}", object.id), object.position, false)?;
    }

    let tags: BTreeSet<&str> = spec
        .enemies
        .iter()
        .map(|e| &e.template)
        .chain(spec.waves.iter().flat_map(|w| w.composition.iter().map(|g| &g.template)))
        .filter_map(|t| t.tag.as_deref())
        .collect();
    for objective in &spec.objectives {
        let missing = |what: &str, id: &str| MissionBuildError::UnknownReference {
            objective: objective.id.clone(),
            what: what.into(),
            id: id.into(),
        };
        let has_object = |id: &str, kind: InteractableKind| {
            spec.interactables.iter().any(|i| i.id == id && i.kind == kind)
        };
        match &objective.kind {
            ObjectiveKind::Retrieve { object_id }
                if !has_object(object_id.as_str(), InteractableKind::Loot) =>
            {
                return Err(missing("loot", object_id.as_str()));
            }
            ObjectiveKind::Hack { object_id }
                if !has_object(object_id.as_str(), InteractableKind::Terminal) =>
            {
                return Err(missing("terminal", object_id.as_str()));
            }
            ObjectiveKind::KillTarget { tag } if !tags.contains(tag.as_str()) => {
                return Err(missing("tag", tag.as_str()));
            }
            _ => {}
        }
    }

    for crew in &spec.crew {
        if let Some(pos) = crew.position {
            check_tile(grid, format!("crew {}", crew.name), pos, true)?;
        }
    }
    for (i, enemy) in spec.enemies.iter().enumerate() {
        check_tile(grid, format!("enemy {i}"), enemy.position, true)?;
    }
    Ok(())
}

/// Explicit position, else the first free entry tile, else the nearest
/// free tile to the entry zone.
fn place_crew(s: &Session, deployment: &CrewDeployment) -> Result<TilePos, MissionBuildError> {
    let occupancy = s.occupancy();
    let free = |p: TilePos| !occupancy.contains_key(&p);
    let entry = s.grid.zone_tiles(ZoneKind::Entry);

    let anchor = match deployment.position {
        Some(pos) if free(pos) => return Ok(pos),
        Some(pos) => pos,
        None => {
            if let Some(pos) = entry.iter().copied().find(|p| s.grid.is_walkable(*p) && free(*p)) {
                return Ok(pos);
            }
            entry.first().copied().unwrap_or_default()
        }
    };
    let radius = s.grid.width().max(s.grid.height()) as i32;
    s.grid
        .nearest_free_tile(anchor, radius, free)
        .ok_or(MissionBuildError::NoFreeTile(anchor))
}

fn weapon_from(spec: &WeaponSpec) -> Weapon {
    Weapon {
        name: spec.name.clone(),
        damage: spec.damage,
        range: spec.range,
        accuracy: spec.accuracy,
        magazine: spec.magazine_size,
        magazine_size: spec.magazine_size,
        reserve: spec.reserve,
        fire_interval_ticks: spec.fire_interval_ticks,
        cooldown: 0,
        reload_remaining: 0,
    }
}

/// Components every actor carries.
#[allow(clippy::too_many_arguments)]
fn actor_bundle(
    id: ActorId,
    name: String,
    faction: Faction,
    pos: TilePos,
    hp: i32,
    armor: ArmorClass,
    weapon: &WeaponSpec,
    speed: f64,
    vision: f64,
) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    builder
        .add(Identity { id, name, faction })
        .add(pos)
        .add(Health::new(hp))
        .add(weapon_from(weapon))
        .add(Armor { class: armor })
        .add(Mobility {
            speed,
            progress: 0.0,
        })
        .add(Vision { range: vision })
        .add(Behavior::default())
        .add(StatusEffects::default())
        .add(OverwatchState::default())
        .add(SuppressionState::default())
        .add(CombatStats::default());
    builder
}

/// Spawn a crew member at `pos`.
pub fn spawn_crew(s: &mut Session, deployment: &CrewDeployment, pos: TilePos) -> ActorId {
    let id = s.mission.allocate_id();
    let mut builder = actor_bundle(
        id,
        deployment.name.clone(),
        Faction::Crew,
        pos,
        deployment.hp,
        deployment.armor,
        &deployment.weapon,
        deployment.speed,
        deployment.vision,
    );
    builder.add(Carrying::default());
    let entity = s.world.spawn(builder.build());
    s.index.insert(id, entity);
    debug!(actor = %id, name = %deployment.name, ?pos, "crew deployed");
    id
}

/// Spawn an enemy at `pos`, optionally as part of a wave.
pub fn spawn_enemy(s: &mut Session, template: &EnemyTemplate, pos: TilePos, wave: Option<&str>) -> ActorId {
    let id = s.mission.allocate_id();
    let interval = s.config.think_interval_ticks.max(1);
    let name = template
        .tag
        .clone()
        .unwrap_or_else(|| format!("{:?} {}", template.role, id.0).to_lowercase());
    let mut builder = actor_bundle(
        id,
        name,
        Faction::Enemy,
        pos,
        template.hp,
        template.armor,
        &template.weapon,
        template.speed,
        template.vision,
    );
    builder.add(EnemyBrain {
        role: template.role,
        // Stagger think ticks so enemies do not all decide on the same tick.
        next_think_tick: s.tick() + id.0 as u64 % interval,
        last_attacker: None,
        home: pos,
    });
    if let Some(tag) = &template.tag {
        builder.add(Tag(tag.clone()));
    }
    if let Some(wave) = wave {
        builder.add(SpawnedBy(wave.to_string()));
    }
    let entity = s.world.spawn(builder.build());
    s.index.insert(id, entity);
    debug!(actor = %id, role = ?template.role, ?pos, wave, "enemy spawned");
    id
}
