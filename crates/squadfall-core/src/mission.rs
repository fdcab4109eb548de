//! Mission input contract supplied by the campaign layer.
//!
//! Everything here is plain serde data. The sim crate validates it when
//! building a session and reports inconsistencies as `MissionBuildError`.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VISION_RANGE;
use crate::enums::*;
use crate::types::{Direction8, TilePos};

/// Complete description of one mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSpec {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub seed: u64,
    pub map: MapSpec,
    pub crew: Vec<CrewDeployment>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub interactables: Vec<InteractableSpec>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveSpec>,
    #[serde(default)]
    pub spawn_points: Vec<SpawnPointSpec>,
    #[serde(default)]
    pub waves: Vec<WaveDefinition>,
    /// Whether the mission opens with a negotiation phase.
    #[serde(default)]
    pub negotiation: bool,
    /// Whether evac can be used from the first tick.
    #[serde(default)]
    pub evac_available_at_start: bool,
}

/// Grid template.
///
/// Glyphs: `.` floor, `#` wall, ` ` void, `E` entry-zone floor,
/// `X` evac-zone floor, `D` closed door (wall until opened),
/// `l`/`h`/`H` low/half/high cover obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<String>,
    /// Explicit directional cover overrides applied after glyph-derived cover.
    #[serde(default)]
    pub cover: Vec<CoverSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverSpec {
    pub pos: TilePos,
    pub direction: Direction8,
    pub level: CoverLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub name: String,
    pub damage: i32,
    pub range: f64,
    pub accuracy: f64,
    pub magazine_size: u32,
    pub reserve: u32,
    pub fire_interval_ticks: u32,
}

impl WeaponSpec {
    pub fn pistol() -> Self {
        Self {
            name: "pistol".into(),
            damage: 15,
            range: 8.0,
            accuracy: 0.75,
            magazine_size: 12,
            reserve: 36,
            fire_interval_ticks: 10,
        }
    }

    pub fn rifle() -> Self {
        Self {
            name: "rifle".into(),
            damage: 25,
            range: 12.0,
            accuracy: 0.7,
            magazine_size: 30,
            reserve: 90,
            fire_interval_ticks: 14,
        }
    }

    pub fn smg() -> Self {
        Self {
            name: "smg".into(),
            damage: 18,
            range: 7.0,
            accuracy: 0.65,
            magazine_size: 30,
            reserve: 90,
            fire_interval_ticks: 6,
        }
    }

    pub fn machine_gun() -> Self {
        Self {
            name: "machine gun".into(),
            damage: 22,
            range: 14.0,
            accuracy: 0.55,
            magazine_size: 60,
            reserve: 180,
            fire_interval_ticks: 8,
        }
    }
}

fn default_vision() -> f64 {
    DEFAULT_VISION_RANGE
}

fn default_speed() -> f64 {
    3.0
}

/// One crew member brought into the mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewDeployment {
    pub name: String,
    pub hp: i32,
    #[serde(default)]
    pub armor: ArmorClass,
    pub weapon: WeaponSpec,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_vision")]
    pub vision: f64,
    /// Explicit placement; otherwise the first free entry-zone tile.
    #[serde(default)]
    pub position: Option<TilePos>,
}

/// Stats shared by pre-placed enemies and wave groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub role: EnemyRole,
    pub hp: i32,
    #[serde(default)]
    pub armor: ArmorClass,
    pub weapon: WeaponSpec,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_vision")]
    pub vision: f64,
    /// Name used by kill-target objectives and HP triggers.
    #[serde(default)]
    pub tag: Option<String>,
}

/// Enemy placed at mission build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    #[serde(flatten)]
    pub template: EnemyTemplate,
    pub position: TilePos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableSpec {
    pub id: String,
    pub kind: InteractableKind,
    pub position: TilePos,
    /// Campaign value of loot.
    #[serde(default)]
    pub value: u32,
    /// Channel length; defaults per kind when absent.
    #[serde(default)]
    pub channel_ticks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectiveKind {
    /// Keep at least one crew member alive for this many ticks of live play.
    Survive { ticks: u64 },
    /// Every surviving crew member extracts and none die.
    ExtractAll,
    /// The tagged enemy dies.
    KillTarget { tag: String },
    /// The loot item is carried out through evac.
    Retrieve { object_id: String },
    /// The terminal is hacked.
    Hack { object_id: String },
    /// No enemy remains alive and no wave is still pending.
    EliminateAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    pub id: String,
    pub kind: ObjectiveKind,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPointSpec {
    pub id: String,
    pub tiles: Vec<TilePos>,
    /// Defer spawning while crew can see any of the tiles.
    #[serde(default)]
    pub los_gated: bool,
    /// Door tile opened when a wave uses this point.
    #[serde(default)]
    pub door: Option<TilePos>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveGroup {
    pub template: EnemyTemplate,
    pub count: u32,
}

/// Named mission events a wave can wait for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TriggerEvent {
    AlarmRaised,
    PhaseEntered { phase: MissionPhase },
    ObjectiveCompleted { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveTrigger {
    /// Ticks since the required phase began.
    TimeInPhase { ticks: u64 },
    OnEvent { event: TriggerEvent },
    /// The tagged actor's HP fraction is at or below `threshold`.
    ActorHpBelow { tag: String, threshold: f64 },
    /// Every enemy of the named wave is dead.
    WaveCleared { wave_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    pub id: String,
    pub required_phase: MissionPhase,
    pub composition: Vec<WaveGroup>,
    pub spawn_point: String,
    pub trigger: WaveTrigger,
}

impl WaveDefinition {
    pub fn total_enemies(&self) -> u32 {
        self.composition.iter().map(|g| g.count).sum()
    }
}
