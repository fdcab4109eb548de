//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Combat resolution ---

/// Hit chance never drops below this after all modifiers.
pub const MIN_HIT_CHANCE: f64 = 0.05;

/// Hit chance never exceeds this after all modifiers.
pub const MAX_HIT_CHANCE: f64 = 0.95;

/// Fraction of weapon range inside which there is no range penalty.
pub const RANGE_FALLOFF_START: f64 = 0.5;

/// Accuracy multiplier at exactly maximum range.
pub const RANGE_FALLOFF_MIN: f64 = 0.6;

pub const COVER_REDUCTION_LOW: f64 = 0.15;
pub const COVER_REDUCTION_HALF: f64 = 0.30;
pub const COVER_REDUCTION_HIGH: f64 = 0.45;
pub const COVER_REDUCTION_FULL: f64 = 0.60;

/// Minimum damage of any hit.
pub const MIN_DAMAGE: i32 = 1;

/// Ticks spent reloading from reserve.
pub const RELOAD_TICKS: u32 = 40;

// --- Knockdown ---

/// Single-hit damage as fraction of max HP that knocks an actor down.
pub const KNOCKDOWN_DAMAGE_FRACTION: f64 = 0.4;

/// How long a knockdown lasts.
pub const KNOCKDOWN_TICKS: u32 = 30;

// --- Perception ---

/// Default vision radius in tiles.
pub const DEFAULT_VISION_RANGE: f64 = 10.0;

/// Radius (tiles) around a shooter within which idle enemies hear gunfire.
pub const GUNFIRE_NOISE_RADIUS: f64 = 8.0;

// --- Overwatch ---

/// Reaction shots granted when entering overwatch.
pub const OVERWATCH_DEFAULT_SHOTS: u32 = 2;

/// Half-angle of a directional overwatch cone (degrees).
pub const OVERWATCH_CONE_HALF_ANGLE_DEG: f64 = 45.0;

/// Baseline accuracy multiplier for snap reaction shots.
pub const OVERWATCH_REACTION_ACCURACY: f64 = 0.85;

// --- Suppression ---

/// Rounds consumed by one suppressive burst.
pub const SUPPRESS_AMMO_COST: u32 = 5;

/// Damage multiplier for suppressive fire hits.
pub const SUPPRESS_DAMAGE_MULT: f64 = 0.5;

/// Accuracy multiplier for suppressive bursts.
pub const SUPPRESS_ACCURACY_MULT: f64 = 0.8;

/// Maximum scatter (tiles) of a missed burst.
pub const SUPPRESS_SCATTER_MAX: u32 = 4;

/// Scatter at or below this is a near miss.
pub const SUPPRESS_NEAR_MISS_TILES: f64 = 1.0;

/// Scatter at or below this (and above near) is a far miss; beyond it nothing.
pub const SUPPRESS_FAR_MISS_TILES: f64 = 3.0;

pub const SUPPRESS_NEAR_MISS_CHANCE: f64 = 0.75;
pub const SUPPRESS_FAR_MISS_CHANCE: f64 = 0.30;

/// Area radius (tiles) of a tile-targeted burst.
pub const SUPPRESS_AREA_RADIUS: f64 = 2.0;

/// Duration of the Suppressed status; refreshed, never stacked.
pub const SUPPRESSED_DURATION_TICKS: u32 = 80;

pub const SUPPRESSED_ACCURACY_MULT: f64 = 0.6;
pub const SUPPRESSED_SPEED_MULT: f64 = 0.5;
pub const SUPPRESSED_OVERWATCH_MULT: f64 = 0.5;

// --- Officer aura ---

pub const OFFICER_AURA_RADIUS: f64 = 5.0;
pub const OFFICER_AURA_ACCURACY_MULT: f64 = 1.15;

// --- Movement ---

/// Ticks an actor waits on an occupied tile before re-pathing.
pub const BLOCKED_REPATH_TICKS: u32 = 10;

/// Cost of a diagonal step relative to an orthogonal one.
pub const DIAGONAL_STEP_COST: f64 = std::f64::consts::SQRT_2;

// --- Spawning ---

/// Maximum BFS radius when looking for a free spawn tile.
pub const SPAWN_SEARCH_RADIUS: i32 = 6;

// --- Interaction ---

/// Ticks to pick up a loot item.
pub const LOOT_PICKUP_TICKS: u32 = 20;

/// Ticks to hack a terminal.
pub const HACK_CHANNEL_TICKS: u32 = 100;

/// Max Chebyshev distance between an actor and an object it interacts with.
pub const INTERACT_REACH: i32 = 1;

// --- AI ---

/// Radius (tiles) of candidate positions an enemy considers per think.
pub const AI_CANDIDATE_RADIUS: i32 = 6;

/// Radius (tiles) of candidate retreat positions.
pub const AI_RETREAT_RADIUS: i32 = 8;

// --- Outcome ---

pub const WOUNDED_HP_FRACTION: f64 = 0.66;
pub const CRITICAL_HP_FRACTION: f64 = 0.33;

pub const XP_SURVIVAL: u32 = 50;
pub const XP_PER_KILL: u32 = 25;
pub const XP_PER_HIT: u32 = 2;
pub const XP_EXTRACTION_BONUS: u32 = 20;
