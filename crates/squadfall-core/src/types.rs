//! Fundamental geometric and simulation types.

use serde::{Deserialize, Serialize};

/// Stable identifier for an actor, unique within one mission session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer grid position. x = column (east), y = row (south).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(&self, dir: Direction8) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    /// Euclidean distance in tiles.
    pub fn distance_to(&self, other: &TilePos) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// King-move distance (diagonal steps count as one).
    pub fn chebyshev_to(&self, other: &TilePos) -> i32 {
        (other.x - self.x).abs().max((other.y - self.y).abs())
    }

    /// 8-direction bucket of the vector from `self` toward `other`.
    pub fn direction_to(&self, other: &TilePos) -> Option<Direction8> {
        Direction8::from_delta(other.x - self.x, other.y - self.y)
    }
}

/// The eight compass buckets used for cover tables and overwatch facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction8 {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction8 {
    pub const ALL: [Direction8; 8] = [
        Direction8::N,
        Direction8::NE,
        Direction8::E,
        Direction8::SE,
        Direction8::S,
        Direction8::SW,
        Direction8::W,
        Direction8::NW,
    ];

    /// Index into an 8-entry table, clockwise from north.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction8::N => (0, -1),
            Direction8::NE => (1, -1),
            Direction8::E => (1, 0),
            Direction8::SE => (1, 1),
            Direction8::S => (0, 1),
            Direction8::SW => (-1, 1),
            Direction8::W => (-1, 0),
            Direction8::NW => (-1, -1),
        }
    }

    pub fn opposite(self) -> Direction8 {
        Self::ALL[(self.index() + 4) % 8]
    }

    pub fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Bucket an arbitrary vector into one of eight 45° sectors.
    ///
    /// Uses integer slope comparison against tan(22.5°) ≈ 0.4142 so the
    /// result does not depend on platform float behaviour.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction8> {
        if dx == 0 && dy == 0 {
            return None;
        }
        let ax = dx.unsigned_abs() as u64;
        let ay = dy.unsigned_abs() as u64;

        let dir = if ay * 10_000 <= ax * 4_142 {
            if dx > 0 {
                Direction8::E
            } else {
                Direction8::W
            }
        } else if ax * 10_000 <= ay * 4_142 {
            if dy > 0 {
                Direction8::S
            } else {
                Direction8::N
            }
        } else {
            match (dx > 0, dy > 0) {
                (true, true) => Direction8::SE,
                (true, false) => Direction8::NE,
                (false, true) => Direction8::SW,
                (false, false) => Direction8::NW,
            }
        };
        Some(dir)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each running tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }
}
