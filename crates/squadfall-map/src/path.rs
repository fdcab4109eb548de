//! A* path search over the 8-connected walkable grid.
//!
//! Integer costs (10 orthogonal, 14 diagonal) and ordered maps keep the
//! result identical across runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use squadfall_core::types::TilePos;

use crate::grid::TileGrid;

const ORTHOGONAL_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Safety limit on expanded nodes.
const MAX_EXPANSIONS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct State {
    cost: u32,
    pos: TilePos,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on cost, ties broken by position for determinism.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: TilePos, b: TilePos) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * lo + ORTHOGONAL_COST * (hi - lo)
}

/// Shortest walkable path from `start` to `goal`, excluding `start`.
///
/// `blocked` marks extra impassable tiles (e.g. occupied by other actors);
/// the goal itself is never treated as blocked. Returns `Some(vec![])` when
/// already at the goal.
pub fn find_path(
    grid: &TileGrid,
    start: TilePos,
    goal: TilePos,
    blocked: impl Fn(TilePos) -> bool,
) -> Option<Vec<TilePos>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !grid.is_walkable(goal) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut came_from: BTreeMap<TilePos, TilePos> = BTreeMap::new();
    let mut g_score: BTreeMap<TilePos, u32> = BTreeMap::new();
    g_score.insert(start, 0);
    open.push(State {
        cost: heuristic(start, goal),
        pos: start,
    });

    let mut expansions = 0;
    while let Some(State { pos: current, .. }) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, current, start));
        }
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return None;
        }

        let current_g = g_score[&current];
        for (next, dir) in grid.walkable_neighbors(current) {
            if next != goal && blocked(next) {
                continue;
            }
            let step = if dir.is_diagonal() {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            };
            let tentative = current_g + step;
            if tentative < *g_score.get(&next).unwrap_or(&u32::MAX) {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                open.push(State {
                    cost: tentative + heuristic(next, goal),
                    pos: next,
                });
            }
        }
    }
    None
}

fn reconstruct(came_from: &BTreeMap<TilePos, TilePos>, mut current: TilePos, start: TilePos) -> Vec<TilePos> {
    let mut path = vec![current];
    while let Some(prev) = came_from.get(&current) {
        if *prev == start {
            break;
        }
        current = *prev;
        path.push(current);
    }
    path.reverse();
    path
}
