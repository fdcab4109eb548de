//! Grid line-of-sight.
//!
//! Bresenham trace between tile centres. Any Wall or Void tile strictly
//! between the endpoints blocks. The trace always runs from the smaller
//! endpoint to the larger so that LOS is symmetric.

use squadfall_core::types::TilePos;

use crate::grid::TileGrid;

/// Tiles visited by a Bresenham line from `from` to `to`, both inclusive.
pub fn line(from: TilePos, to: TilePos) -> Vec<TilePos> {
    let mut x0 = from.x;
    let mut y0 = from.y;
    let x1 = to.x;
    let y1 = to.y;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut out = Vec::with_capacity((dx - dy) as usize + 1);
    loop {
        out.push(TilePos::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    out
}

/// Whether `a` can see `b` across the grid.
pub fn has_line_of_sight(grid: &TileGrid, a: TilePos, b: TilePos) -> bool {
    if !grid.in_bounds(a) || !grid.in_bounds(b) {
        return false;
    }
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    let traced = line(from, to);
    traced
        .iter()
        .skip(1)
        .take(traced.len().saturating_sub(2))
        .all(|pos| !grid.blocks_los(*pos))
}

/// LOS plus a Euclidean range limit.
pub fn can_see(grid: &TileGrid, from: TilePos, to: TilePos, range: f64) -> bool {
    from.distance_to(&to) <= range && has_line_of_sight(grid, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squadfall_core::mission::MapSpec;

    fn grid(rows: &[&str]) -> TileGrid {
        TileGrid::from_spec(&MapSpec {
            width: rows[0].len() as u32,
            height: rows.len() as u32,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            cover: Vec::new(),
        })
        .unwrap()
    }

    #[test]
    fn test_line_endpoints_and_length() {
        let traced = line(TilePos::new(0, 0), TilePos::new(4, 2));
        assert_eq!(traced.first(), Some(&TilePos::new(0, 0)));
        assert_eq!(traced.last(), Some(&TilePos::new(4, 2)));
        assert_eq!(traced.len(), 5);
    }

    #[test]
    fn test_los_open_floor() {
        let g = grid(&[".....", ".....", "....."]);
        assert!(has_line_of_sight(&g, TilePos::new(0, 0), TilePos::new(4, 2)));
    }

    #[test]
    fn test_los_blocked_by_wall() {
        let g = grid(&["..#..", "..#..", "..#.."]);
        assert!(!has_line_of_sight(&g, TilePos::new(0, 1), TilePos::new(4, 1)));
    }

    #[test]
    fn test_los_blocked_by_void_not_by_obstacle() {
        let g = grid(&[". .", ".h."]);
        assert!(!has_line_of_sight(&g, TilePos::new(0, 0), TilePos::new(2, 0)));
        assert!(has_line_of_sight(&g, TilePos::new(0, 1), TilePos::new(2, 1)));
    }

    #[test]
    fn test_los_symmetric() {
        let g = grid(&["......", "..#...", "....#.", "......"]);
        for a in g.positions() {
            for b in g.positions() {
                assert_eq!(
                    has_line_of_sight(&g, a, b),
                    has_line_of_sight(&g, b, a),
                    "asymmetric LOS between {a:?} and {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_can_see_respects_range() {
        let g = grid(&["........"]);
        assert!(can_see(&g, TilePos::new(0, 0), TilePos::new(5, 0), 5.0));
        assert!(!can_see(&g, TilePos::new(0, 0), TilePos::new(6, 0), 5.0));
    }
}
