//! TileGrid: walkability, LOS blocking, zones and the per-tile cover table.

use std::collections::{BTreeSet, VecDeque};

use squadfall_core::enums::{CoverLevel, TileType, ZoneKind};
use squadfall_core::error::MissionBuildError;
use squadfall_core::mission::{CoverSpec, MapSpec};
use squadfall_core::types::{Direction8, TilePos};

/// One grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    pub kind: TileType,
    /// Cover this tile offers against attacks arriving from each direction.
    pub cover: [CoverLevel; 8],
    pub zone: ZoneKind,
    /// Furniture that cannot be entered but does not block sight.
    pub obstacle: Option<CoverLevel>,
    /// Closed doors are walls that can be opened.
    pub door: bool,
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        self.kind == TileType::Floor && self.obstacle.is_none()
    }

    pub fn blocks_los(&self) -> bool {
        matches!(self.kind, TileType::Wall | TileType::Void)
    }
}

/// Rectangular tile map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    overrides: Vec<CoverSpec>,
}

impl TileGrid {
    /// Open floor grid with no cover.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); (width * height) as usize],
            overrides: Vec::new(),
        }
    }

    /// Build from a glyph template, deriving cover from adjacent walls and
    /// obstacles, then applying explicit overrides.
    pub fn from_spec(spec: &MapSpec) -> Result<Self, MissionBuildError> {
        if spec.rows.len() != spec.height as usize {
            return Err(MissionBuildError::RowCount {
                expected: spec.height,
                found: spec.rows.len(),
            });
        }

        let mut grid = Self::new(spec.width, spec.height);
        for (y, row) in spec.rows.iter().enumerate() {
            let glyphs: Vec<char> = row.chars().collect();
            if glyphs.len() != spec.width as usize {
                return Err(MissionBuildError::RowWidth {
                    row: y,
                    expected: spec.width,
                    found: glyphs.len(),
                });
            }
            for (x, glyph) in glyphs.into_iter().enumerate() {
                let pos = TilePos::new(x as i32, y as i32);
                let tile = parse_glyph(glyph)
                    .ok_or(MissionBuildError::UnknownGlyph { glyph, pos })?;
                let idx = grid.index(pos);
                grid.tiles[idx] = tile;
            }
        }

        for cover in &spec.cover {
            if !grid.in_bounds(cover.pos) {
                return Err(MissionBuildError::OutOfBounds {
                    what: "cover override".into(),
                    pos: cover.pos,
                    width: spec.width,
                    height: spec.height,
                });
            }
        }
        grid.overrides = spec.cover.clone();
        grid.derive_cover();
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: TilePos) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(&self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    /// Out-of-bounds tiles are never walkable.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(Tile::is_walkable)
    }

    /// Out-of-bounds tiles always block sight.
    pub fn blocks_los(&self, pos: TilePos) -> bool {
        self.tile(pos).is_none_or(Tile::blocks_los)
    }

    pub fn set_kind(&mut self, pos: TilePos, kind: TileType) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles[idx].kind = kind;
            self.derive_cover();
        }
    }

    /// Turn a closed door into floor. Returns false if `pos` is not a closed door.
    pub fn open_door(&mut self, pos: TilePos) -> bool {
        match self.tile(pos) {
            Some(tile) if tile.door && tile.kind == TileType::Wall => {
                self.set_kind(pos, TileType::Floor);
                true
            }
            _ => false,
        }
    }

    /// Cover the tile at `pos` offers against attacks from `dir`.
    pub fn cover_toward(&self, pos: TilePos, dir: Direction8) -> CoverLevel {
        self.tile(pos)
            .map(|t| t.cover[dir.index()])
            .unwrap_or_default()
    }

    pub fn zone_at(&self, pos: TilePos) -> ZoneKind {
        self.tile(pos).map(|t| t.zone).unwrap_or_default()
    }

    /// All tiles of a zone in row-major order.
    pub fn zone_tiles(&self, zone: ZoneKind) -> Vec<TilePos> {
        self.positions()
            .filter(|p| self.zone_at(*p) == zone)
            .collect()
    }

    /// Replace the membership of `zone` with `tiles`.
    pub fn set_zone(&mut self, zone: ZoneKind, tiles: &[TilePos]) {
        for tile in &mut self.tiles {
            if tile.zone == zone {
                tile.zone = ZoneKind::None;
            }
        }
        for pos in tiles {
            if self.in_bounds(*pos) {
                let idx = self.index(*pos);
                self.tiles[idx].zone = zone;
            }
        }
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| TilePos::new(x, y)))
    }

    /// Walkable 8-neighbours. Diagonal steps may not cut a blocked corner.
    pub fn walkable_neighbors(&self, pos: TilePos) -> Vec<(TilePos, Direction8)> {
        let mut out = Vec::with_capacity(8);
        for dir in Direction8::ALL {
            let next = pos.step(dir);
            if !self.is_walkable(next) {
                continue;
            }
            if dir.is_diagonal() {
                let (dx, dy) = dir.delta();
                if !self.is_walkable(pos.offset(dx, 0)) || !self.is_walkable(pos.offset(0, dy)) {
                    continue;
                }
            }
            out.push((next, dir));
        }
        out
    }

    /// Breadth-first search for the closest walkable tile satisfying `is_free`.
    pub fn nearest_free_tile(
        &self,
        origin: TilePos,
        max_radius: i32,
        is_free: impl Fn(TilePos) -> bool,
    ) -> Option<TilePos> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back((origin, 0));
        visited.insert(origin);

        while let Some((pos, distance)) = queue.pop_front() {
            if self.is_walkable(pos) && is_free(pos) {
                return Some(pos);
            }
            if distance >= max_radius {
                continue;
            }
            for dir in Direction8::ALL {
                let next = pos.step(dir);
                if self.in_bounds(next) && visited.insert(next) {
                    queue.push_back((next, distance + 1));
                }
            }
        }
        None
    }

    fn derive_cover(&mut self) {
        for pos in self.positions().collect::<Vec<_>>() {
            let mut table = [CoverLevel::None; 8];
            if self.is_walkable(pos) {
                for dir in Direction8::ALL {
                    table[dir.index()] = self.neighbor_cover(pos, dir);
                }
            }
            let idx = self.index(pos);
            self.tiles[idx].cover = table;
        }
        for cover in self.overrides.clone() {
            let idx = self.index(cover.pos);
            self.tiles[idx].cover[cover.direction.index()] = cover.level;
        }
    }

    fn neighbor_cover(&self, pos: TilePos, dir: Direction8) -> CoverLevel {
        let Some(neighbor) = self.tile(pos.step(dir)) else {
            return CoverLevel::None;
        };
        if let Some(level) = neighbor.obstacle {
            return if dir.is_diagonal() {
                level.min(CoverLevel::Low)
            } else {
                level
            };
        }
        match neighbor.kind {
            TileType::Wall if dir.is_diagonal() => CoverLevel::Half,
            TileType::Wall => CoverLevel::High,
            _ => CoverLevel::None,
        }
    }
}

fn parse_glyph(glyph: char) -> Option<Tile> {
    let mut tile = Tile::default();
    match glyph {
        '.' => {}
        '#' => tile.kind = TileType::Wall,
        ' ' => tile.kind = TileType::Void,
        'E' => tile.zone = ZoneKind::Entry,
        'X' => tile.zone = ZoneKind::Evac,
        'D' => {
            tile.kind = TileType::Wall;
            tile.door = true;
        }
        'l' => tile.obstacle = Some(CoverLevel::Low),
        'h' => tile.obstacle = Some(CoverLevel::Half),
        'H' => tile.obstacle = Some(CoverLevel::High),
        _ => return None,
    }
    Some(tile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(rows: &[&str]) -> MapSpec {
        MapSpec {
            width: rows[0].len() as u32,
            height: rows.len() as u32,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            cover: Vec::new(),
        }
    }

    #[test]
    fn test_parse_template() {
        let grid = TileGrid::from_spec(&spec(&["E.#", ".h.", " DX"])).unwrap();
        assert!(grid.is_walkable(TilePos::new(0, 0)));
        assert_eq!(grid.zone_at(TilePos::new(0, 0)), ZoneKind::Entry);
        assert!(!grid.is_walkable(TilePos::new(2, 0)));
        assert!(!grid.is_walkable(TilePos::new(1, 1)), "obstacles are not walkable");
        assert!(!grid.blocks_los(TilePos::new(1, 1)), "obstacles do not block sight");
        assert!(grid.blocks_los(TilePos::new(0, 2)));
        assert_eq!(grid.zone_tiles(ZoneKind::Evac), vec![TilePos::new(2, 2)]);
    }

    #[test]
    fn test_bad_template_rejected() {
        assert!(matches!(
            TileGrid::from_spec(&spec(&["..", "."])),
            Err(MissionBuildError::RowWidth { row: 1, .. })
        ));
        assert!(matches!(
            TileGrid::from_spec(&spec(&[".?"])),
            Err(MissionBuildError::UnknownGlyph { glyph: '?', .. })
        ));
    }

    #[test]
    fn test_cover_derived_from_neighbors() {
        let grid = TileGrid::from_spec(&spec(&["...", ".h.", "..."])).unwrap();
        let below = TilePos::new(1, 2);
        assert_eq!(grid.cover_toward(below, Direction8::N), CoverLevel::Half);
        assert_eq!(grid.cover_toward(below, Direction8::S), CoverLevel::None);
        let corner = TilePos::new(0, 0);
        assert_eq!(grid.cover_toward(corner, Direction8::SE), CoverLevel::Low);
    }

    #[test]
    fn test_cover_override_applied() {
        let mut map = spec(&["..."]);
        map.cover.push(CoverSpec {
            pos: TilePos::new(1, 0),
            direction: Direction8::E,
            level: CoverLevel::Full,
        });
        let grid = TileGrid::from_spec(&map).unwrap();
        assert_eq!(grid.cover_toward(TilePos::new(1, 0), Direction8::E), CoverLevel::Full);
    }

    #[test]
    fn test_open_door() {
        let mut grid = TileGrid::from_spec(&spec(&[".D."])).unwrap();
        let door = TilePos::new(1, 0);
        assert!(!grid.is_walkable(door));
        assert_eq!(grid.cover_toward(TilePos::new(0, 0), Direction8::E), CoverLevel::High);
        assert!(grid.open_door(door));
        assert!(grid.is_walkable(door));
        assert_eq!(grid.cover_toward(TilePos::new(0, 0), Direction8::E), CoverLevel::None);
        assert!(!grid.open_door(door), "already open");
    }

    #[test]
    fn test_nearest_free_tile_skips_occupied() {
        let grid = TileGrid::new(5, 5);
        let center = TilePos::new(2, 2);
        let found = grid.nearest_free_tile(center, 3, |p| p != center).unwrap();
        assert_eq!(found.chebyshev_to(&center), 1);
        assert!(grid.nearest_free_tile(center, 3, |_| false).is_none());
    }

    #[test]
    fn test_no_corner_cutting() {
        let grid = TileGrid::from_spec(&spec(&[".#", ".."])).unwrap();
        let neighbors: Vec<_> = grid
            .walkable_neighbors(TilePos::new(0, 0))
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert!(!neighbors.contains(&TilePos::new(1, 1)));
        assert!(neighbors.contains(&TilePos::new(0, 1)));
    }

    proptest! {
        #[test]
        fn prop_walls_and_void_block_and_are_never_walkable(
            cells in proptest::collection::vec(prop_oneof![Just('.'), Just('#'), Just(' '), Just('h')], 16)
        ) {
            let rows: Vec<String> = cells.chunks(4).map(|c| c.iter().collect()).collect();
            let grid = TileGrid::from_spec(&MapSpec {
                width: 4,
                height: 4,
                rows,
                cover: Vec::new(),
            }).unwrap();
            for pos in grid.positions() {
                let tile = grid.tile(pos).unwrap();
                if matches!(tile.kind, TileType::Wall | TileType::Void) {
                    prop_assert!(!grid.is_walkable(pos));
                    prop_assert!(grid.blocks_los(pos));
                }
            }
        }
    }
}
