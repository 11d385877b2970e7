//! The 3-D tile grid.
//!
//! [`TileGrid`] is the source of truth for tile kinds and walkability. On
//! every [`TileGrid::set_tile`] the walkability bit is re-derived from the
//! kind (doors and windows start closed; the door registry toggles the bit
//! as they open and close), per-tile environment metadata is refreshed, and
//! the tile is pushed onto the dirty queue the room index drains each tick.
//!
//! Environment metadata (`is_outside`, room id, exit count) is advisory
//! only -- nothing in the core depends on it for correctness.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use gridfall_types::{RoomId, TileKind, TilePos};

/// Advisory per-tile environment metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvData {
    /// Whether the tile is exposed to the sky (no enclosing room).
    pub is_outside: bool,
    /// The room containing this tile, if any.
    pub room: Option<RoomId>,
    /// Number of adjacent walkable tiles.
    pub exit_count: u8,
}

impl Default for EnvData {
    fn default() -> Self {
        Self {
            is_outside: true,
            room: None,
            exit_count: 0,
        }
    }
}

/// The logical grid backing the world tiles.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    depth: i32,
    tiles: Vec<TileKind>,
    walkable: Vec<bool>,
    env: Vec<EnvData>,
    /// Original tile kinds under installed furniture, for restoration.
    base_tiles: BTreeMap<TilePos, TileKind>,
    /// Tiles changed since the room index last ran.
    dirty: BTreeSet<TilePos>,
}

impl TileGrid {
    /// Create an empty grid of the given dimensions.
    ///
    /// Dimensions are clamped to at least 1 in every axis.
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let depth = depth.max(1);
        let volume = usize::try_from(width)
            .unwrap_or(1)
            .saturating_mul(usize::try_from(height).unwrap_or(1))
            .saturating_mul(usize::try_from(depth).unwrap_or(1));
        let mut grid = Self {
            width,
            height,
            depth,
            tiles: vec![TileKind::Empty; volume],
            walkable: vec![false; volume],
            env: vec![EnvData::default(); volume],
            base_tiles: BTreeMap::new(),
            dirty: BTreeSet::new(),
        };
        // Ground level starts walkable, upper levels blocked.
        for y in 0..height {
            for x in 0..width {
                if let Some(i) = grid.index_of(TilePos::new(x, y, 0)) {
                    if let Some(slot) = grid.walkable.get_mut(i) {
                        *slot = true;
                    }
                }
            }
        }
        grid
    }

    /// Grid width (x extent).
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height (y extent).
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Number of z-levels.
    pub const fn depth(&self) -> i32 {
        self.depth
    }

    /// Whether the position lies inside the grid volume.
    pub const fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0
            && pos.x < self.width
            && pos.y >= 0
            && pos.y < self.height
            && pos.z >= 0
            && pos.z < self.depth
    }

    fn index_of(&self, pos: TilePos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        let z = usize::try_from(pos.z).ok()?;
        let w = usize::try_from(self.width).ok()?;
        let h = usize::try_from(self.height).ok()?;
        Some(z.checked_mul(w)?.checked_mul(h)?.checked_add(y.checked_mul(w)?)?.checked_add(x)?)
    }

    /// The tile kind at `pos`, or `None` if out of bounds.
    pub fn tile(&self, pos: TilePos) -> Option<TileKind> {
        self.index_of(pos).and_then(|i| self.tiles.get(i)).copied()
    }

    /// Whether colonists can stand on `pos`. Out of bounds is not walkable.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.index_of(pos)
            .and_then(|i| self.walkable.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Set the tile kind at `pos`, deriving walkability and refreshing
    /// environment metadata. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: TilePos, kind: TileKind) {
        let Some(i) = self.index_of(pos) else {
            return;
        };
        if let Some(slot) = self.tiles.get_mut(i) {
            *slot = kind;
        }
        if let Some(slot) = self.walkable.get_mut(i) {
            *slot = kind.base_walkable(pos.z);
        }
        self.refresh_env(pos, kind);
        self.dirty.insert(pos);
        self.recount_exits_around(pos);
    }

    /// Override the walkability bit at `pos` without touching the tile kind.
    ///
    /// Used by the door registry: an open door or window is walkable even
    /// though its kind is not.
    pub fn set_walkable(&mut self, pos: TilePos, walkable: bool) {
        if let Some(i) = self.index_of(pos) {
            if let Some(slot) = self.walkable.get_mut(i) {
                *slot = walkable;
            }
            self.recount_exits_around(pos);
        }
    }

    /// Environment metadata at `pos`.
    pub fn env(&self, pos: TilePos) -> Option<EnvData> {
        self.index_of(pos).and_then(|i| self.env.get(i)).copied()
    }

    /// Set the containing room and interior flag for a tile.
    pub fn set_room(&mut self, pos: TilePos, room: Option<RoomId>) {
        if let Some(i) = self.index_of(pos) {
            if let Some(env) = self.env.get_mut(i) {
                env.room = room;
                env.is_outside = room.is_none();
            }
        }
    }

    fn refresh_env(&mut self, pos: TilePos, kind: TileKind) {
        let inside = matches!(kind, TileKind::Site(_) | TileKind::Built(_) | TileKind::Furniture(_));
        if let Some(i) = self.index_of(pos) {
            if let Some(env) = self.env.get_mut(i) {
                if inside {
                    env.is_outside = false;
                } else if env.room.is_none() {
                    env.is_outside = true;
                }
            }
        }
    }

    fn recount_exits_around(&mut self, pos: TilePos) {
        self.recount_exits(pos);
        for neighbor in pos.neighbors() {
            self.recount_exits(neighbor);
        }
    }

    fn recount_exits(&mut self, pos: TilePos) {
        if !self.in_bounds(pos) {
            return;
        }
        let mut count: u8 = 0;
        for neighbor in pos.neighbors() {
            if self.is_walkable(neighbor) {
                count = count.saturating_add(1);
            }
        }
        if let Some(i) = self.index_of(pos) {
            if let Some(env) = self.env.get_mut(i) {
                env.exit_count = count;
            }
        }
    }

    /// Record the tile kind being covered by furniture so removal can
    /// restore it.
    pub fn remember_base_tile(&mut self, pos: TilePos, kind: TileKind) {
        self.base_tiles.insert(pos, kind);
    }

    /// Take the remembered base tile under furniture at `pos`.
    pub fn take_base_tile(&mut self, pos: TilePos) -> Option<TileKind> {
        self.base_tiles.remove(&pos)
    }

    /// Mark a tile dirty without changing it (used when adjacent state that
    /// affects enclosure changes, e.g. a door registers).
    pub fn mark_dirty(&mut self, pos: TilePos) {
        if self.in_bounds(pos) {
            self.dirty.insert(pos);
        }
    }

    /// Drain the dirty-tile queue.
    pub fn drain_dirty(&mut self) -> BTreeSet<TilePos> {
        core::mem::take(&mut self.dirty)
    }

    /// Whether any tiles are awaiting room reprocessing.
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Enumerate all non-empty tiles (sparse view used by saves and hosts).
    pub fn non_empty_tiles(&self) -> BTreeMap<TilePos, TileKind> {
        let mut out = BTreeMap::new();
        for z in 0..self.depth {
            for y in 0..self.height {
                for x in 0..self.width {
                    let pos = TilePos::new(x, y, z);
                    if let Some(kind) = self.tile(pos) {
                        if kind != TileKind::Empty {
                            out.insert(pos, kind);
                        }
                    }
                }
            }
        }
        out
    }

    /// Iterate every position on one z-level.
    pub fn level_positions(&self, z: i32) -> Vec<TilePos> {
        let mut out = Vec::new();
        if z < 0 || z >= self.depth {
            return out;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(TilePos::new(x, y, z));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use gridfall_types::BuildingKind;

    use super::*;

    #[test]
    fn ground_defaults_walkable_upper_blocked() {
        let grid = TileGrid::new(4, 4, 2);
        assert!(grid.is_walkable(TilePos::new(1, 1, 0)));
        assert!(!grid.is_walkable(TilePos::new(1, 1, 1)));
    }

    #[test]
    fn out_of_bounds_reads_are_absent() {
        let grid = TileGrid::new(4, 4, 1);
        assert_eq!(grid.tile(TilePos::new(9, 0, 0)), None);
        assert!(!grid.is_walkable(TilePos::new(-1, 0, 0)));
    }

    #[test]
    fn set_tile_derives_walkability() {
        let mut grid = TileGrid::new(4, 4, 1);
        let pos = TilePos::new(2, 2, 0);
        grid.set_tile(pos, TileKind::Built(BuildingKind::Wall));
        assert!(!grid.is_walkable(pos));
        grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(grid.is_walkable(pos));
    }

    #[test]
    fn door_override_reopens_tile() {
        let mut grid = TileGrid::new(4, 4, 1);
        let pos = TilePos::new(1, 2, 0);
        grid.set_tile(pos, TileKind::Built(BuildingKind::Door));
        assert!(!grid.is_walkable(pos));
        grid.set_walkable(pos, true);
        assert!(grid.is_walkable(pos));
    }

    #[test]
    fn set_tile_marks_dirty() {
        let mut grid = TileGrid::new(4, 4, 1);
        let pos = TilePos::new(0, 0, 0);
        grid.set_tile(pos, TileKind::Debris);
        let dirty = grid.drain_dirty();
        assert!(dirty.contains(&pos));
        assert!(!grid.has_dirty());
    }

    #[test]
    fn exit_count_tracks_walkable_neighbors() {
        let mut grid = TileGrid::new(3, 3, 1);
        let center = TilePos::new(1, 1, 0);
        assert_eq!(grid.env(center).map(|e| e.exit_count), Some(0));
        grid.set_tile(TilePos::new(1, 0, 0), TileKind::Built(BuildingKind::Wall));
        grid.set_tile(TilePos::new(0, 1, 0), TileKind::Built(BuildingKind::Wall));
        assert_eq!(grid.env(center).map(|e| e.exit_count), Some(2));
    }

    #[test]
    fn non_empty_enumeration_is_sparse() {
        let mut grid = TileGrid::new(4, 4, 1);
        grid.set_tile(TilePos::new(3, 3, 0), TileKind::Weeds);
        let tiles = grid.non_empty_tiles();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles.get(&TilePos::new(3, 3, 0)), Some(&TileKind::Weeds));
    }
}
