//! Room detection and classification.
//!
//! A room is a maximal connected region of floor-like tiles bounded by
//! walls (or other solid buildings), with doors and windows as boundary
//! edges recorded as entrances. Regions that leak onto open ground, the
//! grid edge, or bare upper-level air are not rooms.
//!
//! Detection is batched: the grid pushes changed tiles onto a dirty queue,
//! and [`RoomIndex::process_dirty`] rebuilds only the affected z-levels.
//! Enclosed rooms grow `Roof` tiles on the level above; roofs are reclaimed
//! when their room dissolves (player-converted `RoofAccess` is left alone).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridfall_types::{BuildingKind, FurnitureKind, RoomId, RoomKind, TileKind, TilePos};

use crate::grid::TileGrid;
use crate::workstations::WorkstationRegistry;

/// A detected enclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Floor tiles making up the room.
    pub tiles: BTreeSet<TilePos>,
    /// The level the room is on.
    pub z: i32,
    /// Door and window tiles on the room's boundary.
    pub entrances: BTreeSet<TilePos>,
    /// Classified purpose.
    pub kind: RoomKind,
}

/// Index of detected rooms and the roof tiles they own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomIndex {
    rooms: BTreeMap<RoomId, Room>,
    tile_to_room: BTreeMap<TilePos, RoomId>,
    roof_owner: BTreeMap<TilePos, RoomId>,
}

/// Outcome of flooding one candidate region.
struct FloodResult {
    tiles: BTreeSet<TilePos>,
    entrances: BTreeSet<TilePos>,
    enclosed: bool,
}

impl RoomIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
            tile_to_room: BTreeMap::new(),
            roof_owner: BTreeMap::new(),
        }
    }

    /// The room with the given id.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// All rooms (host snapshot).
    pub const fn rooms(&self) -> &BTreeMap<RoomId, Room> {
        &self.rooms
    }

    /// The room containing `pos`, if any.
    pub fn room_at(&self, pos: TilePos) -> Option<RoomId> {
        self.tile_to_room.get(&pos).copied()
    }

    /// Drain the grid's dirty queue and rebuild every affected level.
    pub fn process_dirty(&mut self, grid: &mut TileGrid, stations: &WorkstationRegistry) {
        let dirty = grid.drain_dirty();
        if dirty.is_empty() {
            return;
        }
        let levels: BTreeSet<i32> = dirty.iter().map(|pos| pos.z).collect();
        for z in levels {
            self.rebuild_level(grid, stations, z);
        }
    }

    /// Rebuild all rooms on one z-level from scratch.
    pub fn rebuild_level(&mut self, grid: &mut TileGrid, stations: &WorkstationRegistry, z: i32) {
        // Tear down the level's existing rooms and remember their roofs.
        let stale: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.z == z)
            .map(|(id, _)| *id)
            .collect();
        let mut orphan_roofs: BTreeSet<TilePos> = BTreeSet::new();
        for id in &stale {
            if let Some(room) = self.rooms.remove(id) {
                for tile in room.tiles {
                    self.tile_to_room.remove(&tile);
                    grid.set_room(tile, None);
                }
            }
            let owned: Vec<TilePos> = self
                .roof_owner
                .iter()
                .filter(|&(_, owner)| *owner == *id)
                .map(|(pos, _)| *pos)
                .collect();
            for pos in owned {
                self.roof_owner.remove(&pos);
                orphan_roofs.insert(pos);
            }
        }

        // Flood fresh regions.
        let mut visited: BTreeSet<TilePos> = BTreeSet::new();
        for pos in grid.level_positions(z) {
            if visited.contains(&pos) {
                continue;
            }
            let floor = grid.tile(pos).is_some_and(TileKind::is_floor_like);
            if !floor {
                continue;
            }
            let result = Self::flood(grid, pos, &mut visited);
            if !result.enclosed {
                continue;
            }
            let id = RoomId::new();
            let kind = Self::classify(grid, stations, &result.tiles);
            debug!(room = %id, z, tiles = result.tiles.len(), ?kind, "room detected");
            for &tile in &result.tiles {
                self.tile_to_room.insert(tile, id);
                grid.set_room(tile, Some(id));
            }
            // Grow a roof over the enclosure.
            for &tile in &result.tiles {
                let above = tile.above();
                orphan_roofs.remove(&above);
                if grid.in_bounds(above) {
                    if grid.tile(above) == Some(TileKind::Empty) {
                        grid.set_tile(above, TileKind::Roof);
                    }
                    if grid.tile(above) == Some(TileKind::Roof) {
                        self.roof_owner.insert(above, id);
                    }
                }
            }
            self.rooms.insert(
                id,
                Room {
                    tiles: result.tiles,
                    z,
                    entrances: result.entrances,
                    kind,
                },
            );
        }

        // Reclaim roofs whose room dissolved (but not player-allowed access).
        for pos in orphan_roofs {
            if grid.tile(pos) == Some(TileKind::Roof) {
                grid.set_tile(pos, TileKind::Empty);
            }
        }
    }

    fn flood(grid: &TileGrid, start: TilePos, visited: &mut BTreeSet<TilePos>) -> FloodResult {
        let mut tiles = BTreeSet::new();
        let mut entrances = BTreeSet::new();
        let mut enclosed = true;
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(pos) = queue.pop_front() {
            tiles.insert(pos);
            for neighbor in pos.neighbors() {
                let Some(kind) = grid.tile(neighbor) else {
                    // Grid edge: the region leaks.
                    enclosed = false;
                    continue;
                };
                if kind.is_floor_like() {
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                    continue;
                }
                match kind {
                    TileKind::Built(BuildingKind::Door) | TileKind::Built(BuildingKind::Window) => {
                        entrances.insert(neighbor);
                    }
                    TileKind::Built(_) | TileKind::Site(_) => {
                        // Solid boundary (walls, stations, scaffolding).
                    }
                    _ => {
                        enclosed = false;
                    }
                }
            }
        }
        FloodResult {
            tiles,
            entrances,
            enclosed,
        }
    }

    /// Classify a room by the workstations on its boundary and the furniture
    /// inside it. Precedence is fixed: stove, salvager's bench, gutter
    /// forge, skinshop loom, cortex spindle, barracks, crash bed, common.
    fn classify(
        grid: &TileGrid,
        stations: &WorkstationRegistry,
        tiles: &BTreeSet<TilePos>,
    ) -> RoomKind {
        let mut present: BTreeSet<BuildingKind> = BTreeSet::new();
        let mut has_bed = false;
        for &tile in tiles {
            if grid.tile(tile) == Some(TileKind::Furniture(FurnitureKind::CrashBed)) {
                has_bed = true;
            }
            for neighbor in tile.neighbors() {
                if let Some(TileKind::Built(kind)) = grid.tile(neighbor) {
                    if kind.is_workstation() && stations.station(neighbor).is_some() {
                        present.insert(kind);
                    }
                }
            }
        }
        const PRECEDENCE: [(BuildingKind, RoomKind); 6] = [
            (BuildingKind::Stove, RoomKind::Kitchen),
            (BuildingKind::SalvagersBench, RoomKind::SalvageBay),
            (BuildingKind::GutterForge, RoomKind::Forge),
            (BuildingKind::SkinshopLoom, RoomKind::Tailory),
            (BuildingKind::CortexSpindle, RoomKind::CortexLab),
            (BuildingKind::Barracks, RoomKind::Barracks),
        ];
        for (station, kind) in PRECEDENCE {
            if present.contains(&station) {
                return kind;
            }
        }
        if has_bed {
            return RoomKind::Dormitory;
        }
        RoomKind::CommonRoom
    }

    /// Tiles of every room of the given kind (recreation placement).
    pub fn tiles_of_kind(&self, kind: RoomKind) -> Vec<TilePos> {
        self.rooms
            .values()
            .filter(|room| room.kind == kind)
            .flat_map(|room| room.tiles.iter().copied())
            .collect()
    }
}
