//! Stockpile zones and per-tile storage.
//!
//! A stockpile zone is a set of tiles with a per-resource accept filter.
//! Storage is per tile: one resource kind per tile, clamped to the tile
//! capacity. Global totals are a derived view over tile storage -- nothing
//! mutates a total directly, every write lands on a specific tile.
//!
//! Tiles leave a zone through a two-step drain: [`ZoneRegistry::mark_tile_for_removal`]
//! flags the tile, the relocation planner moves its contents elsewhere, and
//! [`ZoneRegistry::complete_tile_removal`] drops the tile once empty. A
//! pending tile accepts no new deliveries. Flipping a filter never destroys
//! items; mismatched contents sit until the relocation planner finds them a
//! home.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridfall_types::{ResourceKind, TileKind, TilePos, ZoneId};

use crate::error::WorldError;
use crate::grid::TileGrid;

/// A player-designated storage zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockpileZone {
    /// Tiles belonging to this zone.
    pub tiles: BTreeSet<TilePos>,
    /// Per-resource accept filter. Absent kinds default to allowed.
    pub filter: BTreeMap<ResourceKind, bool>,
    /// The z-level the zone was created on.
    pub primary_z: i32,
}

impl StockpileZone {
    /// Whether the zone's filter accepts a resource kind.
    pub fn allows(&self, resource: ResourceKind) -> bool {
        self.filter.get(&resource).copied().unwrap_or(true)
    }
}

/// Contents of one stockpile tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStore {
    /// The stored resource kind.
    pub resource: ResourceKind,
    /// Units stored, at most the tile capacity.
    pub amount: u32,
}

/// Registry of stockpile zones, tile membership, and tile storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, StockpileZone>,
    tile_to_zone: BTreeMap<TilePos, ZoneId>,
    storage: BTreeMap<TilePos, TileStore>,
    pending_removal: BTreeSet<TilePos>,
    /// Capacity of a single stockpile tile.
    capacity: u32,
}

impl ZoneRegistry {
    /// Create an empty registry with the given per-tile capacity.
    pub const fn new(capacity: u32) -> Self {
        Self {
            zones: BTreeMap::new(),
            tile_to_zone: BTreeMap::new(),
            storage: BTreeMap::new(),
            pending_removal: BTreeSet::new(),
            capacity,
        }
    }

    /// The per-tile storage capacity.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    fn tile_is_valid(grid: &TileGrid, pos: TilePos) -> bool {
        let Some(kind) = grid.tile(pos) else {
            return false;
        };
        match kind {
            TileKind::Site(_) | TileKind::Roof => false,
            // Walls, doors, windows, and workstations never hold storage;
            // finished flooring does.
            TileKind::Built(built) if !built.passable_when_built() || built.is_openable() => false,
            _ if pos.z == 0 => grid.is_walkable(pos),
            _ => kind.is_upper_stockpile_surface(),
        }
    }

    /// Create a stockpile zone over `tiles` on level `z`.
    ///
    /// Tiles already in a zone or invalid for storage (walls, doors,
    /// workstations on any level; anything but flooring above ground) are
    /// silently skipped, matching the drag-to-paint host interaction.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoValidZoneTiles`] if nothing survives the
    /// filter.
    pub fn create_zone(
        &mut self,
        grid: &TileGrid,
        tiles: &[TilePos],
        z: i32,
    ) -> Result<ZoneId, WorldError> {
        let mut accepted = BTreeSet::new();
        for &tile in tiles {
            let pos = TilePos::new(tile.x, tile.y, z);
            if self.tile_to_zone.contains_key(&pos) {
                continue;
            }
            if Self::tile_is_valid(grid, pos) {
                accepted.insert(pos);
            }
        }
        if accepted.is_empty() {
            return Err(WorldError::NoValidZoneTiles);
        }
        let id = ZoneId::new();
        for &pos in &accepted {
            self.tile_to_zone.insert(pos, id);
        }
        debug!(zone = %id, tiles = accepted.len(), z, "stockpile zone created");
        self.zones.insert(
            id,
            StockpileZone {
                tiles: accepted,
                filter: BTreeMap::new(),
                primary_z: z,
            },
        );
        Ok(id)
    }

    /// The zone with the given id.
    pub fn zone(&self, id: ZoneId) -> Option<&StockpileZone> {
        self.zones.get(&id)
    }

    /// All zones (host snapshot).
    pub const fn zones(&self) -> &BTreeMap<ZoneId, StockpileZone> {
        &self.zones
    }

    /// The zone owning `pos`, if any.
    pub fn zone_at(&self, pos: TilePos) -> Option<ZoneId> {
        self.tile_to_zone.get(&pos).copied()
    }

    /// Whether `pos` belongs to a stockpile zone.
    pub fn is_stockpile(&self, pos: TilePos) -> bool {
        self.tile_to_zone.contains_key(&pos)
    }

    /// Set one entry of a zone's accept filter.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZoneNotFound`] for an unknown id.
    pub fn set_filter(
        &mut self,
        id: ZoneId,
        resource: ResourceKind,
        allow: bool,
    ) -> Result<(), WorldError> {
        let zone = self.zones.get_mut(&id).ok_or(WorldError::ZoneNotFound(id))?;
        zone.filter.insert(resource, allow);
        Ok(())
    }

    // -- removal lifecycle ---------------------------------------------------

    /// Mark a stockpile tile for removal.
    ///
    /// If the tile has no stored items it is removed immediately; otherwise
    /// it enters the pending set and the relocation planner drains it.
    /// Returns `true` if the tile belonged to a zone.
    pub fn mark_tile_for_removal(&mut self, pos: TilePos) -> bool {
        if !self.tile_to_zone.contains_key(&pos) {
            return false;
        }
        let occupied = self.storage.get(&pos).is_some_and(|s| s.amount > 0);
        if occupied {
            self.pending_removal.insert(pos);
            true
        } else {
            self.remove_tile(pos)
        }
    }

    /// Whether a tile is waiting for its contents to relocate.
    pub fn is_pending_removal(&self, pos: TilePos) -> bool {
        self.pending_removal.contains(&pos)
    }

    /// All tiles pending removal.
    pub fn pending_removal_tiles(&self) -> Vec<TilePos> {
        self.pending_removal.iter().copied().collect()
    }

    /// Finalize removal of a drained pending tile.
    ///
    /// Returns `true` if the tile was pending and is now out of its zone.
    pub fn complete_tile_removal(&mut self, pos: TilePos) -> bool {
        if !self.pending_removal.remove(&pos) {
            return false;
        }
        self.remove_tile(pos)
    }

    /// Remove zone membership from a tile immediately, dropping any storage
    /// still on it. Prefer [`Self::mark_tile_for_removal`], which drains first.
    pub fn remove_tile(&mut self, pos: TilePos) -> bool {
        let Some(id) = self.tile_to_zone.remove(&pos) else {
            return false;
        };
        if let Some(zone) = self.zones.get_mut(&id) {
            zone.tiles.remove(&pos);
            if zone.tiles.is_empty() {
                self.zones.remove(&id);
            }
        }
        self.storage.remove(&pos);
        self.pending_removal.remove(&pos);
        true
    }

    // -- placement policy ----------------------------------------------------

    /// Find the best stockpile tile to receive `resource`.
    ///
    /// Candidates are tiles in zones whose filter accepts the resource,
    /// excluding pending-removal tiles when asked. Each candidate scores
    /// `(manhattan + 100 * |z - source_z|, stack_priority)` where stacking
    /// onto an existing same-kind tile beats opening an empty one; the best
    /// (lowest) score wins, so hauls top up existing stacks before starting
    /// new ones.
    pub fn find_tile_for_resource(
        &self,
        resource: ResourceKind,
        z: Option<i32>,
        from: Option<TilePos>,
        exclude_pending: bool,
    ) -> Option<TilePos> {
        let mut best: Option<((u32, u8), TilePos)> = None;
        for zone in self.zones.values() {
            if !zone.allows(resource) {
                continue;
            }
            for &tile in &zone.tiles {
                if exclude_pending && self.pending_removal.contains(&tile) {
                    continue;
                }
                let priority = match self.storage.get(&tile) {
                    None => 1,
                    Some(store) if store.resource == resource && store.amount < self.capacity => 0,
                    Some(_) => continue,
                };
                let mut dist = from.map_or(0, |f| f.manhattan(tile));
                if let Some(source_z) = z {
                    let levels = tile.z.abs_diff(source_z);
                    dist = dist.saturating_add(levels.saturating_mul(100));
                }
                let score = (dist, priority);
                if best.is_none_or(|(current, _)| score < current) {
                    best = Some((score, tile));
                }
            }
        }
        best.map(|(_, tile)| tile)
    }

    /// Find a stockpile tile currently holding `resource`, preferring the
    /// requested z-level. Used by supply and crafting-fetch planners.
    pub fn find_tile_with_resource(&self, resource: ResourceKind, z: Option<i32>) -> Option<TilePos> {
        let mut preferred = None;
        let mut fallback = None;
        for (&pos, store) in &self.storage {
            if store.resource != resource || store.amount == 0 {
                continue;
            }
            if z.is_some_and(|level| pos.z == level) {
                if preferred.is_none() {
                    preferred = Some(pos);
                }
            } else if fallback.is_none() {
                fallback = Some(pos);
            }
        }
        preferred.or(fallback)
    }

    // -- tile storage --------------------------------------------------------

    /// Storage contents at `pos`.
    pub fn storage_at(&self, pos: TilePos) -> Option<&TileStore> {
        self.storage.get(&pos)
    }

    /// All tile storage (host snapshot / planners).
    pub const fn all_storage(&self) -> &BTreeMap<TilePos, TileStore> {
        &self.storage
    }

    /// Add resources to a stockpile tile, clamping to capacity.
    ///
    /// Returns the amount actually stored: 0 if the tile is not a stockpile,
    /// is pending removal, or already holds a different kind.
    pub fn add_to_tile_storage(&mut self, pos: TilePos, resource: ResourceKind, amount: u32) -> u32 {
        if !self.tile_to_zone.contains_key(&pos) || self.pending_removal.contains(&pos) {
            return 0;
        }
        match self.storage.get_mut(&pos) {
            None => {
                let stored = amount.min(self.capacity);
                if stored > 0 {
                    self.storage.insert(pos, TileStore { resource, amount: stored });
                }
                stored
            }
            Some(store) if store.resource == resource => {
                let space = self.capacity.saturating_sub(store.amount);
                let stored = amount.min(space);
                store.amount = store.amount.saturating_add(stored);
                stored
            }
            Some(_) => 0,
        }
    }

    /// Remove up to `amount` units from a stockpile tile.
    ///
    /// Returns what was removed; the tile empties (and the entry disappears)
    /// when its amount reaches zero.
    pub fn remove_from_tile_storage(&mut self, pos: TilePos, amount: u32) -> Option<TileStore> {
        let store = self.storage.get_mut(&pos)?;
        let removed = amount.min(store.amount);
        if removed == 0 {
            return None;
        }
        let resource = store.resource;
        store.amount = store.amount.saturating_sub(removed);
        if store.amount == 0 {
            self.storage.remove(&pos);
        }
        Some(TileStore { resource, amount: removed })
    }

    /// Total units of `resource` stored across all stockpiles (derived).
    pub fn total_stored(&self, resource: ResourceKind) -> u32 {
        self.storage
            .values()
            .filter(|store| store.resource == resource)
            .fold(0_u32, |acc, store| acc.saturating_add(store.amount))
    }

    /// Total units of `resource` stored on one z-level (derived).
    pub fn total_stored_on_level(&self, resource: ResourceKind, z: i32) -> u32 {
        self.storage
            .iter()
            .filter(|(pos, store)| pos.z == z && store.resource == resource)
            .fold(0_u32, |acc, (_, store)| acc.saturating_add(store.amount))
    }

    /// Derived totals for every resource kind.
    pub fn totals(&self) -> BTreeMap<ResourceKind, u32> {
        let mut out = BTreeMap::new();
        for store in self.storage.values() {
            let entry = out.entry(store.resource).or_insert(0_u32);
            *entry = entry.saturating_add(store.amount);
        }
        out
    }

    /// Storage tiles whose owning zone no longer accepts their contents.
    pub fn filter_mismatches(&self) -> Vec<(TilePos, ResourceKind)> {
        let mut out = Vec::new();
        for (&pos, store) in &self.storage {
            if store.amount == 0 {
                continue;
            }
            let Some(id) = self.tile_to_zone.get(&pos) else {
                continue;
            };
            let Some(zone) = self.zones.get(id) else {
                continue;
            };
            if !zone.allows(store.resource) {
                out.push((pos, store.resource));
            }
        }
        out
    }
}
