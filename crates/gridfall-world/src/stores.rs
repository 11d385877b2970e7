//! Storage-consistency audit.
//!
//! Tile storage is the single arbiter of where resources live; global totals
//! are derived. The audit cross-checks the structural invariants the rest of
//! the engine assumes: every storage tile belongs to a zone, zone membership
//! indexes agree in both directions, amounts respect capacity, and derived
//! totals match a straight recount. Well-formed mutations preserve all of
//! this by construction -- the audit exists as defense-in-depth against data
//! corruption and future bugs, and the test suite runs it after every
//! scenario.

use std::collections::BTreeMap;

use gridfall_types::{ResourceKind, TilePos};

use crate::zones::ZoneRegistry;

/// The result of a storage audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// Every invariant holds.
    Consistent,
    /// One or more invariants are violated.
    Violations(Vec<String>),
}

impl AuditResult {
    /// Whether the audit passed.
    pub const fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

/// Audit the zone registry's structural invariants.
pub fn audit(zones: &ZoneRegistry) -> AuditResult {
    let mut violations = Vec::new();

    // Every zone tile maps back to its zone, and no tile is claimed twice.
    let mut seen: BTreeMap<TilePos, usize> = BTreeMap::new();
    for (id, zone) in zones.zones() {
        for &tile in &zone.tiles {
            let entry = seen.entry(tile).or_insert(0);
            *entry = entry.saturating_add(1);
            if zones.zone_at(tile) != Some(*id) {
                violations.push(format!("tile {tile} not indexed to its owning zone {id}"));
            }
        }
    }
    for (tile, count) in &seen {
        if *count > 1 {
            violations.push(format!("tile {tile} claimed by {count} zones"));
        }
    }

    // Every storage tile sits in a zone and respects capacity.
    for (pos, store) in zones.all_storage() {
        if zones.zone_at(*pos).is_none() {
            violations.push(format!("storage at {pos} has no owning zone"));
        }
        if store.amount > zones.capacity() {
            violations.push(format!(
                "storage at {pos} holds {} over capacity {}",
                store.amount,
                zones.capacity()
            ));
        }
        if store.amount == 0 {
            violations.push(format!("storage at {pos} is an empty husk entry"));
        }
    }

    // Derived totals equal a straight recount.
    let mut recount: BTreeMap<ResourceKind, u32> = BTreeMap::new();
    for store in zones.all_storage().values() {
        let entry = recount.entry(store.resource).or_insert(0);
        *entry = entry.saturating_add(store.amount);
    }
    for resource in ResourceKind::ALL {
        let derived = zones.total_stored(resource);
        let counted = recount.get(&resource).copied().unwrap_or(0);
        if derived != counted {
            violations.push(format!(
                "total for {resource:?} diverged: derived {derived}, counted {counted}"
            ));
        }
    }

    if violations.is_empty() {
        AuditResult::Consistent
    } else {
        AuditResult::Violations(violations)
    }
}

#[cfg(test)]
mod tests {
    use gridfall_types::ResourceKind;

    use super::*;
    use crate::grid::TileGrid;

    #[test]
    fn fresh_registry_is_consistent() {
        let zones = ZoneRegistry::new(1000);
        assert!(audit(&zones).is_consistent());
    }

    #[test]
    fn populated_registry_is_consistent() {
        let grid = TileGrid::new(8, 8, 1);
        let mut zones = ZoneRegistry::new(1000);
        let tiles = vec![TilePos::new(1, 1, 0), TilePos::new(2, 1, 0)];
        assert!(zones.create_zone(&grid, &tiles, 0).is_ok());
        zones.add_to_tile_storage(TilePos::new(1, 1, 0), ResourceKind::Wood, 40);
        zones.add_to_tile_storage(TilePos::new(2, 1, 0), ResourceKind::Scrap, 3);
        assert!(audit(&zones).is_consistent());
    }

    #[test]
    fn consistent_after_drain_and_removal() {
        let grid = TileGrid::new(8, 8, 1);
        let mut zones = ZoneRegistry::new(1000);
        let tiles = vec![TilePos::new(1, 1, 0), TilePos::new(2, 1, 0)];
        assert!(zones.create_zone(&grid, &tiles, 0).is_ok());
        let pos = TilePos::new(1, 1, 0);
        zones.add_to_tile_storage(pos, ResourceKind::Wood, 10);
        zones.mark_tile_for_removal(pos);
        zones.remove_from_tile_storage(pos, 10);
        zones.complete_tile_removal(pos);
        assert!(audit(&zones).is_consistent());
    }
}
