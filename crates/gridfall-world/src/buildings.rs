//! Building definitions, construction sites, doors, windows, fire escapes.
//!
//! Placing a building stamps a `Site` tile on the grid and opens a
//! construction site tracking material delivery. Supply jobs fill the
//! site's `delivered` map through [`BuildingRegistry::deliver_material`]
//! (clamped to need); construction work converts the tile to its `Built`
//! variant once materials are in and the work bar fills.
//!
//! Doors and windows carry an open flag and a close timer. Walking onto one
//! opens it and re-arms the timer; the per-tick update closes it when the
//! timer runs out, unless an agent is standing on the tile.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use gridfall_types::{BuildingKind, ResourceKind, TilePos};

use crate::grid::TileGrid;

// ---------------------------------------------------------------------------
// Building definitions
// ---------------------------------------------------------------------------

/// Static properties of a building kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingDef {
    /// Materials that must be delivered before completion.
    pub materials: BTreeMap<ResourceKind, u32>,
    /// Work ticks to construct.
    pub work: u32,
}

/// Return the canonical definition for a building kind.
pub fn building_def(kind: BuildingKind) -> BuildingDef {
    match kind {
        BuildingKind::Wall => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 1), (ResourceKind::Mineral, 1)]),
            work: 100,
        },
        BuildingKind::ReinforcedWall => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Mineral, 2)]),
            work: 150,
        },
        BuildingKind::Door => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 1), (ResourceKind::Metal, 1)]),
            work: 80,
        },
        BuildingKind::Floor => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 1)]),
            work: 40,
        },
        BuildingKind::Window => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 1), (ResourceKind::Mineral, 1)]),
            work: 80,
        },
        BuildingKind::Bridge => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 2), (ResourceKind::Metal, 1)]),
            work: 60,
        },
        BuildingKind::FireEscape => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 1), (ResourceKind::Metal, 1)]),
            work: 120,
        },
        BuildingKind::SalvagersBench => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 3), (ResourceKind::Scrap, 2)]),
            work: 100,
        },
        BuildingKind::Generator => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 2), (ResourceKind::Metal, 2)]),
            work: 120,
        },
        BuildingKind::Stove => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Metal, 2), (ResourceKind::Mineral, 1)]),
            work: 100,
        },
        BuildingKind::GutterForge => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Metal, 3), (ResourceKind::Scrap, 2)]),
            work: 120,
        },
        BuildingKind::SkinshopLoom => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 3), (ResourceKind::Scrap, 2)]),
            work: 100,
        },
        BuildingKind::CortexSpindle => BuildingDef {
            materials: BTreeMap::from([
                (ResourceKind::Metal, 2),
                (ResourceKind::Mineral, 2),
                (ResourceKind::Power, 1),
            ]),
            work: 150,
        },
        BuildingKind::Barracks => BuildingDef {
            materials: BTreeMap::from([(ResourceKind::Wood, 4), (ResourceKind::Metal, 2)]),
            work: 120,
        },
    }
}

// ---------------------------------------------------------------------------
// Construction sites
// ---------------------------------------------------------------------------

/// A tile under construction, tracking material delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSite {
    /// What is being built.
    pub kind: BuildingKind,
    /// Materials required.
    pub needed: BTreeMap<ResourceKind, u32>,
    /// Materials delivered so far. Delivered material is consumed into the
    /// site and cannot be reclaimed without demolition.
    pub delivered: BTreeMap<ResourceKind, u32>,
    /// Whether the tile is waiting on a stockpile drain before completion.
    pub awaiting_stockpile_clear: bool,
    /// Resources with a supply job already in flight for this site.
    pub pending_supply: BTreeSet<ResourceKind>,
}

impl ConstructionSite {
    /// Materials still missing, per kind.
    pub fn missing(&self) -> BTreeMap<ResourceKind, u32> {
        let mut out = BTreeMap::new();
        for (&resource, &needed) in &self.needed {
            let delivered = self.delivered.get(&resource).copied().unwrap_or(0);
            let short = needed.saturating_sub(delivered);
            if short > 0 {
                out.insert(resource, short);
            }
        }
        out
    }

    /// Whether every required material has been delivered.
    pub fn has_required_materials(&self) -> bool {
        self.missing().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Doors & windows
// ---------------------------------------------------------------------------

/// Open/close state of a door or window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalState {
    /// Whether it is currently open (and therefore walkable).
    pub open: bool,
    /// Ticks until it swings shut.
    pub close_timer: u32,
}

impl PortalState {
    /// A freshly installed, closed portal.
    pub const fn closed() -> Self {
        Self {
            open: false,
            close_timer: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registry of construction sites, portal states, and fire-escape links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRegistry {
    sites: BTreeMap<TilePos, ConstructionSite>,
    doors: BTreeMap<TilePos, PortalState>,
    windows: BTreeMap<TilePos, PortalState>,
    /// Bidirectional vertical links created by fire escapes.
    escape_links: BTreeMap<TilePos, TilePos>,
}

impl BuildingRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            sites: BTreeMap::new(),
            doors: BTreeMap::new(),
            windows: BTreeMap::new(),
            escape_links: BTreeMap::new(),
        }
    }

    // -- sites ---------------------------------------------------------------

    /// Open a construction site at `pos`.
    ///
    /// `awaiting_clear` is set when the placement displaced a stockpile tile
    /// that still needs draining.
    pub fn open_site(&mut self, pos: TilePos, kind: BuildingKind, awaiting_clear: bool) {
        let def = building_def(kind);
        let delivered = def.materials.keys().map(|&resource| (resource, 0)).collect();
        self.sites.insert(
            pos,
            ConstructionSite {
                kind,
                needed: def.materials,
                delivered,
                awaiting_stockpile_clear: awaiting_clear,
                pending_supply: BTreeSet::new(),
            },
        );
    }

    /// The site at `pos`, if any.
    pub fn site(&self, pos: TilePos) -> Option<&ConstructionSite> {
        self.sites.get(&pos)
    }

    /// Mutable access to the site at `pos`.
    pub fn site_mut(&mut self, pos: TilePos) -> Option<&mut ConstructionSite> {
        self.sites.get_mut(&pos)
    }

    /// All sites (planner scan / host snapshot).
    pub const fn sites(&self) -> &BTreeMap<TilePos, ConstructionSite> {
        &self.sites
    }

    /// Deliver up to `amount` of `resource` to the site at `pos`.
    ///
    /// The delivery clamps to the site's remaining need; the return value is
    /// what was actually absorbed (0 if the site is gone or sated).
    pub fn deliver_material(&mut self, pos: TilePos, resource: ResourceKind, amount: u32) -> u32 {
        let Some(site) = self.sites.get_mut(&pos) else {
            return 0;
        };
        let needed = site.needed.get(&resource).copied().unwrap_or(0);
        let delivered = site.delivered.entry(resource).or_insert(0);
        let space = needed.saturating_sub(*delivered);
        let absorbed = amount.min(space);
        *delivered = delivered.saturating_add(absorbed);
        if absorbed > 0 {
            debug!(%pos, ?resource, absorbed, "material delivered to site");
        }
        absorbed
    }

    /// Clear the supply-pending flag bookkeeping for a delivered resource.
    pub fn clear_pending_supply(&mut self, pos: TilePos, resource: ResourceKind) {
        if let Some(site) = self.sites.get_mut(&pos) {
            site.pending_supply.remove(&resource);
        }
    }

    /// Remove and return the site at `pos` (on completion or demolition).
    pub fn close_site(&mut self, pos: TilePos) -> Option<ConstructionSite> {
        self.sites.remove(&pos)
    }

    /// Clear the stockpile-wait flag on the site at `pos`, if present.
    pub fn clear_stockpile_wait(&mut self, pos: TilePos) {
        if let Some(site) = self.sites.get_mut(&pos) {
            site.awaiting_stockpile_clear = false;
        }
    }

    // -- doors & windows -----------------------------------------------------

    /// Register a freshly built door (closed).
    pub fn register_door(&mut self, pos: TilePos) {
        self.doors.insert(pos, PortalState::closed());
    }

    /// Register a freshly built window (closed).
    pub fn register_window(&mut self, pos: TilePos) {
        self.windows.insert(pos, PortalState::closed());
    }

    /// Whether `pos` holds a door.
    pub fn is_door(&self, pos: TilePos) -> bool {
        self.doors.contains_key(&pos)
    }

    /// Whether `pos` holds a window.
    pub fn is_window(&self, pos: TilePos) -> bool {
        self.windows.contains_key(&pos)
    }

    /// Whether the portal at `pos` is open.
    pub fn is_open(&self, pos: TilePos) -> bool {
        self.doors
            .get(&pos)
            .or_else(|| self.windows.get(&pos))
            .is_some_and(|portal| portal.open)
    }

    /// All door states (host snapshot / saves).
    pub const fn doors(&self) -> &BTreeMap<TilePos, PortalState> {
        &self.doors
    }

    /// All window states (host snapshot / saves).
    pub const fn windows(&self) -> &BTreeMap<TilePos, PortalState> {
        &self.windows
    }

    /// An agent steps onto the portal at `pos`: it opens and the close timer
    /// re-arms. The grid walkability bit follows the open state.
    ///
    /// Returns `true` if a portal was opened (or re-armed).
    pub fn walk_onto(
        &mut self,
        grid: &mut TileGrid,
        pos: TilePos,
        door_delay: u32,
        window_delay: u32,
    ) -> bool {
        if let Some(door) = self.doors.get_mut(&pos) {
            door.open = true;
            door.close_timer = door_delay;
            grid.set_walkable(pos, true);
            return true;
        }
        if let Some(window) = self.windows.get_mut(&pos) {
            window.open = true;
            window.close_timer = window_delay;
            grid.set_walkable(pos, true);
            return true;
        }
        false
    }

    /// Tick every open portal's close timer.
    ///
    /// An occupied portal never closes: its timer re-arms to the full delay
    /// instead, so it swings shut `delay` ticks after the tile clears.
    pub fn tick_portals(
        &mut self,
        grid: &mut TileGrid,
        occupied: &BTreeSet<TilePos>,
        door_delay: u32,
        window_delay: u32,
    ) {
        for (&pos, door) in &mut self.doors {
            if !door.open {
                continue;
            }
            if occupied.contains(&pos) {
                door.close_timer = door_delay;
                continue;
            }
            door.close_timer = door.close_timer.saturating_sub(1);
            if door.close_timer == 0 {
                door.open = false;
                grid.set_walkable(pos, false);
            }
        }
        for (&pos, window) in &mut self.windows {
            if !window.open {
                continue;
            }
            if occupied.contains(&pos) {
                window.close_timer = window_delay;
                continue;
            }
            window.close_timer = window.close_timer.saturating_sub(1);
            if window.close_timer == 0 {
                window.open = false;
                grid.set_walkable(pos, false);
            }
        }
    }

    /// Remove portal state at `pos` (demolition).
    pub fn unregister_portal(&mut self, pos: TilePos) {
        self.doors.remove(&pos);
        self.windows.remove(&pos);
    }

    // -- fire escapes --------------------------------------------------------

    /// Register the vertical link a finished fire escape provides between
    /// its own tile and the platform one level up.
    pub fn register_escape_link(&mut self, foot: TilePos, platform: TilePos) {
        self.escape_links.insert(foot, platform);
        self.escape_links.insert(platform, foot);
    }

    /// The other end of a fire-escape link at `pos`, if any.
    pub fn escape_link(&self, pos: TilePos) -> Option<TilePos> {
        self.escape_links.get(&pos).copied()
    }

    /// All escape links (saves).
    pub const fn escape_links(&self) -> &BTreeMap<TilePos, TilePos> {
        &self.escape_links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> TilePos {
        TilePos::new(3, 3, 0)
    }

    #[test]
    fn wall_def_costs_wood_and_mineral() {
        let def = building_def(BuildingKind::Wall);
        assert_eq!(def.materials.get(&ResourceKind::Wood), Some(&1));
        assert_eq!(def.materials.get(&ResourceKind::Mineral), Some(&1));
        assert_eq!(def.work, 100);
    }

    #[test]
    fn delivery_clamps_to_need() {
        let mut registry = BuildingRegistry::new();
        registry.open_site(pos(), BuildingKind::Wall, false);
        assert_eq!(registry.deliver_material(pos(), ResourceKind::Wood, 5), 1);
        assert_eq!(registry.deliver_material(pos(), ResourceKind::Wood, 5), 0);
        let site = registry.site(pos());
        assert!(site.is_some_and(|s| s.delivered.get(&ResourceKind::Wood) == Some(&1)));
    }

    #[test]
    fn delivery_to_missing_site_absorbs_nothing() {
        let mut registry = BuildingRegistry::new();
        assert_eq!(registry.deliver_material(pos(), ResourceKind::Wood, 5), 0);
    }

    #[test]
    fn missing_materials_shrink_with_delivery() {
        let mut registry = BuildingRegistry::new();
        registry.open_site(pos(), BuildingKind::Generator, false);
        let missing = registry.site(pos()).map(|s| s.missing());
        assert_eq!(
            missing,
            Some(BTreeMap::from([(ResourceKind::Wood, 2), (ResourceKind::Metal, 2)]))
        );
        registry.deliver_material(pos(), ResourceKind::Wood, 2);
        registry.deliver_material(pos(), ResourceKind::Metal, 2);
        assert!(registry.site(pos()).is_some_and(ConstructionSite::has_required_materials));
    }

    #[test]
    fn door_opens_on_entry_and_closes_after_delay() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = BuildingRegistry::new();
        let door = pos();
        grid.set_tile(door, gridfall_types::TileKind::Built(BuildingKind::Door));
        registry.register_door(door);
        assert!(!grid.is_walkable(door));

        assert!(registry.walk_onto(&mut grid, door, 30, 45));
        assert!(grid.is_walkable(door));
        assert!(registry.is_open(door));

        let nobody = BTreeSet::new();
        for _ in 0..30 {
            registry.tick_portals(&mut grid, &nobody, 30, 45);
        }
        assert!(!registry.is_open(door));
        assert!(!grid.is_walkable(door));
    }

    #[test]
    fn occupied_door_never_closes() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = BuildingRegistry::new();
        let door = pos();
        grid.set_tile(door, gridfall_types::TileKind::Built(BuildingKind::Door));
        registry.register_door(door);
        registry.walk_onto(&mut grid, door, 30, 45);

        let standing = BTreeSet::from([door]);
        for _ in 0..60 {
            registry.tick_portals(&mut grid, &standing, 30, 45);
        }
        assert!(registry.is_open(door));

        // After the agent leaves, the door closes 30 ticks later.
        let nobody = BTreeSet::new();
        for _ in 0..29 {
            registry.tick_portals(&mut grid, &nobody, 30, 45);
        }
        assert!(registry.is_open(door));
        registry.tick_portals(&mut grid, &nobody, 30, 45);
        assert!(!registry.is_open(door));
    }

    #[test]
    fn windows_use_their_own_delay() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = BuildingRegistry::new();
        let window = pos();
        grid.set_tile(window, gridfall_types::TileKind::Built(BuildingKind::Window));
        registry.register_window(window);
        registry.walk_onto(&mut grid, window, 30, 45);
        let nobody = BTreeSet::new();
        for _ in 0..44 {
            registry.tick_portals(&mut grid, &nobody, 30, 45);
        }
        assert!(registry.is_open(window));
        registry.tick_portals(&mut grid, &nobody, 30, 45);
        assert!(!registry.is_open(window));
    }

    #[test]
    fn escape_links_are_bidirectional() {
        let mut registry = BuildingRegistry::new();
        let foot = TilePos::new(4, 4, 0);
        let platform = foot.above();
        registry.register_escape_link(foot, platform);
        assert_eq!(registry.escape_link(foot), Some(platform));
        assert_eq!(registry.escape_link(platform), Some(foot));
    }
}
