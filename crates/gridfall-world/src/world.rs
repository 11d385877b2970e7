//! The [`World`] value: every registry bundled behind one owner.
//!
//! The tick loop owns a single `World` and passes it by exclusive reference
//! into each subsystem for its phase. Operations that touch more than one
//! registry (placing a building clears nodes and displaces stockpiles;
//! finishing construction registers doors and workstations; finishing a
//! craft emits output and advances the order queue) live here so no
//! registry ever reaches into another.

use rand::Rng;
use tracing::{debug, info};

use gridfall_types::{
    BuildingKind, FurnitureKind, ItemKind, ResourceKind, TileKind, TilePos,
};

use crate::buildings::BuildingRegistry;
use crate::error::WorldError;
use crate::grid::TileGrid;
use crate::resources::ResourceRegistry;
use crate::rooms::RoomIndex;
use crate::workstations::{RecipeOutput, WorkstationRegistry};
use crate::zones::ZoneRegistry;

/// The complete mutable world state, minus jobs and colonists.
#[derive(Debug)]
pub struct World {
    /// The tile grid.
    pub grid: TileGrid,
    /// Nodes, loose items, salvage, world items.
    pub resources: ResourceRegistry,
    /// Stockpile zones and tile storage.
    pub zones: ZoneRegistry,
    /// Construction sites, doors, windows, fire escapes.
    pub buildings: BuildingRegistry,
    /// Workstations and their order queues.
    pub stations: WorkstationRegistry,
    /// Detected rooms.
    pub rooms: RoomIndex,
}

impl World {
    /// Create an empty world of the given dimensions.
    pub fn new(width: i32, height: i32, depth: i32, tile_capacity: u32) -> Self {
        Self {
            grid: TileGrid::new(width, height, depth),
            resources: ResourceRegistry::new(),
            zones: ZoneRegistry::new(tile_capacity),
            buildings: BuildingRegistry::new(),
            stations: WorkstationRegistry::new(),
            rooms: RoomIndex::new(),
        }
    }

    /// Whether colonists can stand on `pos` right now (doors included).
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.grid.is_walkable(pos)
    }

    // -- building placement --------------------------------------------------

    /// Whether `kind` may be placed on the current tile at `pos`.
    fn placement_allowed(&self, kind: BuildingKind, pos: TilePos) -> bool {
        let Some(current) = self.grid.tile(pos) else {
            return false;
        };
        // Never stack on existing structures or scaffolding; finished
        // flooring is the one built surface that stays buildable.
        if matches!(current, TileKind::Site(_) | TileKind::Furniture(_)) {
            return false;
        }
        if let TileKind::Built(existing) = current {
            if existing != BuildingKind::Floor {
                return false;
            }
        }
        // Roof must be converted to roof access first.
        if current == TileKind::Roof {
            return false;
        }
        // Walls on a fire-escape platform would sever vertical access.
        if current == TileKind::FireEscapePlatform
            && matches!(kind, BuildingKind::Wall | BuildingKind::ReinforcedWall)
        {
            return false;
        }
        // Workstations need finished interior footing.
        if kind.is_workstation()
            && !matches!(current, TileKind::Built(BuildingKind::Floor) | TileKind::RoofAccess)
        {
            return false;
        }
        if pos.z == 0 {
            self.grid.is_walkable(pos) || current == TileKind::ResourceNode
        } else {
            matches!(
                current,
                TileKind::Empty
                    | TileKind::Built(BuildingKind::Floor)
                    | TileKind::RoofAccess
                    | TileKind::FireEscapePlatform
            )
        }
    }

    /// Place a construction site for `kind` at `pos`.
    ///
    /// A resource node on the tile is cleared (its remaining units drop as
    /// haul-requested loose items and it never respawns). A stockpile tile
    /// under a solid building is marked for removal and the site waits for
    /// the drain.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidPlacement`] if the tile cannot host the
    /// building.
    pub fn place_building(&mut self, kind: BuildingKind, pos: TilePos) -> Result<(), WorldError> {
        if !self.placement_allowed(kind, pos) {
            return Err(WorldError::InvalidPlacement { kind, pos });
        }
        if self.grid.tile(pos) == Some(TileKind::ResourceNode) {
            self.resources.clear_node_for_construction(pos);
        }
        let mut awaiting_clear = false;
        if !kind.passable_when_built() || kind.is_openable() {
            // Solid footprint displaces any stockpile tile here.
            if self.zones.is_stockpile(pos) {
                self.zones.mark_tile_for_removal(pos);
                awaiting_clear = self.zones.is_pending_removal(pos);
            }
        }
        self.buildings.open_site(pos, kind, awaiting_clear);
        self.grid.set_tile(pos, TileKind::Site(kind));
        info!(%pos, ?kind, awaiting_clear, "construction site placed");
        Ok(())
    }

    /// Convert a finished site into its built form.
    ///
    /// Registers door/window state, workstations, and fire-escape links,
    /// and (via `set_tile`) queues the room index to re-detect enclosure.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SiteNotFound`] if no site exists at `pos`.
    pub fn complete_construction(&mut self, pos: TilePos) -> Result<BuildingKind, WorldError> {
        let site = self.buildings.close_site(pos).ok_or(WorldError::SiteNotFound(pos))?;
        let kind = site.kind;
        self.grid.set_tile(pos, TileKind::Built(kind));
        match kind {
            BuildingKind::Door => self.buildings.register_door(pos),
            BuildingKind::Window => self.buildings.register_window(pos),
            BuildingKind::FireEscape => {
                let platform = pos.above();
                if self.grid.in_bounds(platform) {
                    self.grid.set_tile(platform, TileKind::FireEscapePlatform);
                    self.buildings.register_escape_link(pos, platform);
                }
            }
            _ if kind.is_workstation() => self.stations.register(pos, kind),
            _ => {}
        }
        info!(%pos, ?kind, "construction complete");
        Ok(kind)
    }

    // -- crafting ------------------------------------------------------------

    /// Finish the current crafting run at the workstation on `pos`.
    ///
    /// Emits the recipe output (resources drop on the station tile flagged
    /// for hauling; items become world items), increments the current
    /// order, pops finished orders, and resets the work state.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::WorkstationNotFound`] if no station is there.
    pub fn finish_crafting(&mut self, pos: TilePos) -> Result<Option<RecipeOutput>, WorldError> {
        let Some(station) = self.stations.station_mut(pos) else {
            return Err(WorldError::WorkstationNotFound(pos));
        };
        if !station.working {
            return Ok(None);
        }
        let Some(recipe) = station.current_recipe() else {
            station.working = false;
            station.progress = 0;
            return Ok(None);
        };
        let output = recipe.output;
        station.working = false;
        station.progress = 0;
        if let Some(index) = station.current_order_index() {
            if let Some(order) = station.orders.get_mut(index) {
                order.completed = order.completed.saturating_add(1);
                order.in_progress = false;
            }
        }
        station.orders.retain(|order| !order.is_done());
        match output {
            RecipeOutput::Resource(resource, amount) => {
                self.resources.drop_loose(pos, resource, amount, true);
            }
            RecipeOutput::Item(item) => {
                self.resources.spawn_world_item(pos, item);
            }
        }
        debug!(%pos, ?output, "crafting run finished");
        Ok(Some(output))
    }

    // -- furniture -----------------------------------------------------------

    /// Whether `kind` can be installed with its footprint origin at `pos`.
    pub fn can_place_furniture(&self, kind: FurnitureKind, pos: TilePos) -> bool {
        let (w, h) = kind.footprint();
        for dx in 0..w {
            for dy in 0..h {
                let tile = TilePos::new(
                    pos.x.saturating_add(dx),
                    pos.y.saturating_add(dy),
                    pos.z,
                );
                let footing = matches!(
                    self.grid.tile(tile),
                    Some(TileKind::Built(BuildingKind::Floor))
                );
                if !footing || !self.grid.is_walkable(tile) {
                    return false;
                }
            }
        }
        true
    }

    /// Install furniture with its footprint origin at `pos`, remembering the
    /// covered tiles for later removal.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidPlacement`] if any footprint tile lacks
    /// finished flooring.
    pub fn install_furniture(&mut self, kind: FurnitureKind, pos: TilePos) -> Result<(), WorldError> {
        if !self.can_place_furniture(kind, pos) {
            return Err(WorldError::InvalidPlacement {
                kind: BuildingKind::Floor,
                pos,
            });
        }
        let (w, h) = kind.footprint();
        for dx in 0..w {
            for dy in 0..h {
                let tile = TilePos::new(
                    pos.x.saturating_add(dx),
                    pos.y.saturating_add(dy),
                    pos.z,
                );
                if let Some(base) = self.grid.tile(tile) {
                    self.grid.remember_base_tile(tile, base);
                }
                self.grid.set_tile(tile, TileKind::Furniture(kind));
            }
        }
        info!(%pos, ?kind, "furniture installed");
        Ok(())
    }

    /// The item that installs a given furniture kind.
    pub const fn furniture_item(kind: FurnitureKind) -> ItemKind {
        match kind {
            FurnitureKind::CrashBed => ItemKind::CrashBed,
        }
    }

    // -- worldgen-ish helpers (host setup, tests) ----------------------------

    /// Convert a roof tile into walkable, buildable roof access.
    ///
    /// Returns `false` if the tile is not currently a roof.
    pub fn allow_roof_access(&mut self, pos: TilePos) -> bool {
        if self.grid.tile(pos) == Some(TileKind::Roof) {
            self.grid.set_tile(pos, TileKind::RoofAccess);
            return true;
        }
        false
    }

    /// Spawn a resource node (host/worldgen entry point).
    pub fn spawn_node(
        &mut self,
        pos: TilePos,
        kind: gridfall_types::NodeKind,
        rng: &mut impl Rng,
    ) -> bool {
        self.resources.spawn_node(&mut self.grid, pos, kind, rng)
    }

    /// Spawn a salvage object (host/worldgen entry point).
    pub fn spawn_salvage(
        &mut self,
        pos: TilePos,
        kind: gridfall_types::SalvageKind,
        rng: &mut impl Rng,
    ) -> bool {
        self.resources.spawn_salvage(&mut self.grid, pos, kind, rng)
    }

    /// Sum of stored food units (raw and cooked), for cooking pressure.
    pub fn total_stored_food(&self) -> u32 {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| kind.is_food())
            .fold(0_u32, |acc, kind| {
                acc.saturating_add(self.zones.total_stored(kind))
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use gridfall_types::NodeKind;

    use super::*;
    use crate::workstations::OrderQuantity;

    fn world() -> World {
        World::new(20, 20, 3, 1000)
    }

    #[test]
    fn place_wall_creates_site_and_scaffolding() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::Wall, pos).is_ok());
        assert_eq!(w.grid.tile(pos), Some(TileKind::Site(BuildingKind::Wall)));
        assert!(w.grid.is_walkable(pos));
        assert!(w.buildings.site(pos).is_some());
    }

    #[test]
    fn placement_on_existing_structure_rejected() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::Wall, pos).is_ok());
        assert!(w.place_building(BuildingKind::Door, pos).is_err());
    }

    #[test]
    fn workstation_requires_floor() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::Generator, pos).is_err());
        w.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(w.place_building(BuildingKind::Generator, pos).is_ok());
    }

    #[test]
    fn placing_on_node_drops_its_yield() {
        let mut w = world();
        let mut rng = SmallRng::seed_from_u64(3);
        let pos = TilePos::new(6, 6, 0);
        assert!(w.spawn_node(pos, NodeKind::Tree, &mut rng));
        let remaining = w.resources.node(pos).map(|n| n.remaining).unwrap_or(0);
        assert!(w.place_building(BuildingKind::Wall, pos).is_ok());
        assert!(w.resources.node(pos).is_none());
        let item = w.resources.loose_at(pos);
        assert!(item.is_some_and(|i| i.amount == remaining && i.haul_requested));
    }

    #[test]
    fn placing_wall_on_stockpile_marks_drain() {
        let mut w = world();
        let pos = TilePos::new(7, 7, 0);
        let tiles = vec![pos, TilePos::new(8, 7, 0)];
        assert!(w.zones.create_zone(&w.grid, &tiles, 0).is_ok());
        w.zones.add_to_tile_storage(pos, ResourceKind::Scrap, 3);
        assert!(w.place_building(BuildingKind::Wall, pos).is_ok());
        assert!(w.zones.is_pending_removal(pos));
        assert!(w.buildings.site(pos).is_some_and(|s| s.awaiting_stockpile_clear));
    }

    #[test]
    fn completion_converts_tile_and_registers_station() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        w.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(w.place_building(BuildingKind::Stove, pos).is_ok());
        assert!(w.complete_construction(pos).is_ok());
        assert_eq!(w.grid.tile(pos), Some(TileKind::Built(BuildingKind::Stove)));
        assert!(!w.grid.is_walkable(pos));
        assert!(w.stations.station(pos).is_some());
        assert!(w.buildings.site(pos).is_none());
    }

    #[test]
    fn completed_door_registers_closed() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::Door, pos).is_ok());
        assert!(w.complete_construction(pos).is_ok());
        assert!(w.buildings.is_door(pos));
        assert!(!w.buildings.is_open(pos));
        assert!(!w.grid.is_walkable(pos));
    }

    #[test]
    fn completed_fire_escape_links_levels() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::FireEscape, pos).is_ok());
        assert!(w.complete_construction(pos).is_ok());
        let platform = pos.above();
        assert_eq!(w.grid.tile(platform), Some(TileKind::FireEscapePlatform));
        assert!(w.grid.is_walkable(platform));
        assert_eq!(w.buildings.escape_link(pos), Some(platform));
    }

    #[test]
    fn finish_crafting_emits_resource_and_advances_order() {
        let mut w = world();
        let pos = TilePos::new(5, 5, 0);
        w.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(w.place_building(BuildingKind::Generator, pos).is_ok());
        assert!(w.complete_construction(pos).is_ok());
        assert!(w.stations.add_order(pos, "burn_wood", OrderQuantity::Single).is_ok());
        if let Some(station) = w.stations.station_mut(pos) {
            station.working = true;
            station.progress = 80;
        }
        let output = w.finish_crafting(pos);
        assert!(matches!(
            output,
            Ok(Some(RecipeOutput::Resource(ResourceKind::Power, 1)))
        ));
        // Single order popped after one emit.
        assert!(w.stations.station(pos).is_some_and(|s| s.orders.is_empty()));
        assert!(w.resources.loose_at(pos).is_some_and(|i| i.haul_requested));
    }

    #[test]
    fn furniture_needs_full_footprint() {
        let mut w = world();
        let origin = TilePos::new(5, 5, 0);
        w.grid.set_tile(origin, TileKind::Built(BuildingKind::Floor));
        // Crash bed is 1x2; second tile is bare ground.
        assert!(!w.can_place_furniture(FurnitureKind::CrashBed, origin));
        w.grid.set_tile(TilePos::new(5, 6, 0), TileKind::Built(BuildingKind::Floor));
        assert!(w.can_place_furniture(FurnitureKind::CrashBed, origin));
        assert!(w.install_furniture(FurnitureKind::CrashBed, origin).is_ok());
        assert_eq!(
            w.grid.tile(TilePos::new(5, 6, 0)),
            Some(TileKind::Furniture(FurnitureKind::CrashBed))
        );
    }

    #[test]
    fn roof_access_conversion() {
        let mut w = world();
        let above = TilePos::new(4, 4, 1);
        assert!(!w.allow_roof_access(above));
        w.grid.set_tile(above, TileKind::Roof);
        assert!(w.allow_roof_access(above));
        assert!(w.grid.is_walkable(above));
    }
}
