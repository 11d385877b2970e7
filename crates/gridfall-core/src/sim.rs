//! The simulation: one owner for all state, one `tick()` for all motion.
//!
//! Phase order within a tick is the contract the whole engine is written
//! against: advance time, update colonists, tick nodes, tick doors and
//! windows, reprocess dirty rooms, decrement job wait timers, auto-haul
//! loose items, run the supply planner, the relocation planner, and the
//! crafting pump, then the slower passes (designation sweep, leisure
//! spawners, combat upkeep). A job created by a planner only becomes
//! claimable on the next tick, because planners run after agent updates.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use gridfall_agents::{
    AgentConfig, Colonist, CombatField, TickCtx, flag_interrupts, maintain_combat_jobs,
    update_colonist,
};
use gridfall_jobs::{
    Job, JobBoard, LeisurePlanner, plan_item_hauls, plan_loose_hauls, plan_relocations,
    plan_supply, pump, sweep,
};
use gridfall_types::{
    BuildingKind, Capability, ColonistId, DesignationKind, FurnitureKind, ItemKind, JobCategory,
    JobKind, Notification, NotificationKind, NotificationLog, ResourceKind, TileKind, TilePos,
    ZoneId,
};
use gridfall_world::{OrderQuantity, World, building_def};

use crate::clock::GameClock;
use crate::config::SimConfig;
use crate::error::SimError;

/// Ticks between passes of the slow equipment-haul planner.
const ITEM_HAUL_INTERVAL: u64 = 10;

/// The complete simulation state and its host-facing API.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) agent_cfg: AgentConfig,
    pub(crate) clock: GameClock,
    pub(crate) tick_count: u64,
    pub(crate) world: World,
    pub(crate) board: JobBoard,
    pub(crate) colonists: Vec<Colonist>,
    pub(crate) leisure: LeisurePlanner,
    pub(crate) rng: SmallRng,
    pub(crate) notifications: NotificationLog,
    pub(crate) colony_lost: bool,
}

impl Simulation {
    /// Build a fresh simulation from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Clock`] if the time rates are inconsistent.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let clock = GameClock::new(config.time.ticks_per_hour, config.time.ticks_per_day)?;
        let world = World::new(
            config.world.width,
            config.world.height,
            config.world.depth,
            config.storage.tile_capacity,
        );
        let agent_cfg = config.agent_config();
        let rng = SmallRng::seed_from_u64(config.world.seed);
        Ok(Self {
            config,
            agent_cfg,
            clock,
            tick_count: 0,
            world,
            board: JobBoard::new(),
            colonists: Vec::new(),
            leisure: LeisurePlanner::new(),
            rng,
            notifications: NotificationLog::new(),
            colony_lost: false,
        })
    }

    // -- the tick ------------------------------------------------------------

    /// Advance the simulation one tick.
    pub fn tick(&mut self) {
        self.clock.advance();
        self.tick_count = self.tick_count.saturating_add(1);
        let hour = self.clock.hour();

        // Colonist phase.
        let mut field = CombatField::survey(&self.colonists);
        flag_interrupts(&mut self.colonists, &field, self.agent_cfg.interrupt_radius);
        let free_beds = self.free_beds();
        for colonist in &mut self.colonists {
            let ctx = TickCtx {
                cfg: &self.agent_cfg,
                hour,
                free_beds: &free_beds,
            };
            update_colonist(
                colonist,
                &mut self.world,
                &mut self.board,
                &mut field,
                &mut self.notifications,
                &ctx,
                &mut self.rng,
            );
        }
        field.apply_damage(&mut self.colonists, &mut self.world, &mut self.notifications);

        // World phase.
        self.world.resources.tick_regrow(&mut self.world.grid);
        let occupied = self
            .colonists
            .iter()
            .filter(|c| !c.dead)
            .map(|c| c.pos)
            .collect();
        self.world.buildings.tick_portals(
            &mut self.world.grid,
            &occupied,
            self.agent_cfg.door_close_delay,
            self.agent_cfg.window_close_delay,
        );
        self.world
            .rooms
            .process_dirty(&mut self.world.grid, &self.world.stations);

        // Planner phase.
        self.board.tick_wait_timers();
        plan_loose_hauls(&mut self.board, &mut self.world);
        if self.tick_count.checked_rem(ITEM_HAUL_INTERVAL) == Some(0) {
            plan_item_hauls(&mut self.board, &self.world);
        }
        plan_supply(
            &mut self.board,
            &mut self.world,
            self.config.storage.max_carry_amount,
        );
        plan_relocations(&mut self.board, &mut self.world);
        pump(&mut self.board, &mut self.world);
        sweep(&mut self.board, &mut self.world);

        let living: Vec<TilePos> = self
            .colonists
            .iter()
            .filter(|c| !c.dead && !c.hostile)
            .map(|c| c.pos)
            .collect();
        let fighters = self
            .colonists
            .iter()
            .filter(|c| !c.dead && !c.hostile && c.capabilities.contains(&Capability::Fight))
            .count();
        self.leisure.spawn_recreation(
            &mut self.board,
            &self.world,
            &living,
            hour,
            self.tick_count,
            &mut self.rng,
        );
        self.leisure
            .spawn_training(&mut self.board, &self.world, fighters, hour, self.tick_count);

        let field = CombatField::survey(&self.colonists);
        maintain_combat_jobs(&mut self.board, &field, &mut self.notifications);

        // Colony-wipe check.
        if !self.colony_lost {
            let had_any = self.colonists.iter().any(|c| !c.hostile);
            let all_dead = self.colonists.iter().filter(|c| !c.hostile).all(|c| c.dead);
            if had_any && all_dead {
                self.colony_lost = true;
                self.notifications.push(Notification::new(
                    NotificationKind::ColonyLost,
                    String::from("Colony lost"),
                    String::from("No colonists remain"),
                ));
            }
        }
    }

    fn free_beds(&self) -> Vec<TilePos> {
        let claimed: Vec<TilePos> = self
            .colonists
            .iter()
            .filter(|c| !c.dead)
            .filter_map(|c| c.bed)
            .collect();
        self.world
            .grid
            .non_empty_tiles()
            .into_iter()
            .filter(|(pos, kind)| {
                *kind == TileKind::Furniture(FurnitureKind::CrashBed) && !claimed.contains(pos)
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    // -- host inputs ---------------------------------------------------------

    /// Place a construction site and queue its construction job.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] if the tile cannot host the building.
    pub fn place_building(&mut self, kind: BuildingKind, pos: TilePos) -> Result<(), SimError> {
        self.world.place_building(kind, pos)?;
        let def = building_def(kind);
        let job = Job::new(JobKind::Construction, JobCategory::Build, pos, def.work)
            .with_subtype(kind);
        self.board.add_job(job);
        Ok(())
    }

    /// Designate a rectangle of tiles (inclusive corners) on level `z`.
    ///
    /// Only tiles with a qualifying subject take the mark: nodes for
    /// harvest, salvage objects for salvage, loose items for haul.
    /// Returns the number of tiles marked.
    pub fn designate(
        &mut self,
        category: DesignationKind,
        from: (i32, i32),
        to: (i32, i32),
        z: i32,
    ) -> u32 {
        let (x0, x1) = (from.0.min(to.0), from.0.max(to.0));
        let (y0, y1) = (from.1.min(to.1), from.1.max(to.1));
        let mut marked = 0;
        for x in x0..=x1 {
            for y in y0..=y1 {
                let pos = TilePos::new(x, y, z);
                let qualifies = match category {
                    DesignationKind::Harvest => self.world.resources.node(pos).is_some(),
                    DesignationKind::Salvage => self.world.resources.salvage_at(pos).is_some(),
                    DesignationKind::Haul => self.world.resources.loose_at(pos).is_some(),
                };
                if qualifies {
                    self.board.add_designation(pos, category);
                    marked = u32::saturating_add(marked, 1);
                }
            }
        }
        marked
    }

    /// Create a stockpile zone over the given tiles.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] if no tile in the proposal is valid.
    pub fn create_stockpile_zone(&mut self, tiles: &[TilePos], z: i32) -> Result<ZoneId, SimError> {
        Ok(self.world.zones.create_zone(&self.world.grid, tiles, z)?)
    }

    /// Set one entry of a zone's accept filter.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] for an unknown zone.
    pub fn set_zone_filter(
        &mut self,
        zone: ZoneId,
        resource: ResourceKind,
        allow: bool,
    ) -> Result<(), SimError> {
        Ok(self.world.zones.set_filter(zone, resource, allow)?)
    }

    /// Mark a stockpile tile for removal (drained first, then dropped).
    pub fn remove_stockpile_tile(&mut self, pos: TilePos) -> bool {
        self.world.zones.mark_tile_for_removal(pos)
    }

    /// Queue an order on a workstation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] for unknown stations or recipes.
    pub fn add_order(
        &mut self,
        pos: TilePos,
        recipe: &str,
        quantity: OrderQuantity,
    ) -> Result<(), SimError> {
        Ok(self.world.stations.add_order(pos, recipe, quantity)?)
    }

    /// Cancel an order on a workstation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] for unknown stations or indices.
    pub fn cancel_order(&mut self, pos: TilePos, index: usize) -> Result<(), SimError> {
        Ok(self.world.stations.cancel_order(pos, index)?)
    }

    /// Select the active recipe for a workstation.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::World`] for unknown stations or recipes.
    pub fn set_workstation_recipe(&mut self, pos: TilePos, recipe: &str) -> Result<(), SimError> {
        Ok(self.world.stations.set_selected_recipe(pos, recipe)?)
    }

    /// Queue a furniture placement: fetch the item from wherever it lies
    /// and install it with its footprint origin at `pos`.
    ///
    /// # Errors
    ///
    /// [`SimError::NoItemAvailable`] when no matching item exists;
    /// [`SimError::World`] when the footprint is invalid.
    pub fn place_furniture(&mut self, kind: FurnitureKind, pos: TilePos) -> Result<(), SimError> {
        if !self.world.can_place_furniture(kind, pos) {
            return Err(SimError::World {
                source: gridfall_world::WorldError::InvalidPlacement {
                    kind: BuildingKind::Floor,
                    pos,
                },
            });
        }
        let item = World::furniture_item(kind);
        let source = self
            .world
            .resources
            .find_world_item(item, pos)
            .ok_or(SimError::NoItemAvailable)?;
        let mut job = Job::new(JobKind::PlaceFurniture, JobCategory::Build, pos, 10)
            .with_pickup(source);
        job.item = Some(item);
        job.furniture = Some(kind);
        self.board.add_job(job);
        Ok(())
    }

    /// Add a colonist to the roster.
    pub fn spawn_colonist(
        &mut self,
        name: &str,
        pos: TilePos,
        capabilities: Vec<Capability>,
    ) -> ColonistId {
        let colonist = Colonist::new(name.to_owned(), pos, capabilities);
        let id = colonist.id;
        info!(colonist = %id, name, "colonist joined");
        self.colonists.push(colonist);
        id
    }

    /// Add a hostile raider to the roster.
    pub fn spawn_hostile(&mut self, name: &str, pos: TilePos) -> ColonistId {
        let raider = Colonist::new_hostile(name.to_owned(), pos);
        let id = raider.id;
        self.notifications.push(Notification::at(
            NotificationKind::Arrival,
            format!("{name} approaches"),
            String::from("hostile"),
            pos,
        ));
        self.colonists.push(raider);
        id
    }

    /// Minimal direct colonist command: raise the interrupt flag so the
    /// colonist drops what they're doing at their next update.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownColonist`] for an unknown id.
    pub fn command_colonist(&mut self, id: ColonistId) -> Result<(), SimError> {
        let colonist = self
            .colonists
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SimError::UnknownColonist(id))?;
        colonist.interrupt = true;
        Ok(())
    }

    /// Convert a roof tile into walkable, buildable roof access.
    pub fn allow_roof_access(&mut self, pos: TilePos) -> bool {
        self.world.allow_roof_access(pos)
    }

    /// Worldgen entry point: spawn a resource node.
    pub fn spawn_node(&mut self, pos: TilePos, kind: gridfall_types::NodeKind) -> bool {
        self.world
            .resources
            .spawn_node(&mut self.world.grid, pos, kind, &mut self.rng)
    }

    /// Worldgen entry point: spawn a salvage object.
    pub fn spawn_salvage(&mut self, pos: TilePos, kind: gridfall_types::SalvageKind) -> bool {
        self.world
            .resources
            .spawn_salvage(&mut self.world.grid, pos, kind, &mut self.rng)
    }

    /// Worldgen/debug entry point: put resources straight into a stockpile
    /// tile, bypassing hauling. Returns the amount actually stored.
    pub fn seed_storage(&mut self, pos: TilePos, resource: ResourceKind, amount: u32) -> u32 {
        self.world.zones.add_to_tile_storage(pos, resource, amount)
    }

    /// Worldgen/debug entry point: leave a crafted item on the ground.
    pub fn seed_item(&mut self, pos: TilePos, item: ItemKind) {
        self.world.resources.spawn_world_item(pos, item);
    }

    // -- host outputs --------------------------------------------------------

    /// The world state (read-only).
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for host-side setup (worldgen, scenario seeding).
    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The job board (read-only).
    pub const fn board(&self) -> &JobBoard {
        &self.board
    }

    /// The colonist roster (read-only).
    pub fn colonists(&self) -> &[Colonist] {
        &self.colonists
    }

    /// The clock (read-only).
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Total ticks simulated.
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Derived stockpile totals for every resource kind.
    pub fn totals(&self) -> std::collections::BTreeMap<ResourceKind, u32> {
        self.world.zones.totals()
    }

    /// Sparse tile enumeration for rendering.
    pub fn tiles(&self) -> std::collections::BTreeMap<TilePos, TileKind> {
        self.world.grid.non_empty_tiles()
    }

    /// Take all pending notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }
}
