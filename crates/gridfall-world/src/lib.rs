//! Grid, resources, zones, buildings, and rooms for the Gridfall simulation.
//!
//! This crate models the physical colony: a 3-D tile grid with derived
//! walkability, harvestable resource nodes, loose ground items, stockpile
//! zones with per-tile storage, construction sites, doors and windows with
//! close timers, workstations with order queues, and flood-fill room
//! detection.
//!
//! # Modules
//!
//! - [`grid`] -- The tile grid: kinds, walkability, env metadata, dirty queue.
//! - [`error`] -- Error types for world-state operations.
//! - [`resources`] -- Nodes, loose items, salvage objects, world items.
//! - [`zones`] -- Stockpile zones, accept filters, per-tile storage.
//! - [`stores`] -- Storage-consistency audit (defense-in-depth).
//! - [`buildings`] -- Building defs, construction sites, doors, fire escapes.
//! - [`workstations`] -- Recipes, orders, input buffers.
//! - [`rooms`] -- Enclosure detection, roof management, classification.
//! - [`world`] -- The [`World`] value bundling every registry.

pub mod buildings;
pub mod error;
pub mod grid;
pub mod resources;
pub mod rooms;
pub mod stores;
pub mod workstations;
pub mod world;
pub mod zones;

// Re-export primary types at crate root.
pub use buildings::{BuildingDef, BuildingRegistry, ConstructionSite, PortalState, building_def};
pub use error::WorldError;
pub use grid::{EnvData, TileGrid};
pub use resources::{
    LooseItem, NodeDef, ResourceNode, ResourceRegistry, SalvageDef, SalvageObject, node_def,
    salvage_def,
};
pub use rooms::{Room, RoomIndex};
pub use stores::{AuditResult, audit};
pub use workstations::{
    Order, OrderQuantity, Recipe, RecipeOutput, Workstation, WorkstationRegistry, recipe,
    recipes_for,
};
pub use world::World;
pub use zones::{StockpileZone, TileStore, ZoneRegistry};
