//! Shared type definitions for the Gridfall simulation core.
//!
//! This crate is the single source of truth for the identifiers, coordinate
//! type, enumerations, and notification records used across the Gridfall
//! workspace. Everything here is plain data: no registry owns anything, and
//! no module in this crate mutates world state.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`pos`] -- [`TilePos`], the universal coordinate key
//! - [`tile`] -- Tile kinds, building kinds, furniture, base walkability
//! - [`enums`] -- Resources, nodes, items, jobs, schedules, rooms
//! - [`notification`] -- Host-facing event records and the drain queue

pub mod enums;
pub mod ids;
pub mod notification;
pub mod pos;
pub mod tile;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Activity, Capability, DesignationKind, ItemKind, JobCategory, JobKind, NodeKind, NodeState,
    ResourceKind, RoomKind, SalvageKind, TimeOfDay,
};
pub use ids::{ColonistId, JobId, RoomId, ZoneId};
pub use notification::{Notification, NotificationKind, NotificationLog};
pub use pos::TilePos;
pub use tile::{BuildingKind, FurnitureKind, TileKind};
