//! Tick loop, configuration, save/load, and the host-facing API for the
//! Gridfall colony simulation.
//!
//! Gridfall is a tick-driven colony engine: autonomous colonists satisfy
//! needs, execute player designations, haul materials, construct buildings,
//! and operate workstations on a cyberpunk city grid. This crate is the
//! boundary the host talks to -- it owns the [`Simulation`] value, advances
//! it one deterministic tick at a time, and exposes coordinate-keyed inputs
//! (place a building, designate a rect, queue an order) and snapshot
//! outputs (tiles, jobs, colonists, notifications).
//!
//! Rendering, input handling, audio, and UI are the host's problem; the
//! core never draws, and it never terminates -- every error inside the tick
//! is absorbed into a wait, a dropped attempt, or a loose item on the
//! ground.
//!
//! # Modules
//!
//! - [`clock`] -- Tick-derived hours, days, and day-night bands.
//! - [`config`] -- Typed YAML configuration with full defaults.
//! - [`error`] -- The host-facing error type.
//! - [`sim`] -- The [`Simulation`]: tick phases and the host API.
//! - [`save`] -- Normalized save snapshots and restore.

pub mod clock;
pub mod config;
pub mod error;
pub mod save;
pub mod sim;

// Re-export the host-facing surface at crate root.
pub use clock::{ClockError, GameClock};
pub use config::{ConfigError, SimConfig};
pub use error::SimError;
pub use save::{SAVE_VERSION, SaveState};
pub use sim::Simulation;

// Re-export the types a host needs to drive the API.
pub use gridfall_types::{
    Activity, BuildingKind, Capability, ColonistId, DesignationKind, FurnitureKind, ItemKind,
    JobCategory, JobKind, NodeKind, Notification, NotificationKind, ResourceKind, RoomKind,
    SalvageKind, TileKind, TilePos, TimeOfDay, ZoneId,
};
pub use gridfall_world::OrderQuantity;
