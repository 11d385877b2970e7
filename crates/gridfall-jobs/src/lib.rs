//! Job board, priorities, and per-tick planners for the Gridfall simulation.
//!
//! Colonists never decide what the colony needs; the planners here do. Each
//! tick the supply planner batches construction-material runs, the
//! relocation planner drains storage tiles that shouldn't hold what they
//! hold, the crafting pump drives workstation orders, the auto-haul pass
//! sweeps flagged loose items, and the designation sweep re-emits jobs for
//! standing player marks. Colonists then pull the best available job
//! through [`JobBoard::request_job`].
//!
//! # Modules
//!
//! - [`job`] -- The job record and its payloads.
//! - [`board`] -- Queue, per-tile index, designations, `request_job`.
//! - [`priority`] -- Lexicographic ordering and should-take rules.
//! - [`pressure`] -- Dynamic cooking and combat pressure.
//! - [`haul`] -- Auto-haul for loose items and crafted gear.
//! - [`supply`] -- Batched construction supply runs.
//! - [`relocate`] -- Pending-removal and filter-mismatch drains.
//! - [`crafting`] -- The workstation pump.
//! - [`designations`] -- Persistent-mark sweep.
//! - [`leisure`] -- Recreation and training spawners.

pub mod board;
pub mod crafting;
pub mod designations;
pub mod haul;
pub mod job;
pub mod leisure;
pub mod pressure;
pub mod priority;
pub mod relocate;
pub mod supply;

// Re-export the main surface at crate root.
pub use board::JobBoard;
pub use crafting::pump;
pub use designations::sweep;
pub use haul::{HAUL_WORK, plan_item_hauls, plan_loose_hauls};
pub use job::{Delivery, Job};
pub use leisure::LeisurePlanner;
pub use pressure::{combat_pressure, cooking_pressure, effective_pressure};
pub use priority::{
    SCHEDULE_OVERRIDE_PRESSURE, capability_allows, kind_weight, should_take, subtype_weight,
    window_allows,
};
pub use relocate::plan_relocations;
pub use supply::plan_supply;
