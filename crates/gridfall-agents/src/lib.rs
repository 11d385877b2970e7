//! Colonist state machine, pathfinding, work execution, and vitals for the
//! Gridfall simulation.
//!
//! Colonists are pull-based: the planners in `gridfall-jobs` decide what
//! the colony needs, and idle colonists claim the best eligible job each
//! tick. This crate owns everything that happens after the claim -- walking
//! (doors opened on entry, fire escapes between levels), at-tile work,
//! multi-leg haul runs, eating, sleeping, and fighting.
//!
//! # Modules
//!
//! - [`colonist`] -- The colonist record and state enum.
//! - [`config`] -- Agent tuning parameters.
//! - [`schedule`] -- Hour-by-hour daily plans.
//! - [`pathing`] -- BFS pathfinding over the walkability grid.
//! - [`controller`] -- The per-tick state machine dispatch.
//! - [`work`] -- At-tile work functions per job kind.
//! - [`vitals`] -- Hunger, eating, starvation, death.
//! - [`combat`] -- Combat survey, damage accumulation, hostile behavior.

pub mod colonist;
pub mod combat;
pub mod config;
pub mod controller;
pub mod pathing;
pub mod schedule;
pub mod vitals;
pub mod work;

// Re-export the main surface at crate root.
pub use colonist::{Carry, Colonist, ColonistState, HaulStage};
pub use combat::{CombatField, flag_interrupts, maintain_combat_jobs};
pub use config::AgentConfig;
pub use controller::{TickCtx, update_colonist};
pub use pathing::{find_path, find_path_to_interaction};
pub use schedule::{Schedule, ScheduleBlock};
pub use work::WorkOutcome;
