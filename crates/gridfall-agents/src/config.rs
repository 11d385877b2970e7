//! Agent tuning parameters.
//!
//! Bundled into one struct so the simulation core can thread a single
//! reference through the controller, work functions, and vitals. Defaults
//! match the values in the host configuration reference.

use serde::{Deserialize, Serialize};

/// Tuning for colonist behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Ticks between steps (one tile per cooldown).
    pub move_cooldown: u32,
    /// Ticks spent in recovery after an interruption or failed job.
    pub recovery_ticks: u32,
    /// Wait applied to a job released for missing preconditions.
    pub retry_wait: u32,
    /// Door auto-close delay, re-armed by each step onto the door.
    pub door_close_delay: u32,
    /// Window auto-close delay.
    pub window_close_delay: u32,
    /// Units a colonist can carry per supply trip.
    pub max_carry: u32,
    /// Hunger at which a colonist goes looking for a meal.
    pub hunger_eat_threshold: u32,
    /// Hunger at which starvation damage begins.
    pub hunger_starvation: u32,
    /// Ticks between starvation damage once starving.
    pub starvation_interval: u32,
    /// Ticks of sleep per point of health regained.
    pub sleep_regen_interval: u32,
    /// Average ticks between idle wander steps.
    pub wander_interval: u32,
    /// Damage per landed blow.
    pub attack_damage: u32,
    /// Ticks between blows.
    pub attack_interval: u32,
    /// Chebyshev radius at which a hostile interrupts non-fighters.
    pub interrupt_radius: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            move_cooldown: 10,
            recovery_ticks: 30,
            retry_wait: 60,
            door_close_delay: 30,
            window_close_delay: 45,
            max_carry: 20,
            hunger_eat_threshold: 1200,
            hunger_starvation: 2400,
            starvation_interval: 10,
            sleep_regen_interval: 50,
            wander_interval: 40,
            attack_damage: 5,
            attack_interval: 20,
            interrupt_radius: 3,
        }
    }
}
