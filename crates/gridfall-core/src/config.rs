//! Configuration loading and typed config structures.
//!
//! The canonical configuration is a YAML document; every field has a
//! default matching the reference values, so an empty document (or no file
//! at all) yields a playable setup. Sections mirror the subsystems: world
//! dimensions and seed, time rates, storage limits, door delays, and the
//! agent tuning block consumed by `gridfall-agents`.

use std::path::Path;

use serde::Deserialize;

use gridfall_agents::AgentConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// World dimensions and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Time rates.
    #[serde(default)]
    pub time: TimeConfig,

    /// Storage and hauling limits.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Door and window auto-close delays.
    #[serde(default)]
    pub doors: DoorConfig,

    /// Agent behavior tuning.
    #[serde(default)]
    pub agents: AgentTuning,
}

impl SimConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The agent tuning block in the form `gridfall-agents` consumes.
    pub const fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            move_cooldown: self.agents.move_cooldown,
            recovery_ticks: self.agents.recovery_ticks,
            retry_wait: self.agents.retry_wait,
            door_close_delay: self.doors.door_close_delay,
            window_close_delay: self.doors.window_close_delay,
            max_carry: self.storage.max_carry_amount,
            hunger_eat_threshold: self.agents.hunger_eat_threshold,
            hunger_starvation: self.agents.hunger_starvation,
            starvation_interval: self.agents.starvation_interval,
            sleep_regen_interval: self.agents.sleep_regen_interval,
            wander_interval: self.agents.wander_interval,
            attack_damage: self.agents.attack_damage,
            attack_interval: self.agents.attack_interval,
            interrupt_radius: self.agents.interrupt_radius,
        }
    }
}

/// World dimensions and seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Grid width in tiles.
    #[serde(default = "default_grid_extent")]
    pub width: i32,

    /// Grid height in tiles.
    #[serde(default = "default_grid_extent")]
    pub height: i32,

    /// Number of z-levels (0 = ground).
    #[serde(default = "default_grid_depth")]
    pub depth: i32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_grid_extent(),
            height: default_grid_extent(),
            depth: default_grid_depth(),
            seed: default_seed(),
        }
    }
}

/// Time rates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Ticks per in-game hour.
    #[serde(default = "default_ticks_per_hour")]
    pub ticks_per_hour: u64,

    /// Ticks per in-game day.
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ticks_per_hour: default_ticks_per_hour(),
            ticks_per_day: default_ticks_per_day(),
        }
    }
}

/// Storage and hauling limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Capacity of a single stockpile tile.
    #[serde(default = "default_tile_capacity")]
    pub tile_capacity: u32,

    /// Units a colonist can carry per supply trip.
    #[serde(default = "default_max_carry")]
    pub max_carry_amount: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tile_capacity: default_tile_capacity(),
            max_carry_amount: default_max_carry(),
        }
    }
}

/// Door and window auto-close delays.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DoorConfig {
    /// Ticks before an opened door swings shut.
    #[serde(default = "default_door_delay")]
    pub door_close_delay: u32,

    /// Ticks before an opened window swings shut.
    #[serde(default = "default_window_delay")]
    pub window_close_delay: u32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            door_close_delay: default_door_delay(),
            window_close_delay: default_window_delay(),
        }
    }
}

/// Agent behavior tuning (mirrors [`AgentConfig`] minus door/storage
/// values, which live in their own sections).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentTuning {
    /// Ticks between steps.
    #[serde(default = "default_move_cooldown")]
    pub move_cooldown: u32,

    /// Recovery pause after interruptions.
    #[serde(default = "default_recovery_ticks")]
    pub recovery_ticks: u32,

    /// Wait applied to softly-failed jobs.
    #[serde(default = "default_retry_wait")]
    pub retry_wait: u32,

    /// Hunger at which colonists seek a meal.
    #[serde(default = "default_hunger_eat")]
    pub hunger_eat_threshold: u32,

    /// Hunger at which starvation damage begins.
    #[serde(default = "default_hunger_starvation")]
    pub hunger_starvation: u32,

    /// Ticks between starvation damage.
    #[serde(default = "default_starvation_interval")]
    pub starvation_interval: u32,

    /// Ticks of sleep per point of health.
    #[serde(default = "default_sleep_regen")]
    pub sleep_regen_interval: u32,

    /// Average ticks between idle wander steps.
    #[serde(default = "default_wander_interval")]
    pub wander_interval: u32,

    /// Damage per landed blow.
    #[serde(default = "default_attack_damage")]
    pub attack_damage: u32,

    /// Ticks between blows.
    #[serde(default = "default_attack_interval")]
    pub attack_interval: u32,

    /// Hostile-proximity interrupt radius.
    #[serde(default = "default_interrupt_radius")]
    pub interrupt_radius: u32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            move_cooldown: default_move_cooldown(),
            recovery_ticks: default_recovery_ticks(),
            retry_wait: default_retry_wait(),
            hunger_eat_threshold: default_hunger_eat(),
            hunger_starvation: default_hunger_starvation(),
            starvation_interval: default_starvation_interval(),
            sleep_regen_interval: default_sleep_regen(),
            wander_interval: default_wander_interval(),
            attack_damage: default_attack_damage(),
            attack_interval: default_attack_interval(),
            interrupt_radius: default_interrupt_radius(),
        }
    }
}

const fn default_grid_extent() -> i32 {
    25
}

const fn default_grid_depth() -> i32 {
    10
}

const fn default_seed() -> u64 {
    0x6472_6964
}

const fn default_ticks_per_hour() -> u64 {
    1000
}

const fn default_ticks_per_day() -> u64 {
    24_000
}

const fn default_tile_capacity() -> u32 {
    1000
}

const fn default_max_carry() -> u32 {
    20
}

const fn default_door_delay() -> u32 {
    30
}

const fn default_window_delay() -> u32 {
    45
}

const fn default_move_cooldown() -> u32 {
    10
}

const fn default_recovery_ticks() -> u32 {
    30
}

const fn default_retry_wait() -> u32 {
    60
}

const fn default_hunger_eat() -> u32 {
    1200
}

const fn default_hunger_starvation() -> u32 {
    2400
}

const fn default_starvation_interval() -> u32 {
    10
}

const fn default_sleep_regen() -> u32 {
    50
}

const fn default_wander_interval() -> u32 {
    40
}

const fn default_attack_damage() -> u32 {
    5
}

const fn default_attack_interval() -> u32 {
    20
}

const fn default_interrupt_radius() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = SimConfig::parse("{}");
        assert!(config.as_ref().is_ok_and(|c| {
            c.storage.tile_capacity == 1000
                && c.storage.max_carry_amount == 20
                && c.doors.door_close_delay == 30
                && c.doors.window_close_delay == 45
                && c.time.ticks_per_hour == 1000
                && c.time.ticks_per_day == 24_000
        }));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let yaml = "storage:\n  tile_capacity: 50\n";
        let config = SimConfig::parse(yaml);
        assert!(config.is_ok_and(|c| {
            c.storage.tile_capacity == 50 && c.storage.max_carry_amount == 20
        }));
    }

    #[test]
    fn bad_yaml_is_an_error() {
        assert!(SimConfig::parse(": not yaml :").is_err());
    }

    #[test]
    fn agent_config_carries_door_delays() {
        let config = SimConfig::default();
        let agents = config.agent_config();
        assert_eq!(agents.door_close_delay, 30);
        assert_eq!(agents.window_close_delay, 45);
        assert_eq!(agents.max_carry, 20);
    }
}
