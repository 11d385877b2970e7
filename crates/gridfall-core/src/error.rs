//! Error types for the `gridfall-core` crate.

use gridfall_types::ColonistId;

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors surfaced by the simulation's host-facing API.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration was invalid.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The clock could not be built from the configured rates.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: gridfall_world::WorldError,
    },

    /// A save snapshot could not be serialized or deserialized.
    #[error("save error: {source}")]
    Save {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// No colonist with the given id exists.
    #[error("unknown colonist: {0}")]
    UnknownColonist(ColonistId),

    /// No furniture item of the required kind exists anywhere in the world.
    #[error("no item available to place")]
    NoItemAvailable,
}
