//! Error types for the `gridfall-world` crate.
//!
//! Recoverable precondition failures (no stockpile accepts a resource, a
//! tile is already occupied) are reported through `Option` and clamped
//! return values at the call sites that expect them; [`WorldError`] covers
//! the cases a caller must not silently ignore.

use gridfall_types::{BuildingKind, ResourceKind, TilePos, ZoneId};

/// Errors that can occur during world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A coordinate outside the grid volume was used.
    #[error("tile out of bounds: {0}")]
    OutOfBounds(TilePos),

    /// A building cannot be placed at the target tile.
    #[error("cannot place {kind:?} at {pos}")]
    InvalidPlacement {
        /// The building being placed.
        kind: BuildingKind,
        /// The rejected tile.
        pos: TilePos,
    },

    /// No construction site exists at the coordinate.
    #[error("no construction site at {0}")]
    SiteNotFound(TilePos),

    /// No workstation exists at the coordinate.
    #[error("no workstation at {0}")]
    WorkstationNotFound(TilePos),

    /// The recipe id is not offered by the workstation's building kind.
    #[error("workstation at {pos} has no recipe {recipe:?}")]
    UnknownRecipe {
        /// The workstation tile.
        pos: TilePos,
        /// The rejected recipe id.
        recipe: String,
    },

    /// An order index was out of range for the workstation's queue.
    #[error("workstation at {pos} has no order {index}")]
    OrderOutOfRange {
        /// The workstation tile.
        pos: TilePos,
        /// The rejected index.
        index: usize,
    },

    /// The zone id does not exist.
    #[error("zone not found: {0}")]
    ZoneNotFound(ZoneId),

    /// None of the proposed tiles were valid for a stockpile zone.
    #[error("no valid stockpile tiles in proposal")]
    NoValidZoneTiles,

    /// A storage tile already holds a different resource kind.
    #[error("storage at {pos} holds {stored:?}, cannot accept {offered:?}")]
    StorageKindMismatch {
        /// The storage tile.
        pos: TilePos,
        /// What it already holds.
        stored: ResourceKind,
        /// What was offered.
        offered: ResourceKind,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
