//! Enumeration types shared across the Gridfall workspace.
//!
//! Resources, node and salvage kinds, crafted items, job kinds and
//! capability gates, schedule activities, room kinds, and time-of-day bands.
//! All of these are fieldless enums that serialize as snake_case strings so
//! they can key JSON maps in save snapshots.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A stackable resource type.
///
/// Resources flow from nodes (or salvage) through loose ground items into
/// stockpile tiles, and from stockpiles into construction sites and
/// workstation input buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Scavenged lumber, the staple construction material.
    Wood,
    /// Unsorted junk, refined into metal at a salvager's bench.
    Scrap,
    /// Quarried mineral, used in masonry and electronics.
    Mineral,
    /// Refined metal, produced from scrap.
    Metal,
    /// Stored charge, produced by generators and consumed by stoves.
    Power,
    /// Unprepared food harvested from food plants.
    RawFood,
    /// A prepared meal, the only thing colonists will eat.
    CookedMeal,
}

impl ResourceKind {
    /// All resource kinds, in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Wood,
        Self::Scrap,
        Self::Mineral,
        Self::Metal,
        Self::Power,
        Self::RawFood,
        Self::CookedMeal,
    ];

    /// Whether this resource counts toward the colony's food supply
    /// (drives dynamic cooking pressure).
    pub const fn is_food(self) -> bool {
        matches!(self, Self::RawFood | Self::CookedMeal)
    }
}

// ---------------------------------------------------------------------------
// Resource nodes & salvage
// ---------------------------------------------------------------------------

/// A kind of harvestable resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A tree; yields wood, regrows.
    Tree,
    /// A scrap heap; spawns loose scrap directly, never regrows.
    ScrapPile,
    /// A mineral outcrop; yields mineral, regrows slowly.
    MineralNode,
    /// An edible plant; yields raw food, regrows.
    FoodPlant,
}

/// Lifecycle state of a resource node, used for reservation and rendering.
///
/// Transitions are monotonic within a harvest run:
/// `Idle → Reserved → InProgress → Yielded → Depleted`; regrowth resets the
/// node to `Idle` atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// No colonist assigned.
    Idle,
    /// A colonist has claimed the gathering job and is en route.
    Reserved,
    /// A colonist is actively harvesting.
    InProgress,
    /// Units have dropped on the tile and await pickup.
    Yielded,
    /// Fully harvested; waiting on the regrow timer (or removal).
    Depleted,
}

/// A kind of salvageable ruin object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalvageKind {
    /// Dead machinery; the richest scrap source.
    RuinedTech,
    /// A loose pile of salvage.
    SalvagePile,
    /// A collapsed wall section.
    RuinedWall,
}

// ---------------------------------------------------------------------------
// Crafted items
// ---------------------------------------------------------------------------

/// A discrete crafted item (equipment or furniture).
///
/// Unlike resources, items do not stack into tile storage; they exist as
/// world items on a tile until hauled or installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Pry-bar and cutter set; gutter forge output.
    SalvageTool,
    /// Heavy gloves; gutter forge output.
    WorkGloves,
    /// Wrist-mounted signal booster; gutter forge output.
    SignalGauntlet,
    /// Cast paving slab; gutter forge output.
    GutterSlab,
    /// Pressed scrap helmet; skinshop loom output.
    HardHat,
    /// Reinforced vest; skinshop loom output.
    WorkVest,
    /// Insulated jacket; skinshop loom output.
    PaddedJacket,
    /// Steel-toed boots; skinshop loom output.
    WorkBoots,
    /// Plated torso armor; skinshop loom output.
    ScrapArmor,
    /// A flat-pack bed; placeable furniture.
    CrashBed,
    /// Concentration implant; cortex spindle output.
    FocusChip,
    /// Anti-noise implant; cortex spindle output.
    EchoDampener,
    /// A talisman; cortex spindle output.
    LuckyCoin,
    /// A keepsake; cortex spindle output.
    MemoryLocket,
    /// A beacon charm; cortex spindle output.
    SignalStone,
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// The kind of work a job represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Build out a construction site at the target tile.
    Construction,
    /// Harvest a resource node.
    Gathering,
    /// Batched material delivery to construction sites.
    Supply,
    /// Move a loose item (or world item) into storage.
    Haul,
    /// Drain a storage tile whose zone no longer wants its contents.
    Relocate,
    /// Dismantle a salvage object for scrap.
    Salvage,
    /// Fetch a recipe input from storage into a workstation buffer.
    CraftingFetch,
    /// Stand at a workstation and advance its recipe progress.
    CraftingWork,
    /// Fetch a furniture item and install it at the target tile.
    PlaceFurniture,
    /// Unwind at a recreation spot.
    Recreation,
    /// Drill at the barracks.
    Training,
    /// Engage a hostile.
    Combat,
}

impl JobKind {
    /// Whether this kind follows the pickup-then-deliver movement shape
    /// rather than walk-to-target-and-work.
    pub const fn is_haul_like(self) -> bool {
        matches!(
            self,
            Self::Supply | Self::Haul | Self::Relocate | Self::CraftingFetch | Self::PlaceFurniture
        )
    }
}

/// Capability-gating group for a job.
///
/// A colonist only claims jobs whose category matches one of their
/// capability tags. `Leisure` is ungated -- anyone may relax or drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    /// Construction and furniture installation.
    Build,
    /// Supply runs, loose-item hauls, and relocations.
    Haul,
    /// Harvesting and salvage.
    Scavenge,
    /// Workstation fetching and crafting work.
    Craft,
    /// Crafting work at a stove.
    Cook,
    /// Combat.
    Fight,
    /// Recreation and training.
    Leisure,
}

/// A colonist capability tag, gating which job categories they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May take `Build` jobs.
    Build,
    /// May take `Cook` jobs.
    Cook,
    /// May take `Craft` jobs.
    Craft,
    /// May take `Haul` jobs.
    Haul,
    /// May take `Scavenge` jobs.
    Scavenge,
    /// May take `Fight` jobs.
    Fight,
}

impl Capability {
    /// The job category this capability unlocks.
    pub const fn unlocks(self) -> JobCategory {
        match self {
            Self::Build => JobCategory::Build,
            Self::Cook => JobCategory::Cook,
            Self::Craft => JobCategory::Craft,
            Self::Haul => JobCategory::Haul,
            Self::Scavenge => JobCategory::Scavenge,
            Self::Fight => JobCategory::Fight,
        }
    }
}

/// A persistent player mark on a tile.
///
/// Designations outlive the jobs they spawn: a harvest designation keeps
/// re-emitting gathering jobs as its node regrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignationKind {
    /// Harvest the resource node here (re-arms on regrowth).
    Harvest,
    /// Dismantle the salvage object here.
    Salvage,
    /// Haul the loose item here to a stockpile.
    Haul,
}

// ---------------------------------------------------------------------------
// Schedules & time
// ---------------------------------------------------------------------------

/// What a colonist's schedule says the current hour is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Normal working hours; any job is fair game.
    Work,
    /// Off hours; recreation jobs preferred.
    Recreation,
    /// Bedtime; only urgent work interrupts.
    Sleep,
    /// Morning drills; training jobs preferred.
    Training,
}

/// Day-night band derived from the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 05:00-07:00.
    Dawn,
    /// 07:00-19:00.
    Day,
    /// 19:00-21:00.
    Dusk,
    /// 21:00-05:00.
    Night,
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// Classified purpose of a detected room.
///
/// Classification precedence (first matching workstation wins): stove,
/// salvager's bench, gutter forge, skinshop loom, cortex spindle, barracks,
/// crash bed, otherwise common room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Contains a stove.
    Kitchen,
    /// Contains a salvager's bench.
    SalvageBay,
    /// Contains a gutter forge.
    Forge,
    /// Contains a skinshop loom.
    Tailory,
    /// Contains a cortex spindle.
    CortexLab,
    /// Contains a barracks.
    Barracks,
    /// Contains a crash bed (and no workstation).
    Dormitory,
    /// No distinguishing contents.
    CommonRoom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&ResourceKind::CookedMeal).ok(),
            Some(String::from("\"cooked_meal\""))
        );
    }

    #[test]
    fn food_kinds() {
        assert!(ResourceKind::RawFood.is_food());
        assert!(ResourceKind::CookedMeal.is_food());
        assert!(!ResourceKind::Wood.is_food());
    }

    #[test]
    fn haul_like_kinds() {
        assert!(JobKind::Supply.is_haul_like());
        assert!(JobKind::CraftingFetch.is_haul_like());
        assert!(JobKind::PlaceFurniture.is_haul_like());
        assert!(!JobKind::Construction.is_haul_like());
        assert!(!JobKind::Gathering.is_haul_like());
    }

    #[test]
    fn capabilities_unlock_their_categories() {
        assert_eq!(Capability::Build.unlocks(), JobCategory::Build);
        assert_eq!(Capability::Scavenge.unlocks(), JobCategory::Scavenge);
        assert_eq!(Capability::Fight.unlocks(), JobCategory::Fight);
    }
}
