//! Tile kinds and base walkability.
//!
//! The grid stores one [`TileKind`] per cell. Buildings appear twice in the
//! kind space: `Site(kind)` while under construction (walkable scaffolding)
//! and `Built(kind)` once finished. Walkability is a pure function of the
//! kind plus door/window open state; the grid layer re-derives it on every
//! tile mutation, and the door registry toggles it when doors open or close.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A constructible building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Basic wall; blocks movement.
    Wall,
    /// Reinforced wall; blocks movement.
    ReinforcedWall,
    /// Door; passable while open.
    Door,
    /// Interior floor.
    Floor,
    /// Window; climbable while open.
    Window,
    /// A walkable span between structures.
    Bridge,
    /// Vertical access; links to a platform one level up.
    FireEscape,
    /// Workstation: refines scrap into metal.
    SalvagersBench,
    /// Workstation: burns wood into power.
    Generator,
    /// Workstation: cooks raw food into meals.
    Stove,
    /// Multi-recipe workstation: tools and hardware.
    GutterForge,
    /// Multi-recipe workstation: clothing and bedding.
    SkinshopLoom,
    /// Multi-recipe workstation: implants and charms.
    CortexSpindle,
    /// Training station for fighters.
    Barracks,
}

impl BuildingKind {
    /// All building kinds, in canonical order.
    pub const ALL: [Self; 14] = [
        Self::Wall,
        Self::ReinforcedWall,
        Self::Door,
        Self::Floor,
        Self::Window,
        Self::Bridge,
        Self::FireEscape,
        Self::SalvagersBench,
        Self::Generator,
        Self::Stove,
        Self::GutterForge,
        Self::SkinshopLoom,
        Self::CortexSpindle,
        Self::Barracks,
    ];

    /// Whether the finished building can be walked through.
    ///
    /// Doors and windows report `false` here -- their walkability is gated
    /// on open state, which the door registry maintains on the grid.
    pub const fn passable_when_built(self) -> bool {
        matches!(self, Self::Floor | Self::Bridge | Self::FireEscape)
    }

    /// Whether this building is opened by walking onto it.
    pub const fn is_openable(self) -> bool {
        matches!(self, Self::Door | Self::Window)
    }

    /// Whether the finished building hosts an order queue and recipes.
    pub const fn is_workstation(self) -> bool {
        matches!(
            self,
            Self::SalvagersBench
                | Self::Generator
                | Self::Stove
                | Self::GutterForge
                | Self::SkinshopLoom
                | Self::CortexSpindle
                | Self::Barracks
        )
    }
}

// ---------------------------------------------------------------------------
// Furniture
// ---------------------------------------------------------------------------

/// Installed furniture (placed from a crafted item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    /// A bed; colonists claim one for the sleep window. 1x2 footprint.
    CrashBed,
}

impl FurnitureKind {
    /// Footprint in tiles as `(width, height)`; `(x, y)` is the origin.
    pub const fn footprint(self) -> (i32, i32) {
        match self {
            Self::CrashBed => (1, 2),
        }
    }

    /// Whether colonists can walk over the installed furniture.
    pub const fn passable(self) -> bool {
        match self {
            Self::CrashBed => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// The kind tag carried by every grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Nothing here. Walkable at ground level only.
    Empty,
    /// Paved street.
    Street,
    /// Cracked street.
    StreetCracked,
    /// Sidewalk.
    Sidewalk,
    /// Rubble and litter.
    Debris,
    /// Overgrowth.
    Weeds,
    /// Bare dirt.
    Dirt,
    /// Stubborn grass.
    Grass,
    /// Exposed rock.
    Rock,
    /// Burn scar.
    Scorched,
    /// A harvestable resource node stands here.
    ResourceNode,
    /// A salvageable ruin object stands here.
    SalvageObject,
    /// Roof surface over an enclosed room; not walkable until allowed.
    Roof,
    /// Player-allowed rooftop surface; walkable and buildable.
    RoofAccess,
    /// External landing of a fire escape; walkable.
    FireEscapePlatform,
    /// A building under construction (walkable scaffolding).
    Site(BuildingKind),
    /// A finished building.
    Built(BuildingKind),
    /// Installed furniture.
    Furniture(FurnitureKind),
}

impl TileKind {
    /// Base walkability of this kind at the given level, with doors and
    /// windows considered closed.
    ///
    /// Ground level defaults walkable; upper levels default blocked until a
    /// tile explicitly provides footing (floors, roof access, platforms).
    pub const fn base_walkable(self, z: i32) -> bool {
        match self {
            Self::Empty => z == 0,
            Self::Street
            | Self::StreetCracked
            | Self::Sidewalk
            | Self::Debris
            | Self::Weeds
            | Self::Dirt
            | Self::Grass
            | Self::Rock
            | Self::Scorched
            | Self::ResourceNode
            | Self::SalvageObject
            | Self::RoofAccess
            | Self::FireEscapePlatform
            | Self::Site(_) => true,
            Self::Roof => false,
            Self::Built(kind) => kind.passable_when_built(),
            Self::Furniture(kind) => kind.passable(),
        }
    }

    /// Whether this tile provides interior flooring for room detection.
    pub const fn is_floor_like(self) -> bool {
        matches!(
            self,
            Self::Built(BuildingKind::Floor) | Self::RoofAccess | Self::Furniture(_)
        )
    }

    /// Whether a stockpile zone may claim this tile on an upper level.
    ///
    /// Ground-level zone validation accepts any walkable non-building tile;
    /// upper levels only accept explicit flooring.
    pub const fn is_upper_stockpile_surface(self) -> bool {
        matches!(
            self,
            Self::Built(BuildingKind::Floor) | Self::RoofAccess | Self::FireEscapePlatform
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_walkable_only_at_ground() {
        assert!(TileKind::Empty.base_walkable(0));
        assert!(!TileKind::Empty.base_walkable(1));
    }

    #[test]
    fn walls_block_and_floors_pass() {
        assert!(!TileKind::Built(BuildingKind::Wall).base_walkable(0));
        assert!(TileKind::Built(BuildingKind::Floor).base_walkable(2));
    }

    #[test]
    fn closed_doors_block() {
        assert!(!TileKind::Built(BuildingKind::Door).base_walkable(0));
        assert!(!TileKind::Built(BuildingKind::Window).base_walkable(0));
    }

    #[test]
    fn sites_are_walkable_scaffolding() {
        assert!(TileKind::Site(BuildingKind::Wall).base_walkable(0));
        assert!(TileKind::Site(BuildingKind::Generator).base_walkable(1));
    }

    #[test]
    fn workstations_block_when_built() {
        for kind in BuildingKind::ALL {
            if kind.is_workstation() {
                assert!(!TileKind::Built(kind).base_walkable(0));
            }
        }
    }

    #[test]
    fn crash_bed_is_passable_furniture() {
        assert!(TileKind::Furniture(FurnitureKind::CrashBed).base_walkable(1));
        assert_eq!(FurnitureKind::CrashBed.footprint(), (1, 2));
    }
}
