//! Job ordering and the should-take rules.
//!
//! `request_job` returns the best available job under a lexicographic
//! ordering: pressure (higher first), kind weight, construction subtype
//! weight, Manhattan distance to the colonist, and finally insertion order
//! for a stable tie-break.

use gridfall_types::{Activity, BuildingKind, Capability, JobCategory, JobKind, TilePos};
use gridfall_world::World;

use crate::job::Job;

/// Pressure at or above which a job overrides off-hours schedules.
pub const SCHEDULE_OVERRIDE_PRESSURE: u8 = 5;

/// Static weight of a job kind (higher claims first at equal pressure).
pub const fn kind_weight(kind: JobKind) -> u8 {
    match kind {
        JobKind::Construction | JobKind::PlaceFurniture => 80,
        JobKind::Supply => 70,
        JobKind::CraftingWork => 65,
        JobKind::CraftingFetch => 60,
        JobKind::Gathering | JobKind::Salvage => 50,
        JobKind::Haul => 40,
        JobKind::Relocate => 30,
        JobKind::Combat => 25,
        JobKind::Recreation => 20,
        JobKind::Training => 10,
    }
}

/// Weight of a construction subtype (workstations first, floors last).
pub const fn subtype_weight(subtype: Option<BuildingKind>) -> u8 {
    match subtype {
        Some(kind) if kind.is_workstation() => 4,
        Some(BuildingKind::Door) => 3,
        Some(BuildingKind::Wall | BuildingKind::ReinforcedWall) => 2,
        Some(BuildingKind::Floor) => 1,
        _ => 0,
    }
}

/// Sort key for a candidate job. Larger compares better.
pub fn score(job: &Job, pressure: u8, colonist: TilePos) -> (u8, u8, u8, core::cmp::Reverse<u32>, core::cmp::Reverse<u64>) {
    (
        pressure,
        kind_weight(job.kind),
        subtype_weight(job.subtype),
        core::cmp::Reverse(colonist.manhattan(job.pos)),
        core::cmp::Reverse(job.seq),
    )
}

/// Whether a colonist with these capabilities may work this category.
pub fn capability_allows(capabilities: &[Capability], category: JobCategory) -> bool {
    if category == JobCategory::Leisure {
        return true;
    }
    capabilities.iter().any(|cap| cap.unlocks() == category)
}

/// Whether the schedule window admits this job.
///
/// Working hours admit everything. Off-hours admit leisure (recreation and
/// training) plus anything urgent enough to override; the sleep window only
/// yields to urgent work.
pub const fn window_allows(activity: Activity, kind: JobKind, pressure: u8) -> bool {
    match activity {
        Activity::Work => true,
        Activity::Recreation | Activity::Training => {
            matches!(kind, JobKind::Recreation | JobKind::Training)
                || pressure >= SCHEDULE_OVERRIDE_PRESSURE
        }
        Activity::Sleep => pressure >= SCHEDULE_OVERRIDE_PRESSURE,
    }
}

/// The construction should-take rule.
///
/// A construction job is skipped while any material still missing from its
/// site has no stored units on the colonist's level -- supply jobs handle
/// delivery, and construction only commits once the shortfall is coverable.
pub fn should_take(job: &Job, world: &World, colonist: TilePos) -> bool {
    if job.kind != JobKind::Construction {
        return true;
    }
    let Some(site) = world.buildings.site(job.pos) else {
        // Site vanished; the stale job will be culled when claimed.
        return false;
    };
    if site.awaiting_stockpile_clear {
        return false;
    }
    for (resource, _short) in site.missing() {
        if world.zones.total_stored_on_level(resource, colonist.z) == 0 {
            return false;
        }
    }
    true
}
