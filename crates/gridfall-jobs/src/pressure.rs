//! Dynamic job pressure.
//!
//! Most jobs carry a static pressure set at creation. Two kinds are
//! recomputed on every scan from live colony state: cooking pressure is a
//! stepwise function of total stored food, and combat pressure scales
//! inversely with Chebyshev distance to the nearest same-level hostile.

use gridfall_types::{JobCategory, JobKind, TilePos};
use gridfall_world::World;

use crate::job::Job;

/// Cooking pressure from total stored food units.
///
/// Plenty of food keeps the stove a background chore; an empty larder makes
/// it the most urgent job in the colony.
pub const fn cooking_pressure(total_food: u32) -> u8 {
    if total_food >= 50 {
        2
    } else if total_food >= 30 {
        4
    } else if total_food >= 15 {
        6
    } else if total_food >= 5 {
        8
    } else {
        10
    }
}

/// Combat pressure from the nearest hostile on the job's level.
///
/// No hostile in sight scores the baseline 1.
pub fn combat_pressure(hostiles: &[TilePos], pos: TilePos) -> u8 {
    let mut nearest: Option<u32> = None;
    for &hostile in hostiles {
        if hostile.z != pos.z {
            continue;
        }
        let d = pos.chebyshev(hostile);
        if nearest.is_none_or(|best| d < best) {
            nearest = Some(d);
        }
    }
    match nearest {
        None => 1,
        Some(d) if d <= 3 => 10,
        Some(d) if d <= 6 => 8,
        Some(d) if d <= 10 => 6,
        Some(d) if d <= 15 => 4,
        Some(_) => 2,
    }
}

/// The pressure a job exerts right now.
///
/// Cooking and combat are dynamic; everything else reports its stored value.
pub fn effective_pressure(job: &Job, world: &World, hostiles: &[TilePos]) -> u8 {
    match (job.kind, job.category) {
        (JobKind::CraftingWork | JobKind::CraftingFetch, JobCategory::Cook) => {
            cooking_pressure(world.total_stored_food())
        }
        (JobKind::Combat, _) => combat_pressure(hostiles, job.pos),
        _ => job.pressure,
    }
}
