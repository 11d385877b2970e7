//! Auto-haul planning for loose items and crafted world items.
//!
//! Each tick, every loose item flagged `haul_requested` with no job on its
//! tile gets a haul job to the best stockpile tile for its kind; the flag
//! clears when the job is created (it re-arms if the carry is dropped).
//! Crafted world items lying outside stockpiles are hauled the same way,
//! to any stockpile tile, where they sit as stored gear.

use tracing::debug;

use gridfall_types::{JobCategory, JobKind, TilePos};
use gridfall_world::World;

use crate::board::JobBoard;
use crate::job::Job;

/// Work ticks for a simple pickup-and-deliver run.
pub const HAUL_WORK: u32 = 10;

/// Emit haul jobs for flagged loose items. Returns jobs created.
pub fn plan_loose_hauls(board: &mut JobBoard, world: &mut World) -> u32 {
    let mut created = 0;
    for pos in world.resources.items_needing_haul() {
        if board.job_at(pos).is_some() {
            continue;
        }
        let Some(item) = world.resources.loose_at(pos) else {
            continue;
        };
        let resource = item.resource;
        let Some(dest) =
            world
                .zones
                .find_tile_for_resource(resource, Some(pos.z), Some(pos), true)
        else {
            // No stockpile accepts it; leave the flag set and retry later.
            continue;
        };
        let job = Job::new(JobKind::Haul, JobCategory::Haul, pos, HAUL_WORK)
            .with_resource(resource)
            .with_dest(dest);
        if board.add_job(job).is_some() {
            world.resources.clear_haul_request(pos);
            created = u32::saturating_add(created, 1);
        }
    }
    if created > 0 {
        debug!(created, "auto-haul jobs emitted");
    }
    created
}

/// Emit haul jobs for crafted items lying outside stockpiles.
/// Returns jobs created.
pub fn plan_item_hauls(board: &mut JobBoard, world: &World) -> u32 {
    let mut created = 0;
    let targets: Vec<(TilePos, gridfall_types::ItemKind)> = world
        .resources
        .world_items()
        .iter()
        .filter(|(pos, _)| !world.zones.is_stockpile(**pos))
        .filter_map(|(pos, stack)| stack.first().map(|item| (*pos, *item)))
        .collect();
    for (pos, item) in targets {
        if board.has_kind_at(pos, JobKind::Haul) {
            continue;
        }
        // Gear parks on any stockpile tile; filters govern resources only.
        let Some(dest) = world
            .zones
            .zones()
            .values()
            .flat_map(|zone| zone.tiles.iter().copied())
            .filter(|tile| !world.zones.is_pending_removal(*tile))
            .min_by_key(|tile| pos.manhattan(*tile))
        else {
            continue;
        };
        let mut job = Job::new(JobKind::Haul, JobCategory::Haul, pos, HAUL_WORK).with_dest(dest);
        job.item = Some(item);
        if board.add_job(job).is_some() {
            created = u32::saturating_add(created, 1);
        }
    }
    created
}
