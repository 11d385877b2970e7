//! Relocation planning: draining storage tiles that shouldn't hold what
//! they hold.
//!
//! Two passes each tick, independent of construction supply:
//!
//! 1. **Pending-removal drain.** Tiles marked for removal that still hold
//!    items get a relocate job to a valid destination; once a pending tile
//!    reads empty its removal finalizes (and any construction site waiting
//!    on the drain is unblocked).
//! 2. **Filter-mismatch drain.** Storage whose zone filter no longer
//!    accepts it gets a relocate job to a zone that does. If no destination
//!    exists the items stay put -- a filter change never destroys anything.

use tracing::debug;

use gridfall_types::{JobCategory, JobKind};
use gridfall_world::World;

use crate::board::JobBoard;
use crate::haul::HAUL_WORK;
use crate::job::Job;

/// Emit relocate jobs and finalize drained removals. Returns jobs created.
pub fn plan_relocations(board: &mut JobBoard, world: &mut World) -> u32 {
    let mut created = 0;

    // Pass 1: tiles pending removal.
    for pos in world.zones.pending_removal_tiles() {
        let Some(store) = world.zones.storage_at(pos).copied() else {
            // Drained: finalize and unblock any site waiting on this tile.
            world.zones.complete_tile_removal(pos);
            world.buildings.clear_stockpile_wait(pos);
            continue;
        };
        if store.amount == 0 {
            world.zones.complete_tile_removal(pos);
            world.buildings.clear_stockpile_wait(pos);
            continue;
        }
        if board.has_kind_at(pos, JobKind::Relocate) {
            continue;
        }
        let Some(dest) =
            world
                .zones
                .find_tile_for_resource(store.resource, Some(pos.z), Some(pos), true)
        else {
            continue;
        };
        let job = Job::new(JobKind::Relocate, JobCategory::Haul, pos, HAUL_WORK)
            .with_resource(store.resource)
            .with_dest(dest)
            .with_pressure(1);
        if board.add_job(job).is_some() {
            created = u32::saturating_add(created, 1);
        }
    }

    // Pass 2: filter mismatches.
    for (pos, resource) in world.zones.filter_mismatches() {
        if world.zones.is_pending_removal(pos) {
            continue;
        }
        if board.has_kind_at(pos, JobKind::Relocate) {
            continue;
        }
        let Some(dest) = world
            .zones
            .find_tile_for_resource(resource, Some(pos.z), Some(pos), true)
        else {
            continue;
        };
        debug!(%pos, ?resource, %dest, "filter changed, relocating");
        let job = Job::new(JobKind::Relocate, JobCategory::Haul, pos, HAUL_WORK)
            .with_resource(resource)
            .with_dest(dest)
            .with_pressure(1);
        if board.add_job(job).is_some() {
            created = u32::saturating_add(created, 1);
        }
    }

    created
}
