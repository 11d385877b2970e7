//! Construction supply planning.
//!
//! Each tick: find every construction site still short on a material with
//! no supply already in flight for that (site, resource) pair, group the
//! shortfalls by (resource, level), pick a source stockpile tile per group,
//! and pack sites into batched multi-drop supply jobs capped at the carry
//! limit. Pending flags on sites stop duplicate emission and are reconciled
//! against the live queue each tick so an aborted job frees its sites.

use std::collections::BTreeMap;

use tracing::debug;

use gridfall_types::{JobCategory, JobKind, ResourceKind, TilePos};
use gridfall_world::World;

use crate::board::JobBoard;
use crate::job::{Delivery, Job};

/// Work ticks for a supply run (movement dominates; this is handling time).
pub const SUPPLY_WORK: u32 = 10;

/// Reconcile pending-supply flags against the live job queue.
///
/// A site keeps its flag for a resource only while some supply job still
/// lists it in its delivery queue.
pub fn reconcile_pending_flags(board: &JobBoard, world: &mut World) {
    let mut live: BTreeMap<(TilePos, ResourceKind), bool> = BTreeMap::new();
    for job in board.jobs().values() {
        if job.kind != JobKind::Supply {
            continue;
        }
        let Some(resource) = job.resource else {
            continue;
        };
        for delivery in &job.deliveries {
            live.insert((delivery.pos, resource), true);
        }
    }
    let sites: Vec<TilePos> = world.buildings.sites().keys().copied().collect();
    for pos in sites {
        let Some(site) = world.buildings.site_mut(pos) else {
            continue;
        };
        site.pending_supply
            .retain(|resource| live.contains_key(&(pos, *resource)));
    }
}

/// Emit batched supply jobs for undersupplied sites. Returns jobs created.
pub fn plan_supply(board: &mut JobBoard, world: &mut World, max_carry: u32) -> u32 {
    reconcile_pending_flags(board, world);

    // Collect (site, resource, still-needed) with no supply in flight.
    let mut shortfalls: BTreeMap<(ResourceKind, i32), Vec<(TilePos, u32)>> = BTreeMap::new();
    for (&pos, site) in world.buildings.sites() {
        for (resource, short) in site.missing() {
            if site.pending_supply.contains(&resource) {
                continue;
            }
            shortfalls
                .entry((resource, pos.z))
                .or_default()
                .push((pos, short));
        }
    }

    let mut created = 0;
    for ((resource, z), mut sites) in shortfalls {
        let Some(source) = world.zones.find_tile_with_resource(resource, Some(z)) else {
            continue;
        };
        // Visit sites nearest-the-source first so one trip drains cleanly.
        sites.sort_by_key(|(pos, _)| (source.manhattan(*pos), *pos));

        // Pack whole sites into batches up to the carry cap. A single site
        // asking for more than one carry gets the cap now and the rest on a
        // later pass, once this batch's flag reconciles away.
        let mut batches: Vec<Vec<Delivery>> = Vec::new();
        let mut batch: Vec<Delivery> = Vec::new();
        let mut total = 0_u32;
        for (site_pos, short) in sites {
            let take = short.min(max_carry);
            if total.saturating_add(take) > max_carry && !batch.is_empty() {
                batches.push(core::mem::take(&mut batch));
                total = 0;
            }
            batch.push(Delivery {
                pos: site_pos,
                amount: take,
            });
            total = total.saturating_add(take);
        }
        if !batch.is_empty() {
            batches.push(batch);
        }

        for deliveries in batches {
            let Some(first) = deliveries.first().copied() else {
                continue;
            };
            let total: u32 = deliveries
                .iter()
                .fold(0, |acc, d| acc.saturating_add(d.amount));
            let mut job = Job::new(JobKind::Supply, JobCategory::Haul, first.pos, SUPPLY_WORK)
                .with_resource(resource)
                .with_pickup(source);
            job.pickup_amount = total;
            job.deliveries.clone_from(&deliveries);
            if board.add_job(job).is_some() {
                for delivery in &deliveries {
                    if let Some(site) = world.buildings.site_mut(delivery.pos) {
                        site.pending_supply.insert(resource);
                    }
                }
                created = u32::saturating_add(created, 1);
            }
        }
    }
    if created > 0 {
        debug!(created, "supply jobs emitted");
    }
    created
}

#[cfg(test)]
mod tests {
    use gridfall_types::BuildingKind;

    use super::*;

    const MAX_CARRY: u32 = 20;

    fn world_with_source(resource: ResourceKind, amount: u32) -> World {
        let mut world = World::new(32, 32, 1, 1000);
        let tiles = vec![TilePos::new(1, 1, 0)];
        assert!(world.zones.create_zone(&world.grid, &tiles, 0).is_ok());
        world.zones.add_to_tile_storage(TilePos::new(1, 1, 0), resource, amount);
        world
    }

    #[test]
    fn site_shortfall_emits_one_batch() {
        let mut world = world_with_source(ResourceKind::Wood, 50);
        let mut board = JobBoard::new();
        let site = TilePos::new(10, 10, 0);
        assert!(world.place_building(BuildingKind::Floor, site).is_ok());
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 1);
        let job = board.jobs().values().next();
        assert!(job.is_some_and(|j| {
            j.kind == JobKind::Supply
                && j.pos == site
                && j.pickup == Some(TilePos::new(1, 1, 0))
                && j.pickup_amount == 1
                && j.deliveries == vec![Delivery { pos: site, amount: 1 }]
        }));
        // The pending flag suppresses re-emission.
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 0);
    }

    #[test]
    fn batches_cap_at_carry_limit() {
        // Three sites needing wood 10/10/5 = 25 total -> two jobs at cap 20.
        let mut world = world_with_source(ResourceKind::Wood, 100);
        let mut board = JobBoard::new();
        for (x, needed) in [(8, 10_u32), (10, 10), (12, 5)] {
            let site = TilePos::new(x, 10, 0);
            assert!(world.place_building(BuildingKind::Floor, site).is_ok());
            if let Some(s) = world.buildings.site_mut(site) {
                s.needed = BTreeMap::from([(ResourceKind::Wood, needed)]);
                s.delivered = BTreeMap::from([(ResourceKind::Wood, 0)]);
            }
        }
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 2);
        let mut totals: Vec<u32> = board.jobs().values().map(|j| j.pickup_amount).collect();
        totals.sort_unstable();
        assert_eq!(totals, vec![5, 20]);
    }

    #[test]
    fn no_source_means_no_job() {
        let mut world = World::new(32, 32, 1, 1000);
        let mut board = JobBoard::new();
        assert!(world.place_building(BuildingKind::Floor, TilePos::new(10, 10, 0)).is_ok());
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 0);
    }

    #[test]
    fn reconcile_clears_orphaned_flags() {
        let mut world = world_with_source(ResourceKind::Wood, 50);
        let mut board = JobBoard::new();
        let site = TilePos::new(10, 10, 0);
        assert!(world.place_building(BuildingKind::Floor, site).is_ok());
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 1);
        // Kill the job; the flag must clear and the site resupplies.
        let ids: Vec<_> = board.jobs().keys().copied().collect();
        for id in ids {
            board.remove(id);
        }
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 1);
    }

    #[test]
    fn satisfied_sites_are_skipped() {
        let mut world = world_with_source(ResourceKind::Wood, 50);
        let mut board = JobBoard::new();
        let site = TilePos::new(10, 10, 0);
        assert!(world.place_building(BuildingKind::Floor, site).is_ok());
        world.buildings.deliver_material(site, ResourceKind::Wood, 1);
        assert_eq!(plan_supply(&mut board, &mut world, MAX_CARRY), 0);
    }
}
