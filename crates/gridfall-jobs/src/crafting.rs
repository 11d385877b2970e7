//! The crafting pump: drives workstation order queues each tick.
//!
//! Per workstation with a live order: spawn one crafting-fetch job per
//! missing input (pickup from a stockpile holding it, deposit into the
//! station's buffer), consume inputs atomically once they're all in, and
//! keep exactly one crafting-work job at the station while a run is under
//! way. Output emission happens in the agent's work function via
//! [`gridfall_world::World::finish_crafting`] when the work bar fills.
//!
//! Two stations may race for the same source tile: pickups clamp to what
//! the tile holds, and the short station stays in the fetching state until
//! a later pass finds more.

use std::collections::BTreeSet;

use tracing::debug;

use gridfall_types::{BuildingKind, JobCategory, JobKind, ResourceKind, TilePos};
use gridfall_world::World;

use crate::board::JobBoard;
use crate::haul::HAUL_WORK;
use crate::job::Job;

/// The capability category for work at a station of this kind.
const fn work_category(kind: BuildingKind) -> JobCategory {
    match kind {
        BuildingKind::Stove => JobCategory::Cook,
        _ => JobCategory::Craft,
    }
}

/// Reconcile stations' pending-fetch flags against the live queue.
fn reconcile_fetch_flags(board: &JobBoard, world: &mut World) {
    let mut live: BTreeSet<(TilePos, ResourceKind)> = BTreeSet::new();
    for job in board.jobs().values() {
        if job.kind != JobKind::CraftingFetch {
            continue;
        }
        if let (Some(dest), Some(resource)) = (job.dest, job.resource) {
            live.insert((dest, resource));
        }
    }
    let stations: Vec<TilePos> = world.stations.stations().keys().copied().collect();
    for pos in stations {
        if let Some(station) = world.stations.station_mut(pos) {
            station
                .pending_fetch
                .retain(|resource| live.contains(&(pos, *resource)));
        }
    }
}

/// Drive every workstation one step. Returns jobs created.
pub fn pump(board: &mut JobBoard, world: &mut World) -> u32 {
    reconcile_fetch_flags(board, world);
    let mut created = 0;
    let stations: Vec<TilePos> = world.stations.stations().keys().copied().collect();
    for pos in stations {
        let Some(station) = world.stations.station(pos) else {
            continue;
        };
        let kind = station.kind;
        let category = work_category(kind);

        if station.working {
            // Keep one work job alive while the run is under way.
            if !board.has_kind_at(pos, JobKind::CraftingWork) {
                let work = station.current_recipe().map_or(1, |recipe| recipe.work);
                let job = Job::new(JobKind::CraftingWork, category, pos, work);
                if board.add_job(job).is_some() {
                    created = u32::saturating_add(created, 1);
                }
            }
            continue;
        }

        if station.current_order_index().is_none() {
            // Nothing queued: cull any stale work job left behind.
            board.remove_kind_at(pos, JobKind::CraftingWork);
            continue;
        }

        if station.has_inputs() {
            let Some(station) = world.stations.station_mut(pos) else {
                continue;
            };
            if station.consume_inputs() {
                station.working = true;
                station.progress = 0;
                if let Some(index) = station.current_order_index() {
                    if let Some(order) = station.orders.get_mut(index) {
                        order.in_progress = true;
                    }
                }
                let work = station.current_recipe().map_or(1, |recipe| recipe.work);
                debug!(%pos, ?kind, "inputs consumed, run started");
                let job = Job::new(JobKind::CraftingWork, category, pos, work);
                if board.add_job(job).is_some() {
                    created = u32::saturating_add(created, 1);
                }
            }
            continue;
        }

        // Missing inputs: spawn one fetch per short resource.
        let missing = station.missing_inputs();
        for (resource, short) in missing {
            let already = world
                .stations
                .station(pos)
                .is_some_and(|s| s.pending_fetch.contains(&resource));
            if already {
                continue;
            }
            let Some(source) = world.zones.find_tile_with_resource(resource, Some(pos.z)) else {
                continue;
            };
            let mut job = Job::new(JobKind::CraftingFetch, category, pos, HAUL_WORK)
                .with_resource(resource)
                .with_pickup(source)
                .with_dest(pos);
            job.pickup_amount = short;
            if board.add_job(job).is_some() {
                if let Some(station) = world.stations.station_mut(pos) {
                    station.pending_fetch.insert(resource);
                }
                created = u32::saturating_add(created, 1);
            }
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use gridfall_types::TileKind;
    use gridfall_world::OrderQuantity;

    use super::*;

    fn world_with_generator() -> (World, TilePos) {
        let mut world = World::new(24, 24, 1, 1000);
        let pos = TilePos::new(10, 10, 0);
        world.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(world.place_building(BuildingKind::Generator, pos).is_ok());
        assert!(world.complete_construction(pos).is_ok());
        (world, pos)
    }

    fn stock(world: &mut World, at: (i32, i32), resource: ResourceKind, amount: u32) {
        let pos = TilePos::new(at.0, at.1, 0);
        assert!(world.zones.create_zone(&world.grid, &[pos], 0).is_ok());
        world.zones.add_to_tile_storage(pos, resource, amount);
    }

    #[test]
    fn idle_station_without_orders_spawns_nothing() {
        let (mut world, _pos) = world_with_generator();
        let mut board = JobBoard::new();
        assert_eq!(pump(&mut board, &mut world), 0);
    }

    #[test]
    fn missing_inputs_spawn_fetch() {
        let (mut world, pos) = world_with_generator();
        stock(&mut world, (1, 1), ResourceKind::Wood, 30);
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Infinite).is_ok());
        assert_eq!(pump(&mut board, &mut world), 1);
        let job = board.job_at(pos);
        assert!(job.is_some_and(|j| {
            j.kind == JobKind::CraftingFetch
                && j.resource == Some(ResourceKind::Wood)
                && j.pickup == Some(TilePos::new(1, 1, 0))
                && j.dest == Some(pos)
        }));
        // Pending flag suppresses duplicates.
        assert_eq!(pump(&mut board, &mut world), 0);
    }

    #[test]
    fn no_source_no_fetch() {
        let (mut world, pos) = world_with_generator();
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Infinite).is_ok());
        assert_eq!(pump(&mut board, &mut world), 0);
    }

    #[test]
    fn satisfied_inputs_start_run_and_spawn_work() {
        let (mut world, pos) = world_with_generator();
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Single).is_ok());
        world.stations.add_input(pos, ResourceKind::Wood, 3);
        assert_eq!(pump(&mut board, &mut world), 1);
        let station = world.stations.station(pos);
        assert!(station.is_some_and(|s| s.working && s.inputs.is_empty()));
        let job = board.job_at(pos);
        assert!(job.is_some_and(|j| j.kind == JobKind::CraftingWork && j.required == 80));
    }

    #[test]
    fn killed_work_job_is_respawned_while_working() {
        let (mut world, pos) = world_with_generator();
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Single).is_ok());
        world.stations.add_input(pos, ResourceKind::Wood, 3);
        pump(&mut board, &mut world);
        board.remove_kind_at(pos, JobKind::CraftingWork);
        assert_eq!(pump(&mut board, &mut world), 1);
        assert!(board.has_kind_at(pos, JobKind::CraftingWork));
    }

    #[test]
    fn canceled_orders_cull_stale_work_jobs() {
        let (mut world, pos) = world_with_generator();
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Single).is_ok());
        world.stations.add_input(pos, ResourceKind::Wood, 3);
        pump(&mut board, &mut world);
        assert!(world.stations.cancel_order(pos, 0).is_ok());
        pump(&mut board, &mut world);
        assert!(!board.has_kind_at(pos, JobKind::CraftingWork));
    }

    #[test]
    fn stove_work_is_cook_category() {
        let mut world = World::new(24, 24, 1, 1000);
        let pos = TilePos::new(10, 10, 0);
        world.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(world.place_building(BuildingKind::Stove, pos).is_ok());
        assert!(world.complete_construction(pos).is_ok());
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(pos, "cook_meal", OrderQuantity::Infinite).is_ok());
        world.stations.add_input(pos, ResourceKind::RawFood, 1);
        world.stations.add_input(pos, ResourceKind::Power, 1);
        pump(&mut board, &mut world);
        let job = board.job_at(pos);
        assert!(job.is_some_and(|j| j.category == JobCategory::Cook));
    }

    #[test]
    fn two_stations_race_for_one_source() {
        let mut world = World::new(24, 24, 1, 1000);
        let a = TilePos::new(8, 8, 0);
        let b = TilePos::new(14, 14, 0);
        for pos in [a, b] {
            world.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
            assert!(world.place_building(BuildingKind::Generator, pos).is_ok());
            assert!(world.complete_construction(pos).is_ok());
        }
        stock(&mut world, (1, 1), ResourceKind::Wood, 4);
        let mut board = JobBoard::new();
        assert!(world.stations.add_order(a, "burn_wood", OrderQuantity::Infinite).is_ok());
        assert!(world.stations.add_order(b, "burn_wood", OrderQuantity::Infinite).is_ok());
        // Both stations get a fetch from the same 4-unit tile; the second
        // pickup will clamp short at execution time.
        assert_eq!(pump(&mut board, &mut world), 2);
    }
}
