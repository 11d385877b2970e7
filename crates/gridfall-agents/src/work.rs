//! At-tile work functions, one per job kind.
//!
//! Each function advances one tick of work and reports an outcome: keep
//! going, finished, abort (subject gone), or wait (preconditions failed
//! softly -- the job is released with a cooldown so the queue doesn't
//! thrash).

use tracing::debug;

use gridfall_types::{
    JobKind, Notification, NotificationKind, NotificationLog,
};
use gridfall_world::World;

use gridfall_jobs::Job;

use crate::colonist::Colonist;

/// Result of one tick of at-tile work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Still working.
    Continue,
    /// Job finished; remove it.
    Done,
    /// Preconditions failed softly; release with this cooldown.
    Wait(u32),
    /// Subject is gone; remove the job and recover.
    Abort,
}

/// Advance one tick of the colonist's current at-tile job.
pub fn perform_tick(
    colonist: &Colonist,
    job: &mut Job,
    world: &mut World,
    log: &mut NotificationLog,
    retry_wait: u32,
) -> WorkOutcome {
    match job.kind {
        JobKind::Construction => construction_tick(job, world, log, retry_wait),
        JobKind::Gathering => gathering_tick(job, world),
        JobKind::Salvage => salvage_tick(job, world),
        JobKind::CraftingWork => crafting_tick(job, world),
        JobKind::Recreation | JobKind::Training => leisure_tick(job),
        _ => {
            // Haul-shaped and combat jobs never reach the at-tile path.
            debug!(colonist = %colonist.id, kind = ?job.kind, "non-tile job in perform_tick");
            WorkOutcome::Abort
        }
    }
}

fn construction_tick(
    job: &mut Job,
    world: &mut World,
    log: &mut NotificationLog,
    retry_wait: u32,
) -> WorkOutcome {
    let Some(site) = world.buildings.site(job.pos) else {
        return WorkOutcome::Abort;
    };
    if site.awaiting_stockpile_clear || !site.has_required_materials() {
        return WorkOutcome::Wait(retry_wait);
    }
    job.progress = job.progress.saturating_add(1);
    if job.progress < job.required {
        return WorkOutcome::Continue;
    }
    match world.complete_construction(job.pos) {
        Ok(kind) => {
            log.push(Notification::at(
                NotificationKind::ConstructionComplete,
                format!("{kind:?} complete"),
                String::new(),
                job.pos,
            ));
            WorkOutcome::Done
        }
        Err(_) => WorkOutcome::Abort,
    }
}

fn gathering_tick(job: &mut Job, world: &mut World) -> WorkOutcome {
    let Some(node) = world.resources.node(job.pos) else {
        return WorkOutcome::Done;
    };
    if node.depleted {
        return WorkOutcome::Done;
    }
    job.progress = job.progress.saturating_add(1);
    world
        .resources
        .harvest_tick(job.pos, job.progress, job.required);
    let exhausted = world
        .resources
        .node(job.pos)
        .is_none_or(|node| node.depleted);
    if exhausted || job.progress >= job.required {
        return WorkOutcome::Done;
    }
    WorkOutcome::Continue
}

fn salvage_tick(job: &mut Job, world: &mut World) -> WorkOutcome {
    if world.resources.salvage_at(job.pos).is_none() {
        return WorkOutcome::Abort;
    }
    job.progress = job.progress.saturating_add(1);
    if job.progress < job.required {
        return WorkOutcome::Continue;
    }
    world.resources.complete_salvage(&mut world.grid, job.pos);
    WorkOutcome::Done
}

fn crafting_tick(job: &mut Job, world: &mut World) -> WorkOutcome {
    let Some(station) = world.stations.station_mut(job.pos) else {
        return WorkOutcome::Abort;
    };
    if !station.working {
        // Order canceled under us.
        return WorkOutcome::Abort;
    }
    station.progress = station.progress.saturating_add(1);
    job.progress = job.progress.saturating_add(1);
    if station.progress < job.required {
        return WorkOutcome::Continue;
    }
    match world.finish_crafting(job.pos) {
        Ok(_) => WorkOutcome::Done,
        Err(_) => WorkOutcome::Abort,
    }
}

fn leisure_tick(job: &mut Job) -> WorkOutcome {
    job.progress = job.progress.saturating_add(1);
    if job.progress >= job.required {
        WorkOutcome::Done
    } else {
        WorkOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use gridfall_types::{
        BuildingKind, Capability, JobCategory, ResourceKind, TileKind, TilePos,
    };
    use gridfall_world::OrderQuantity;

    use super::*;

    fn colonist() -> Colonist {
        Colonist::new(String::from("Vex"), TilePos::new(0, 0, 0), vec![Capability::Build])
    }

    #[test]
    fn construction_waits_for_materials() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(5, 5, 0);
        assert!(world.place_building(BuildingKind::Wall, pos).is_ok());
        let mut job = Job::new(JobKind::Construction, JobCategory::Build, pos, 100);
        let c = colonist();
        assert_eq!(
            perform_tick(&c, &mut job, &mut world, &mut log, 60),
            WorkOutcome::Wait(60)
        );
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn construction_completes_and_notifies() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(5, 5, 0);
        assert!(world.place_building(BuildingKind::Wall, pos).is_ok());
        world.buildings.deliver_material(pos, ResourceKind::Wood, 1);
        world.buildings.deliver_material(pos, ResourceKind::Mineral, 1);
        let mut job = Job::new(JobKind::Construction, JobCategory::Build, pos, 3);
        let c = colonist();
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Continue);
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Continue);
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Done);
        assert_eq!(world.grid.tile(pos), Some(TileKind::Built(BuildingKind::Wall)));
        assert!(!world.grid.is_walkable(pos));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn gathering_yields_and_finishes_on_depletion() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(3, 3, 0);
        // Hand-build a small node for determinism.
        let mut rng = {
            use rand::SeedableRng;
            rand::rngs::SmallRng::seed_from_u64(11)
        };
        assert!(world.spawn_node(pos, gridfall_types::NodeKind::FoodPlant, &mut rng));
        let max = world.resources.node(pos).map_or(0, |n| n.remaining);
        let mut job = Job::new(JobKind::Gathering, JobCategory::Scavenge, pos, 150);
        let c = colonist();
        let mut outcome = WorkOutcome::Continue;
        for _ in 0..150 {
            outcome = perform_tick(&c, &mut job, &mut world, &mut log, 60);
            if outcome == WorkOutcome::Done {
                break;
            }
        }
        assert_eq!(outcome, WorkOutcome::Done);
        assert_eq!(world.resources.loose_at(pos).map(|i| i.amount), Some(max));
    }

    #[test]
    fn salvage_drops_scrap_on_completion() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(4, 4, 0);
        let mut rng = {
            use rand::SeedableRng;
            rand::rngs::SmallRng::seed_from_u64(11)
        };
        assert!(world.spawn_salvage(pos, gridfall_types::SalvageKind::SalvagePile, &mut rng));
        let mut job = Job::new(JobKind::Salvage, JobCategory::Scavenge, pos, 2);
        let c = colonist();
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Continue);
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Done);
        assert!(world.resources.loose_at(pos).is_some_and(|i| i.haul_requested));
        assert_eq!(world.grid.tile(pos), Some(TileKind::Empty));
    }

    #[test]
    fn crafting_work_advances_station_and_emits() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(6, 6, 0);
        world.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(world.place_building(BuildingKind::Generator, pos).is_ok());
        assert!(world.complete_construction(pos).is_ok());
        assert!(world.stations.add_order(pos, "burn_wood", OrderQuantity::Single).is_ok());
        if let Some(station) = world.stations.station_mut(pos) {
            station.working = true;
        }
        let mut job = Job::new(JobKind::CraftingWork, JobCategory::Craft, pos, 80);
        let c = colonist();
        let mut outcome = WorkOutcome::Continue;
        for _ in 0..80 {
            outcome = perform_tick(&c, &mut job, &mut world, &mut log, 60);
        }
        assert_eq!(outcome, WorkOutcome::Done);
        assert!(world.resources.loose_at(pos).is_some_and(|i| {
            i.resource == ResourceKind::Power && i.amount == 1
        }));
    }

    #[test]
    fn canceled_station_aborts_work() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let pos = TilePos::new(6, 6, 0);
        world.grid.set_tile(pos, TileKind::Built(BuildingKind::Floor));
        assert!(world.place_building(BuildingKind::Stove, pos).is_ok());
        assert!(world.complete_construction(pos).is_ok());
        let mut job = Job::new(JobKind::CraftingWork, JobCategory::Cook, pos, 60);
        let c = colonist();
        assert_eq!(perform_tick(&c, &mut job, &mut world, &mut log, 60), WorkOutcome::Abort);
    }
}
