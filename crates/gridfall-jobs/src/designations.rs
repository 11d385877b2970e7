//! Designation sweep: turning persistent player marks into jobs.
//!
//! Designations outlive their jobs. A harvest mark re-emits a gathering job
//! whenever its node stands ready (so a regrown tree gets cut again); a
//! salvage mark emits one dismantle job; a haul mark flags the loose item
//! for the auto-haul planner. Marks clear themselves when their subject is
//! gone for good.

use gridfall_types::{DesignationKind, JobCategory, JobKind, NodeState, TilePos};
use gridfall_world::{World, node_def, salvage_def};

use crate::board::JobBoard;
use crate::job::Job;

/// Re-emit jobs for standing designations. Returns jobs created.
pub fn sweep(board: &mut JobBoard, world: &mut World) -> u32 {
    let mut created = 0;
    let marks: Vec<(TilePos, DesignationKind)> = board
        .designations()
        .iter()
        .map(|(pos, kind)| (*pos, *kind))
        .collect();
    for (pos, mark) in marks {
        match mark {
            DesignationKind::Harvest => {
                let Some(node) = world.resources.node(pos) else {
                    // Node permanently gone (cleared or removed): retire.
                    board.clear_designation(pos);
                    continue;
                };
                if node.depleted || node.state != NodeState::Idle {
                    continue;
                }
                if board.has_kind_at(pos, JobKind::Gathering) {
                    continue;
                }
                let required = node_def(node.kind).harvest_work;
                let resource = node.resource;
                let job = Job::new(JobKind::Gathering, JobCategory::Scavenge, pos, required)
                    .with_resource(resource);
                if board.add_job(job).is_some() {
                    created = u32::saturating_add(created, 1);
                }
            }
            DesignationKind::Salvage => {
                let Some(object_kind) = world.resources.salvage_at(pos).map(|object| object.kind) else {
                    board.clear_designation(pos);
                    continue;
                };
                if board.has_kind_at(pos, JobKind::Salvage) {
                    continue;
                }
                world.resources.designate_salvage(pos);
                let required = salvage_def(object_kind).work;
                let job = Job::new(JobKind::Salvage, JobCategory::Scavenge, pos, required);
                if board.add_job(job).is_some() {
                    created = u32::saturating_add(created, 1);
                }
            }
            DesignationKind::Haul => {
                if world.resources.mark_for_haul(pos) {
                    // The auto-haul planner takes it from here.
                    board.clear_designation(pos);
                } else if world.resources.loose_at(pos).is_none() {
                    board.clear_designation(pos);
                }
            }
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use gridfall_types::{NodeKind, ResourceKind, SalvageKind};

    use super::*;

    #[test]
    fn harvest_mark_emits_gathering_job() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let pos = TilePos::new(3, 3, 0);
        assert!(world.spawn_node(pos, NodeKind::Tree, &mut rng));
        board.add_designation(pos, DesignationKind::Harvest);
        assert_eq!(sweep(&mut board, &mut world), 1);
        let job = board.job_at(pos);
        assert!(job.is_some_and(|j| j.kind == JobKind::Gathering && j.required == 200));
        // Mark persists; no duplicate while the job lives.
        assert_eq!(sweep(&mut board, &mut world), 0);
        assert_eq!(board.designation_at(pos), Some(DesignationKind::Harvest));
    }

    #[test]
    fn harvest_mark_rearms_after_regrowth() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let pos = TilePos::new(3, 3, 0);
        assert!(world.spawn_node(pos, NodeKind::Tree, &mut rng));
        board.add_designation(pos, DesignationKind::Harvest);
        sweep(&mut board, &mut world);
        board.remove_kind_at(pos, JobKind::Gathering);
        // Deplete the node: no new job while down.
        world.resources.set_node_state(pos, NodeState::Depleted);
        assert_eq!(sweep(&mut board, &mut world), 0);
        // Regrown: the mark re-emits.
        world.resources.set_node_state(pos, NodeState::Idle);
        assert_eq!(sweep(&mut board, &mut world), 1);
    }

    #[test]
    fn mark_retires_when_node_is_gone() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let pos = TilePos::new(3, 3, 0);
        board.add_designation(pos, DesignationKind::Harvest);
        assert_eq!(sweep(&mut board, &mut world), 0);
        assert_eq!(board.designation_at(pos), None);
    }

    #[test]
    fn salvage_mark_emits_dismantle_job() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let mut rng = SmallRng::seed_from_u64(1);
        let pos = TilePos::new(4, 4, 0);
        assert!(world.spawn_salvage(pos, SalvageKind::SalvagePile, &mut rng));
        board.add_designation(pos, DesignationKind::Salvage);
        assert_eq!(sweep(&mut board, &mut world), 1);
        let job = board.job_at(pos);
        assert!(job.is_some_and(|j| j.kind == JobKind::Salvage && j.required == 50));
        assert!(world.resources.salvage_at(pos).is_some_and(|o| o.designated));
    }

    #[test]
    fn haul_mark_flags_item_and_retires() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let pos = TilePos::new(5, 5, 0);
        world.resources.drop_loose(pos, ResourceKind::Scrap, 2, false);
        board.add_designation(pos, DesignationKind::Haul);
        sweep(&mut board, &mut world);
        assert!(world.resources.loose_at(pos).is_some_and(|i| i.haul_requested));
        assert_eq!(board.designation_at(pos), None);
    }
}
