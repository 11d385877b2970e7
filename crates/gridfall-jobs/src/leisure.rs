//! Recreation and training job spawners.
//!
//! Both run on a slow cadence. Recreation jobs appear during evening hours,
//! placed inside common rooms and dormitories when any exist (else near the
//! colonists), one unassigned job per two living colonists. Training jobs
//! appear during morning drill hours on walkable tiles adjacent to a
//! barracks, one per fighter capped by barracks count.

use rand::Rng;
use tracing::debug;

use gridfall_types::{BuildingKind, JobCategory, JobKind, RoomKind, TilePos};
use gridfall_world::World;

use crate::board::JobBoard;
use crate::job::Job;

/// Ticks between spawner passes.
pub const SPAWN_INTERVAL: u64 = 300;

/// Recreation window, start hour inclusive to end hour exclusive.
pub const RECREATION_HOURS: (u8, u8) = (18, 22);

/// Morning drill window.
pub const TRAINING_HOURS: (u8, u8) = (6, 8);

/// Work ticks for one recreation break.
pub const RECREATION_WORK: u32 = 50;

/// Work ticks for one drill session.
pub const TRAINING_WORK: u32 = 100;

/// Cadence state for the two spawners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeisurePlanner {
    last_recreation: u64,
    last_training: u64,
}

impl LeisurePlanner {
    /// Fresh planner state.
    pub const fn new() -> Self {
        Self {
            last_recreation: 0,
            last_training: 0,
        }
    }

    /// Spawn recreation jobs if the cadence and window allow.
    /// Returns jobs created.
    pub fn spawn_recreation(
        &mut self,
        board: &mut JobBoard,
        world: &World,
        colonist_positions: &[TilePos],
        hour: u8,
        tick: u64,
        rng: &mut impl Rng,
    ) -> u32 {
        if tick.saturating_sub(self.last_recreation) < SPAWN_INTERVAL {
            return 0;
        }
        self.last_recreation = tick;
        if hour < RECREATION_HOURS.0 || hour >= RECREATION_HOURS.1 {
            return 0;
        }
        if colonist_positions.is_empty() {
            return 0;
        }
        let existing = board
            .jobs()
            .values()
            .filter(|job| job.kind == JobKind::Recreation && !job.assigned)
            .count();
        let target = (colonist_positions.len() / 2).max(1);
        if existing >= target {
            return 0;
        }

        // Prefer social spaces; fall back to spots near the crew.
        let mut venues: Vec<TilePos> = world.rooms.tiles_of_kind(RoomKind::CommonRoom);
        venues.extend(world.rooms.tiles_of_kind(RoomKind::Dormitory));

        let mut created = 0;
        let wanted = target.saturating_sub(existing);
        for _ in 0..wanted {
            let pos = if venues.is_empty() {
                let index = rng.random_range(0..colonist_positions.len());
                let Some(anchor) = colonist_positions.get(index) else {
                    continue;
                };
                TilePos::new(
                    anchor.x.saturating_add(rng.random_range(-5..=5)),
                    anchor.y.saturating_add(rng.random_range(-5..=5)),
                    anchor.z,
                )
            } else {
                let index = rng.random_range(0..venues.len());
                match venues.get(index) {
                    Some(tile) => *tile,
                    None => continue,
                }
            };
            if !world.is_walkable(pos) {
                continue;
            }
            let job = Job::new(JobKind::Recreation, JobCategory::Leisure, pos, RECREATION_WORK)
                .with_pressure(2);
            if board.add_job(job).is_some() {
                created = u32::saturating_add(created, 1);
            }
        }
        if created > 0 {
            debug!(created, "recreation jobs spawned");
        }
        created
    }

    /// Spawn training jobs if the cadence and window allow.
    /// Returns jobs created.
    pub fn spawn_training(
        &mut self,
        board: &mut JobBoard,
        world: &World,
        fighter_count: usize,
        hour: u8,
        tick: u64,
    ) -> u32 {
        if tick.saturating_sub(self.last_training) < SPAWN_INTERVAL {
            return 0;
        }
        self.last_training = tick;
        if hour < TRAINING_HOURS.0 || hour >= TRAINING_HOURS.1 {
            return 0;
        }
        let barracks: Vec<TilePos> = world
            .stations
            .stations()
            .iter()
            .filter(|(_, station)| station.kind == BuildingKind::Barracks)
            .map(|(pos, _)| *pos)
            .collect();
        if barracks.is_empty() {
            return 0;
        }
        let existing = board
            .jobs()
            .values()
            .filter(|job| job.kind == JobKind::Training && !job.assigned)
            .count();
        let target = fighter_count.min(barracks.len());
        if existing >= target {
            return 0;
        }

        let mut created = 0;
        for pos in barracks.iter().take(target.saturating_sub(existing)) {
            // Drill next to the barracks, not on it.
            let Some(spot) = pos
                .neighbors()
                .into_iter()
                .find(|candidate| world.is_walkable(*candidate))
            else {
                continue;
            };
            if board.has_kind_at(spot, JobKind::Training) {
                continue;
            }
            let job = Job::new(JobKind::Training, JobCategory::Leisure, spot, TRAINING_WORK)
                .with_pressure(3);
            if board.add_job(job).is_some() {
                created = u32::saturating_add(created, 1);
            }
        }
        created
    }
}
