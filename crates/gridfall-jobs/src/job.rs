//! The job record.
//!
//! A job is a unit of claimable work anchored at a tile. Haul-shaped jobs
//! carry a pickup amount, an optional destination, and (for batched supply
//! runs) a queue of per-site deliveries consumed front to back.

use serde::{Deserialize, Serialize};

use gridfall_types::{
    BuildingKind, ColonistId, FurnitureKind, ItemKind, JobCategory, JobId, JobKind, ResourceKind,
    TilePos,
};

/// One stop of a batched supply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// The receiving construction site.
    pub pos: TilePos,
    /// Units earmarked for it.
    pub amount: u32,
}

/// A unit of claimable work anchored at a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Stable identity.
    pub id: JobId,
    /// Insertion counter; the final priority tie-break.
    pub seq: u64,
    /// What kind of work this is.
    pub kind: JobKind,
    /// Capability gate.
    pub category: JobCategory,
    /// Anchor tile. At-tile jobs work here; loose-item hauls pick up here;
    /// supply runs and crafting fetches anchor at their consumer and carry
    /// the source in `pickup`.
    pub pos: TilePos,
    /// Work accumulated so far.
    pub progress: u32,
    /// Work required to finish.
    pub required: u32,
    /// Whether a colonist has claimed this job.
    pub assigned: bool,
    /// Ticks before the job becomes claimable again after a soft failure.
    pub wait_timer: u32,
    /// Urgency 1-10; some kinds are recomputed each scan from world state.
    pub pressure: u8,
    /// Construction subtype for intra-category priority.
    pub subtype: Option<BuildingKind>,
    /// Resource payload for haul-shaped jobs.
    pub resource: Option<ResourceKind>,
    /// Item payload for equipment hauls and furniture placement.
    pub item: Option<ItemKind>,
    /// Explicit pickup tile when it differs from the anchor (supply runs
    /// and crafting fetches anchor at their consumer, not their source).
    pub pickup: Option<TilePos>,
    /// Destination tile for haul-shaped jobs.
    pub dest: Option<TilePos>,
    /// Remaining delivery stops of a batched supply run.
    pub deliveries: Vec<Delivery>,
    /// Units to pick up at the source.
    pub pickup_amount: u32,
    /// Furniture being installed, for placement jobs.
    pub furniture: Option<FurnitureKind>,
    /// Hostile target, for combat jobs.
    pub target: Option<ColonistId>,
}

impl Job {
    /// A fresh unassigned job; `seq` is stamped by the board on insert.
    pub fn new(kind: JobKind, category: JobCategory, pos: TilePos, required: u32) -> Self {
        Self {
            id: JobId::new(),
            seq: 0,
            kind,
            category,
            pos,
            progress: 0,
            required,
            assigned: false,
            wait_timer: 0,
            pressure: 1,
            subtype: None,
            resource: None,
            item: None,
            pickup: None,
            dest: None,
            deliveries: Vec::new(),
            pickup_amount: 1,
            furniture: None,
            target: None,
        }
    }

    /// Builder-style pressure override.
    #[must_use]
    pub const fn with_pressure(mut self, pressure: u8) -> Self {
        self.pressure = pressure;
        self
    }

    /// Builder-style resource payload.
    #[must_use]
    pub const fn with_resource(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Builder-style destination.
    #[must_use]
    pub const fn with_dest(mut self, dest: TilePos) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Builder-style construction subtype.
    #[must_use]
    pub const fn with_subtype(mut self, subtype: BuildingKind) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Builder-style pickup tile.
    #[must_use]
    pub const fn with_pickup(mut self, pickup: TilePos) -> Self {
        self.pickup = Some(pickup);
        self
    }

    /// Whether the job is free for a colonist to claim.
    pub const fn is_available(&self) -> bool {
        !self.assigned && self.wait_timer == 0
    }

    /// The tile where the carry is collected (haul-shaped jobs).
    pub fn pickup_tile(&self) -> TilePos {
        self.pickup.unwrap_or(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_available() {
        let job = Job::new(
            JobKind::Haul,
            JobCategory::Haul,
            TilePos::new(1, 1, 0),
            10,
        );
        assert!(job.is_available());
        assert_eq!(job.pressure, 1);
    }

    #[test]
    fn wait_timer_blocks_availability() {
        let mut job = Job::new(
            JobKind::Construction,
            JobCategory::Build,
            TilePos::new(1, 1, 0),
            100,
        );
        job.wait_timer = 30;
        assert!(!job.is_available());
    }

    #[test]
    fn builders_compose() {
        let job = Job::new(
            JobKind::Relocate,
            JobCategory::Haul,
            TilePos::new(0, 0, 0),
            10,
        )
        .with_resource(ResourceKind::Scrap)
        .with_dest(TilePos::new(5, 5, 0))
        .with_pressure(1);
        assert_eq!(job.resource, Some(ResourceKind::Scrap));
        assert_eq!(job.dest, Some(TilePos::new(5, 5, 0)));
    }
}
