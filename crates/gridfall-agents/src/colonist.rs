//! The colonist record.
//!
//! Everything a colonist *is* lives here; everything a colonist *does* per
//! tick lives in the controller. Colonists reference their job by id and
//! the world by coordinates only -- no owning references span the
//! agent → job → tile → zone cycle.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use gridfall_types::{Capability, ColonistId, ItemKind, JobId, ResourceKind, TilePos};

use crate::schedule::Schedule;

/// What a colonist is carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Carry {
    /// A stack of one resource kind.
    Resource {
        /// The resource kind.
        kind: ResourceKind,
        /// Units carried.
        amount: u32,
    },
    /// One discrete item.
    Item(ItemKind),
}

/// Leg of a pickup-then-deliver job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaulStage {
    /// Walking to the pickup tile.
    ToPickup,
    /// Walking to the current delivery target.
    Delivering,
}

/// The colonist state machine's top-level states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColonistState {
    /// No job; may wander, sleep, or claim work.
    Idle,
    /// Walking to the job's interaction tile.
    MovingToTarget,
    /// At the target, doing at-tile work.
    Performing,
    /// Executing a pickup-then-deliver job.
    Hauling(HaulStage),
    /// Walking to a meal, then eating it.
    Eating,
    /// In bed (or collapsed in place) for the sleep window.
    Sleeping,
    /// Closing with a combat target.
    Combat,
    /// Brief pause after an interruption, against re-claim thrash.
    Recovery,
}

/// A colonist (or hostile raider; hostiles skip the job board entirely).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colonist {
    /// Stable identity.
    pub id: ColonistId,
    /// Display name.
    pub name: String,
    /// Current tile.
    pub pos: TilePos,
    /// State machine position.
    pub state: ColonistState,
    /// Claimed job, if any.
    pub job: Option<JobId>,
    /// Remaining steps of the current path (front = next tile).
    #[serde(skip)]
    pub path: VecDeque<TilePos>,
    /// Carried load, if any.
    pub carrying: Option<Carry>,
    /// Hunger, rising every tick.
    pub hunger: u32,
    /// Health; death at zero.
    pub health: u32,
    /// Job categories this colonist accepts.
    pub capabilities: Vec<Capability>,
    /// Daily plan.
    pub schedule: Schedule,
    /// Whether this is a hostile raider.
    pub hostile: bool,
    /// Whether the colonist is dead (corpses stay in the roster).
    pub dead: bool,
    /// Ticks until the next step.
    pub move_cooldown: u32,
    /// Set by external events; handled at the top of the next update.
    pub interrupt: bool,
    /// Remaining recovery ticks.
    pub recovery_left: u32,
    /// Claimed bed origin tile.
    pub bed: Option<TilePos>,
    /// Countdown to the next idle wander step.
    pub wander_timer: u32,
    /// Countdown to the next combat blow.
    pub strike_timer: u32,
    /// Ticks asleep, for slow regeneration.
    pub sleep_timer: u32,
    /// Combat target, when fighting.
    pub target: Option<ColonistId>,
    /// Tile the colonist is walking to for a meal.
    pub eat_target: Option<TilePos>,
}

impl Colonist {
    /// Full health for a fresh colonist.
    pub const MAX_HEALTH: u32 = 100;

    /// Create a colonist at a position with the given capabilities.
    /// Fighters get the drill-block schedule, everyone else the standard
    /// working day.
    pub fn new(name: String, pos: TilePos, capabilities: Vec<Capability>) -> Self {
        let schedule = if capabilities.contains(&Capability::Fight) {
            Schedule::fighter()
        } else {
            Schedule::standard()
        };
        Self {
            id: ColonistId::new(),
            name,
            pos,
            state: ColonistState::Idle,
            job: None,
            path: VecDeque::new(),
            carrying: None,
            hunger: 0,
            health: Self::MAX_HEALTH,
            capabilities,
            schedule,
            hostile: false,
            dead: false,
            move_cooldown: 0,
            interrupt: false,
            recovery_left: 0,
            bed: None,
            wander_timer: 0,
            strike_timer: 0,
            sleep_timer: 0,
            target: None,
            eat_target: None,
        }
    }

    /// Create a hostile raider.
    pub fn new_hostile(name: String, pos: TilePos) -> Self {
        let mut raider = Self::new(name, pos, vec![Capability::Fight]);
        raider.hostile = true;
        raider
    }

    /// Whether this colonist participates in the tick (alive and present).
    pub const fn is_active(&self) -> bool {
        !self.dead
    }

    /// Reset transient, non-durable state (used on load).
    pub fn normalize(&mut self) {
        self.path.clear();
        self.move_cooldown = 0;
        self.interrupt = false;
        self.recovery_left = 0;
        self.strike_timer = 0;
        self.sleep_timer = 0;
        self.eat_target = None;
        self.job = None;
        self.target = None;
        if !matches!(self.state, ColonistState::Sleeping) {
            self.state = ColonistState::Idle;
        }
    }
}
