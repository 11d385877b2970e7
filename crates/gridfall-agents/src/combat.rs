//! Combat support: the per-tick survey, damage accumulation, combat-job
//! upkeep, and hostile behavior.
//!
//! Damage is not applied mid-update. Each tick the simulation surveys
//! positions into a [`CombatField`], colonists and hostiles record hits
//! against it during their updates, and the field applies the accumulated
//! damage afterward -- so no agent observes a half-resolved exchange.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use gridfall_types::{
    ColonistId, JobCategory, JobKind, Notification, NotificationKind, NotificationLog, TilePos,
};
use gridfall_world::World;

use gridfall_jobs::{Job, JobBoard};

use crate::colonist::Colonist;
use crate::config::AgentConfig;
use crate::pathing;
use crate::vitals;

/// Snapshot of combatant positions plus accumulated damage for one tick.
#[derive(Debug, Clone, Default)]
pub struct CombatField {
    positions: BTreeMap<ColonistId, TilePos>,
    hostile_ids: Vec<ColonistId>,
    friendly_ids: Vec<ColonistId>,
    damage: BTreeMap<ColonistId, u32>,
}

impl CombatField {
    /// Survey the roster at the top of the tick.
    pub fn survey(colonists: &[Colonist]) -> Self {
        let mut field = Self::default();
        for colonist in colonists {
            if colonist.dead {
                continue;
            }
            field.positions.insert(colonist.id, colonist.pos);
            if colonist.hostile {
                field.hostile_ids.push(colonist.id);
            } else {
                field.friendly_ids.push(colonist.id);
            }
        }
        field
    }

    /// Positions of all living hostiles (for dynamic combat pressure).
    pub fn hostile_positions(&self) -> Vec<TilePos> {
        self.hostile_ids
            .iter()
            .filter_map(|id| self.positions.get(id).copied())
            .collect()
    }

    /// Whether any hostile is alive.
    pub fn has_hostiles(&self) -> bool {
        !self.hostile_ids.is_empty()
    }

    /// Position of a combatant, if alive this tick.
    pub fn position_of(&self, id: ColonistId) -> Option<TilePos> {
        self.positions.get(&id).copied()
    }

    /// Living hostiles with their positions.
    pub fn hostiles(&self) -> Vec<(ColonistId, TilePos)> {
        self.hostile_ids
            .iter()
            .filter_map(|id| self.positions.get(id).map(|pos| (*id, *pos)))
            .collect()
    }

    /// Nearest non-hostile to `from` (hostile AI targeting).
    pub fn nearest_friendly(&self, from: TilePos) -> Option<(ColonistId, TilePos)> {
        self.friendly_ids
            .iter()
            .filter_map(|id| self.positions.get(id).map(|pos| (*id, *pos)))
            .filter(|(_, pos)| pos.z == from.z)
            .min_by_key(|(_, pos)| from.chebyshev(*pos))
    }

    /// Record a landed blow.
    pub fn record_hit(&mut self, target: ColonistId, damage: u32) {
        let entry = self.damage.entry(target).or_insert(0);
        *entry = entry.saturating_add(damage);
    }

    /// Apply accumulated damage after all updates. Returns deaths.
    pub fn apply_damage(
        &mut self,
        colonists: &mut [Colonist],
        world: &mut World,
        log: &mut NotificationLog,
    ) -> u32 {
        let mut deaths: u32 = 0;
        for colonist in colonists.iter_mut() {
            let Some(&damage) = self.damage.get(&colonist.id) else {
                continue;
            };
            if colonist.dead || damage == 0 {
                continue;
            }
            colonist.health = colonist.health.saturating_sub(damage);
            colonist.interrupt = true;
            if colonist.health == 0 {
                vitals::handle_death(colonist, world, log);
                deaths = deaths.saturating_add(1);
            }
        }
        self.damage.clear();
        deaths
    }
}

/// Keep one combat job alive per living hostile, anchored at its position.
pub fn maintain_combat_jobs(board: &mut JobBoard, field: &CombatField, log: &mut NotificationLog) {
    // Cull jobs for dead or vanished targets; re-anchor unassigned jobs
    // whose hostile has moved.
    let stale: Vec<(gridfall_types::JobId, Option<TilePos>, Option<ColonistId>, bool)> = board
        .jobs()
        .iter()
        .filter(|(_, job)| job.kind == JobKind::Combat)
        .map(|(id, job)| {
            let current = job.target.and_then(|target| field.position_of(target));
            (*id, current, job.target, job.assigned)
        })
        .collect();
    let mut covered: Vec<ColonistId> = Vec::new();
    for (id, current, target, assigned) in stale {
        match (current, target) {
            (Some(pos), Some(target)) => {
                if !assigned {
                    if let Some(job) = board.job(id) {
                        if job.pos != pos {
                            board.remove(id);
                            let mut job = Job::new(JobKind::Combat, JobCategory::Fight, pos, 1);
                            job.target = Some(target);
                            board.add_job(job);
                        }
                    }
                }
                covered.push(target);
            }
            _ => {
                board.remove(id);
                log.push(Notification::new(
                    NotificationKind::CombatEnd,
                    String::from("Threat down"),
                    String::new(),
                ));
            }
        }
    }
    for (target, pos) in field.hostiles() {
        if covered.contains(&target) {
            continue;
        }
        debug!(%target, %pos, "hostile engaged");
        log.push(Notification::at(
            NotificationKind::CombatStart,
            String::from("Hostile sighted"),
            String::new(),
            pos,
        ));
        let mut job = Job::new(JobKind::Combat, JobCategory::Fight, pos, 1);
        job.target = Some(target);
        board.add_job(job);
    }
}

/// Set interrupt flags on non-fighters with a hostile close by.
pub fn flag_interrupts(colonists: &mut [Colonist], field: &CombatField, radius: u32) {
    let hostile_positions = field.hostile_positions();
    if hostile_positions.is_empty() {
        return;
    }
    for colonist in colonists.iter_mut() {
        if colonist.dead || colonist.hostile {
            continue;
        }
        let threatened = hostile_positions
            .iter()
            .any(|pos| pos.z == colonist.pos.z && colonist.pos.chebyshev(*pos) <= radius);
        if threatened && colonist.job.is_some() {
            colonist.interrupt = true;
        }
    }
}

/// One tick of hostile behavior: close with the nearest colonist and swing.
pub fn update_hostile(
    colonist: &mut Colonist,
    world: &World,
    field: &mut CombatField,
    cfg: &AgentConfig,
    rng: &mut impl Rng,
) {
    colonist.strike_timer = colonist.strike_timer.saturating_sub(1);
    let Some((target, target_pos)) = field.nearest_friendly(colonist.pos) else {
        // Nobody left to menace; shuffle around.
        wander_step(colonist, world, cfg, rng);
        return;
    };
    if colonist.pos.chebyshev(target_pos) <= 1 {
        if colonist.strike_timer == 0 {
            field.record_hit(target, cfg.attack_damage);
            colonist.strike_timer = cfg.attack_interval;
        }
        return;
    }
    if colonist.path.is_empty() {
        match pathing::find_path_to_interaction(world, colonist.pos, target_pos) {
            Some((path, _)) => colonist.path = path,
            None => return,
        }
    }
    step_one(colonist, world, cfg);
}

fn wander_step(colonist: &mut Colonist, world: &World, cfg: &AgentConfig, rng: &mut impl Rng) {
    if colonist.wander_timer > 0 {
        colonist.wander_timer = colonist.wander_timer.saturating_sub(1);
        return;
    }
    colonist.wander_timer = cfg.wander_interval;
    let options: Vec<TilePos> = colonist
        .pos
        .neighbors()
        .into_iter()
        .filter(|pos| world.is_walkable(*pos))
        .collect();
    if options.is_empty() {
        return;
    }
    let index = rng.random_range(0..options.len());
    if let Some(next) = options.get(index) {
        colonist.pos = *next;
        colonist.move_cooldown = cfg.move_cooldown;
    }
}

fn step_one(colonist: &mut Colonist, world: &World, cfg: &AgentConfig) {
    let Some(&next) = colonist.path.front() else {
        return;
    };
    if !pathing::is_enterable(world, next) {
        colonist.path.clear();
        return;
    }
    colonist.path.pop_front();
    colonist.pos = next;
    colonist.move_cooldown = cfg.move_cooldown;
}
