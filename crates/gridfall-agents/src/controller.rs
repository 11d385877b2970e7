//! The per-tick colonist state machine.
//!
//! Order within one update: the dead do nothing; hostiles run their own
//! behavior; hunger ticks (death included); the move cooldown gates the
//! rest; a pending interrupt drops the carry, frees the job, and resets to
//! idle; then the current state runs one step.
//!
//! Job claiming happens in `Idle`: the board picks the best eligible job,
//! the colonist paths to the pickup or interaction tile, and the state
//! machine walks the legs from there. Failed preconditions release the job
//! with a wait timer and send the colonist through a short recovery pause
//! so the queue doesn't thrash.

use rand::Rng;
use tracing::debug;

use gridfall_types::{
    Activity, JobKind, NodeState, NotificationLog, TileKind, TilePos,
};
use gridfall_world::World;

use gridfall_jobs::JobBoard;

use crate::colonist::{Carry, Colonist, ColonistState, HaulStage};
use crate::combat::{self, CombatField};
use crate::config::AgentConfig;
use crate::pathing;
use crate::vitals;
use crate::work::{self, WorkOutcome};

/// Per-tick context shared by every colonist update.
#[derive(Debug, Clone, Copy)]
pub struct TickCtx<'a> {
    /// Agent tuning.
    pub cfg: &'a AgentConfig,
    /// Current hour of day.
    pub hour: u8,
    /// Unclaimed crash-bed origin tiles.
    pub free_beds: &'a [TilePos],
}

/// Advance one colonist by one tick.
pub fn update_colonist(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    field: &mut CombatField,
    log: &mut NotificationLog,
    ctx: &TickCtx<'_>,
    rng: &mut impl Rng,
) {
    if colonist.dead {
        return;
    }
    if colonist.hostile {
        if colonist.move_cooldown > 0 {
            colonist.move_cooldown = colonist.move_cooldown.saturating_sub(1);
            return;
        }
        combat::update_hostile(colonist, world, field, ctx.cfg, rng);
        return;
    }
    if vitals::tick_hunger(colonist, ctx.cfg, log) {
        release_job(colonist, board, 0);
        vitals::handle_death(colonist, world, log);
        return;
    }
    if colonist.move_cooldown > 0 {
        colonist.move_cooldown = colonist.move_cooldown.saturating_sub(1);
        return;
    }
    if colonist.interrupt {
        colonist.interrupt = false;
        vitals::drop_carry(colonist, world);
        release_job(colonist, board, 0);
        colonist.path.clear();
        colonist.state = ColonistState::Idle;
        debug!(colonist = %colonist.id, "interrupted, back to idle");
        return;
    }

    match colonist.state {
        ColonistState::Idle => idle_tick(colonist, world, board, field, ctx, rng),
        ColonistState::MovingToTarget => moving_tick(colonist, world, board, ctx),
        ColonistState::Performing => performing_tick(colonist, world, board, log, ctx),
        ColonistState::Hauling(stage) => hauling_tick(colonist, world, board, ctx, stage),
        ColonistState::Eating => eating_tick(colonist, world, ctx),
        ColonistState::Sleeping => sleeping_tick(colonist, world, ctx),
        ColonistState::Combat => combat_tick(colonist, world, board, field, ctx),
        ColonistState::Recovery => {
            colonist.recovery_left = colonist.recovery_left.saturating_sub(1);
            if colonist.recovery_left == 0 {
                colonist.state = ColonistState::Idle;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Free the colonist's job: released back to the pool when untouched,
/// removed outright when already part-executed (the dropped carry re-enters
/// the world as a loose item, so nothing dangles).
fn release_job(colonist: &mut Colonist, board: &mut JobBoard, wait: u32) {
    if let Some(id) = colonist.job.take() {
        if colonist.carrying.is_some() {
            board.remove(id);
        } else {
            board.release(id, wait);
        }
    }
}

fn enter_recovery(colonist: &mut Colonist, ctx: &TickCtx<'_>) {
    colonist.path.clear();
    colonist.state = ColonistState::Recovery;
    colonist.recovery_left = ctx.cfg.recovery_ticks;
}

enum StepResult {
    Moved,
    Blocked,
    AtEnd,
}

fn step(colonist: &mut Colonist, world: &mut World, ctx: &TickCtx<'_>) -> StepResult {
    let Some(&next) = colonist.path.front() else {
        return StepResult::AtEnd;
    };
    if !pathing::is_enterable(world, next) {
        return StepResult::Blocked;
    }
    if matches!(
        world.grid.tile(next),
        Some(TileKind::Built(gridfall_types::BuildingKind::Door | gridfall_types::BuildingKind::Window))
    ) {
        world.buildings.walk_onto(
            &mut world.grid,
            next,
            ctx.cfg.door_close_delay,
            ctx.cfg.window_close_delay,
        );
    }
    colonist.path.pop_front();
    colonist.pos = next;
    colonist.move_cooldown = ctx.cfg.move_cooldown;
    StepResult::Moved
}

fn wander(colonist: &mut Colonist, world: &World, ctx: &TickCtx<'_>, rng: &mut impl Rng) {
    if colonist.wander_timer > 0 {
        colonist.wander_timer = colonist.wander_timer.saturating_sub(1);
        return;
    }
    colonist.wander_timer = ctx.cfg.wander_interval;
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
        colonist.move_cooldown = ctx.cfg.move_cooldown;
    }
}

// ---------------------------------------------------------------------------
// Idle: claim work, or sleep, or wander
// ---------------------------------------------------------------------------

fn idle_tick(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    field: &CombatField,
    ctx: &TickCtx<'_>,
    rng: &mut impl Rng,
) {
    // An idle colonist holds nothing: a stranded carry (load restore, odd
    // interruption orders) goes back on the ground for the haul planner.
    if colonist.carrying.is_some() {
        vitals::drop_carry(colonist, world);
    }

    // A hungry colonist eats before taking new work.
    if vitals::wants_food(colonist, ctx.cfg) {
        if let Some(meal) = vitals::find_meal(world, colonist.pos) {
            if let Some(path) = pathing::find_path(world, colonist.pos, meal) {
                colonist.eat_target = Some(meal);
                colonist.path = path;
                colonist.state = ColonistState::Eating;
                return;
            }
        }
    }

    let activity = colonist.schedule.activity_at(ctx.hour);
    let hostiles = field.hostile_positions();
    let picked = board.request_job(
        colonist.pos,
        &colonist.capabilities,
        activity,
        world,
        &hostiles,
    );
    if let Some(id) = picked {
        if !board.claim(id) {
            return;
        }
        let Some(job) = board.job(id) else {
            return;
        };
        let kind = job.kind;
        let target = job.pos;
        let pickup = job.pickup_tile();
        let combat_target = job.target;
        colonist.job = Some(id);
        debug!(colonist = %colonist.id, job = %id, ?kind, "job claimed");

        if kind == JobKind::Combat {
            colonist.target = combat_target;
            colonist.path.clear();
            colonist.state = ColonistState::Combat;
            return;
        }
        if kind.is_haul_like() {
            match pathing::find_path(world, colonist.pos, pickup) {
                Some(path) => {
                    colonist.path = path;
                    colonist.state = ColonistState::Hauling(HaulStage::ToPickup);
                }
                None => {
                    colonist.job = None;
                    board.release(id, ctx.cfg.retry_wait);
                }
            }
            return;
        }
        match pathing::find_path_to_interaction(world, colonist.pos, target) {
            Some((path, _standing)) => {
                if kind == JobKind::Gathering {
                    world.resources.set_node_state(target, NodeState::Reserved);
                }
                colonist.path = path;
                colonist.state = ColonistState::MovingToTarget;
            }
            None => {
                colonist.job = None;
                board.release(id, ctx.cfg.retry_wait);
            }
        }
        return;
    }

    // No job. Sleep window sends the colonist to bed; otherwise loiter.
    if activity == Activity::Sleep {
        if colonist.bed.is_none() {
            colonist.bed = ctx
                .free_beds
                .iter()
                .copied()
                .min_by_key(|bed| colonist.pos.manhattan(*bed));
        }
        colonist.sleep_timer = 0;
        colonist.state = ColonistState::Sleeping;
        return;
    }
    wander(colonist, world, ctx, rng);
}

// ---------------------------------------------------------------------------
// Movement toward an at-tile job
// ---------------------------------------------------------------------------

fn moving_tick(colonist: &mut Colonist, world: &mut World, board: &mut JobBoard, ctx: &TickCtx<'_>) {
    let Some(id) = colonist.job else {
        colonist.path.clear();
        colonist.state = ColonistState::Idle;
        return;
    };
    let Some(job) = board.job(id) else {
        colonist.job = None;
        colonist.path.clear();
        colonist.state = ColonistState::Idle;
        return;
    };
    let kind = job.kind;
    let target = job.pos;
    match step(colonist, world, ctx) {
        StepResult::AtEnd => {
            if kind == JobKind::Gathering {
                world.resources.set_node_state(target, NodeState::InProgress);
            }
            colonist.state = ColonistState::Performing;
        }
        StepResult::Moved => {}
        StepResult::Blocked => {
            // Re-path once; give the job back if the target is cut off.
            match pathing::find_path_to_interaction(world, colonist.pos, target) {
                Some((path, _)) => colonist.path = path,
                None => {
                    release_job(colonist, board, ctx.cfg.retry_wait);
                    enter_recovery(colonist, ctx);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// At-tile work
// ---------------------------------------------------------------------------

fn performing_tick(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    log: &mut NotificationLog,
    ctx: &TickCtx<'_>,
) {
    let Some(id) = colonist.job else {
        colonist.state = ColonistState::Idle;
        return;
    };
    let Some(job) = board.job_mut(id) else {
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return;
    };
    let outcome = work::perform_tick(colonist, job, world, log, ctx.cfg.retry_wait);
    match outcome {
        WorkOutcome::Continue => {}
        WorkOutcome::Done => {
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
        }
        WorkOutcome::Wait(wait) => {
            colonist.job = None;
            board.release(id, wait);
            enter_recovery(colonist, ctx);
        }
        WorkOutcome::Abort => {
            board.remove(id);
            colonist.job = None;
            enter_recovery(colonist, ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Haul legs
// ---------------------------------------------------------------------------

/// Current delivery target of a haul-shaped job.
fn delivery_target(job: &gridfall_jobs::Job) -> TilePos {
    if let Some(delivery) = job.deliveries.first() {
        return delivery.pos;
    }
    job.dest.unwrap_or(job.pos)
}

fn hauling_tick(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    ctx: &TickCtx<'_>,
    stage: HaulStage,
) {
    let Some(id) = colonist.job else {
        vitals::drop_carry(colonist, world);
        colonist.state = ColonistState::Idle;
        return;
    };
    let Some(job) = board.job(id) else {
        vitals::drop_carry(colonist, world);
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return;
    };
    let kind = job.kind;
    let pickup = job.pickup_tile();
    let target = delivery_target(job);

    match stage {
        HaulStage::ToPickup => {
            if colonist.pos == pickup {
                if !do_pickup(colonist, world, board, ctx, id) {
                    return;
                }
                // Walk the load to its first stop.
                let route = if pathing::is_enterable(world, target) {
                    pathing::find_path(world, colonist.pos, target)
                } else {
                    pathing::find_path_to_interaction(world, colonist.pos, target)
                        .map(|(path, _)| path)
                };
                match route {
                    Some(path) => {
                        colonist.path = path;
                        colonist.state = ColonistState::Hauling(HaulStage::Delivering);
                    }
                    None => {
                        vitals::drop_carry(colonist, world);
                        board.remove(id);
                        colonist.job = None;
                        enter_recovery(colonist, ctx);
                    }
                }
                return;
            }
            match step(colonist, world, ctx) {
                StepResult::Moved => {}
                StepResult::AtEnd | StepResult::Blocked => {
                    match pathing::find_path(world, colonist.pos, pickup) {
                        Some(path) => colonist.path = path,
                        None => {
                            release_job(colonist, board, ctx.cfg.retry_wait);
                            enter_recovery(colonist, ctx);
                        }
                    }
                }
            }
        }
        HaulStage::Delivering => {
            let adjacent_ok = !world.is_walkable(target) && colonist.pos.manhattan(target) == 1;
            if colonist.pos == target || (colonist.path.is_empty() && adjacent_ok) {
                do_delivery(colonist, world, board, ctx, id, kind);
                return;
            }
            match step(colonist, world, ctx) {
                StepResult::Moved => {}
                StepResult::AtEnd | StepResult::Blocked => {
                    let route = if pathing::is_enterable(world, target) {
                        pathing::find_path(world, colonist.pos, target)
                    } else {
                        pathing::find_path_to_interaction(world, colonist.pos, target)
                            .map(|(path, _)| path)
                    };
                    match route {
                        Some(path) => colonist.path = path,
                        None => {
                            vitals::drop_carry(colonist, world);
                            board.remove(id);
                            colonist.job = None;
                            enter_recovery(colonist, ctx);
                        }
                    }
                }
            }
        }
    }
}

/// Collect the load at the pickup tile. Returns `false` when the job ended
/// here (nothing to pick up, or the subject vanished).
fn do_pickup(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    ctx: &TickCtx<'_>,
    id: gridfall_types::JobId,
) -> bool {
    let Some(job) = board.job(id) else {
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return false;
    };
    let kind = job.kind;
    let pickup = job.pickup_tile();
    let wanted = job.pickup_amount;
    let item = job.item;

    match kind {
        JobKind::Haul if item.is_some() => {
            let Some(item) = item else {
                return false;
            };
            if world.resources.take_world_item(pickup, item) {
                colonist.carrying = Some(Carry::Item(item));
                true
            } else {
                board.remove(id);
                colonist.job = None;
                colonist.state = ColonistState::Idle;
                false
            }
        }
        JobKind::Haul => match world.resources.pickup_loose(pickup) {
            Some(loose) => {
                colonist.carrying = Some(Carry::Resource {
                    kind: loose.resource,
                    amount: loose.amount,
                });
                true
            }
            None => {
                board.remove(id);
                colonist.job = None;
                colonist.state = ColonistState::Idle;
                false
            }
        },
        JobKind::Relocate => match world.resources.pickup_loose(pickup) {
            // A stray drop on the relocating tile moves first; the storage
            // stack drains on the next pass.
            Some(loose) => {
                colonist.carrying = Some(Carry::Resource {
                    kind: loose.resource,
                    amount: loose.amount,
                });
                true
            }
            None => match world.zones.remove_from_tile_storage(pickup, ctx.cfg.max_carry) {
                Some(store) => {
                    colonist.carrying = Some(Carry::Resource {
                        kind: store.resource,
                        amount: store.amount,
                    });
                    true
                }
                None => {
                    board.remove(id);
                    colonist.job = None;
                    colonist.state = ColonistState::Idle;
                    false
                }
            },
        },
        JobKind::Supply | JobKind::CraftingFetch => {
            match world.zones.remove_from_tile_storage(pickup, wanted) {
                Some(store) => {
                    // A short pickup still ships; the delivery clamps.
                    colonist.carrying = Some(Carry::Resource {
                        kind: store.resource,
                        amount: store.amount,
                    });
                    true
                }
                None => {
                    board.remove(id);
                    colonist.job = None;
                    enter_recovery(colonist, ctx);
                    false
                }
            }
        }
        JobKind::PlaceFurniture => {
            let Some(item) = item else {
                board.remove(id);
                colonist.job = None;
                colonist.state = ColonistState::Idle;
                return false;
            };
            if world.resources.take_world_item(pickup, item) {
                colonist.carrying = Some(Carry::Item(item));
                true
            } else {
                board.remove(id);
                colonist.job = None;
                colonist.state = ColonistState::Idle;
                false
            }
        }
        _ => {
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
            false
        }
    }
}

/// Hand the load over at the current delivery target.
fn do_delivery(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    ctx: &TickCtx<'_>,
    id: gridfall_types::JobId,
    kind: JobKind,
) {
    match kind {
        JobKind::Supply => {
            deliver_supply_leg(colonist, world, board, ctx, id);
        }
        JobKind::Haul | JobKind::Relocate => {
            let dest = board.job(id).and_then(|job| job.dest).unwrap_or(colonist.pos);
            match colonist.carrying.take() {
                Some(Carry::Resource { kind: resource, amount }) => {
                    let stored = world.zones.add_to_tile_storage(dest, resource, amount);
                    let leftover = amount.saturating_sub(stored);
                    if leftover > 0 {
                        // Destination filled since the job was created.
                        world
                            .resources
                            .drop_loose(colonist.pos, resource, leftover, true);
                    }
                }
                Some(Carry::Item(item)) => {
                    world.resources.spawn_world_item(dest, item);
                }
                None => {}
            }
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
        }
        JobKind::CraftingFetch => {
            let dest = board.job(id).and_then(|job| job.dest).unwrap_or(colonist.pos);
            match colonist.carrying.take() {
                Some(Carry::Resource { kind: resource, amount }) => {
                    if !world.stations.add_input(dest, resource, amount) {
                        // Station demolished mid-run; the load stays usable.
                        world.resources.drop_loose(colonist.pos, resource, amount, true);
                    }
                }
                Some(Carry::Item(item)) => {
                    world.resources.spawn_world_item(colonist.pos, item);
                }
                None => {}
            }
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
        }
        JobKind::PlaceFurniture => {
            let target = board.job(id).map_or(colonist.pos, |job| job.pos);
            let furniture = board.job(id).and_then(|job| job.furniture);
            match (colonist.carrying.take(), furniture) {
                (Some(Carry::Item(item)), Some(furniture)) => {
                    if world.install_furniture(furniture, target).is_err() {
                        // Footprint lost since designation; leave the item.
                        world.resources.spawn_world_item(colonist.pos, item);
                    }
                }
                (Some(Carry::Item(item)), None) => {
                    world.resources.spawn_world_item(colonist.pos, item);
                }
                (Some(Carry::Resource { kind: resource, amount }), _) => {
                    world.resources.drop_loose(colonist.pos, resource, amount, true);
                }
                (None, _) => {}
            }
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
        }
        _ => {
            vitals::drop_carry(colonist, world);
            board.remove(id);
            colonist.job = None;
            colonist.state = ColonistState::Idle;
        }
    }
}

/// Deliver to the head of a supply job's queue, then roll on to the next
/// stop or finish, dropping any remainder as a haul-requested loose item.
fn deliver_supply_leg(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    ctx: &TickCtx<'_>,
    id: gridfall_types::JobId,
) {
    let Some(Carry::Resource { kind: resource, amount }) = colonist.carrying else {
        board.remove(id);
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return;
    };
    let mut remaining = amount;
    let Some(job) = board.job_mut(id) else {
        vitals::drop_carry(colonist, world);
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return;
    };
    if let Some(delivery) = job.deliveries.first().copied() {
        let offered = delivery.amount.min(remaining);
        // Clamps to the site's remaining need (zero if it is gone).
        let absorbed = world.buildings.deliver_material(delivery.pos, resource, offered);
        world.buildings.clear_pending_supply(delivery.pos, resource);
        remaining = remaining.saturating_sub(absorbed);
        job.deliveries.remove(0);
    }
    let more_stops = !job.deliveries.is_empty();
    let next_stop = job.deliveries.first().map(|delivery| delivery.pos);

    if remaining == 0 || !more_stops {
        colonist.carrying = None;
        if remaining > 0 {
            world
                .resources
                .drop_loose(colonist.pos, resource, remaining, true);
        }
        board.remove(id);
        colonist.job = None;
        colonist.state = ColonistState::Idle;
        return;
    }
    colonist.carrying = Some(Carry::Resource {
        kind: resource,
        amount: remaining,
    });
    if let Some(next) = next_stop {
        match pathing::find_path(world, colonist.pos, next) {
            Some(path) => {
                colonist.path = path;
            }
            None => {
                vitals::drop_carry(colonist, world);
                board.remove(id);
                colonist.job = None;
                enter_recovery(colonist, ctx);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Eating, sleeping, combat
// ---------------------------------------------------------------------------

fn eating_tick(colonist: &mut Colonist, world: &mut World, ctx: &TickCtx<'_>) {
    let Some(target) = colonist.eat_target else {
        colonist.state = ColonistState::Idle;
        return;
    };
    if colonist.pos == target {
        if vitals::consume_meal(world, target) {
            colonist.hunger = 0;
        }
        colonist.eat_target = None;
        colonist.state = ColonistState::Idle;
        return;
    }
    match step(colonist, world, ctx) {
        StepResult::Moved => {}
        StepResult::AtEnd | StepResult::Blocked => {
            match pathing::find_path(world, colonist.pos, target) {
                Some(path) => colonist.path = path,
                None => {
                    colonist.eat_target = None;
                    colonist.state = ColonistState::Idle;
                }
            }
        }
    }
}

fn sleeping_tick(colonist: &mut Colonist, world: &mut World, ctx: &TickCtx<'_>) {
    if colonist.schedule.activity_at(ctx.hour) != Activity::Sleep {
        colonist.sleep_timer = 0;
        colonist.state = ColonistState::Idle;
        return;
    }
    if let Some(bed) = colonist.bed {
        if colonist.pos != bed {
            match step(colonist, world, ctx) {
                StepResult::Moved => return,
                StepResult::AtEnd | StepResult::Blocked => {
                    match pathing::find_path(world, colonist.pos, bed) {
                        Some(path) => {
                            colonist.path = path;
                            return;
                        }
                        None => {
                            // Bed unreachable tonight; doze where standing.
                        }
                    }
                }
            }
        }
    }
    colonist.sleep_timer = colonist.sleep_timer.saturating_add(1);
    if ctx.cfg.sleep_regen_interval > 0
        && colonist.sleep_timer.checked_rem(ctx.cfg.sleep_regen_interval) == Some(0)
    {
        colonist.health = colonist.health.saturating_add(1).min(Colonist::MAX_HEALTH);
    }
}

fn combat_tick(
    colonist: &mut Colonist,
    world: &mut World,
    board: &mut JobBoard,
    field: &mut CombatField,
    ctx: &TickCtx<'_>,
) {
    colonist.strike_timer = colonist.strike_timer.saturating_sub(1);
    let Some(target) = colonist.target else {
        if let Some(id) = colonist.job.take() {
            board.remove(id);
        }
        colonist.state = ColonistState::Idle;
        return;
    };
    let Some(target_pos) = field.position_of(target) else {
        // Threat resolved.
        if let Some(id) = colonist.job.take() {
            board.remove(id);
        }
        colonist.target = None;
        colonist.state = ColonistState::Idle;
        return;
    };
    if colonist.pos.chebyshev(target_pos) <= 1 && colonist.pos.z == target_pos.z {
        if colonist.strike_timer == 0 {
            field.record_hit(target, ctx.cfg.attack_damage);
            colonist.strike_timer = ctx.cfg.attack_interval;
        }
        return;
    }
    match step(colonist, world, ctx) {
        StepResult::Moved => {}
        StepResult::AtEnd | StepResult::Blocked => {
            match pathing::find_path_to_interaction(world, colonist.pos, target_pos) {
                Some((path, _)) => colonist.path = path,
                None => {
                    // Cornered target out of reach; circle back later.
                    colonist.path.clear();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use gridfall_types::{BuildingKind, Capability, JobCategory, ResourceKind};
    use gridfall_jobs::Job;

    use super::*;

    fn fast_cfg() -> AgentConfig {
        AgentConfig {
            move_cooldown: 0,
            ..AgentConfig::default()
        }
    }

    fn run_ticks(
        n: u32,
        colonist: &mut Colonist,
        world: &mut World,
        board: &mut JobBoard,
        cfg: &AgentConfig,
    ) {
        let mut log = NotificationLog::new();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..n {
            let mut field = CombatField::survey(core::slice::from_ref(colonist));
            let ctx = TickCtx {
                cfg,
                hour: 12,
                free_beds: &[],
            };
            update_colonist(colonist, world, board, &mut field, &mut log, &ctx, &mut rng);
        }
    }

    #[test]
    fn idle_colonist_claims_and_walks_to_job() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = fast_cfg();
        let target = TilePos::new(5, 0, 0);
        board.add_job(Job::new(JobKind::Recreation, JobCategory::Leisure, target, 3));
        let mut c = Colonist::new(String::from("Vex"), TilePos::new(0, 0, 0), vec![Capability::Haul]);
        run_ticks(1, &mut c, &mut world, &mut board, &cfg);
        assert_eq!(c.state, ColonistState::MovingToTarget);
        assert!(c.job.is_some());
        // Walk there and finish the job.
        run_ticks(20, &mut c, &mut world, &mut board, &cfg);
        assert_eq!(c.state, ColonistState::Idle);
        assert!(board.jobs().is_empty());
    }

    #[test]
    fn haul_moves_loose_item_into_storage() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = fast_cfg();
        let item_pos = TilePos::new(2, 0, 0);
        let store_pos = TilePos::new(6, 0, 0);
        assert!(world.zones.create_zone(&world.grid, &[store_pos], 0).is_ok());
        world.resources.drop_loose(item_pos, ResourceKind::Wood, 5, true);
        gridfall_jobs::plan_loose_hauls(&mut board, &mut world);
        let mut c = Colonist::new(String::from("Vex"), TilePos::new(0, 0, 0), vec![Capability::Haul]);
        run_ticks(40, &mut c, &mut world, &mut board, &cfg);
        assert_eq!(world.zones.total_stored(ResourceKind::Wood), 5);
        assert!(world.resources.loose_at(item_pos).is_none());
        assert!(board.jobs().is_empty());
        assert_eq!(c.carrying, None);
    }

    #[test]
    fn interrupt_drops_carry_and_frees_job() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = fast_cfg();
        let mut c = Colonist::new(String::from("Vex"), TilePos::new(3, 3, 0), vec![Capability::Haul]);
        c.carrying = Some(Carry::Resource {
            kind: ResourceKind::Scrap,
            amount: 2,
        });
        let id = board.add_job(Job::new(JobKind::Haul, JobCategory::Haul, TilePos::new(3, 3, 0), 10));
        c.job = id;
        c.state = ColonistState::Hauling(HaulStage::Delivering);
        c.interrupt = true;
        run_ticks(1, &mut c, &mut world, &mut board, &cfg);
        assert_eq!(c.state, ColonistState::Idle);
        assert_eq!(c.carrying, None);
        assert!(c.job.is_none());
        assert!(world.resources.loose_at(TilePos::new(3, 3, 0)).is_some_and(|i| i.haul_requested));
        // Part-executed haul was removed outright.
        assert!(board.jobs().is_empty());
    }

    #[test]
    fn construction_job_waits_without_materials() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = fast_cfg();
        let site = TilePos::new(4, 0, 0);
        assert!(world.place_building(BuildingKind::Floor, site).is_ok());
        let job = Job::new(JobKind::Construction, JobCategory::Build, site, 40)
            .with_subtype(BuildingKind::Floor);
        board.add_job(job);
        // Stock the material so should-take admits the job, then drain it
        // before the colonist arrives.
        let store = TilePos::new(1, 1, 0);
        assert!(world.zones.create_zone(&world.grid, &[store], 0).is_ok());
        world.zones.add_to_tile_storage(store, ResourceKind::Wood, 1);
        let mut c = Colonist::new(String::from("Vex"), TilePos::new(0, 0, 0), vec![Capability::Build]);
        run_ticks(1, &mut c, &mut world, &mut board, &cfg);
        assert_eq!(c.state, ColonistState::MovingToTarget);
        run_ticks(10, &mut c, &mut world, &mut board, &cfg);
        // Arrived with no delivery: released with a wait timer.
        assert!(c.job.is_none());
        let job = board.jobs().values().next();
        assert!(job.is_some_and(|j| !j.assigned && j.wait_timer > 0));
    }

    #[test]
    fn supply_run_feeds_site_and_finishes() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = fast_cfg();
        let site = TilePos::new(8, 0, 0);
        assert!(world.place_building(BuildingKind::Floor, site).is_ok());
        let store = TilePos::new(2, 0, 0);
        assert!(world.zones.create_zone(&world.grid, &[store], 0).is_ok());
        world.zones.add_to_tile_storage(store, ResourceKind::Wood, 10);
        gridfall_jobs::plan_supply(&mut board, &mut world, 20);
        let mut c = Colonist::new(String::from("Vex"), TilePos::new(0, 0, 0), vec![Capability::Haul]);
        run_ticks(60, &mut c, &mut world, &mut board, &cfg);
        assert!(world.buildings.site(site).is_some_and(|s| s.has_required_materials()));
        // One unit left the stockpile; the rest stayed.
        assert_eq!(world.zones.total_stored(ResourceKind::Wood), 9);
        assert!(board.jobs().is_empty());
    }

    #[test]
    fn combat_closes_and_strikes() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut board = JobBoard::new();
        let cfg = AgentConfig {
            move_cooldown: 0,
            attack_interval: 1,
            ..AgentConfig::default()
        };
        let mut fighter = Colonist::new(
            String::from("Vex"),
            TilePos::new(0, 0, 0),
            vec![Capability::Fight],
        );
        let raider = Colonist::new_hostile(String::from("Husk"), TilePos::new(4, 0, 0));
        let mut log = NotificationLog::new();
        let mut rng = SmallRng::seed_from_u64(5);

        let roster = vec![fighter.clone(), raider];
        let field_now = CombatField::survey(&roster);
        combat::maintain_combat_jobs(&mut board, &field_now, &mut log);
        for _ in 0..20 {
            let mut field = CombatField::survey(&roster);
            let ctx = TickCtx {
                cfg: &cfg,
                hour: 12,
                free_beds: &[],
            };
            update_colonist(&mut fighter, &mut world, &mut board, &mut field, &mut log, &ctx, &mut rng);
            if fighter.state == ColonistState::Combat && fighter.pos.chebyshev(TilePos::new(4, 0, 0)) <= 1 {
                break;
            }
        }
        assert_eq!(fighter.state, ColonistState::Combat);
        assert!(fighter.pos.chebyshev(TilePos::new(4, 0, 0)) <= 1);
    }
}
