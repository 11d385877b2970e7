//! Hunger, eating, starvation, and death consequences.
//!
//! Hunger rises one point per tick. Past the eat threshold an idle colonist
//! walks to a stockpile holding cooked meals and eats one; past the
//! starvation threshold health drains on a slow cadence until a meal or
//! death. Death drops whatever was carried (flagged for hauling, nothing is
//! lost) and emits a notification.

use tracing::info;

use gridfall_types::{Notification, NotificationKind, NotificationLog, ResourceKind, TilePos};
use gridfall_world::World;

use crate::colonist::{Carry, Colonist};
use crate::config::AgentConfig;

/// Advance hunger and starvation for one tick. Returns `true` if the
/// colonist died of starvation this tick.
pub fn tick_hunger(colonist: &mut Colonist, cfg: &AgentConfig, log: &mut NotificationLog) -> bool {
    colonist.hunger = colonist.hunger.saturating_add(1);
    if colonist.hunger == cfg.hunger_starvation {
        log.push(Notification::at(
            NotificationKind::Starvation,
            format!("{} is starving", colonist.name),
            String::new(),
            colonist.pos,
        ));
    }
    if colonist.hunger >= cfg.hunger_starvation
        && cfg.starvation_interval > 0
        && colonist.hunger.checked_rem(cfg.starvation_interval) == Some(0)
    {
        colonist.health = colonist.health.saturating_sub(1);
        if colonist.health == 0 {
            return true;
        }
    }
    false
}

/// Whether the colonist is hungry enough to go eat.
pub const fn wants_food(colonist: &Colonist, cfg: &AgentConfig) -> bool {
    colonist.hunger >= cfg.hunger_eat_threshold
}

/// Find a stockpile tile holding a cooked meal, preferring the colonist's
/// level.
pub fn find_meal(world: &World, from: TilePos) -> Option<TilePos> {
    world
        .zones
        .find_tile_with_resource(ResourceKind::CookedMeal, Some(from.z))
}

/// Eat one cooked meal from the tile. Returns `true` if a meal was there.
pub fn consume_meal(world: &mut World, pos: TilePos) -> bool {
    let holds_meal = world
        .zones
        .storage_at(pos)
        .is_some_and(|store| store.resource == ResourceKind::CookedMeal && store.amount > 0);
    if !holds_meal {
        return false;
    }
    world.zones.remove_from_tile_storage(pos, 1).is_some()
}

/// Drop the colonist's carry on their tile, flagged for hauling.
pub fn drop_carry(colonist: &mut Colonist, world: &mut World) {
    match colonist.carrying.take() {
        Some(Carry::Resource { kind, amount }) => {
            world.resources.drop_loose(colonist.pos, kind, amount, true);
        }
        Some(Carry::Item(item)) => {
            world.resources.spawn_world_item(colonist.pos, item);
        }
        None => {}
    }
}

/// Kill the colonist: drop the carry and emit a notification.
pub fn handle_death(colonist: &mut Colonist, world: &mut World, log: &mut NotificationLog) {
    drop_carry(colonist, world);
    colonist.dead = true;
    colonist.job = None;
    colonist.path.clear();
    info!(colonist = %colonist.id, name = %colonist.name, "colonist died");
    log.push(Notification::at(
        NotificationKind::Death,
        format!("{} died", colonist.name),
        String::new(),
        colonist.pos,
    ));
}

#[cfg(test)]
mod tests {
    use gridfall_types::Capability;

    use super::*;

    fn colonist() -> Colonist {
        Colonist::new(String::from("Ash"), TilePos::new(2, 2, 0), vec![Capability::Haul])
    }

    #[test]
    fn hunger_rises_and_triggers_want() {
        let cfg = AgentConfig::default();
        let mut log = NotificationLog::new();
        let mut c = colonist();
        assert!(!wants_food(&c, &cfg));
        for _ in 0..cfg.hunger_eat_threshold {
            assert!(!tick_hunger(&mut c, &cfg, &mut log));
        }
        assert!(wants_food(&c, &cfg));
    }

    #[test]
    fn starvation_drains_health_and_kills() {
        let cfg = AgentConfig {
            hunger_starvation: 10,
            starvation_interval: 1,
            ..AgentConfig::default()
        };
        let mut log = NotificationLog::new();
        let mut c = colonist();
        c.health = 3;
        let mut died = false;
        for _ in 0..20 {
            if tick_hunger(&mut c, &cfg, &mut log) {
                died = true;
                break;
            }
        }
        assert!(died);
        assert_eq!(c.health, 0);
        // The starvation warning fired once on crossing the threshold.
        assert!(
            log.pending()
                .iter()
                .any(|n| n.kind == NotificationKind::Starvation)
        );
    }

    #[test]
    fn eating_takes_one_meal_from_storage() {
        let mut world = World::new(16, 16, 1, 1000);
        let tile = TilePos::new(5, 5, 0);
        assert!(world.zones.create_zone(&world.grid, &[tile], 0).is_ok());
        world.zones.add_to_tile_storage(tile, ResourceKind::CookedMeal, 2);
        assert_eq!(find_meal(&world, TilePos::new(0, 0, 0)), Some(tile));
        assert!(consume_meal(&mut world, tile));
        assert_eq!(world.zones.total_stored(ResourceKind::CookedMeal), 1);
    }

    #[test]
    fn eating_refuses_non_meals() {
        let mut world = World::new(16, 16, 1, 1000);
        let tile = TilePos::new(5, 5, 0);
        assert!(world.zones.create_zone(&world.grid, &[tile], 0).is_ok());
        world.zones.add_to_tile_storage(tile, ResourceKind::Wood, 2);
        assert!(!consume_meal(&mut world, tile));
        assert_eq!(world.zones.total_stored(ResourceKind::Wood), 2);
    }

    #[test]
    fn death_drops_carry_for_rehaul() {
        let mut world = World::new(16, 16, 1, 1000);
        let mut log = NotificationLog::new();
        let mut c = colonist();
        c.carrying = Some(Carry::Resource {
            kind: ResourceKind::Mineral,
            amount: 4,
        });
        handle_death(&mut c, &mut world, &mut log);
        assert!(c.dead);
        assert!(c.carrying.is_none());
        let item = world.resources.loose_at(c.pos);
        assert!(item.is_some_and(|i| i.amount == 4 && i.haul_requested));
        assert!(log.pending().iter().any(|n| n.kind == NotificationKind::Death));
    }
}
