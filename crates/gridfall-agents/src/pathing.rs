//! Breadth-first pathfinding on the walkability grid.
//!
//! Paths run over currently-walkable tiles, plus two special edges: closed
//! doors and windows are traversable (the agent opens them by stepping on),
//! and fire escapes link their foot tile to the platform one level up.
//! Paths are recomputed per job target and invalidated by the controller
//! when a step lands on a tile that is no longer enterable.

use std::collections::{BTreeMap, VecDeque};

use gridfall_types::{BuildingKind, TileKind, TilePos};
use gridfall_world::World;

/// Whether a tile can be entered by a walking colonist (doors count even
/// while closed; entering opens them).
pub fn is_enterable(world: &World, pos: TilePos) -> bool {
    if world.is_walkable(pos) {
        return true;
    }
    matches!(
        world.grid.tile(pos),
        Some(TileKind::Built(BuildingKind::Door) | TileKind::Built(BuildingKind::Window))
    )
}

fn neighbors(world: &World, pos: TilePos) -> Vec<TilePos> {
    let mut out = Vec::with_capacity(5);
    for neighbor in pos.neighbors() {
        if is_enterable(world, neighbor) {
            out.push(neighbor);
        }
    }
    if let Some(linked) = world.buildings.escape_link(pos) {
        if is_enterable(world, linked) {
            out.push(linked);
        }
    }
    out
}

/// Shortest path from `from` to `to`, excluding `from`, including `to`.
///
/// Returns `None` when unreachable. A zero-length request (already there)
/// returns an empty path.
pub fn find_path(world: &World, from: TilePos, to: TilePos) -> Option<VecDeque<TilePos>> {
    if from == to {
        return Some(VecDeque::new());
    }
    if !is_enterable(world, to) {
        return None;
    }
    let mut came_from: BTreeMap<TilePos, TilePos> = BTreeMap::new();
    let mut queue = VecDeque::from([from]);
    came_from.insert(from, from);
    while let Some(pos) = queue.pop_front() {
        for next in neighbors(world, pos) {
            if came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, pos);
            if next == to {
                // Walk the chain back.
                let mut path = VecDeque::new();
                let mut cursor = to;
                while cursor != from {
                    path.push_front(cursor);
                    cursor = came_from.get(&cursor).copied().unwrap_or(from);
                }
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Path to `target` if it is enterable, else to its nearest enterable
/// orthogonal neighbor. Used for workstations and other solid targets.
///
/// Returns the path and the tile the colonist will stand on.
pub fn find_path_to_interaction(
    world: &World,
    from: TilePos,
    target: TilePos,
) -> Option<(VecDeque<TilePos>, TilePos)> {
    if is_enterable(world, target) {
        return find_path(world, from, target).map(|path| (path, target));
    }
    let mut best: Option<(VecDeque<TilePos>, TilePos)> = None;
    for neighbor in target.neighbors() {
        if !is_enterable(world, neighbor) {
            continue;
        }
        if let Some(path) = find_path(world, from, neighbor) {
            let better = best
                .as_ref()
                .is_none_or(|(held, _)| path.len() < held.len());
            if better {
                best = Some((path, neighbor));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(12, 12, 2, 1000)
    }

    #[test]
    fn straight_line_path() {
        let w = world();
        let path = find_path(&w, TilePos::new(0, 0, 0), TilePos::new(3, 0, 0));
        assert_eq!(path.map(|p| p.len()), Some(3));
    }

    #[test]
    fn already_there_is_empty_path() {
        let w = world();
        let path = find_path(&w, TilePos::new(2, 2, 0), TilePos::new(2, 2, 0));
        assert_eq!(path.map(|p| p.len()), Some(0));
    }

    #[test]
    fn walls_block_and_reroute() {
        let mut w = world();
        // Wall across x=2 except a gap at y=5.
        for y in 0..12 {
            if y == 5 {
                continue;
            }
            w.grid.set_tile(TilePos::new(2, y, 0), TileKind::Built(BuildingKind::Wall));
        }
        let path = find_path(&w, TilePos::new(0, 0, 0), TilePos::new(4, 0, 0));
        let Some(path) = path else {
            assert!(path.is_some());
            return;
        };
        assert!(path.contains(&TilePos::new(2, 5, 0)));
    }

    #[test]
    fn closed_door_is_traversable() {
        let mut w = world();
        for y in 0..12 {
            w.grid.set_tile(TilePos::new(2, y, 0), TileKind::Built(BuildingKind::Wall));
        }
        let door = TilePos::new(2, 4, 0);
        w.grid.set_tile(door, TileKind::Built(BuildingKind::Door));
        w.buildings.register_door(door);
        let path = find_path(&w, TilePos::new(0, 4, 0), TilePos::new(4, 4, 0));
        let Some(path) = path else {
            assert!(path.is_some());
            return;
        };
        assert!(path.contains(&door));
    }

    #[test]
    fn sealed_room_is_unreachable() {
        let mut w = world();
        for y in 0..12 {
            w.grid.set_tile(TilePos::new(2, y, 0), TileKind::Built(BuildingKind::Wall));
        }
        assert!(find_path(&w, TilePos::new(0, 0, 0), TilePos::new(4, 0, 0)).is_none());
    }

    #[test]
    fn fire_escape_reaches_upper_level() {
        let mut w = world();
        let foot = TilePos::new(5, 5, 0);
        assert!(w.place_building(BuildingKind::FireEscape, foot).is_ok());
        assert!(w.complete_construction(foot).is_ok());
        // A walkable pad next to the platform.
        let pad = TilePos::new(5, 6, 1);
        w.grid.set_tile(pad, TileKind::Built(BuildingKind::Floor));
        let path = find_path(&w, TilePos::new(0, 0, 0), pad);
        let Some(path) = path else {
            assert!(path.is_some());
            return;
        };
        assert!(path.contains(&foot.above()));
    }

    #[test]
    fn interaction_path_stops_beside_solid_target() {
        let mut w = world();
        let station = TilePos::new(6, 6, 0);
        w.grid.set_tile(station, TileKind::Built(BuildingKind::Generator));
        let found = find_path_to_interaction(&w, TilePos::new(0, 6, 0), station);
        let Some((_, standing)) = found else {
            assert!(found.is_some());
            return;
        };
        assert_eq!(standing.manhattan(station), 1);
    }
}
