//! Resource nodes, loose ground items, salvage objects, and world items.
//!
//! Nodes are fixed ground-level entities harvested incrementally: yield is
//! amortized across a gathering job's duration, and every yielded unit drops
//! as a loose item on the node's tile flagged for hauling. Depleted nodes
//! either regrow (blocked while a loose item sits on the tile) or, for
//! non-replenishable kinds, are removed once their last drop is collected.
//!
//! Loose items are identified by their tile; a second drop of the same kind
//! stacks. World items are discrete crafted goods (equipment, furniture)
//! that never stack into tile storage.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gridfall_types::{ItemKind, NodeKind, NodeState, ResourceKind, SalvageKind, TileKind, TilePos};

use crate::grid::TileGrid;

// ---------------------------------------------------------------------------
// Static definition tables
// ---------------------------------------------------------------------------

/// Static properties of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDef {
    /// What the node yields.
    pub resource: ResourceKind,
    /// Maximum units a freshly spawned node can hold.
    pub max_amount: u32,
    /// Ticks from depletion to regrowth; 0 means never.
    pub regrow_ticks: u32,
    /// Whether the node comes back after depletion.
    pub replenishable: bool,
    /// Whether the kind spawns as loose ground items instead of a node.
    pub loose: bool,
    /// Total work a gathering job at this node requires.
    pub harvest_work: u32,
}

/// Return the canonical definition for a node kind.
pub const fn node_def(kind: NodeKind) -> NodeDef {
    match kind {
        NodeKind::Tree => NodeDef {
            resource: ResourceKind::Wood,
            max_amount: 50,
            regrow_ticks: 600,
            replenishable: true,
            loose: false,
            harvest_work: 200,
        },
        NodeKind::ScrapPile => NodeDef {
            resource: ResourceKind::Scrap,
            max_amount: 25,
            regrow_ticks: 0,
            replenishable: false,
            loose: true,
            harvest_work: 0,
        },
        NodeKind::MineralNode => NodeDef {
            resource: ResourceKind::Mineral,
            max_amount: 75,
            regrow_ticks: 900,
            replenishable: true,
            loose: false,
            harvest_work: 300,
        },
        NodeKind::FoodPlant => NodeDef {
            resource: ResourceKind::RawFood,
            max_amount: 20,
            regrow_ticks: 800,
            replenishable: true,
            loose: false,
            harvest_work: 150,
        },
    }
}

/// Static properties of a salvage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalvageDef {
    /// Minimum scrap recovered.
    pub scrap_min: u32,
    /// Maximum scrap recovered.
    pub scrap_max: u32,
    /// Work required to dismantle.
    pub work: u32,
}

/// Return the canonical definition for a salvage kind.
pub const fn salvage_def(kind: SalvageKind) -> SalvageDef {
    match kind {
        SalvageKind::RuinedTech => SalvageDef {
            scrap_min: 3,
            scrap_max: 6,
            work: 80,
        },
        SalvageKind::SalvagePile => SalvageDef {
            scrap_min: 2,
            scrap_max: 4,
            work: 50,
        },
        SalvageKind::RuinedWall => SalvageDef {
            scrap_min: 2,
            scrap_max: 5,
            work: 60,
        },
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A harvestable resource node at a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// The node's kind.
    pub kind: NodeKind,
    /// What it yields.
    pub resource: ResourceKind,
    /// Units remaining.
    pub remaining: u32,
    /// Units when full (randomized at spawn).
    pub max: u32,
    /// Ticks from depletion to regrowth; 0 means never.
    pub regrow_ticks: u32,
    /// Countdown once depleted.
    pub regrow_timer: u32,
    /// Whether the node is exhausted.
    pub depleted: bool,
    /// Reservation / progress state.
    pub state: NodeState,
}

/// A stack of loose resource units sitting on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooseItem {
    /// The resource kind.
    pub resource: ResourceKind,
    /// Stack size.
    pub amount: u32,
    /// Whether the auto-haul planner should move this to storage.
    pub haul_requested: bool,
}

/// A salvageable ruin object at a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalvageObject {
    /// The object's kind.
    pub kind: SalvageKind,
    /// Scrap recovered on completion (rolled at spawn).
    pub scrap_amount: u32,
    /// Whether the player has designated it for dismantling.
    pub designated: bool,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registry of nodes, loose items, salvage objects, and world items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRegistry {
    nodes: BTreeMap<TilePos, ResourceNode>,
    loose: BTreeMap<TilePos, LooseItem>,
    salvage: BTreeMap<TilePos, SalvageObject>,
    world_items: BTreeMap<TilePos, Vec<ItemKind>>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            loose: BTreeMap::new(),
            salvage: BTreeMap::new(),
            world_items: BTreeMap::new(),
        }
    }

    // -- nodes --------------------------------------------------------------

    /// Spawn a node of `kind` at `pos` with a randomized amount in
    /// `[max/2, max]`. Loose kinds drop their units as ground items instead.
    ///
    /// Returns `false` if the tile already hosts a node or is not empty
    /// ground on the grid.
    pub fn spawn_node(
        &mut self,
        grid: &mut TileGrid,
        pos: TilePos,
        kind: NodeKind,
        rng: &mut impl Rng,
    ) -> bool {
        if self.nodes.contains_key(&pos) || grid.tile(pos) != Some(TileKind::Empty) {
            return false;
        }
        let def = node_def(kind);
        let low = (def.max_amount / 2).max(1);
        let amount = rng.random_range(low..=def.max_amount.max(low));
        if def.loose {
            self.drop_loose(pos, def.resource, amount, false);
            return true;
        }
        self.nodes.insert(
            pos,
            ResourceNode {
                kind,
                resource: def.resource,
                remaining: amount,
                max: amount,
                regrow_ticks: def.regrow_ticks,
                regrow_timer: 0,
                depleted: false,
                state: NodeState::Idle,
            },
        );
        grid.set_tile(pos, TileKind::ResourceNode);
        true
    }

    /// The node at `pos`, if any.
    pub fn node(&self, pos: TilePos) -> Option<&ResourceNode> {
        self.nodes.get(&pos)
    }

    /// Set the reservation state of the node at `pos`.
    pub fn set_node_state(&mut self, pos: TilePos, state: NodeState) {
        if let Some(node) = self.nodes.get_mut(&pos) {
            node.state = state;
        }
    }

    /// All nodes (host snapshot).
    pub const fn nodes(&self) -> &BTreeMap<TilePos, ResourceNode> {
        &self.nodes
    }

    /// One tick of incremental harvest at `pos`.
    ///
    /// Yield is spread evenly across the job: with a full node of `max`
    /// units and a job of `required` ticks, one unit is owed every
    /// `required / max` ticks of progress. Each yielded unit drops on the
    /// node's tile as a loose item flagged for hauling. Returns `true` if a
    /// unit was yielded this tick.
    pub fn harvest_tick(&mut self, pos: TilePos, progress: u32, required: u32) -> bool {
        let Some(node) = self.nodes.get_mut(&pos) else {
            return false;
        };
        if node.remaining == 0 || required == 0 || node.max == 0 {
            return false;
        }
        let expected = u64::from(progress)
            .saturating_mul(u64::from(node.max))
            .checked_div(u64::from(required))
            .unwrap_or(0);
        let already = u64::from(node.max.saturating_sub(node.remaining));
        if expected <= already {
            return false;
        }
        node.remaining = node.remaining.saturating_sub(1);
        node.state = NodeState::Yielded;
        let resource = node.resource;
        if node.remaining == 0 {
            node.depleted = true;
            node.state = NodeState::Depleted;
            if node.regrow_ticks > 0 {
                node.regrow_timer = node.regrow_ticks;
            }
            debug!(%pos, kind = ?node.kind, "node depleted");
        }
        self.drop_loose(pos, resource, 1, true);
        true
    }

    /// Clear the node at `pos` for construction: every remaining unit drops
    /// as a haul-requested loose item and the node is removed permanently.
    ///
    /// Returns `true` if a node was cleared.
    pub fn clear_node_for_construction(&mut self, pos: TilePos) -> bool {
        let Some(node) = self.nodes.remove(&pos) else {
            return false;
        };
        if node.remaining > 0 {
            self.drop_loose(pos, node.resource, node.remaining, true);
        }
        debug!(%pos, kind = ?node.kind, dropped = node.remaining, "node cleared for construction");
        true
    }

    /// Tick regrow timers for depleted nodes.
    ///
    /// A node cannot regrow while a loose item sits on its tile. Depleted
    /// non-replenishable nodes are removed (tile reverts to empty) once
    /// their drop has been collected.
    pub fn tick_regrow(&mut self, grid: &mut TileGrid) {
        let depleted: Vec<TilePos> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.depleted)
            .map(|(pos, _)| *pos)
            .collect();
        for pos in depleted {
            let blocked = self.loose.contains_key(&pos);
            let Some(node) = self.nodes.get_mut(&pos) else {
                continue;
            };
            if node.regrow_ticks == 0 {
                if !blocked {
                    self.nodes.remove(&pos);
                    grid.set_tile(pos, TileKind::Empty);
                }
                continue;
            }
            if blocked {
                continue;
            }
            node.regrow_timer = node.regrow_timer.saturating_sub(1);
            if node.regrow_timer == 0 {
                node.remaining = node.max;
                node.depleted = false;
                node.state = NodeState::Idle;
                grid.set_tile(pos, TileKind::ResourceNode);
                debug!(%pos, kind = ?node.kind, "node regrown");
            }
        }
    }

    // -- loose items --------------------------------------------------------

    /// Drop `amount` units of `resource` at `pos`, stacking onto an existing
    /// item of the same tile. A haul request on the new drop sticks.
    pub fn drop_loose(&mut self, pos: TilePos, resource: ResourceKind, amount: u32, haul: bool) {
        if amount == 0 {
            return;
        }
        match self.loose.get_mut(&pos) {
            Some(item) => {
                item.amount = item.amount.saturating_add(amount);
                if haul {
                    item.haul_requested = true;
                }
            }
            None => {
                self.loose.insert(
                    pos,
                    LooseItem {
                        resource,
                        amount,
                        haul_requested: haul,
                    },
                );
            }
        }
    }

    /// The loose item at `pos`, if any.
    pub fn loose_at(&self, pos: TilePos) -> Option<&LooseItem> {
        self.loose.get(&pos)
    }

    /// Pick up and remove the loose item at `pos`.
    pub fn pickup_loose(&mut self, pos: TilePos) -> Option<LooseItem> {
        self.loose.remove(&pos)
    }

    /// Flag the loose item at `pos` for hauling. Returns `true` if present.
    pub fn mark_for_haul(&mut self, pos: TilePos) -> bool {
        match self.loose.get_mut(&pos) {
            Some(item) => {
                item.haul_requested = true;
                true
            }
            None => false,
        }
    }

    /// Clear the haul request on the loose item at `pos` (a job now owns it).
    pub fn clear_haul_request(&mut self, pos: TilePos) {
        if let Some(item) = self.loose.get_mut(&pos) {
            item.haul_requested = false;
        }
    }

    /// All loose items (host snapshot / planners).
    pub const fn loose_items(&self) -> &BTreeMap<TilePos, LooseItem> {
        &self.loose
    }

    /// Positions of loose items currently flagged for hauling.
    pub fn items_needing_haul(&self) -> Vec<TilePos> {
        self.loose
            .iter()
            .filter(|(_, item)| item.haul_requested)
            .map(|(pos, _)| *pos)
            .collect()
    }

    // -- salvage ------------------------------------------------------------

    /// Spawn a salvage object at `pos`, rolling its scrap yield.
    ///
    /// Returns `false` if the tile already hosts one or is not empty ground.
    pub fn spawn_salvage(
        &mut self,
        grid: &mut TileGrid,
        pos: TilePos,
        kind: SalvageKind,
        rng: &mut impl Rng,
    ) -> bool {
        if self.salvage.contains_key(&pos) || grid.tile(pos) != Some(TileKind::Empty) {
            return false;
        }
        let def = salvage_def(kind);
        let scrap_amount = rng.random_range(def.scrap_min..=def.scrap_max.max(def.scrap_min));
        self.salvage.insert(
            pos,
            SalvageObject {
                kind,
                scrap_amount,
                designated: false,
            },
        );
        grid.set_tile(pos, TileKind::SalvageObject);
        true
    }

    /// The salvage object at `pos`, if any.
    pub fn salvage_at(&self, pos: TilePos) -> Option<&SalvageObject> {
        self.salvage.get(&pos)
    }

    /// Designate the salvage object at `pos` for dismantling.
    ///
    /// Returns `false` if absent or already designated.
    pub fn designate_salvage(&mut self, pos: TilePos) -> bool {
        match self.salvage.get_mut(&pos) {
            Some(obj) if !obj.designated => {
                obj.designated = true;
                true
            }
            _ => false,
        }
    }

    /// Complete salvage at `pos`: the object is removed, the tile reverts to
    /// empty, and the scrap drops as a haul-requested loose item.
    ///
    /// Returns the scrap amount recovered, or `None` if no object existed.
    pub fn complete_salvage(&mut self, grid: &mut TileGrid, pos: TilePos) -> Option<u32> {
        let obj = self.salvage.remove(&pos)?;
        grid.set_tile(pos, TileKind::Empty);
        self.drop_loose(pos, ResourceKind::Scrap, obj.scrap_amount, true);
        Some(obj.scrap_amount)
    }

    /// All salvage objects (host snapshot).
    pub const fn salvage_objects(&self) -> &BTreeMap<TilePos, SalvageObject> {
        &self.salvage
    }

    // -- world items --------------------------------------------------------

    /// Leave a crafted item on the ground at `pos`.
    pub fn spawn_world_item(&mut self, pos: TilePos, item: ItemKind) {
        self.world_items.entry(pos).or_default().push(item);
    }

    /// Remove one `item` from the ground at `pos`. Returns `true` on success.
    pub fn take_world_item(&mut self, pos: TilePos, item: ItemKind) -> bool {
        let Some(stack) = self.world_items.get_mut(&pos) else {
            return false;
        };
        let Some(index) = stack.iter().position(|&candidate| candidate == item) else {
            return false;
        };
        stack.remove(index);
        if stack.is_empty() {
            self.world_items.remove(&pos);
        }
        true
    }

    /// Find the nearest tile holding an `item`, measured from `from`.
    pub fn find_world_item(&self, item: ItemKind, from: TilePos) -> Option<TilePos> {
        self.world_items
            .iter()
            .filter(|(_, stack)| stack.contains(&item))
            .map(|(pos, _)| *pos)
            .min_by_key(|pos| (from.manhattan(*pos), pos.z.abs_diff(from.z)))
    }

    /// All world items (host snapshot / planners).
    pub const fn world_items(&self) -> &BTreeMap<TilePos, Vec<ItemKind>> {
        &self.world_items
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn seeded() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn registry_with_node(pos: TilePos, remaining: u32, max: u32) -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        registry.nodes.insert(
            pos,
            ResourceNode {
                kind: NodeKind::Tree,
                resource: ResourceKind::Wood,
                remaining,
                max,
                regrow_ticks: 600,
                regrow_timer: 0,
                depleted: false,
                state: NodeState::Idle,
            },
        );
        registry
    }

    #[test]
    fn spawn_node_randomizes_amount_within_bounds() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = ResourceRegistry::new();
        let mut rng = seeded();
        let pos = TilePos::new(3, 3, 0);
        assert!(registry.spawn_node(&mut grid, pos, NodeKind::Tree, &mut rng));
        let node = registry.node(pos);
        assert!(node.is_some_and(|n| n.remaining >= 25 && n.remaining <= 50));
        assert_eq!(grid.tile(pos), Some(TileKind::ResourceNode));
    }

    #[test]
    fn spawn_loose_kind_drops_items_instead() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = ResourceRegistry::new();
        let mut rng = seeded();
        let pos = TilePos::new(2, 2, 0);
        assert!(registry.spawn_node(&mut grid, pos, NodeKind::ScrapPile, &mut rng));
        assert!(registry.node(pos).is_none());
        assert!(registry.loose_at(pos).is_some_and(|i| i.resource == ResourceKind::Scrap));
    }

    #[test]
    fn harvest_amortizes_across_job() {
        let pos = TilePos::new(0, 0, 0);
        let mut registry = registry_with_node(pos, 5, 5);
        // required = 40, max = 5 -> one unit every 8 ticks of progress.
        let mut yielded = 0;
        for progress in 1..=40 {
            if registry.harvest_tick(pos, progress, 40) {
                yielded += 1;
            }
        }
        assert_eq!(yielded, 5);
        assert!(registry.node(pos).is_some_and(|n| n.depleted));
        assert_eq!(registry.loose_at(pos).map(|i| i.amount), Some(5));
        assert!(registry.loose_at(pos).is_some_and(|i| i.haul_requested));
    }

    #[test]
    fn depletion_starts_regrow_timer() {
        let pos = TilePos::new(0, 0, 0);
        let mut registry = registry_with_node(pos, 1, 1);
        assert!(registry.harvest_tick(pos, 1, 1));
        let node = registry.node(pos);
        assert!(node.is_some_and(|n| n.state == NodeState::Depleted && n.regrow_timer == 600));
    }

    #[test]
    fn regrow_blocked_by_loose_item() {
        let mut grid = TileGrid::new(4, 4, 1);
        let pos = TilePos::new(0, 0, 0);
        let mut registry = registry_with_node(pos, 1, 1);
        assert!(registry.harvest_tick(pos, 1, 1));
        let before = registry.node(pos).map(|n| n.regrow_timer);
        registry.tick_regrow(&mut grid);
        // Timer unchanged while the drop sits on the tile.
        assert_eq!(registry.node(pos).map(|n| n.regrow_timer), before);
        registry.pickup_loose(pos);
        registry.tick_regrow(&mut grid);
        assert_eq!(registry.node(pos).map(|n| n.regrow_timer), Some(599));
    }

    #[test]
    fn non_replenishable_node_removed_after_pickup() {
        let mut grid = TileGrid::new(4, 4, 1);
        let pos = TilePos::new(1, 1, 0);
        let mut registry = ResourceRegistry::new();
        registry.nodes.insert(
            pos,
            ResourceNode {
                kind: NodeKind::ScrapPile,
                resource: ResourceKind::Scrap,
                remaining: 0,
                max: 10,
                regrow_ticks: 0,
                regrow_timer: 0,
                depleted: true,
                state: NodeState::Depleted,
            },
        );
        registry.drop_loose(pos, ResourceKind::Scrap, 2, true);
        registry.tick_regrow(&mut grid);
        assert!(registry.node(pos).is_some());
        registry.pickup_loose(pos);
        registry.tick_regrow(&mut grid);
        assert!(registry.node(pos).is_none());
        assert_eq!(grid.tile(pos), Some(TileKind::Empty));
    }

    #[test]
    fn clear_for_construction_drops_everything() {
        let pos = TilePos::new(0, 0, 0);
        let mut registry = registry_with_node(pos, 7, 10);
        assert!(registry.clear_node_for_construction(pos));
        assert!(registry.node(pos).is_none());
        let item = registry.loose_at(pos);
        assert!(item.is_some_and(|i| i.amount == 7 && i.haul_requested));
    }

    #[test]
    fn loose_items_stack_by_tile() {
        let mut registry = ResourceRegistry::new();
        let pos = TilePos::new(4, 4, 0);
        registry.drop_loose(pos, ResourceKind::Wood, 3, false);
        registry.drop_loose(pos, ResourceKind::Wood, 2, true);
        let item = registry.loose_at(pos);
        assert!(item.is_some_and(|i| i.amount == 5 && i.haul_requested));
    }

    #[test]
    fn pickup_returns_identity() {
        let mut registry = ResourceRegistry::new();
        let pos = TilePos::new(4, 4, 0);
        registry.drop_loose(pos, ResourceKind::Mineral, 6, false);
        let item = registry.pickup_loose(pos);
        assert_eq!(
            item,
            Some(LooseItem {
                resource: ResourceKind::Mineral,
                amount: 6,
                haul_requested: false,
            })
        );
        assert!(registry.loose_at(pos).is_none());
    }

    #[test]
    fn salvage_completion_drops_scrap() {
        let mut grid = TileGrid::new(8, 8, 1);
        let mut registry = ResourceRegistry::new();
        let mut rng = seeded();
        let pos = TilePos::new(5, 5, 0);
        assert!(registry.spawn_salvage(&mut grid, pos, SalvageKind::RuinedTech, &mut rng));
        let expected = registry.salvage_at(pos).map(|o| o.scrap_amount);
        let recovered = registry.complete_salvage(&mut grid, pos);
        assert_eq!(recovered, expected);
        assert_eq!(grid.tile(pos), Some(TileKind::Empty));
        assert!(registry.loose_at(pos).is_some_and(|i| i.haul_requested));
    }

    #[test]
    fn world_items_take_and_find() {
        let mut registry = ResourceRegistry::new();
        let pos = TilePos::new(2, 3, 0);
        registry.spawn_world_item(pos, ItemKind::CrashBed);
        registry.spawn_world_item(pos, ItemKind::WorkGloves);
        assert_eq!(
            registry.find_world_item(ItemKind::CrashBed, TilePos::new(0, 0, 0)),
            Some(pos)
        );
        assert!(registry.take_world_item(pos, ItemKind::CrashBed));
        assert!(!registry.take_world_item(pos, ItemKind::CrashBed));
        assert!(registry.take_world_item(pos, ItemKind::WorkGloves));
        assert!(registry.world_items().is_empty());
    }
}
