//! Workstations, recipes, and order queues.
//!
//! A workstation holds an input buffer, a recipe selection, and a queue of
//! standing orders. The crafting pump (in the jobs crate) drives the state
//! machine: fetch inputs, consume them atomically, spawn a crafting-work
//! job, and emit the output when the work bar fills.
//!
//! Single-recipe stations (salvager's bench, generator, stove) always run
//! their one recipe; multi-recipe stations (gutter forge, skinshop loom,
//! cortex spindle) run whichever recipe each order names.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use gridfall_types::{BuildingKind, ItemKind, ResourceKind, TilePos};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// What a recipe produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOutput {
    /// A stack of resources, dropped on the station tile flagged for haul.
    Resource(ResourceKind, u32),
    /// A discrete item, emitted as a world item at the station tile.
    Item(ItemKind),
}

/// A crafting recipe offered by a workstation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Stable identifier, referenced by orders.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Input materials consumed per run.
    pub inputs: BTreeMap<ResourceKind, u32>,
    /// What one run produces.
    pub output: RecipeOutput,
    /// Work ticks per run.
    pub work: u32,
}

/// The recipes a workstation kind offers. Empty for non-crafting stations
/// (the barracks trains, it does not produce).
pub fn recipes_for(kind: BuildingKind) -> Vec<Recipe> {
    match kind {
        BuildingKind::SalvagersBench => vec![Recipe {
            id: "refine_metal",
            name: "Refine Metal",
            inputs: BTreeMap::from([(ResourceKind::Scrap, 2)]),
            output: RecipeOutput::Resource(ResourceKind::Metal, 1),
            work: 60,
        }],
        BuildingKind::Generator => vec![Recipe {
            id: "burn_wood",
            name: "Burn Wood",
            inputs: BTreeMap::from([(ResourceKind::Wood, 3)]),
            output: RecipeOutput::Resource(ResourceKind::Power, 1),
            work: 80,
        }],
        BuildingKind::Stove => vec![Recipe {
            id: "cook_meal",
            name: "Cook Meal",
            inputs: BTreeMap::from([(ResourceKind::RawFood, 1), (ResourceKind::Power, 1)]),
            output: RecipeOutput::Resource(ResourceKind::CookedMeal, 1),
            work: 60,
        }],
        BuildingKind::GutterForge => vec![
            Recipe {
                id: "salvage_tool",
                name: "Salvage Tool",
                inputs: BTreeMap::from([(ResourceKind::Metal, 2), (ResourceKind::Scrap, 1)]),
                output: RecipeOutput::Item(ItemKind::SalvageTool),
                work: 80,
            },
            Recipe {
                id: "work_gloves",
                name: "Work Gloves",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 2)]),
                output: RecipeOutput::Item(ItemKind::WorkGloves),
                work: 60,
            },
            Recipe {
                id: "signal_gauntlet",
                name: "Signal Gauntlet",
                inputs: BTreeMap::from([(ResourceKind::Metal, 2), (ResourceKind::Power, 1)]),
                output: RecipeOutput::Item(ItemKind::SignalGauntlet),
                work: 100,
            },
            Recipe {
                id: "gutter_slab",
                name: "Gutter Slab",
                inputs: BTreeMap::from([(ResourceKind::Wood, 4), (ResourceKind::Mineral, 2)]),
                output: RecipeOutput::Item(ItemKind::GutterSlab),
                work: 90,
            },
        ],
        BuildingKind::SkinshopLoom => vec![
            Recipe {
                id: "hard_hat",
                name: "Hard Hat",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 2)]),
                output: RecipeOutput::Item(ItemKind::HardHat),
                work: 60,
            },
            Recipe {
                id: "work_vest",
                name: "Work Vest",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 2), (ResourceKind::Wood, 1)]),
                output: RecipeOutput::Item(ItemKind::WorkVest),
                work: 70,
            },
            Recipe {
                id: "padded_jacket",
                name: "Padded Jacket",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 3)]),
                output: RecipeOutput::Item(ItemKind::PaddedJacket),
                work: 90,
            },
            Recipe {
                id: "work_boots",
                name: "Work Boots",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 2)]),
                output: RecipeOutput::Item(ItemKind::WorkBoots),
                work: 60,
            },
            Recipe {
                id: "scrap_armor",
                name: "Scrap Armor",
                inputs: BTreeMap::from([(ResourceKind::Metal, 3), (ResourceKind::Scrap, 2)]),
                output: RecipeOutput::Item(ItemKind::ScrapArmor),
                work: 120,
            },
            Recipe {
                id: "crash_bed",
                name: "Crash Bed",
                inputs: BTreeMap::from([(ResourceKind::Scrap, 2), (ResourceKind::Wood, 2)]),
                output: RecipeOutput::Item(ItemKind::CrashBed),
                work: 90,
            },
        ],
        BuildingKind::CortexSpindle => vec![
            Recipe {
                id: "focus_chip",
                name: "Focus Chip",
                inputs: BTreeMap::from([(ResourceKind::Metal, 2), (ResourceKind::Mineral, 1)]),
                output: RecipeOutput::Item(ItemKind::FocusChip),
                work: 100,
            },
            Recipe {
                id: "echo_dampener",
                name: "Echo Dampener",
                inputs: BTreeMap::from([(ResourceKind::Metal, 1), (ResourceKind::Mineral, 2)]),
                output: RecipeOutput::Item(ItemKind::EchoDampener),
                work: 100,
            },
            Recipe {
                id: "lucky_coin",
                name: "Lucky Coin",
                inputs: BTreeMap::from([(ResourceKind::Metal, 1)]),
                output: RecipeOutput::Item(ItemKind::LuckyCoin),
                work: 40,
            },
            Recipe {
                id: "memory_locket",
                name: "Memory Locket",
                inputs: BTreeMap::from([(ResourceKind::Metal, 1), (ResourceKind::Mineral, 1)]),
                output: RecipeOutput::Item(ItemKind::MemoryLocket),
                work: 60,
            },
            Recipe {
                id: "signal_stone",
                name: "Signal Stone",
                inputs: BTreeMap::from([(ResourceKind::Mineral, 2), (ResourceKind::Power, 1)]),
                output: RecipeOutput::Item(ItemKind::SignalStone),
                work: 80,
            },
        ],
        _ => Vec::new(),
    }
}

/// Look up one recipe of a workstation kind by id.
pub fn recipe(kind: BuildingKind, id: &str) -> Option<Recipe> {
    recipes_for(kind).into_iter().find(|recipe| recipe.id == id)
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// How many times an order should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderQuantity {
    /// Run once, then pop.
    Single,
    /// Run until `completed` reaches the target, then pop.
    Target(u32),
    /// Run until the player cancels.
    Infinite,
}

/// A standing production request on a workstation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The recipe to run.
    pub recipe: String,
    /// How many runs are wanted.
    pub quantity: OrderQuantity,
    /// Completed runs.
    pub completed: u32,
    /// Whether a run is currently consuming inputs / in progress.
    pub in_progress: bool,
}

impl Order {
    /// Whether this order has produced everything it asked for.
    pub const fn is_done(&self) -> bool {
        match self.quantity {
            OrderQuantity::Single => self.completed >= 1,
            OrderQuantity::Target(target) => self.completed >= target,
            OrderQuantity::Infinite => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Workstations
// ---------------------------------------------------------------------------

/// Runtime state of one workstation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workstation {
    /// The station's building kind.
    pub kind: BuildingKind,
    /// Reserved by a crafting-fetch in flight.
    pub reserved: bool,
    /// Inputs consumed, work underway.
    pub working: bool,
    /// Work ticks accumulated toward the current run.
    pub progress: u32,
    /// Fetched inputs awaiting consumption.
    pub inputs: BTreeMap<ResourceKind, u32>,
    /// Standing orders, first non-done order is current.
    pub orders: Vec<Order>,
    /// Selected recipe for single-recipe stations with a choice.
    pub selected_recipe: Option<String>,
    /// Resources with a fetch job already in flight.
    pub pending_fetch: BTreeSet<ResourceKind>,
}

impl Workstation {
    /// A fresh, idle station of the given kind.
    pub const fn new(kind: BuildingKind) -> Self {
        Self {
            kind,
            reserved: false,
            working: false,
            progress: 0,
            inputs: BTreeMap::new(),
            orders: Vec::new(),
            selected_recipe: None,
            pending_fetch: BTreeSet::new(),
        }
    }

    /// Index of the current (first non-done) order.
    pub fn current_order_index(&self) -> Option<usize> {
        self.orders.iter().position(|order| !order.is_done())
    }

    /// The recipe the current order wants to run.
    pub fn current_recipe(&self) -> Option<Recipe> {
        let index = self.current_order_index()?;
        let order = self.orders.get(index)?;
        recipe(self.kind, &order.recipe)
    }

    /// Whether the input buffer satisfies the current recipe.
    pub fn has_inputs(&self) -> bool {
        let Some(recipe) = self.current_recipe() else {
            return false;
        };
        recipe
            .inputs
            .iter()
            .all(|(resource, &needed)| self.inputs.get(resource).copied().unwrap_or(0) >= needed)
    }

    /// Inputs still missing for the current recipe, per kind.
    pub fn missing_inputs(&self) -> BTreeMap<ResourceKind, u32> {
        let mut out = BTreeMap::new();
        let Some(recipe) = self.current_recipe() else {
            return out;
        };
        for (&resource, &needed) in &recipe.inputs {
            let have = self.inputs.get(&resource).copied().unwrap_or(0);
            let short = needed.saturating_sub(have);
            if short > 0 {
                out.insert(resource, short);
            }
        }
        out
    }

    /// Consume the current recipe's inputs from the buffer atomically.
    ///
    /// Returns `false` (buffer untouched) if anything is short.
    pub fn consume_inputs(&mut self) -> bool {
        let Some(recipe) = self.current_recipe() else {
            return false;
        };
        if !self.has_inputs() {
            return false;
        }
        for (resource, needed) in recipe.inputs {
            if let Some(have) = self.inputs.get_mut(&resource) {
                *have = have.saturating_sub(needed);
                if *have == 0 {
                    self.inputs.remove(&resource);
                }
            }
        }
        true
    }
}

/// Registry of all workstations, keyed by tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkstationRegistry {
    stations: BTreeMap<TilePos, Workstation>,
}

impl WorkstationRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            stations: BTreeMap::new(),
        }
    }

    /// Register a finished workstation at `pos`.
    pub fn register(&mut self, pos: TilePos, kind: BuildingKind) {
        self.stations.insert(pos, Workstation::new(kind));
    }

    /// Remove the workstation at `pos` (demolition).
    pub fn unregister(&mut self, pos: TilePos) -> Option<Workstation> {
        self.stations.remove(&pos)
    }

    /// The station at `pos`, if any.
    pub fn station(&self, pos: TilePos) -> Option<&Workstation> {
        self.stations.get(&pos)
    }

    /// Mutable access to the station at `pos`.
    pub fn station_mut(&mut self, pos: TilePos) -> Option<&mut Workstation> {
        self.stations.get_mut(&pos)
    }

    /// All stations (pump scan / host snapshot).
    pub const fn stations(&self) -> &BTreeMap<TilePos, Workstation> {
        &self.stations
    }

    /// Queue an order on the station at `pos`.
    ///
    /// # Errors
    ///
    /// [`WorldError::WorkstationNotFound`] if no station is there;
    /// [`WorldError::UnknownRecipe`] if the kind does not offer the recipe.
    pub fn add_order(
        &mut self,
        pos: TilePos,
        recipe_id: &str,
        quantity: OrderQuantity,
    ) -> Result<(), WorldError> {
        let station = self
            .stations
            .get_mut(&pos)
            .ok_or(WorldError::WorkstationNotFound(pos))?;
        if recipe(station.kind, recipe_id).is_none() {
            return Err(WorldError::UnknownRecipe {
                pos,
                recipe: recipe_id.to_owned(),
            });
        }
        station.orders.push(Order {
            recipe: recipe_id.to_owned(),
            quantity,
            completed: 0,
            in_progress: false,
        });
        Ok(())
    }

    /// Cancel the order at `index` on the station at `pos`.
    ///
    /// In-progress work is lost (progress resets), but already-fetched
    /// inputs stay in the buffer for the next order to consume.
    ///
    /// # Errors
    ///
    /// [`WorldError::WorkstationNotFound`] / [`WorldError::OrderOutOfRange`].
    pub fn cancel_order(&mut self, pos: TilePos, index: usize) -> Result<(), WorldError> {
        let station = self
            .stations
            .get_mut(&pos)
            .ok_or(WorldError::WorkstationNotFound(pos))?;
        if index >= station.orders.len() {
            return Err(WorldError::OrderOutOfRange { pos, index });
        }
        let order = station.orders.remove(index);
        if order.in_progress {
            station.working = false;
            station.progress = 0;
        }
        Ok(())
    }

    /// Select the active recipe for a station (multi-recipe convenience).
    ///
    /// # Errors
    ///
    /// [`WorldError::WorkstationNotFound`] / [`WorldError::UnknownRecipe`].
    pub fn set_selected_recipe(&mut self, pos: TilePos, recipe_id: &str) -> Result<(), WorldError> {
        let station = self
            .stations
            .get_mut(&pos)
            .ok_or(WorldError::WorkstationNotFound(pos))?;
        if recipe(station.kind, recipe_id).is_none() {
            return Err(WorldError::UnknownRecipe {
                pos,
                recipe: recipe_id.to_owned(),
            });
        }
        station.selected_recipe = Some(recipe_id.to_owned());
        Ok(())
    }

    /// Deposit a fetched input into the station buffer at `pos`.
    ///
    /// Returns `true` if a station absorbed it.
    pub fn add_input(&mut self, pos: TilePos, resource: ResourceKind, amount: u32) -> bool {
        let Some(station) = self.stations.get_mut(&pos) else {
            return false;
        };
        let entry = station.inputs.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
        station.pending_fetch.remove(&resource);
        true
    }
}
