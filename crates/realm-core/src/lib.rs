#![deny(warnings)]

//! Core domain models and invariants for Realm Architect.
//!
//! This crate defines the serializable game state, the static rule tables
//! the simulation reads, and validation helpers that guarantee those tables
//! are internally consistent before a game starts.

mod event;
mod rules;
mod validate;

pub use event::{EffectContext, EffectOutcome, EventEffect, GameEvent, ResourceDelta};
pub use rules::{FlatBonus, GiftTuning, HazardTuning, Ruleset, Tuning};
pub use validate::{validate_ruleset, validate_state, validate_tuning, ValidationError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kinds of tracked resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Construction timber.
    Wood,
    /// Quarried stone.
    Stone,
    /// Eaten by citizens every turn.
    Food,
    /// Pays building upkeep; at zero the realm enters work stoppage.
    Gold,
    /// Citizens. Both a resource and the multiplier on food consumption.
    Population,
}

impl Resource {
    /// Resources that can be spent, produced, or granted as rewards.
    pub const MATERIALS: [Resource; 4] = [
        Resource::Wood,
        Resource::Stone,
        Resource::Food,
        Resource::Gold,
    ];

    /// Every tracked resource, in display order.
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Stone,
        Resource::Food,
        Resource::Gold,
        Resource::Population,
    ];

    /// Lowercase identifier used in catalogs and event text.
    pub fn key(self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Food => "food",
            Resource::Gold => "gold",
            Resource::Population => "population",
        }
    }

    /// Human-readable display name.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Wood => "Wood",
            Resource::Stone => "Stone",
            Resource::Food => "Food",
            Resource::Gold => "Gold",
            Resource::Population => "Population",
        }
    }

    /// False only for population.
    pub fn is_material(self) -> bool {
        self != Resource::Population
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Partial map of resource amounts (costs, upkeep, production, rewards).
pub type ResourceAmounts = BTreeMap<Resource, u64>;

/// Current stock of every resource. Fields are unsigned, so the
/// non-negativity invariant holds by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub wood: u64,
    pub stone: u64,
    pub food: u64,
    pub gold: u64,
    pub population: u64,
}

impl ResourceSet {
    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Food => self.food,
            Resource::Gold => self.gold,
            Resource::Population => self.population,
        }
    }

    pub fn get_mut(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Stone => &mut self.stone,
            Resource::Food => &mut self.food,
            Resource::Gold => &mut self.gold,
            Resource::Population => &mut self.population,
        }
    }

    /// True when every component of `cost` is fully covered.
    pub fn can_afford(&self, cost: &ResourceAmounts) -> bool {
        cost.iter().all(|(&r, &amount)| self.get(r) >= amount)
    }

    /// Add every component of `amounts`, saturating at `u64::MAX`.
    pub fn add(&mut self, amounts: &ResourceAmounts) {
        for (&r, &amount) in amounts {
            let slot = self.get_mut(r);
            *slot = slot.saturating_add(amount);
        }
    }

    /// Subtract every component of `amounts`, clamping each at zero.
    pub fn sub_clamped(&mut self, amounts: &ResourceAmounts) {
        for (&r, &amount) in amounts {
            let slot = self.get_mut(r);
            *slot = slot.saturating_sub(amount);
        }
    }
}

/// Catalog entry describing a constructible building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingType {
    /// Catalog key, e.g. "hut".
    pub id: String,
    /// Display name, e.g. "Hut".
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// One-time construction cost.
    #[serde(default)]
    pub cost: ResourceAmounts,
    /// Charged every turn.
    #[serde(default)]
    pub upkeep: ResourceAmounts,
    /// Yielded every turn unless halted by work stoppage.
    #[serde(default)]
    pub production: ResourceAmounts,
    /// Housing units contributed to population capacity.
    #[serde(default)]
    pub population_capacity: u64,
}

impl BuildingType {
    /// Whether operating this building costs gold each turn.
    pub fn needs_gold(&self) -> bool {
        self.upkeep.get(&Resource::Gold).is_some_and(|&g| g > 0)
    }
}

/// A building instance on the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedStructure {
    /// Unique within a game session.
    pub id: String,
    /// Key into the building catalog.
    pub type_id: String,
}

/// Progress of a quest for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerQuest {
    pub quest_id: String,
    pub status: QuestStatus,
}

/// A single condition of a quest, with the text shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestCriterion {
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: CriterionKind,
}

/// What a quest criterion measures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriterionKind {
    /// At least `target_count` structures of `building_id` are placed.
    Build {
        building_id: String,
        target_count: usize,
    },
    /// A material resource reached `target_amount`.
    ResourceReach {
        resource: Resource,
        target_amount: u64,
    },
    /// Population reached `target_amount`.
    PopulationReach { target_amount: u64 },
    /// The turn counter reached `target_turn`.
    TurnReach { target_turn: u32 },
    /// At least `target_amount` structures of any type are placed.
    StructureCountReach { target_amount: usize },
    /// A criterion type this build does not know. Never satisfied.
    #[serde(other)]
    Unrecognized,
}

/// One-time reward granted when a quest completes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestReward {
    #[serde(default)]
    pub resources: ResourceAmounts,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub criteria: Vec<QuestCriterion>,
    #[serde(default)]
    pub reward: QuestReward,
    /// Presentation only: achievements are announced differently.
    #[serde(default)]
    pub is_achievement: bool,
}

/// Aggregate root of a game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub resources: ResourceSet,
    /// Insertion order; only meaningful for display.
    pub structures: Vec<PlacedStructure>,
    /// Starts at 1.
    pub current_turn: u32,
    /// Messages produced by the last action, joined with " | ".
    pub current_event: Option<String>,
    /// Terminal flag. Once set, no operation mutates the state again.
    pub is_game_over: bool,
    pub player_quests: Vec<PlayerQuest>,
    /// UI selection state, carried through untouched except on placement.
    pub selected_building_for_construction: Option<String>,
}

impl GameState {
    /// Number of placed structures of the given building type.
    pub fn count_of(&self, type_id: &str) -> usize {
        self.structures.iter().filter(|s| s.type_id == type_id).count()
    }

    /// Append a message to `current_event`, keeping earlier text.
    pub fn push_event(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.current_event = Some(match self.current_event.take() {
            Some(prev) if !prev.is_empty() => format!("{prev} | {message}"),
            _ => message,
        });
    }
}
