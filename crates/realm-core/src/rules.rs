//! Static rule tables: catalogs plus the tunable constants of the economy.

use crate::{BuildingType, GameEvent, QuestDefinition, Resource, ResourceAmounts, ResourceSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Low-probability ambush that kills a few citizens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Chance per turn in [0, 1].
    pub chance: f64,
    pub min_losses: u64,
    pub max_losses: u64,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            chance: 0.02,
            min_losses: 1,
            max_losses: 3,
        }
    }
}

/// Periodic gift of a random material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftTuning {
    /// Gift arrives on turns divisible by this. Zero disables gifts.
    pub every_turns: u32,
    pub min_amount: u64,
    pub max_amount: u64,
}

impl Default for GiftTuning {
    fn default() -> Self {
        Self {
            every_turns: 10,
            min_amount: 1,
            max_amount: 10,
        }
    }
}

/// Flat production bonus per building of a type, active outside work stoppage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBonus {
    pub building_id: String,
    pub per_building: ResourceAmounts,
}

/// Tunable constants. Defaults are the reference balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Housing available with no buildings at all.
    pub base_population_capacity: u64,
    /// Food eaten per citizen per turn; the turn total is rounded up.
    pub food_per_person: Decimal,
    /// Food deficit per citizen lost to starvation (rounded up).
    pub starvation_divisor: u64,
    /// Share of the construction cost returned on demolition (floored).
    pub refund_fraction: Decimal,
    pub hazard: HazardTuning,
    pub gift: GiftTuning,
    pub knowledge_bonus: Option<FlatBonus>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_population_capacity: 10,
            food_per_person: Decimal::new(5, 1),
            starvation_divisor: 2,
            refund_fraction: Decimal::new(5, 1),
            hazard: HazardTuning::default(),
            gift: GiftTuning::default(),
            knowledge_bonus: Some(FlatBonus {
                building_id: "library".to_string(),
                per_building: [
                    (Resource::Wood, 1),
                    (Resource::Stone, 1),
                    (Resource::Food, 1),
                ]
                .into_iter()
                .collect(),
            }),
        }
    }
}

/// Everything the simulation reads but never mutates.
#[derive(Clone, Debug)]
pub struct Ruleset {
    pub buildings: BTreeMap<String, BuildingType>,
    /// Catalog order is the order quests are evaluated and announced.
    pub quests: Vec<QuestDefinition>,
    pub events: Vec<GameEvent>,
    pub tuning: Tuning,
    pub initial_resources: ResourceSet,
}

impl Ruleset {
    pub fn building(&self, id: &str) -> Option<&BuildingType> {
        self.buildings.get(id)
    }

    pub fn quest(&self, id: &str) -> Option<&QuestDefinition> {
        self.quests.iter().find(|q| q.id == id)
    }
}
