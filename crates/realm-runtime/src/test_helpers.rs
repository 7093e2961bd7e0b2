//! Shared fixtures for runtime tests.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use realm_core::{GameEvent, GameState, PlacedStructure, ResourceSet, Ruleset};

pub(crate) const QUIET: &str = "A quiet turn passes.";

/// The shipped rules.
pub(crate) fn rules() -> Ruleset {
    realm_data::builtin().expect("builtin rules must load")
}

/// Shipped rules without chance: one effect-free event, no ambush, no gifts.
pub(crate) fn quiet_rules() -> Ruleset {
    let mut r = rules();
    r.events = vec![GameEvent::flavor(QUIET)];
    r.tuning.hazard.chance = 0.0;
    r.tuning.gift.every_turns = 0;
    r
}

pub(crate) fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub(crate) fn resources(wood: u64, stone: u64, food: u64, gold: u64, population: u64) -> ResourceSet {
    ResourceSet {
        wood,
        stone,
        food,
        gold,
        population,
    }
}

/// A running game with the given resources and structures.
pub(crate) fn state_with(res: ResourceSet, types: &[&str]) -> GameState {
    let mut g = crate::init_game(&rules());
    g.resources = res;
    g.structures = types
        .iter()
        .enumerate()
        .map(|(i, t)| PlacedStructure {
            id: format!("s{i}"),
            type_id: t.to_string(),
        })
        .collect();
    g
}
