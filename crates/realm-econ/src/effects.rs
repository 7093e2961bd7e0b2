//! Named event effects referenced from the event catalog.
//!
//! Each effect reads a snapshot of the realm and returns the change it wants
//! applied. Buildings can soften or amplify an effect: farms enlarge a good
//! harvest, a warehouse protects stores, barracks turn raiders away.

use rand::{Rng, RngCore};
use realm_core::{EffectContext, EffectOutcome, EventEffect, Resource};

const FARM: &str = "farm";
const LOGGING_CAMP: &str = "loggingCamp";
const LUMBER_MILL: &str = "lumberMill";
const GOLD_MINE: &str = "goldMine";
const MARKET: &str = "market";
const WAREHOUSE: &str = "warehouse";
const BARRACKS: &str = "barracks";

/// Every effect by catalog name.
pub const REGISTRY: &[(&str, EventEffect)] = &[
    ("bountiful_harvest", bountiful_harvest),
    ("mineral_vein", mineral_vein),
    ("improved_logging", improved_logging),
    ("new_family", new_family),
    ("sickness", sickness),
    ("tax_shortfall", tax_shortfall),
    ("small_fire", small_fire),
    ("rats_in_granary", rats_in_granary),
    ("bandit_raid", bandit_raid),
    ("trade_caravan", trade_caravan),
    ("ancient_ruins", ancient_ruins),
    ("abundant_wildlife", abundant_wildlife),
    ("worker_unrest", worker_unrest),
];

/// Resolve an effect by its catalog name.
pub fn lookup(name: &str) -> Option<EventEffect> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, effect)| effect)
}

fn signed(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn count(ctx: &EffectContext<'_>, type_id: &str) -> u64 {
    ctx.count_of(type_id) as u64
}

pub fn bountiful_harvest(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let gain = 5 + 3 * count(ctx, FARM);
    EffectOutcome::default()
        .with(Resource::Food, signed(gain))
        .message(format!("The granaries fill with {gain} extra food."))
}

pub fn mineral_vein(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let mines = count(ctx, GOLD_MINE);
    let out = EffectOutcome::default().with(Resource::Stone, 10);
    if mines == 0 {
        return out.message("Quarrymen haul in 10 stone from the new vein.");
    }
    let gold = 3 * mines;
    out.with(Resource::Gold, signed(gold))
        .message(format!("The vein yields 10 stone, and your mines extract {gold} gold."))
}

pub fn improved_logging(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let gain = 2 + 2 * count(ctx, LOGGING_CAMP) + count(ctx, LUMBER_MILL);
    EffectOutcome::default()
        .with(Resource::Wood, signed(gain))
        .message(format!("Woodcutters bring in {gain} extra wood."))
}

pub fn new_family(_ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    EffectOutcome::default().with(Resource::Population, 2)
}

pub fn sickness(ctx: &EffectContext<'_>, rng: &mut dyn RngCore) -> EffectOutcome {
    let lost = rng.gen_range(1..=2u64).min(ctx.resources.population);
    if lost == 0 {
        return EffectOutcome::default();
    }
    EffectOutcome::default()
        .with(Resource::Population, -signed(lost))
        .message(format!("{lost} citizen(s) succumbed to the sickness."))
}

pub fn tax_shortfall(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let lost = ctx.resources.gold / 10;
    if lost == 0 {
        return EffectOutcome::default().message("There was little gold to lose.");
    }
    EffectOutcome::default()
        .with(Resource::Gold, -signed(lost))
        .message(format!("The treasury came up {lost} gold short."))
}

pub fn small_fire(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let mut lost = ctx.resources.wood / 10;
    let protected = count(ctx, WAREHOUSE) > 0;
    if protected {
        lost /= 2;
    }
    let out = EffectOutcome::default().with(Resource::Wood, -signed(lost));
    if protected {
        out.message(format!(
            "Timber stored in the warehouse was spared; only {lost} wood burned."
        ))
    } else {
        out.message(format!("The fire consumed {lost} wood."))
    }
}

pub fn rats_in_granary(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    if count(ctx, WAREHOUSE) > 0 {
        return EffectOutcome::default().message("Sealed warehouses kept the rats away from the food.");
    }
    let lost = ctx.resources.food.saturating_mul(15) / 100;
    EffectOutcome::default()
        .with(Resource::Food, -signed(lost))
        .message(format!("Rats spoiled {lost} food."))
}

pub fn bandit_raid(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    if count(ctx, BARRACKS) > 0 {
        return EffectOutcome::default().message("Soldiers from the barracks drove the bandits off.");
    }
    let demand = 5 + u64::from(ctx.current_turn / 2);
    let lost = demand.min(ctx.resources.gold);
    EffectOutcome::default()
        .with(Resource::Gold, -signed(lost))
        .message(format!("Bandits made off with {lost} gold."))
}

pub fn trade_caravan(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    let gain = 3 + 2 * count(ctx, MARKET);
    EffectOutcome::default()
        .with(Resource::Gold, signed(gain))
        .message(format!("Merchants paid {gain} gold in tolls."))
}

pub fn ancient_ruins(_ctx: &EffectContext<'_>, rng: &mut dyn RngCore) -> EffectOutcome {
    let gain = rng.gen_range(5..=15u64);
    EffectOutcome::default()
        .with(Resource::Gold, signed(gain))
        .message(format!("Scouts recovered {gain} gold from the ruins."))
}

pub fn abundant_wildlife(_ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    EffectOutcome::default()
        .with(Resource::Food, 3)
        .message("Hunters return with 3 food.")
}

pub fn worker_unrest(ctx: &EffectContext<'_>, _rng: &mut dyn RngCore) -> EffectOutcome {
    if ctx.resources.gold >= 10 {
        return EffectOutcome::default().message("The grumbling fades as wages are paid.");
    }
    EffectOutcome::default()
        .with(Resource::Wood, -2)
        .with(Resource::Stone, -2)
        .message("Idle workers cost you 2 wood and 2 stone.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use realm_core::{PlacedStructure, ResourceSet};

    fn placed(types: &[&str]) -> Vec<PlacedStructure> {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| PlacedStructure {
                id: format!("s{i}"),
                type_id: t.to_string(),
            })
            .collect()
    }

    fn res() -> ResourceSet {
        ResourceSet {
            wood: 100,
            stone: 100,
            food: 60,
            gold: 40,
            population: 5,
        }
    }

    fn run(effect: EventEffect, resources: &ResourceSet, types: &[&str]) -> EffectOutcome {
        let structures = placed(types);
        let ctx = EffectContext {
            resources,
            structures: &structures,
            current_turn: 4,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        effect(&ctx, &mut rng)
    }

    #[test]
    fn every_registered_name_resolves() {
        for (name, _) in REGISTRY {
            assert!(lookup(name).is_some(), "{name}");
        }
        assert!(lookup("dragon_attack").is_none());
    }

    #[test]
    fn harvest_scales_with_farms() {
        let out = run(bountiful_harvest, &res(), &["farm", "farm"]);
        assert_eq!(out.resource_delta.get(&Resource::Food), Some(&11));
    }

    #[test]
    fn warehouse_halves_fire_and_stops_rats() {
        let r = res();
        let open = run(small_fire, &r, &[]);
        let guarded = run(small_fire, &r, &["warehouse"]);
        assert_eq!(open.resource_delta.get(&Resource::Wood), Some(&-10));
        assert_eq!(guarded.resource_delta.get(&Resource::Wood), Some(&-5));
        assert!(run(rats_in_granary, &r, &["warehouse"])
            .resource_delta
            .is_empty());
        assert_eq!(
            run(rats_in_granary, &r, &[]).resource_delta.get(&Resource::Food),
            Some(&-9)
        );
    }

    #[test]
    fn rats_on_a_huge_granary_do_not_overflow() {
        let r = ResourceSet {
            food: u64::MAX,
            ..res()
        };
        let out = run(rats_in_granary, &r, &[]);
        let lost = out.resource_delta[&Resource::Food];
        assert!(lost < 0);
        assert_eq!(lost.unsigned_abs(), u64::MAX / 100);
    }

    #[test]
    fn barracks_repel_bandits() {
        let r = res();
        assert!(run(bandit_raid, &r, &["barracks"]).resource_delta.is_empty());
        assert_eq!(
            run(bandit_raid, &r, &[]).resource_delta.get(&Resource::Gold),
            Some(&-7)
        );
        let poor = ResourceSet { gold: 3, ..r };
        assert_eq!(
            run(bandit_raid, &poor, &[]).resource_delta.get(&Resource::Gold),
            Some(&-3)
        );
    }

    #[test]
    fn sickness_never_exceeds_population() {
        let r = ResourceSet {
            population: 1,
            ..res()
        };
        let out = run(sickness, &r, &[]);
        assert_eq!(out.resource_delta.get(&Resource::Population), Some(&-1));
    }

    #[test]
    fn ruins_gold_in_range() {
        let out = run(ancient_ruins, &res(), &[]);
        let gold = out.resource_delta[&Resource::Gold];
        assert!((5..=15).contains(&gold));
    }

    #[test]
    fn effects_do_not_touch_input() {
        let r = res();
        let before = r;
        for (_, effect) in REGISTRY {
            let _ = run(*effect, &r, &["farm", "market"]);
        }
        assert_eq!(r, before);
    }
}
