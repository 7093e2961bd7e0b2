#![deny(warnings)]

//! Economic models: housing, upkeep, food and refund arithmetic for Realm Architect.
//!
//! This crate provides pure helpers for:
//! - Population capacity from base housing plus buildings
//! - Per-turn upkeep and production totals, including work stoppage
//! - Food consumption and starvation losses
//! - Demolition refunds
//!
//! Event effect functions live in [`effects`].

pub mod effects;

use realm_core::{PlacedStructure, ResourceAmounts, Ruleset};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

/// Maximum sustainable population: base capacity plus the housing of every
/// placed structure. Always recomputed from the list it is given.
///
/// Example:
/// let cap = max_population_capacity(&[], &rules);
/// assert_eq!(cap, rules.tuning.base_population_capacity);
pub fn max_population_capacity(structures: &[PlacedStructure], rules: &Ruleset) -> u64 {
    structures
        .iter()
        .filter_map(|s| rules.building(&s.type_id))
        .fold(rules.tuning.base_population_capacity, |acc, b| {
            acc.saturating_add(b.population_capacity)
        })
}

/// Food needed to feed `population` for one turn, rounded up.
///
/// Example:
/// assert_eq!(food_required(5, Decimal::new(5, 1)), 3);
pub fn food_required(population: u64, per_person: Decimal) -> u64 {
    let total = (Decimal::from(population) * per_person).ceil();
    total.to_u64().unwrap_or(u64::MAX)
}

/// Citizens lost to a food deficit: at least one, one per `divisor` units
/// of deficit (rounded up), never more than the population.
///
/// Example:
/// assert_eq!(starvation_losses(4, 5, 2), 2);
pub fn starvation_losses(deficit: u64, population: u64, divisor: u64) -> u64 {
    deficit
        .div_ceil(divisor.max(1))
        .max(1)
        .min(population)
}

/// Resources returned when demolishing a building: each cost component
/// times `fraction`, floored. Components that floor to zero are omitted.
pub fn refund_for(cost: &ResourceAmounts, fraction: Decimal) -> ResourceAmounts {
    cost.iter()
        .filter_map(|(&r, &amount)| {
            let back = (Decimal::from(amount) * fraction).floor().to_u64()?;
            (back > 0).then_some((r, back.min(amount)))
        })
        .collect()
}

/// Upkeep and production totals for one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLedger {
    /// Charged regardless of work stoppage.
    pub upkeep: ResourceAmounts,
    /// Includes the knowledge bonus when it applies.
    pub production: ResourceAmounts,
    /// Names of building types that produced nothing for lack of gold,
    /// in order of first occurrence, without repeats.
    pub halted: Vec<String>,
    /// Number of bonus buildings whose flat bonus was applied (0 if none).
    pub bonus_buildings: usize,
}

fn accumulate(total: &mut ResourceAmounts, amounts: &ResourceAmounts, times: u64) {
    for (&r, &amount) in amounts {
        let slot = total.entry(r).or_insert(0);
        *slot = slot.saturating_add(amount.saturating_mul(times));
    }
}

/// Sum upkeep and production over all structures.
///
/// During work stoppage, buildings whose upkeep includes gold produce
/// nothing and the knowledge bonus is withheld. Structures of unknown
/// types are skipped.
pub fn tally_structures(
    structures: &[PlacedStructure],
    rules: &Ruleset,
    work_stoppage: bool,
) -> TurnLedger {
    let mut ledger = TurnLedger::default();
    for s in structures {
        let Some(b) = rules.building(&s.type_id) else {
            warn!(structure = %s.id, type_id = %s.type_id, "unknown building type; skipping");
            continue;
        };
        accumulate(&mut ledger.upkeep, &b.upkeep, 1);
        if work_stoppage && b.needs_gold() {
            if !ledger.halted.contains(&b.name) {
                ledger.halted.push(b.name.clone());
            }
            continue;
        }
        accumulate(&mut ledger.production, &b.production, 1);
    }

    if let Some(bonus) = &rules.tuning.knowledge_bonus {
        let count = structures
            .iter()
            .filter(|s| s.type_id == bonus.building_id)
            .count();
        if !work_stoppage && count > 0 {
            accumulate(&mut ledger.production, &bonus.per_building, count as u64);
            ledger.bonus_buildings = count;
        }
    }
    ledger
}

/// Apply `delta` to a stock value, clamping the result at zero.
pub fn apply_signed(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use realm_core::{BuildingType, FlatBonus, Resource, ResourceSet, Tuning};
    use std::collections::BTreeMap;

    fn amounts(pairs: &[(Resource, u64)]) -> ResourceAmounts {
        pairs.iter().copied().collect()
    }

    fn building(
        id: &str,
        upkeep: &[(Resource, u64)],
        production: &[(Resource, u64)],
        housing: u64,
    ) -> BuildingType {
        BuildingType {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            cost: amounts(&[(Resource::Wood, 50), (Resource::Stone, 21)]),
            upkeep: amounts(upkeep),
            production: amounts(production),
            population_capacity: housing,
        }
    }

    fn rules() -> Ruleset {
        let mut buildings = BTreeMap::new();
        for b in [
            building("hut", &[(Resource::Food, 1)], &[], 5),
            building("farm", &[(Resource::Gold, 1)], &[(Resource::Food, 5)], 0),
            building("camp", &[(Resource::Food, 1)], &[(Resource::Wood, 3)], 0),
            building("library", &[(Resource::Gold, 5)], &[], 0),
        ] {
            buildings.insert(b.id.clone(), b);
        }
        Ruleset {
            buildings,
            quests: vec![],
            events: vec![],
            tuning: Tuning::default(),
            initial_resources: ResourceSet::default(),
        }
    }

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

    #[test]
    fn capacity_sums_housing() {
        let r = rules();
        assert_eq!(max_population_capacity(&[], &r), 10);
        assert_eq!(max_population_capacity(&placed(&["hut", "hut", "farm"]), &r), 20);
        // unknown types contribute nothing
        assert_eq!(max_population_capacity(&placed(&["castle"]), &r), 10);
    }

    #[test]
    fn food_rounds_up() {
        let half = Decimal::new(5, 1);
        assert_eq!(food_required(0, half), 0);
        assert_eq!(food_required(1, half), 1);
        assert_eq!(food_required(5, half), 3);
        assert_eq!(food_required(6, half), 3);
    }

    #[test]
    fn starvation_scenarios() {
        assert_eq!(starvation_losses(4, 5, 2), 2);
        assert_eq!(starvation_losses(1, 5, 2), 1);
        assert_eq!(starvation_losses(100, 3, 2), 3);
    }

    #[test]
    fn refund_floors_and_omits_zero() {
        let cost = amounts(&[(Resource::Wood, 50), (Resource::Stone, 21), (Resource::Gold, 1)]);
        let back = refund_for(&cost, Decimal::new(5, 1));
        assert_eq!(back, amounts(&[(Resource::Wood, 25), (Resource::Stone, 10)]));
    }

    #[test]
    fn stoppage_halts_gold_buildings_once_per_type() {
        let r = rules();
        let s = placed(&["farm", "farm", "camp", "library"]);
        let ledger = tally_structures(&s, &r, true);
        assert_eq!(ledger.upkeep, amounts(&[(Resource::Gold, 7), (Resource::Food, 1)]));
        assert_eq!(ledger.production, amounts(&[(Resource::Wood, 3)]));
        assert_eq!(ledger.halted, vec!["FARM".to_string(), "LIBRARY".to_string()]);
        assert_eq!(ledger.bonus_buildings, 0);
    }

    #[test]
    fn knowledge_bonus_scales_with_count() {
        let mut r = rules();
        r.tuning.knowledge_bonus = Some(FlatBonus {
            building_id: "library".into(),
            per_building: amounts(&[(Resource::Wood, 1), (Resource::Food, 1)]),
        });
        let ledger = tally_structures(&placed(&["library", "library", "farm"]), &r, false);
        assert_eq!(ledger.bonus_buildings, 2);
        assert_eq!(ledger.production, amounts(&[(Resource::Wood, 2), (Resource::Food, 7)]));
        assert!(ledger.halted.is_empty());
    }

    #[test]
    fn signed_application_clamps() {
        assert_eq!(apply_signed(5, -10), 0);
        assert_eq!(apply_signed(5, 3), 8);
    }

    proptest! {
        #[test]
        fn refund_never_exceeds_cost(wood in 0u64..10_000, gold in 0u64..10_000, pct in 0i64..=100) {
            let cost = amounts(&[(Resource::Wood, wood), (Resource::Gold, gold)]);
            let frac = Decimal::new(pct, 2);
            let back = refund_for(&cost, frac);
            for (r, v) in &back {
                prop_assert!(*v <= cost[r]);
                prop_assert_eq!(*v, (Decimal::from(cost[r]) * frac).floor().to_u64().unwrap());
            }
        }

        #[test]
        fn losses_bounded(deficit in 1u64..1_000, pop in 0u64..100, div in 1u64..10) {
            let lost = starvation_losses(deficit, pop, div);
            prop_assert!(lost <= pop);
            if pop > 0 {
                prop_assert!(lost >= 1);
            }
        }

        #[test]
        fn capacity_monotonic_in_huts(n in 0usize..50) {
            let r = rules();
            let huts: Vec<&str> = std::iter::repeat("hut").take(n).collect();
            prop_assert_eq!(max_population_capacity(&placed(&huts), &r), 10 + 5 * n as u64);
        }
    }
}
