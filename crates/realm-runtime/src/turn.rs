//! The turn engine: one call advances the realm by a single turn.

use rand::seq::SliceRandom;
use rand::Rng;
use realm_core::{EffectContext, GameState, Resource, ResourceDelta, ResourceSet, Ruleset};
use realm_econ::{
    apply_signed, food_required, max_population_capacity, starvation_losses, tally_structures,
};
use tracing::{debug, info};

/// Messages collected during an action, joined into `current_event`.
#[derive(Debug, Default)]
struct EventLog {
    messages: Vec<String>,
}

impl EventLog {
    fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn finish(self, mut state: GameState) -> GameState {
        let joined = self
            .messages
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        state.current_event = (!joined.is_empty()).then_some(joined);
        state
    }
}

fn fall(mut state: GameState, mut log: EventLog, closing: &str) -> GameState {
    state.is_game_over = true;
    info!(turn = state.current_turn, "realm has fallen");
    log.push(closing);
    log.finish(state)
}

/// Apply an event's delta. Population growth stops at capacity; every
/// value is clamped at zero.
fn apply_event_delta(
    res: &mut ResourceSet,
    delta: &ResourceDelta,
    capacity: u64,
    log: &mut EventLog,
) {
    for (&r, &d) in delta {
        if r == Resource::Population && d > 0 {
            let wanted = res.population.saturating_add(d.unsigned_abs());
            if wanted > capacity {
                res.population = capacity.max(res.population);
                log.push("Some newcomers found no free housing and moved on.");
            } else {
                res.population = wanted;
            }
        } else {
            *res.get_mut(r) = apply_signed(res.get(r), d);
        }
    }
}

fn knowledge_message(rules: &Ruleset, count: usize) -> Option<String> {
    let bonus = rules.tuning.knowledge_bonus.as_ref()?;
    let name = rules
        .building(&bonus.building_id)
        .map_or(bonus.building_id.as_str(), |b| b.name.as_str());
    let gains = bonus
        .per_building
        .iter()
        .map(|(r, v)| format!("{} {r}", v.saturating_mul(count as u64)))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "Knowledge from {count} {name}(s) added {gains} to this turn's output."
    ))
}

/// Advance the realm by one turn.
///
/// Phases run in a fixed order: immigration, upkeep and production, food
/// consumption, starvation, overcrowding, depopulation check, ambush,
/// random catalog event, periodic gift. Once the realm falls no later
/// phase runs. A fallen realm is returned unchanged.
pub fn advance_turn<R: Rng>(state: &GameState, rules: &Ruleset, rng: &mut R) -> GameState {
    if state.is_game_over {
        return state.clone();
    }
    let tuning = &rules.tuning;
    let mut next = state.clone();
    next.current_turn = next.current_turn.saturating_add(1);
    let turn = next.current_turn;
    let mut log = EventLog::default();
    let mut res = next.resources;

    // Immigration: at most one settler, and only if they can be fed.
    let capacity = max_population_capacity(&next.structures, rules);
    if res.population < capacity {
        let needed = food_required(res.population + 1, tuning.food_per_person);
        if res.food >= needed {
            res.population += 1;
            log.push("A new settler has arrived, drawn by the promise of shelter and food.");
        } else if res.food < food_required(res.population, tuning.food_per_person) {
            log.push("Settlers were deterred by the lack of food in your realm.");
        } else {
            log.push(
                "A traveler considered settling, but there is not quite enough food to sustain another citizen.",
            );
        }
    }
    debug!(turn, capacity, population = res.population, "immigration");

    // Work stoppage is decided before this turn's upkeep is charged.
    let work_stoppage = res.gold == 0;
    let ledger = tally_structures(&next.structures, rules, work_stoppage);
    for name in &ledger.halted {
        log.push(format!(
            "{name} ceased production due to lack of gold for upkeep."
        ));
    }
    if ledger.bonus_buildings > 0 {
        if let Some(text) = knowledge_message(rules, ledger.bonus_buildings) {
            log.push(text);
        }
    }
    res.sub_clamped(&ledger.upkeep);
    res.add(&ledger.production);
    debug!(turn, work_stoppage, upkeep = ?ledger.upkeep, production = ?ledger.production, "ledger applied");

    let consumed = food_required(res.population, tuning.food_per_person);
    let mut starved = false;
    if consumed > res.food {
        let deficit = consumed - res.food;
        let lost = starvation_losses(deficit, res.population, tuning.starvation_divisor);
        res.food = 0;
        if lost > 0 {
            res.population -= lost;
            log.push(format!("{lost} citizen(s) perished from starvation!"));
            starved = true;
        }
    } else {
        res.food -= consumed;
        if res.food == 0 && res.population > 0 && consumed > 0 {
            res.population -= 1;
            log.push("1 citizen starved due to critical food shortage!");
            starved = true;
        }
    }
    debug!(turn, consumed, food = res.food, population = res.population, "fed");

    // Overcrowding: population may have shrunk above, so recompute.
    let capacity = max_population_capacity(&next.structures, rules);
    let mut evicted = false;
    if res.population > capacity {
        let homeless = res.population - capacity;
        res.population = capacity;
        log.push(format!(
            "{homeless} citizen(s) left the realm, finding no housing."
        ));
        evicted = true;
    }
    next.resources = res;

    if next.resources.population == 0 {
        let closing = if starved {
            "The last of your people have perished from hunger. Your realm has fallen into ruin."
        } else if evicted {
            "With no homes left to shelter them, the last of your people have departed. The realm stands empty."
        } else {
            "Your realm has fallen due to depopulation."
        };
        return fall(next, log, closing);
    }

    if work_stoppage && ledger.halted.is_empty() {
        log.push(
            "The realm's coffers are empty! Workers are unpaid, and overall production is affected.",
        );
    }

    let hazard = &tuning.hazard;
    if hazard.chance > 0.0 && rng.gen_bool(hazard.chance.min(1.0)) {
        let max = hazard.max_losses.max(hazard.min_losses);
        let lost = rng
            .gen_range(hazard.min_losses..=max)
            .min(next.resources.population);
        next.resources.population -= lost;
        log.push(format!(
            "Bandits ambushed travelers on the road! {lost} citizen(s) were lost."
        ));
        if next.resources.population == 0 {
            return fall(
                next,
                log,
                "The ambush claimed the last of your people. The realm is lost.",
            );
        }
    }

    if let Some(event) = rules.events.choose(rng) {
        log.push(event.message.clone());
        if let Some(effect) = event.effect {
            let outcome = {
                let ctx = EffectContext {
                    resources: &next.resources,
                    structures: &next.structures,
                    current_turn: turn,
                };
                effect(&ctx, rng)
            };
            apply_event_delta(
                &mut next.resources,
                &outcome.resource_delta,
                capacity,
                &mut log,
            );
            if let Some(extra) = outcome.additional_message {
                log.push(extra);
            }
            debug!(turn, delta = ?outcome.resource_delta, "event applied");
            if next.resources.population == 0 {
                return fall(
                    next,
                    log,
                    "A sudden calamity has wiped out your remaining population! The realm is lost.",
                );
            }
        }
    }

    let gift = &tuning.gift;
    if gift.every_turns > 0 && turn % gift.every_turns == 0 {
        if let Some(&resource) = Resource::MATERIALS.choose(rng) {
            let max = gift.max_amount.max(gift.min_amount);
            let amount = rng.gen_range(gift.min_amount..=max);
            let slot = next.resources.get_mut(resource);
            *slot = slot.saturating_add(amount);
            log.push(format!(
                "A passing caravan left a gift of {amount} {resource}."
            ));
        }
    }

    log.finish(next)
}
