//! Placing and demolishing structures.

use crate::ActionError;
use chrono::Utc;
use realm_core::{GameState, PlacedStructure, Resource, ResourceAmounts, Ruleset};
use realm_econ::{max_population_capacity, refund_for};
use tracing::{debug, info, warn};

/// Fresh structure id: `struct_<millis>_<random hex>`. The suffix does not
/// depend on the current list, so a demolished structure's id is not handed
/// out again.
fn new_structure_id(existing: &[PlacedStructure]) -> String {
    let millis = Utc::now().timestamp_millis();
    loop {
        let id = format!("struct_{millis}_{:08x}", rand::random::<u32>());
        if existing.iter().all(|s| s.id != id) {
            return id;
        }
    }
}

fn describe(amounts: &ResourceAmounts) -> String {
    amounts
        .iter()
        .map(|(r, v)| format!("{v} {r}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Place a building, paying its full cost up front.
pub fn try_place_building(
    state: &GameState,
    building_id: &str,
    rules: &Ruleset,
) -> Result<GameState, ActionError> {
    if state.is_game_over {
        return Err(ActionError::GameOver);
    }
    let building = rules
        .building(building_id)
        .ok_or_else(|| ActionError::UnknownBuilding(building_id.to_string()))?;
    if !state.resources.can_afford(&building.cost) {
        return Err(ActionError::Unaffordable(building.name.clone()));
    }

    let mut next = state.clone();
    next.resources.sub_clamped(&building.cost);
    let id = new_structure_id(&next.structures);
    debug!(structure = %id, type_id = building_id, "building placed");
    next.structures.push(PlacedStructure {
        id,
        type_id: building.id.clone(),
    });
    next.selected_building_for_construction = None;
    Ok(next)
}

/// Place a building, or return the state unchanged if that is not possible.
///
/// The caller is expected to check affordability itself before offering
/// the action; a rejected placement leaves no trace in `current_event`.
pub fn place_building(state: &GameState, building_id: &str, rules: &Ruleset) -> GameState {
    match try_place_building(state, building_id, rules) {
        Ok(next) => next,
        Err(err @ ActionError::UnknownBuilding(_)) => {
            warn!(%err, "placement rejected");
            state.clone()
        }
        Err(err) => {
            debug!(%err, "placement rejected");
            state.clone()
        }
    }
}

/// Demolish a structure, refunding part of its cost.
///
/// Removing housing recomputes capacity from the remaining structures and
/// evicts anyone left without a home. A structure of unknown type is still
/// removed, with nothing refunded.
pub fn try_delete_structure(
    state: &GameState,
    structure_id: &str,
    rules: &Ruleset,
) -> Result<GameState, ActionError> {
    if state.is_game_over {
        return Err(ActionError::GameOver);
    }
    let idx = state
        .structures
        .iter()
        .position(|s| s.id == structure_id)
        .ok_or_else(|| ActionError::UnknownStructure(structure_id.to_string()))?;

    let mut next = state.clone();
    let removed = next.structures.remove(idx);
    let Some(building) = rules.building(&removed.type_id) else {
        warn!(structure = %removed.id, type_id = %removed.type_id, "demolished structure of unknown type");
        next.push_event("An unknown structure was demolished. No resources recovered.");
        return Ok(next);
    };

    let refund = refund_for(&building.cost, rules.tuning.refund_fraction);
    next.resources.add(&refund);

    if building.population_capacity > 0 {
        let capacity = max_population_capacity(&next.structures, rules);
        let population = next.resources.get(Resource::Population);
        if population > capacity {
            let homeless = population - capacity;
            next.resources.population = capacity;
            next.push_event(format!(
                "{homeless} citizen(s) were left homeless and departed after the {} was demolished.",
                building.name
            ));
        }
        if next.resources.population == 0 {
            next.is_game_over = true;
            next.push_event(format!(
                "Demolishing vital housing ({}) left your last citizens without shelter. The realm is lost.",
                building.name
            ));
            info!(structure = %removed.id, "realm has fallen after demolition");
            return Ok(next);
        }
    }

    let recovered = if refund.is_empty() {
        "No resources recovered.".to_string()
    } else {
        format!("Recovered {}.", describe(&refund))
    };
    next.push_event(format!("{} demolished. {recovered}", building.name));
    Ok(next)
}

/// Demolish a structure. An unknown id is reported in `current_event`;
/// a fallen realm is returned unchanged.
pub fn delete_structure(state: &GameState, structure_id: &str, rules: &Ruleset) -> GameState {
    match try_delete_structure(state, structure_id, rules) {
        Ok(next) => next,
        Err(err @ ActionError::UnknownStructure(_)) => {
            warn!(%err, "demolition rejected");
            let mut next = state.clone();
            next.push_event(format!(
                "Error: Structure ID {structure_id} not found for deletion."
            ));
            next
        }
        Err(err) => {
            debug!(%err, "demolition rejected");
            state.clone()
        }
    }
}
