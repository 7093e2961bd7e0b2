use crate::{CriterionKind, GameState, Resource, ResourceAmounts, Ruleset, Tuning};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

/// Validation errors for rule tables and game states.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Catalog key and the entry's own id disagree.
    #[error("building key {key} does not match its id {id}")]
    BuildingKeyMismatch { key: String, id: String },
    /// Names are shown to the player and must not be blank.
    #[error("{0} has an empty name")]
    EmptyName(String),
    /// Population can only change through housing and events.
    #[error("{owner} lists population in its {field}")]
    PopulationNotAllowed { owner: String, field: &'static str },
    #[error("duplicate quest id: {0}")]
    DuplicateQuest(String),
    #[error("quest {0} has no criteria")]
    EmptyCriteria(String),
    #[error("quest {quest} references unknown building {building}")]
    UnknownBuilding { quest: String, building: String },
    #[error("invalid tuning: {0}")]
    InvalidTuning(&'static str),
    /// Turn counter starts at 1.
    #[error("turn must be >= 1")]
    TurnOutOfRange,
    #[error("duplicate structure id: {0}")]
    DuplicateStructure(String),
    #[error("unknown quest id: {0}")]
    UnknownQuest(String),
}

fn check_materials(
    owner: &str,
    field: &'static str,
    amounts: &ResourceAmounts,
) -> Result<(), ValidationError> {
    if amounts.contains_key(&Resource::Population) {
        return Err(ValidationError::PopulationNotAllowed {
            owner: owner.to_string(),
            field,
        });
    }
    Ok(())
}

/// Validate tunable constants.
pub fn validate_tuning(t: &Tuning) -> Result<(), ValidationError> {
    if t.starvation_divisor == 0 {
        return Err(ValidationError::InvalidTuning("starvation_divisor must be >= 1"));
    }
    if t.food_per_person < Decimal::ZERO {
        return Err(ValidationError::InvalidTuning("food_per_person must be >= 0"));
    }
    if t.refund_fraction < Decimal::ZERO || t.refund_fraction > Decimal::ONE {
        return Err(ValidationError::InvalidTuning("refund_fraction must be within [0,1]"));
    }
    if !(0.0..=1.0).contains(&t.hazard.chance) {
        return Err(ValidationError::InvalidTuning("hazard chance must be within [0,1]"));
    }
    if t.hazard.min_losses > t.hazard.max_losses {
        return Err(ValidationError::InvalidTuning("hazard min_losses exceeds max_losses"));
    }
    if t.gift.min_amount > t.gift.max_amount {
        return Err(ValidationError::InvalidTuning("gift min_amount exceeds max_amount"));
    }
    if let Some(bonus) = &t.knowledge_bonus {
        check_materials("knowledge bonus", "bonus", &bonus.per_building)?;
    }
    Ok(())
}

/// Validate the rule tables, including cross-references from quests to buildings.
pub fn validate_ruleset(rules: &Ruleset) -> Result<(), ValidationError> {
    validate_tuning(&rules.tuning)?;
    for (key, b) in &rules.buildings {
        if key != &b.id {
            return Err(ValidationError::BuildingKeyMismatch {
                key: key.clone(),
                id: b.id.clone(),
            });
        }
        if b.name.trim().is_empty() {
            return Err(ValidationError::EmptyName(b.id.clone()));
        }
        check_materials(&b.id, "cost", &b.cost)?;
        check_materials(&b.id, "upkeep", &b.upkeep)?;
        check_materials(&b.id, "production", &b.production)?;
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for q in &rules.quests {
        if !ids.insert(q.id.as_str()) {
            return Err(ValidationError::DuplicateQuest(q.id.clone()));
        }
        if q.title.trim().is_empty() {
            return Err(ValidationError::EmptyName(q.id.clone()));
        }
        if q.criteria.is_empty() {
            return Err(ValidationError::EmptyCriteria(q.id.clone()));
        }
        check_materials(&q.id, "reward", &q.reward.resources)?;
        for c in &q.criteria {
            match &c.kind {
                CriterionKind::Build { building_id, .. } => {
                    if !rules.buildings.contains_key(building_id) {
                        return Err(ValidationError::UnknownBuilding {
                            quest: q.id.clone(),
                            building: building_id.clone(),
                        });
                    }
                }
                CriterionKind::ResourceReach { resource, .. } if !resource.is_material() => {
                    return Err(ValidationError::PopulationNotAllowed {
                        owner: q.id.clone(),
                        field: "resource criterion",
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Validate a game state against the rules it will be simulated with.
///
/// Structures of unknown types are tolerated: demolition handles them.
pub fn validate_state(state: &GameState, rules: &Ruleset) -> Result<(), ValidationError> {
    if state.current_turn == 0 {
        return Err(ValidationError::TurnOutOfRange);
    }
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for s in &state.structures {
        if !ids.insert(s.id.as_str()) {
            return Err(ValidationError::DuplicateStructure(s.id.clone()));
        }
    }
    for pq in &state.player_quests {
        if rules.quest(&pq.quest_id).is_none() {
            return Err(ValidationError::UnknownQuest(pq.quest_id.clone()));
        }
    }
    Ok(())
}
