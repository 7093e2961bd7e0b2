#![deny(warnings)]

//! Simulation runtime for Realm Architect.
//!
//! Every operation takes a full [`GameState`] snapshot and returns a new one;
//! nothing here holds state between calls. Callers serialize access to a
//! session themselves.
//!
//! - [`advance_turn`]: the turn engine
//! - [`place_building`] / [`delete_structure`]: structure lifecycle
//! - [`check_and_complete_quests`]: quest evaluation with reward chaining
//! - [`perform`]: runs an action and then re-evaluates quests

mod quests;
mod session;
mod structures;
mod turn;

#[cfg(test)]
mod test_helpers;

pub use quests::{check_and_complete_quests, criterion_met, QuestNotice};
pub use session::{perform, Action, ActionOutcome};
pub use structures::{delete_structure, place_building, try_delete_structure, try_place_building};
pub use turn::advance_turn;

use realm_core::{GameState, PlayerQuest, QuestStatus, Ruleset};
use thiserror::Error;

/// Why a state-mutating action was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("the realm has fallen; no further actions are possible")]
    GameOver,
    #[error("unknown building type: {0}")]
    UnknownBuilding(String),
    #[error("not enough resources to build {0}")]
    Unaffordable(String),
    #[error("structure {0} not found")]
    UnknownStructure(String),
}

/// Fresh game at turn 1 with every quest active, in catalog order.
pub fn init_game(rules: &Ruleset) -> GameState {
    GameState {
        resources: rules.initial_resources,
        structures: Vec::new(),
        current_turn: 1,
        current_event: None,
        is_game_over: false,
        player_quests: rules
            .quests
            .iter()
            .map(|q| PlayerQuest {
                quest_id: q.id.clone(),
                status: QuestStatus::Active,
            })
            .collect(),
        selected_building_for_construction: None,
    }
}
