//! Player actions and the quest check that follows each of them.

use crate::{advance_turn, check_and_complete_quests, delete_structure, place_building, QuestNotice};
use rand::Rng;
use realm_core::{GameState, Ruleset};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AdvanceTurn,
    Place { building_id: String },
    Demolish { structure_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub state: GameState,
    pub notices: Vec<QuestNotice>,
}

/// Run one action, then evaluate quests unless the realm has fallen.
pub fn perform<R: Rng>(state: &GameState, action: &Action, rules: &Ruleset, rng: &mut R) -> ActionOutcome {
    let next = match action {
        Action::AdvanceTurn => advance_turn(state, rules, rng),
        Action::Place { building_id } => place_building(state, building_id, rules),
        Action::Demolish { structure_id } => delete_structure(state, structure_id, rules),
    };
    if next.is_game_over {
        return ActionOutcome {
            state: next,
            notices: Vec::new(),
        };
    }
    let (state, notices) = check_and_complete_quests(&next, rules);
    ActionOutcome { state, notices }
}
