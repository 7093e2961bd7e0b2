//! Quest evaluation. Rewards from one completion may satisfy another quest,
//! so passes repeat until nothing new completes.

use realm_core::{CriterionKind, GameState, QuestCriterion, QuestStatus, Resource, Ruleset};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Completion announcement for transient display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestNotice {
    pub title: String,
    pub message: String,
    pub is_achievement: bool,
}

/// Whether a single criterion holds for `state`. Unrecognized criteria
/// never hold.
pub fn criterion_met(criterion: &QuestCriterion, state: &GameState) -> bool {
    match &criterion.kind {
        CriterionKind::Build {
            building_id,
            target_count,
        } => state.count_of(building_id) >= *target_count,
        CriterionKind::ResourceReach {
            resource,
            target_amount,
        } => resource.is_material() && state.resources.get(*resource) >= *target_amount,
        CriterionKind::PopulationReach { target_amount } => {
            state.resources.get(Resource::Population) >= *target_amount
        }
        CriterionKind::TurnReach { target_turn } => state.current_turn >= *target_turn,
        CriterionKind::StructureCountReach { target_amount } => {
            state.structures.len() >= *target_amount
        }
        CriterionKind::Unrecognized => {
            warn!(criterion = %criterion.description, "unrecognized quest criterion; treated as not met");
            false
        }
    }
}

/// Complete every active quest whose criteria all hold, granting rewards.
///
/// Notices come back in completion order. A fallen realm is returned
/// unchanged with no notices.
pub fn check_and_complete_quests(state: &GameState, rules: &Ruleset) -> (GameState, Vec<QuestNotice>) {
    if state.is_game_over {
        return (state.clone(), Vec::new());
    }
    let mut next = state.clone();
    let mut notices = Vec::new();
    let mut pass = 0;
    loop {
        pass += 1;
        let mut completed_this_pass = 0;
        for idx in 0..next.player_quests.len() {
            if next.player_quests[idx].status != QuestStatus::Active {
                continue;
            }
            let Some(quest) = rules.quest(&next.player_quests[idx].quest_id) else {
                warn!(quest = %next.player_quests[idx].quest_id, "unknown quest id; skipping");
                continue;
            };
            if !quest.criteria.iter().all(|c| criterion_met(c, &next)) {
                continue;
            }

            next.player_quests[idx].status = QuestStatus::Completed;
            for (&resource, &amount) in &quest.reward.resources {
                if resource.is_material() {
                    let slot = next.resources.get_mut(resource);
                    *slot = slot.saturating_add(amount);
                }
            }
            let (prefix, fallback) = if quest.is_achievement {
                ("Achievement Unlocked: ", "A milestone reached!")
            } else {
                ("Quest Completed: ", "You earned a reward!")
            };
            info!(quest = %quest.id, "quest completed");
            notices.push(QuestNotice {
                title: format!("{prefix}{}", quest.title),
                message: quest
                    .reward
                    .message
                    .clone()
                    .unwrap_or_else(|| fallback.to_string()),
                is_achievement: quest.is_achievement,
            });
            completed_this_pass += 1;
        }
        if completed_this_pass == 0 {
            break;
        }
    }
    debug!(passes = pass, completed = notices.len(), "quests evaluated");
    (next, notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{resources, rules, state_with};
    use proptest::prelude::*;
    use realm_core::{PlayerQuest, QuestDefinition, QuestReward};

    fn quest(id: &str, kind: CriterionKind, reward: &[(Resource, u64)]) -> QuestDefinition {
        QuestDefinition {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            criteria: vec![QuestCriterion {
                description: String::new(),
                kind,
            }],
            reward: QuestReward {
                resources: reward.iter().copied().collect(),
                message: None,
            },
            is_achievement: false,
        }
    }

    fn with_quests(quests: Vec<QuestDefinition>) -> Ruleset {
        let mut r = rules();
        r.quests = quests;
        r
    }

    fn fresh(r: &Ruleset, res: realm_core::ResourceSet, types: &[&str]) -> GameState {
        let mut g = state_with(res, types);
        g.player_quests = r
            .quests
            .iter()
            .map(|q| PlayerQuest {
                quest_id: q.id.clone(),
                status: QuestStatus::Active,
            })
            .collect();
        g
    }

    #[test]
    fn reward_can_complete_a_second_quest_in_one_call() {
        let r = with_quests(vec![
            quest(
                "stockpile",
                CriterionKind::ResourceReach {
                    resource: Resource::Wood,
                    target_amount: 130,
                },
                &[],
            ),
            quest(
                "firstHut",
                CriterionKind::Build {
                    building_id: "hut".into(),
                    target_count: 1,
                },
                &[(Resource::Wood, 20), (Resource::Stone, 10)],
            ),
        ]);
        let start = fresh(&r, resources(110, 100, 50, 20, 5), &["hut"]);
        let (next, notices) = check_and_complete_quests(&start, &r);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].title, "Quest Completed: firstHut");
        assert_eq!(notices[0].message, "You earned a reward!");
        assert_eq!(notices[1].title, "Quest Completed: stockpile");
        assert_eq!(next.resources.wood, 130);
        assert_eq!(next.resources.stone, 110);
        assert!(next
            .player_quests
            .iter()
            .all(|q| q.status == QuestStatus::Completed));
    }

    #[test]
    fn shipped_first_shelter_quest() {
        let r = rules();
        let start = fresh(&r, resources(50, 80, 50, 20, 5), &["hut"]);
        let (next, notices) = check_and_complete_quests(&start, &r);
        assert_eq!(notices[0].title, "Quest Completed: First Shelter");
        assert_eq!(
            notices[0].message,
            "Your first citizens have a place to call home!"
        );
        assert_eq!(next.resources.wood, 70);
        assert_eq!(next.resources.stone, 90);
    }

    #[test]
    fn achievement_notice_wording() {
        let mut q = quest(
            "veteran",
            CriterionKind::TurnReach { target_turn: 3 },
            &[],
        );
        q.title = "Veteran".into();
        q.is_achievement = true;
        let r = with_quests(vec![q]);
        let mut start = fresh(&r, resources(0, 0, 0, 0, 1), &[]);
        start.current_turn = 3;
        let (_, notices) = check_and_complete_quests(&start, &r);
        assert_eq!(
            notices,
            vec![QuestNotice {
                title: "Achievement Unlocked: Veteran".into(),
                message: "A milestone reached!".into(),
                is_achievement: true,
            }]
        );
    }

    #[test]
    fn all_criteria_must_hold() {
        let mut q = quest(
            "both",
            CriterionKind::PopulationReach { target_amount: 5 },
            &[],
        );
        q.criteria.push(QuestCriterion {
            description: String::new(),
            kind: CriterionKind::StructureCountReach { target_amount: 2 },
        });
        let r = with_quests(vec![q]);
        let start = fresh(&r, resources(0, 0, 0, 0, 5), &["farm"]);
        assert!(check_and_complete_quests(&start, &r).1.is_empty());
        let start = fresh(&r, resources(0, 0, 0, 0, 5), &["farm", "hut"]);
        assert_eq!(check_and_complete_quests(&start, &r).1.len(), 1);
    }

    #[test]
    fn population_is_never_a_reward() {
        let r = with_quests(vec![quest(
            "census",
            CriterionKind::TurnReach { target_turn: 1 },
            &[(Resource::Population, 50), (Resource::Gold, 5)],
        )]);
        let start = fresh(&r, resources(0, 0, 0, 0, 5), &[]);
        let (next, _) = check_and_complete_quests(&start, &r);
        assert_eq!(next.resources.population, 5);
        assert_eq!(next.resources.gold, 5);
    }

    #[test]
    fn unrecognized_and_population_resource_criteria_fail_closed() {
        let r = with_quests(vec![
            quest("mystery", CriterionKind::Unrecognized, &[]),
            quest(
                "headcount",
                CriterionKind::ResourceReach {
                    resource: Resource::Population,
                    target_amount: 1,
                },
                &[],
            ),
        ]);
        let start = fresh(&r, resources(0, 0, 0, 0, 5), &[]);
        let (next, notices) = check_and_complete_quests(&start, &r);
        assert!(notices.is_empty());
        assert_eq!(next, start);
    }

    #[test]
    fn unknown_quest_ids_are_skipped() {
        let r = rules();
        let mut start = fresh(&r, resources(0, 0, 0, 0, 5), &[]);
        start.player_quests.insert(
            0,
            PlayerQuest {
                quest_id: "retired".into(),
                status: QuestStatus::Active,
            },
        );
        let (next, _) = check_and_complete_quests(&start, &r);
        assert_eq!(next.player_quests[0].status, QuestStatus::Active);
    }

    #[test]
    fn fallen_realm_completes_nothing() {
        let r = rules();
        let mut start = fresh(&r, resources(500, 500, 500, 500, 0), &["hut"]);
        start.is_game_over = true;
        let (next, notices) = check_and_complete_quests(&start, &r);
        assert!(notices.is_empty());
        assert_eq!(next, start);
    }

    proptest! {
        #[test]
        fn evaluation_is_idempotent(wood in 0u64..600, stone in 0u64..600, food in 0u64..600,
                                    gold in 0u64..300, pop in 0u64..40, turn in 1u32..80,
                                    huts in 0usize..4, farms in 0usize..4) {
            let r = rules();
            let mut types = vec!["hut"; huts];
            types.extend(std::iter::repeat("farm").take(farms));
            let mut start = fresh(&r, resources(wood, stone, food, gold, pop), &types);
            start.current_turn = turn;
            let (once, notices) = check_and_complete_quests(&start, &r);
            let (twice, again) = check_and_complete_quests(&once, &r);
            prop_assert!(again.is_empty());
            prop_assert_eq!(&twice, &once);
            let completed = once
                .player_quests
                .iter()
                .filter(|q| q.status == QuestStatus::Completed)
                .count();
            prop_assert_eq!(completed, notices.len());
            for (a, b) in start.player_quests.iter().zip(&once.player_quests) {
                if a.status == QuestStatus::Completed {
                    prop_assert_eq!(b.status, QuestStatus::Completed);
                }
            }
        }
    }
}
