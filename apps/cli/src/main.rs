#![deny(warnings)]

//! Headless driver: start a realm, optionally place buildings, play turns.

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use realm_core::{GameState, QuestStatus, Resource, Ruleset};
use realm_econ::{food_required, max_population_capacity};
use realm_runtime::{perform, Action, QuestNotice};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    turns: u32,
    seed: u64,
    rules: Option<PathBuf>,
    build: Vec<String>,
    autoplay: bool,
    json: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Option<Args>> {
    let mut args = Args {
        turns: 20,
        seed: 42,
        rules: None,
        build: Vec::new(),
        autoplay: false,
        json: false,
    };
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--turns" => {
                args.turns = it
                    .next()
                    .context("--turns needs a value")?
                    .parse()
                    .context("--turns must be a number")?
            }
            "--seed" => {
                args.seed = it
                    .next()
                    .context("--seed needs a value")?
                    .parse()
                    .context("--seed must be a number")?
            }
            "--rules" => {
                args.rules = Some(PathBuf::from(
                    it.next().context("--rules needs a directory")?,
                ))
            }
            "--build" => {
                let list = it.next().context("--build needs a comma-separated list")?;
                args.build
                    .extend(list.split(',').filter(|s| !s.is_empty()).map(str::to_string));
            }
            "--autoplay" => args.autoplay = true,
            "--json" => args.json = true,
            "--version" => {
                println!(
                    "realm {} ({} {})",
                    env!("CARGO_PKG_VERSION"),
                    env!("GIT_SHA"),
                    env!("BUILD_DATE")
                );
                return Ok(None);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(Some(args))
}

/// Pick something worth building this turn, if anything is affordable.
fn choose_building(state: &GameState, rules: &Ruleset) -> Option<String> {
    let res = &state.resources;
    let capacity = max_population_capacity(&state.structures, rules);
    let hungry = res.food < food_required(res.population, rules.tuning.food_per_person) * 3;
    let mut wishes = Vec::new();
    if hungry {
        wishes.push("farm");
    }
    if res.population + 1 >= capacity {
        wishes.push("hut");
    }
    if res.gold < 10 {
        wishes.push("market");
    }
    wishes.extend(["loggingCamp", "stoneQuarry"]);
    wishes
        .into_iter()
        .filter_map(|id| rules.building(id))
        .find(|b| state.count_of(&b.id) < 4 && res.can_afford(&b.cost))
        .map(|b| b.id.clone())
}

fn announce(notices: &[QuestNotice]) {
    for n in notices {
        println!("  * {} - {}", n.title, n.message);
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let Some(args) = parse_args(std::env::args().skip(1))? else {
        return Ok(());
    };
    info!(?args, "starting CLI");

    let rules = match &args.rules {
        Some(dir) => realm_data::load_dir(dir)
            .with_context(|| format!("loading rules from {}", dir.display()))?,
        None => realm_data::builtin()?,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut state = realm_runtime::init_game(&rules);

    for id in &args.build {
        let out = perform(
            &state,
            &Action::Place {
                building_id: id.clone(),
            },
            &rules,
            &mut rng,
        );
        if out.state.structures.len() == state.structures.len() {
            println!("Could not build {id}.");
        }
        announce(&out.notices);
        state = out.state;
    }

    for _ in 0..args.turns {
        if state.is_game_over {
            break;
        }
        if args.autoplay {
            if let Some(id) = choose_building(&state, &rules) {
                let out = perform(&state, &Action::Place { building_id: id }, &rules, &mut rng);
                announce(&out.notices);
                state = out.state;
            }
        }
        let out = perform(&state, &Action::AdvanceTurn, &rules, &mut rng);
        state = out.state;
        if !args.json {
            println!(
                "Turn {:>3} | {}",
                state.current_turn,
                state.current_event.as_deref().unwrap_or("")
            );
            announce(&out.notices);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let res = &state.resources;
    let completed = state
        .player_quests
        .iter()
        .filter(|q| q.status == QuestStatus::Completed)
        .count();
    println!(
        "Realm {} | turn: {} | structures: {} | quests: {}/{}",
        if state.is_game_over { "FALLEN" } else { "OK" },
        state.current_turn,
        state.structures.len(),
        completed,
        state.player_quests.len()
    );
    let line = Resource::ALL
        .iter()
        .map(|&r| format!("{}: {}", r.name(), res.get(r)))
        .collect::<Vec<_>>()
        .join(" | ");
    println!(
        "{line} | capacity: {}",
        max_population_capacity(&state.structures, &rules)
    );

    Ok(())
}
