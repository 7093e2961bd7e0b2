#![deny(warnings)]

//! Rule table loading: building, quest and event catalogs plus tuning.
//!
//! The shipped catalogs live in `assets/rules/*.yaml` and are embedded at
//! compile time. [`load_dir`] reads the same files from a directory, falling
//! back to the embedded copy for any file that is absent, so a rules
//! directory can override just the tables it cares about.

use realm_core::{
    validate_ruleset, BuildingType, GameEvent, QuestDefinition, ResourceSet, Ruleset, Tuning,
    ValidationError,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const BUILDINGS_FILE: &str = "buildings.yaml";
pub const QUESTS_FILE: &str = "quests.yaml";
pub const EVENTS_FILE: &str = "events.yaml";
pub const TUNING_FILE: &str = "tuning.yaml";

const EMBEDDED_BUILDINGS: &str = include_str!("../../../assets/rules/buildings.yaml");
const EMBEDDED_QUESTS: &str = include_str!("../../../assets/rules/quests.yaml");
const EMBEDDED_EVENTS: &str = include_str!("../../../assets/rules/events.yaml");
const EMBEDDED_TUNING: &str = include_str!("../../../assets/rules/tuning.yaml");

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {source}")]
    Yaml {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("duplicate building id: {0}")]
    DuplicateBuilding(String),
    #[error("event \"{message}\" names unknown effect {effect}")]
    UnknownEffect { message: String, effect: String },
    #[error("invalid rules: {0}")]
    Invalid(#[from] ValidationError),
}

/// Raw event entry: the effect is referenced by name.
#[derive(Debug, Deserialize)]
struct EventEntry {
    message: String,
    #[serde(default)]
    effect: Option<String>,
}

fn default_initial_resources() -> ResourceSet {
    ResourceSet {
        wood: 100,
        stone: 100,
        food: 50,
        gold: 20,
        population: 5,
    }
}

#[derive(Debug, Deserialize)]
struct TuningFile {
    #[serde(default = "default_initial_resources")]
    initial_resources: ResourceSet,
    #[serde(default)]
    tuning: Tuning,
}

/// Catalog texts to assemble a ruleset from.
#[derive(Debug, Clone, Copy)]
pub struct RuleSources<'a> {
    pub buildings: &'a str,
    pub quests: &'a str,
    pub events: &'a str,
    pub tuning: &'a str,
}

impl RuleSources<'static> {
    /// The catalogs shipped with the game.
    pub fn embedded() -> Self {
        Self {
            buildings: EMBEDDED_BUILDINGS,
            quests: EMBEDDED_QUESTS,
            events: EMBEDDED_EVENTS,
            tuning: EMBEDDED_TUNING,
        }
    }
}

fn parse<T: DeserializeOwned>(file: &'static str, text: &str) -> Result<T, DataError> {
    serde_yaml::from_str(text).map_err(|source| DataError::Yaml { file, source })
}

fn resolve_events(entries: Vec<EventEntry>) -> Result<Vec<GameEvent>, DataError> {
    let mut events = Vec::with_capacity(entries.len());
    for e in entries {
        let effect = match e.effect {
            None => None,
            Some(name) => match realm_econ::effects::lookup(&name) {
                Some(f) => Some(f),
                None => {
                    return Err(DataError::UnknownEffect {
                        message: e.message,
                        effect: name,
                    })
                }
            },
        };
        events.push(GameEvent {
            message: e.message,
            effect,
        });
    }
    Ok(events)
}

/// Parse and validate a ruleset from catalog texts.
pub fn parse_ruleset(src: RuleSources<'_>) -> Result<Ruleset, DataError> {
    let building_list: Vec<BuildingType> = parse(BUILDINGS_FILE, src.buildings)?;
    let mut buildings = BTreeMap::new();
    for b in building_list {
        if buildings.contains_key(&b.id) {
            return Err(DataError::DuplicateBuilding(b.id));
        }
        buildings.insert(b.id.clone(), b);
    }
    let quests: Vec<QuestDefinition> = parse(QUESTS_FILE, src.quests)?;
    let events = resolve_events(parse(EVENTS_FILE, src.events)?)?;
    let tf: TuningFile = parse(TUNING_FILE, src.tuning)?;

    let rules = Ruleset {
        buildings,
        quests,
        events,
        tuning: tf.tuning,
        initial_resources: tf.initial_resources,
    };
    validate_ruleset(&rules)?;
    debug!(
        buildings = rules.buildings.len(),
        quests = rules.quests.len(),
        events = rules.events.len(),
        "ruleset assembled"
    );
    Ok(rules)
}

/// The rules shipped with the game.
pub fn builtin() -> Result<Ruleset, DataError> {
    parse_ruleset(RuleSources::embedded())
}

fn read_or_embedded(dir: &Path, file: &str, embedded: &'static str) -> Result<String, DataError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(embedded.to_string());
    }
    info!(path = %path.display(), "loading rules override");
    fs::read_to_string(&path).map_err(|source| DataError::Io { path, source })
}

/// Load rules from `dir`, using the embedded catalog for any missing file.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Ruleset, DataError> {
    let dir = dir.as_ref();
    let embedded = RuleSources::embedded();
    let buildings = read_or_embedded(dir, BUILDINGS_FILE, embedded.buildings)?;
    let quests = read_or_embedded(dir, QUESTS_FILE, embedded.quests)?;
    let events = read_or_embedded(dir, EVENTS_FILE, embedded.events)?;
    let tuning = read_or_embedded(dir, TUNING_FILE, embedded.tuning)?;
    parse_ruleset(RuleSources {
        buildings: &buildings,
        quests: &quests,
        events: &events,
        tuning: &tuning,
    })
}
