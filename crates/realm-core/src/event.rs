//! Random turn events and the effect functions attached to them.

use crate::{PlacedStructure, Resource, ResourceSet};
use rand::RngCore;
use std::collections::BTreeMap;
use std::fmt;

/// Signed per-resource change requested by an event effect.
pub type ResourceDelta = BTreeMap<Resource, i64>;

/// Read-only view of the realm handed to an event effect.
#[derive(Clone, Copy, Debug)]
pub struct EffectContext<'a> {
    pub resources: &'a ResourceSet,
    pub structures: &'a [PlacedStructure],
    pub current_turn: u32,
}

impl EffectContext<'_> {
    /// Number of placed structures of the given building type.
    pub fn count_of(&self, type_id: &str) -> usize {
        self.structures
            .iter()
            .filter(|s| s.type_id == type_id)
            .count()
    }
}

/// Result of an event effect: a resource delta plus optional extra text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub resource_delta: ResourceDelta,
    pub additional_message: Option<String>,
}

impl EffectOutcome {
    /// Add `delta` to `resource`, merging with any earlier entry.
    pub fn with(mut self, resource: Resource, delta: i64) -> Self {
        if delta != 0 {
            *self.resource_delta.entry(resource).or_insert(0) += delta;
        }
        self
    }

    pub fn message(mut self, text: impl Into<String>) -> Self {
        self.additional_message = Some(text.into());
        self
    }
}

/// Pure function from a realm snapshot to a resource delta. Effects that
/// need chance draw from the supplied random source only.
pub type EventEffect = fn(&EffectContext<'_>, &mut dyn RngCore) -> EffectOutcome;

/// Catalog entry for the turn engine's random event phase.
#[derive(Clone)]
pub struct GameEvent {
    pub message: String,
    pub effect: Option<EventEffect>,
}

impl GameEvent {
    /// An event that only prints its message.
    pub fn flavor(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            effect: None,
        }
    }
}

impl fmt::Debug for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEvent")
            .field("message", &self.message)
            .field("has_effect", &self.effect.is_some())
            .finish()
    }
}
