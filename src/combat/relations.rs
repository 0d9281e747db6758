//! Diplomatic relations between factions
//!
//! Keys are unordered pairs; lookups are symmetric.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::FactionId;

/// Diplomatic stance between two factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relation {
    War,
    #[default]
    Neutral,
    Allied,
}

/// Relation table keyed by unordered faction pairs
#[derive(Debug, Clone, Default)]
pub struct FactionRelations {
    relations: AHashMap<(FactionId, FactionId), Relation>,
}

fn pair_key(a: FactionId, b: FactionId) -> (FactionId, FactionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl FactionRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-faction views `(faction, other, relation)`.
    ///
    /// When both factions state a view of each other the later entry wins.
    pub fn from_views<I>(views: I) -> Self
    where
        I: IntoIterator<Item = (FactionId, FactionId, Relation)>,
    {
        let mut table = Self::new();
        for (a, b, relation) in views {
            table.set(a, b, relation);
        }
        table
    }

    pub fn set(&mut self, a: FactionId, b: FactionId, relation: Relation) {
        if a == b {
            return;
        }
        self.relations.insert(pair_key(a, b), relation);
    }

    /// Relation between two factions; unknown pairs are neutral
    pub fn get(&self, a: FactionId, b: FactionId) -> Relation {
        if a == b {
            return Relation::Allied;
        }
        self.relations
            .get(&pair_key(a, b))
            .copied()
            .unwrap_or_default()
    }

    pub fn at_war(&self, a: FactionId, b: FactionId) -> bool {
        self.get(a, b) == Relation::War
    }

    pub fn declare_war(&mut self, a: FactionId, b: FactionId) {
        self.set(a, b, Relation::War);
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
