//! Encounter detection
//!
//! Positions are snapped to a coarse grid so that forces parked near the same
//! spot are grouped together. Every pair of warring factions sharing a cell
//! yields one encounter. Three-way wars in one cell produce overlapping
//! encounters that share units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::combat::relations::FactionRelations;
use crate::core::types::{FactionId, Vec2};

/// Grid cell index on the galaxy map
pub type Cell = (i64, i64);

/// Stable identity of an encounter within a turn
///
/// Ordering is (cell, initiator, responder), which is also the order
/// encounters are resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterKey {
    pub cell: Cell,
    pub initiator: FactionId,
    pub responder: FactionId,
}

/// Two opposing groups sharing a location
#[derive(Debug, Clone)]
pub struct Encounter<'a> {
    pub key: EncounterKey,
    /// Centre of the shared cell
    pub location: Vec2,
    pub initiator: Vec<&'a Combatant>,
    pub responder: Vec<&'a Combatant>,
}

impl Encounter<'_> {
    pub fn size(&self) -> usize {
        self.initiator.len() + self.responder.len()
    }
}

/// Snap a position to its cell. Halfway values round to even.
pub fn cell_of(position: Vec2, cell_size: f32) -> Cell {
    (
        (position.x / cell_size).round_ties_even() as i64,
        (position.y / cell_size).round_ties_even() as i64,
    )
}

/// World location of a cell
pub fn cell_center(cell: Cell, cell_size: f32) -> Vec2 {
    Vec2::new(cell.0 as f32 * cell_size, cell.1 as f32 * cell_size)
}

/// Find every encounter among living combatants, in resolution order
pub fn detect_encounters<'a>(
    combatants: &'a [Combatant],
    relations: &FactionRelations,
    cell_size: f32,
) -> Vec<Encounter<'a>> {
    let mut cells: BTreeMap<Cell, BTreeMap<FactionId, Vec<&'a Combatant>>> = BTreeMap::new();
    for combatant in combatants.iter().filter(|c| c.is_alive()) {
        cells
            .entry(cell_of(combatant.position, cell_size))
            .or_default()
            .entry(combatant.faction)
            .or_default()
            .push(combatant);
    }

    let mut encounters = Vec::new();
    for (cell, factions) in &cells {
        if factions.len() < 2 {
            continue;
        }

        let groups: Vec<(&FactionId, &Vec<&'a Combatant>)> = factions.iter().collect();
        for (i, (initiator, initiator_units)) in groups.iter().enumerate() {
            for (responder, responder_units) in &groups[i + 1..] {
                if !relations.at_war(**initiator, **responder) {
                    continue;
                }
                encounters.push(Encounter {
                    key: EncounterKey {
                        cell: *cell,
                        initiator: **initiator,
                        responder: **responder,
                    },
                    location: cell_center(*cell, cell_size),
                    initiator: (*initiator_units).clone(),
                    responder: (*responder_units).clone(),
                });
            }
        }
    }

    tracing::debug!(
        "Detected {} encounters across {} occupied cells",
        encounters.len(),
        cells.len()
    );
    encounters
}
