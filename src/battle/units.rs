//! Per-engagement unit state
//!
//! A combat unit wraps one combatant snapshot with its tile and what it has
//! done this round. State is reset at the start of every round.

use serde::{Deserialize, Serialize};

use crate::battle::grid::GridPosition;
use crate::combat::combatant::Combatant;
use crate::combat::result::Side;
use crate::core::types::CombatantId;

/// What a unit may still do this round
///
/// Ready -> Moved -> Done, Ready -> Attacked -> Done. Passing goes straight
/// to Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnState {
    #[default]
    Ready,
    Moved,
    Attacked,
    Done,
}

impl TurnState {
    pub fn can_move(&self) -> bool {
        matches!(self, TurnState::Ready | TurnState::Attacked)
    }

    pub fn can_attack(&self) -> bool {
        matches!(self, TurnState::Ready | TurnState::Moved)
    }

    pub fn after_move(&self) -> TurnState {
        match self {
            TurnState::Ready => TurnState::Moved,
            _ => TurnState::Done,
        }
    }

    pub fn after_attack(&self) -> TurnState {
        match self {
            TurnState::Ready => TurnState::Attacked,
            _ => TurnState::Done,
        }
    }
}

/// Movement points for a round. Never below one.
pub fn movement_points_for(speed: f32) -> u32 {
    (speed.max(0.0).floor() as u32).max(1)
}

/// Handle to a unit inside an engagement roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRef {
    pub side: Side,
    pub index: usize,
}

/// A combatant placed on the tactical grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub combatant: Combatant,
    pub side: Side,
    pub position: GridPosition,
    pub state: TurnState,
    pub movement_points: u32,
}

impl CombatUnit {
    pub fn new(combatant: Combatant, side: Side, position: GridPosition) -> Self {
        let movement_points = movement_points_for(combatant.speed);
        Self {
            combatant,
            side,
            position,
            state: TurnState::Ready,
            movement_points,
        }
    }

    pub fn id(&self) -> CombatantId {
        self.combatant.id
    }

    pub fn is_alive(&self) -> bool {
        self.combatant.is_alive()
    }

    pub fn weapon_range(&self) -> u32 {
        self.combatant.weapon_range()
    }

    pub fn can_reach(&self, target: GridPosition) -> bool {
        self.position.distance(&target) <= self.movement_points
    }

    pub fn in_weapon_range(&self, target: GridPosition) -> bool {
        self.position.distance(&target) <= self.weapon_range()
    }

    /// Clear turn state and recompute movement for a new round
    pub fn reset_for_round(&mut self) {
        self.state = TurnState::Ready;
        self.movement_points = movement_points_for(self.combatant.speed);
    }
}
