//! Interactive control surface for tactical engagements
//!
//! Every call returns an [`ActionReport`]: what happened (or why it was
//! refused) plus the legal moves and targets a front end should highlight.
//! A refused action never changes the engagement.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::execution::{TacticalEngagement, TacticalPhase};
use crate::battle::grid::GridPosition;
use crate::battle::units::UnitRef;
use crate::combat::result::Side;
use crate::core::types::CombatantId;

/// Why an action was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
    #[error("engagement has ended")]
    EngagementEnded,

    #[error("no unit holds the turn")]
    NoActiveUnit,

    #[error("unit holding the turn is not under interactive control")]
    NotControlled,

    #[error("unit {0} does not hold the turn")]
    NotCurrentUnit(CombatantId),

    #[error("unit {0} is not part of this engagement")]
    UnitNotFound(CombatantId),

    #[error("unit {0} has been destroyed")]
    UnitDestroyed(CombatantId),

    #[error("unit {0} has already moved this round")]
    AlreadyMoved(CombatantId),

    #[error("unit {0} has already attacked this round")]
    AlreadyAttacked(CombatantId),

    #[error("tile ({}, {}) is outside the arena", .0.x, .0.y)]
    OutOfBounds(GridPosition),

    #[error("tile ({}, {}) is occupied", .0.x, .0.y)]
    CellOccupied(GridPosition),

    #[error("target is {distance} tiles away, only {movement_points} movement points left")]
    OutOfMovementRange { distance: u32, movement_points: u32 },

    #[error("unit {0} is on the same side")]
    FriendlyTarget(CombatantId),

    #[error("target {0} is already destroyed")]
    TargetDestroyed(CombatantId),

    #[error("target is {distance} tiles away, weapon range is {weapon_range}")]
    OutOfWeaponRange { distance: u32, weapon_range: u32 },

    #[error("no side of this engagement is under interactive control")]
    NoControlledSide,
}

/// What a successful action did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionEffect {
    Selected {
        unit: CombatantId,
    },
    Moved {
        unit: CombatantId,
        from: GridPosition,
        to: GridPosition,
        path: Vec<GridPosition>,
    },
    Attacked {
        attacker: CombatantId,
        target: CombatantId,
        damage: f32,
        destroyed: bool,
    },
    Passed {
        unit: CombatantId,
    },
    TurnEnded {
        next: Option<CombatantId>,
    },
    RoundAdvanced {
        round: u32,
    },
    Retreated {
        side: Side,
    },
}

/// Options open to the unit a front end is looking at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalOptions {
    pub active_unit: Option<CombatantId>,
    pub legal_moves: Vec<GridPosition>,
    pub legal_targets: Vec<CombatantId>,
}

/// Outcome of one control call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub result: Result<ActionEffect, ActionError>,
    pub options: LegalOptions,
    pub phase: TacticalPhase,
    pub round: u32,
}

impl ActionReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl TacticalEngagement {
    /// Inspect a unit. While a unit is selected, reported options describe
    /// it instead of the unit holding the turn.
    pub fn select_unit(&mut self, id: CombatantId) -> ActionReport {
        let result = match self.unit_by_id(id) {
            None => Err(ActionError::UnitNotFound(id)),
            Some(unit) if !unit.is_alive() => Err(ActionError::UnitDestroyed(id)),
            Some(_) if self.is_ended() => Err(ActionError::EngagementEnded),
            Some(_) => {
                self.selected = Some(id);
                Ok(ActionEffect::Selected { unit: id })
            }
        };
        self.report(result)
    }

    /// Move the controlled unit holding the turn
    pub fn move_unit(&mut self, target: GridPosition) -> ActionReport {
        let result = self
            .controlled_actor()
            .and_then(|actor| self.perform_move(actor, target));
        self.report(result)
    }

    /// Attack with the controlled unit holding the turn
    pub fn attack_unit(&mut self, target: CombatantId) -> ActionReport {
        let result = self
            .controlled_actor()
            .and_then(|actor| self.perform_attack(actor, target));
        self.report(result)
    }

    /// Forfeit the current unit's remaining actions and end its turn
    pub fn pass_turn(&mut self) -> ActionReport {
        let result = self.controlled_actor().map(|actor| {
            let effect = self.forfeit(actor);
            self.hand_over_turn();
            effect
        });
        self.report(result)
    }

    /// End the current unit's turn. Automated units then act until a
    /// controlled unit holds the turn again.
    pub fn end_turn(&mut self) -> ActionReport {
        let result = self.controlled_actor().map(|_| {
            self.hand_over_turn();
            ActionEffect::TurnEnded {
                next: self.current_unit().map(|u| u.id()),
            }
        });
        self.report(result)
    }

    /// Finish the round: controlled units that have not acted forfeit,
    /// automated units still take their turns. Refused when no side is
    /// controlled; use `auto_resolve` for those.
    pub fn advance_round(&mut self) -> ActionReport {
        if self.is_ended() {
            return self.report(Err(ActionError::EngagementEnded));
        }
        if self.controlled_side().is_none() {
            return self.report(Err(ActionError::NoControlledSide));
        }

        let starting_round = self.round();
        while let Some(actor) = self.current_ref() {
            if self.round() != starting_round {
                break;
            }
            if Some(actor.side) == self.controlled_side() {
                self.forfeit(actor);
            } else {
                crate::battle::ai::take_turn(self, actor);
            }
            self.advance_turn();
        }
        self.selected = None;
        self.play_automated_turns();

        let round = self.round();
        self.report(Ok(ActionEffect::RoundAdvanced { round }))
    }

    /// Withdraw the controlled side. Ends the engagement with everyone
    /// still alive counted as a survivor.
    pub fn retreat(&mut self) -> ActionReport {
        let result = match self.controlled_side() {
            None => Err(ActionError::NoControlledSide),
            Some(_) if self.is_ended() => Err(ActionError::EngagementEnded),
            Some(side) => {
                self.withdraw(side);
                Ok(ActionEffect::Retreated { side })
            }
        };
        self.report(result)
    }

    /// Legal moves and targets for the selected unit, or the unit holding
    /// the turn when nothing is selected
    pub fn legal_options(&self) -> LegalOptions {
        if self.is_ended() {
            return LegalOptions::default();
        }
        let Some(id) = self.selected.or_else(|| self.current_unit().map(|u| u.id())) else {
            return LegalOptions::default();
        };
        let Some(unit) = self.unit_by_id(id) else {
            return LegalOptions::default();
        };

        let legal_targets = if unit.is_alive() && unit.state.can_attack() {
            self.targets_in_range(id).into_iter().map(|t| t.id()).collect()
        } else {
            Vec::new()
        };

        LegalOptions {
            active_unit: Some(id),
            legal_moves: self.reachable_cells(id),
            legal_targets,
        }
    }

    /// The unit holding the turn, if it is ours to command. A selection of
    /// some other unit blocks actions.
    fn controlled_actor(&self) -> Result<UnitRef, ActionError> {
        if self.is_ended() {
            return Err(ActionError::EngagementEnded);
        }
        let actor = self.current_ref().ok_or(ActionError::NoActiveUnit)?;
        let unit = self.unit(actor);
        if let Some(selected) = self.selected {
            if selected != unit.id() {
                return Err(ActionError::NotCurrentUnit(selected));
            }
        }
        match self.controlled_side() {
            None => Err(ActionError::NoControlledSide),
            Some(side) if side != actor.side => Err(ActionError::NotControlled),
            Some(_) => Ok(actor),
        }
    }

    fn hand_over_turn(&mut self) {
        self.selected = None;
        self.advance_turn();
        self.play_automated_turns();
    }

    fn report(&self, result: Result<ActionEffect, ActionError>) -> ActionReport {
        if let Err(e) = &result {
            tracing::debug!("Action refused: {}", e);
        }
        ActionReport {
            result,
            options: self.legal_options(),
            phase: self.phase(),
            round: self.round(),
        }
    }
}
