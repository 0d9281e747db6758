//! Automated unit policy
//!
//! Greedy and single-target: close on the nearest enemy and shoot it. No
//! lookahead, no formations, no focus fire.

use serde::{Deserialize, Serialize};

use crate::battle::execution::TacticalEngagement;
use crate::battle::grid::GridPosition;
use crate::battle::units::{CombatUnit, UnitRef};
use crate::core::types::CombatantId;

/// What the policy wants a unit to do with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannedAction {
    /// Target already in range
    Attack(CombatantId),
    /// Move towards the target, then fire if it ends up in range
    Advance {
        to: GridPosition,
        then_attack: Option<CombatantId>,
    },
    Hold,
}

/// Nearest living enemy by taxicab distance; ties go to roster order
pub fn nearest_enemy<'a>(
    engagement: &'a TacticalEngagement,
    unit: &CombatUnit,
) -> Option<&'a CombatUnit> {
    engagement
        .units(unit.side.opposite())
        .iter()
        .filter(|e| e.is_alive())
        .min_by_key(|e| unit.position.distance(&e.position))
}

/// Decide a unit's turn without touching the engagement
pub fn plan_turn(engagement: &TacticalEngagement, id: CombatantId) -> PlannedAction {
    let Some(unit) = engagement.unit_by_id(id) else {
        return PlannedAction::Hold;
    };
    if !unit.is_alive() {
        return PlannedAction::Hold;
    }
    let Some(enemy) = nearest_enemy(engagement, unit) else {
        return PlannedAction::Hold;
    };

    if unit.state.can_attack() && unit.in_weapon_range(enemy.position) {
        return PlannedAction::Attack(enemy.id());
    }

    if !unit.state.can_move() {
        return PlannedAction::Hold;
    }

    // Best free tile even if no closer than where the unit stands; first
    // minimum in scan order wins
    let step = engagement
        .reachable_cells(id)
        .into_iter()
        .min_by_key(|p| p.distance(&enemy.position));

    match step {
        Some(to) => {
            let in_range_after = to.distance(&enemy.position) <= unit.weapon_range();
            let then_attack = (unit.state.can_attack() && in_range_after).then(|| enemy.id());
            PlannedAction::Advance { to, then_attack }
        }
        None => PlannedAction::Hold,
    }
}

/// Plan and carry out a unit's turn
pub(crate) fn take_turn(engagement: &mut TacticalEngagement, actor: UnitRef) {
    let id = engagement.unit(actor).id();
    match plan_turn(engagement, id) {
        PlannedAction::Attack(target) => {
            if let Err(e) = engagement.perform_attack(actor, target) {
                tracing::debug!("Automated attack by {} rejected: {}", id, e);
            }
        }
        PlannedAction::Advance { to, then_attack } => {
            if let Err(e) = engagement.perform_move(actor, to) {
                tracing::debug!("Automated move by {} rejected: {}", id, e);
                return;
            }
            if let Some(target) = then_attack {
                if let Err(e) = engagement.perform_attack(actor, target) {
                    tracing::debug!("Automated attack by {} rejected: {}", id, e);
                }
            }
        }
        PlannedAction::Hold => {}
    }
}
