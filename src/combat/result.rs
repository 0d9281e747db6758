//! Battle outcomes shared by strategic and tactical resolution

use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::core::types::{CombatantId, FactionId, Vec2};

/// One of the two forces in an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Initiator,
    Responder,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Initiator => Side::Responder,
            Side::Responder => Side::Initiator,
        }
    }
}

/// How a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InitiatorVictory,
    ResponderVictory,
    /// Equal survivor counts, including mutual annihilation
    Draw,
    /// Round ceiling reached with both sides still standing
    Timeout,
    /// One side left the field; both sides keep their survivors
    Withdrawn { side: Side },
    /// One side had no living units when the encounter was resolved
    NoBattle,
}

impl Outcome {
    /// Strictly more survivors wins; equal counts draw
    pub fn by_survivors(initiator_alive: usize, responder_alive: usize) -> Self {
        match initiator_alive.cmp(&responder_alive) {
            std::cmp::Ordering::Greater => Outcome::InitiatorVictory,
            std::cmp::Ordering::Less => Outcome::ResponderVictory,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::InitiatorVictory => Some(Side::Initiator),
            Outcome::ResponderVictory => Some(Side::Responder),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw | Outcome::Timeout)
    }
}

/// How resolution stopped, before the outcome is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// At least one side was eliminated
    Decided,
    Timeout,
    Withdrawn(Side),
}

/// Immutable record of a finished battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub initiator_faction: FactionId,
    pub responder_faction: FactionId,
    pub outcome: Outcome,
    /// Living initiator units with their final hit points
    pub initiator_survivors: Vec<Combatant>,
    pub responder_survivors: Vec<Combatant>,
    pub initiator_destroyed: usize,
    pub responder_destroyed: usize,
    /// Ids of every unit destroyed in this battle, initiator side first
    pub casualties: Vec<CombatantId>,
    pub rounds: u32,
    pub location: Vec2,
}

impl BattleResult {
    /// Build a result from the final state of both rosters
    pub fn conclude(
        factions: (FactionId, FactionId),
        initiator: &[Combatant],
        responder: &[Combatant],
        rounds: u32,
        location: Vec2,
        termination: Termination,
    ) -> Self {
        let initiator_survivors: Vec<Combatant> =
            initiator.iter().filter(|c| c.is_alive()).cloned().collect();
        let responder_survivors: Vec<Combatant> =
            responder.iter().filter(|c| c.is_alive()).cloned().collect();

        let casualties = initiator
            .iter()
            .chain(responder.iter())
            .filter(|c| !c.is_alive())
            .map(|c| c.id)
            .collect();

        let outcome = match termination {
            Termination::Decided => {
                Outcome::by_survivors(initiator_survivors.len(), responder_survivors.len())
            }
            Termination::Timeout => Outcome::Timeout,
            Termination::Withdrawn(side) => Outcome::Withdrawn { side },
        };

        Self {
            initiator_faction: factions.0,
            responder_faction: factions.1,
            outcome,
            initiator_destroyed: initiator.len() - initiator_survivors.len(),
            responder_destroyed: responder.len() - responder_survivors.len(),
            initiator_survivors,
            responder_survivors,
            casualties,
            rounds,
            location,
        }
    }

    /// Result for an encounter that had nobody to fight on one side
    pub fn no_battle(
        factions: (FactionId, FactionId),
        initiator: &[Combatant],
        responder: &[Combatant],
        location: Vec2,
    ) -> Self {
        Self {
            initiator_faction: factions.0,
            responder_faction: factions.1,
            outcome: Outcome::NoBattle,
            initiator_survivors: initiator.iter().filter(|c| c.is_alive()).cloned().collect(),
            responder_survivors: responder.iter().filter(|c| c.is_alive()).cloned().collect(),
            initiator_destroyed: 0,
            responder_destroyed: 0,
            casualties: Vec::new(),
            rounds: 0,
            location,
        }
    }

    /// True only for a clean initiator victory
    pub fn attacker_won(&self) -> bool {
        self.outcome == Outcome::InitiatorVictory
    }

    pub fn is_draw(&self) -> bool {
        self.outcome.is_draw()
    }

    pub fn survivors(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Initiator => &self.initiator_survivors,
            Side::Responder => &self.responder_survivors,
        }
    }

    pub fn destroyed(&self, side: Side) -> usize {
        match side {
            Side::Initiator => self.initiator_destroyed,
            Side::Responder => self.responder_destroyed,
        }
    }

    pub fn faction(&self, side: Side) -> FactionId {
        match side {
            Side::Initiator => self.initiator_faction,
            Side::Responder => self.responder_faction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::ShipClass;

    fn ship(id: u32, faction: u32, hp: f32) -> Combatant {
        Combatant::from_class(
            CombatantId::new(id),
            FactionId::new(faction),
            Vec2::default(),
            ShipClass::Fighter,
        )
        .with_hp(hp)
    }

    const FACTIONS: (FactionId, FactionId) = (FactionId(0), FactionId(1));

    #[test]
    fn test_strictly_more_survivors_wins() {
        assert_eq!(Outcome::by_survivors(2, 1), Outcome::InitiatorVictory);
        assert_eq!(Outcome::by_survivors(0, 3), Outcome::ResponderVictory);
        assert_eq!(Outcome::by_survivors(2, 2), Outcome::Draw);
        assert_eq!(Outcome::by_survivors(0, 0), Outcome::Draw);
    }

    #[test]
    fn test_conclude_counts_casualties() {
        let initiator = vec![ship(1, 0, 40.0), ship(2, 0, 0.0)];
        let responder = vec![ship(3, 1, 0.0), ship(4, 1, 0.0)];

        let result = BattleResult::conclude(
            FACTIONS,
            &initiator,
            &responder,
            4,
            Vec2::default(),
            Termination::Decided,
        );

        assert!(result.attacker_won());
        assert_eq!(result.initiator_survivors.len(), 1);
        assert_eq!(result.initiator_destroyed, 1);
        assert_eq!(result.responder_destroyed, 2);
        assert_eq!(
            result.casualties,
            vec![CombatantId(2), CombatantId(3), CombatantId(4)]
        );
        assert_eq!(result.rounds, 4);
    }

    #[test]
    fn test_timeout_is_not_a_win() {
        let initiator = vec![ship(1, 0, 80.0), ship(2, 0, 80.0)];
        let responder = vec![ship(3, 1, 10.0)];

        let result = BattleResult::conclude(
            FACTIONS,
            &initiator,
            &responder,
            50,
            Vec2::default(),
            Termination::Timeout,
        );

        assert_eq!(result.outcome, Outcome::Timeout);
        assert!(result.is_draw());
        assert!(!result.attacker_won());
        assert_eq!(result.outcome.winner(), None);
    }

    #[test]
    fn test_withdrawal_keeps_everyone() {
        let initiator = vec![ship(1, 0, 5.0)];
        let responder = vec![ship(3, 1, 80.0)];

        let result = BattleResult::conclude(
            FACTIONS,
            &initiator,
            &responder,
            3,
            Vec2::default(),
            Termination::Withdrawn(Side::Initiator),
        );

        assert_eq!(
            result.outcome,
            Outcome::Withdrawn {
                side: Side::Initiator
            }
        );
        assert_eq!(result.survivors(Side::Initiator).len(), 1);
        assert_eq!(result.survivors(Side::Responder).len(), 1);
        assert!(result.casualties.is_empty());
        assert!(!result.is_draw());
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Initiator.opposite(), Side::Responder);
        assert_eq!(Side::Responder.opposite(), Side::Initiator);
    }
}
