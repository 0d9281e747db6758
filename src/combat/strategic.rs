//! Strategic auto-resolve
//!
//! Each round the initiator fires a volley, then the responder. Every living
//! unit picks one random living enemy. Resolution stops as soon as a side is
//! wiped out or the round ceiling is reached.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::combat::damage::calculate_damage;
use crate::combat::encounter::Encounter;
use crate::combat::result::{BattleResult, Side, Termination};
use crate::core::types::{FactionId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategicPhase {
    #[default]
    Active,
    Resolved,
}

/// A non-interactive battle between two forces
#[derive(Debug, Clone)]
pub struct StrategicBattle {
    factions: (FactionId, FactionId),
    initiator: Vec<Combatant>,
    responder: Vec<Combatant>,
    pub round: u32,
    pub max_rounds: u32,
    pub phase: StrategicPhase,
    pub location: Vec2,
    result: Option<BattleResult>,
}

impl StrategicBattle {
    /// Create a battle from owned rosters. Dead units are dropped; a side
    /// with nobody left resolves at once as no battle.
    pub fn new(
        factions: (FactionId, FactionId),
        initiator: Vec<Combatant>,
        responder: Vec<Combatant>,
        location: Vec2,
        max_rounds: u32,
    ) -> Self {
        let initiator: Vec<Combatant> = initiator.into_iter().filter(|c| c.is_alive()).collect();
        let responder: Vec<Combatant> = responder.into_iter().filter(|c| c.is_alive()).collect();

        let mut battle = Self {
            factions,
            initiator,
            responder,
            round: 0,
            max_rounds: max_rounds.max(1),
            phase: StrategicPhase::Active,
            location,
            result: None,
        };

        if battle.initiator.is_empty() || battle.responder.is_empty() {
            tracing::warn!(
                "Strategic battle at ({:.0}, {:.0}) has an empty side; no battle",
                location.x,
                location.y
            );
            battle.result = Some(BattleResult::no_battle(
                factions,
                &battle.initiator,
                &battle.responder,
                location,
            ));
            battle.phase = StrategicPhase::Resolved;
        }

        battle
    }

    /// Snapshot both groups of an encounter
    pub fn from_encounter(encounter: &Encounter<'_>, max_rounds: u32) -> Self {
        Self::new(
            (encounter.key.initiator, encounter.key.responder),
            encounter.initiator.iter().map(|c| (*c).clone()).collect(),
            encounter.responder.iter().map(|c| (*c).clone()).collect(),
            encounter.location,
            max_rounds,
        )
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == StrategicPhase::Resolved
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn units(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Initiator => &self.initiator,
            Side::Responder => &self.responder,
        }
    }

    pub fn living(&self, side: Side) -> usize {
        self.units(side).iter().filter(|c| c.is_alive()).count()
    }

    /// Play one round. Returns true once the battle is resolved.
    pub fn execute_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_resolved() {
            return true;
        }

        self.round += 1;

        fire_volley(&self.initiator, &mut self.responder, rng);
        if self.living(Side::Responder) == 0 {
            self.finish(Termination::Decided);
            return true;
        }

        fire_volley(&self.responder, &mut self.initiator, rng);
        if self.living(Side::Initiator) == 0 {
            self.finish(Termination::Decided);
            return true;
        }

        if self.round >= self.max_rounds {
            self.finish(Termination::Timeout);
            return true;
        }

        false
    }

    /// Run rounds until the battle resolves
    pub fn resolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BattleResult {
        while !self.execute_round(rng) {}

        match &self.result {
            Some(result) => result.clone(),
            // execute_round only returns true after storing a result
            None => BattleResult::no_battle(
                self.factions,
                &self.initiator,
                &self.responder,
                self.location,
            ),
        }
    }

    fn finish(&mut self, termination: Termination) {
        let result = BattleResult::conclude(
            self.factions,
            &self.initiator,
            &self.responder,
            self.round,
            self.location,
            termination,
        );
        tracing::debug!(
            "Strategic battle {:?} vs {:?} resolved after {} rounds: {:?}",
            self.factions.0,
            self.factions.1,
            self.round,
            result.outcome
        );
        self.result = Some(result);
        self.phase = StrategicPhase::Resolved;
    }
}

/// Every living attacker hits one random living defender. A defender leaves
/// the target pool the moment its hit points reach zero.
fn fire_volley<R: Rng + ?Sized>(attackers: &[Combatant], defenders: &mut [Combatant], rng: &mut R) {
    for attacker in attackers.iter().filter(|c| c.is_alive()) {
        let living: Vec<usize> = defenders
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_alive())
            .map(|(i, _)| i)
            .collect();

        let Some(&target) = living.choose(rng) else {
            break;
        };

        let damage = calculate_damage(attacker, &defenders[target], rng);
        defenders[target].take_damage(damage);
    }
}
