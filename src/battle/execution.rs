//! Tactical engagement state machine
//!
//! Setup -> AwaitingTurn(unit) -> RoundComplete -> ... -> Ended
//!
//! Units act one at a time in a fixed initiative order. Dead units keep their
//! slot in the queue and are skipped.

use ahash::AHashSet;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::ai;
use crate::battle::control::{ActionEffect, ActionError};
use crate::battle::grid::{CombatGrid, GridPosition};
use crate::battle::units::{CombatUnit, TurnState, UnitRef};
use crate::combat::combatant::Combatant;
use crate::combat::damage::calculate_damage;
use crate::combat::encounter::Encounter;
use crate::combat::result::{BattleResult, Side, Termination};
use crate::core::config::{ArenaConfig, CombatConfig};
use crate::core::error::{CombatError, Result};
use crate::core::types::{CombatantId, FactionId, Vec2};

/// Engagement phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacticalPhase {
    /// Deploying units and rolling initiative
    Setup,
    /// Waiting for this unit to act
    AwaitingTurn(CombatantId),
    /// Initiative queue exhausted, end-of-round checks running
    RoundComplete,
    Ended,
}

/// Something that happened during the engagement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalEvent {
    pub round: u32,
    pub effect: ActionEffect,
}

/// A turn-based grid battle between two forces
#[derive(Debug, Clone)]
pub struct TacticalEngagement {
    factions: (FactionId, FactionId),
    grid: CombatGrid,
    initiator: Vec<CombatUnit>,
    responder: Vec<CombatUnit>,
    initiative: Vec<UnitRef>,
    cursor: usize,
    round: u32,
    max_rounds: u32,
    phase: TacticalPhase,
    location: Vec2,
    controlled: Option<Side>,
    pub(crate) selected: Option<CombatantId>,
    rng: ChaCha8Rng,
    events: Vec<TacticalEvent>,
    result: Option<BattleResult>,
}

impl TacticalEngagement {
    /// Deploy both forces and start the first round.
    ///
    /// Dead combatants are left out. If either side has nobody to deploy the
    /// engagement ends at once as no battle. Fails if a side does not fit in
    /// its half of the arena.
    pub fn new(
        factions: (FactionId, FactionId),
        initiator: Vec<Combatant>,
        responder: Vec<Combatant>,
        location: Vec2,
        controlled: Option<Side>,
        config: &CombatConfig,
        seed: u64,
    ) -> Result<Self> {
        let grid = CombatGrid::new(config.arena.width, config.arena.height);
        let initiator: Vec<Combatant> = initiator.into_iter().filter(|c| c.is_alive()).collect();
        let responder: Vec<Combatant> = responder.into_iter().filter(|c| c.is_alive()).collect();

        let mut taken = AHashSet::new();
        let initiator = deploy(&grid, &config.arena, Side::Initiator, initiator, &mut taken)?;
        let responder = deploy(&grid, &config.arena, Side::Responder, responder, &mut taken)?;

        let mut engagement = Self {
            factions,
            grid,
            initiator,
            responder,
            initiative: Vec::new(),
            cursor: 0,
            round: 1,
            max_rounds: config.max_rounds.max(1),
            phase: TacticalPhase::Setup,
            location,
            controlled,
            selected: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
            result: None,
        };

        if engagement.initiator.is_empty() || engagement.responder.is_empty() {
            tracing::warn!(
                "Tactical engagement at ({:.0}, {:.0}) has an empty side; no battle",
                location.x,
                location.y
            );
            let initiator: Vec<Combatant> =
                engagement.initiator.iter().map(|u| u.combatant.clone()).collect();
            let responder: Vec<Combatant> =
                engagement.responder.iter().map(|u| u.combatant.clone()).collect();
            engagement.result = Some(BattleResult::no_battle(
                factions, &initiator, &responder, location,
            ));
            engagement.phase = TacticalPhase::Ended;
            return Ok(engagement);
        }

        engagement.roll_initiative();
        engagement.settle_cursor();

        tracing::info!(
            "Tactical engagement {:?} vs {:?} deployed: {} vs {} units, controlled side {:?}",
            factions.0,
            factions.1,
            engagement.initiator.len(),
            engagement.responder.len(),
            controlled
        );

        if controlled.is_some() {
            engagement.play_automated_turns();
        }

        Ok(engagement)
    }

    /// Snapshot both groups of an encounter into a new engagement
    pub fn from_encounter(
        encounter: &Encounter<'_>,
        controlled: Option<Side>,
        config: &CombatConfig,
        seed: u64,
    ) -> Result<Self> {
        Self::new(
            (encounter.key.initiator, encounter.key.responder),
            encounter.initiator.iter().map(|c| (*c).clone()).collect(),
            encounter.responder.iter().map(|c| (*c).clone()).collect(),
            encounter.location,
            controlled,
            config,
            seed,
        )
    }

    // === QUERIES ===

    pub fn phase(&self) -> TacticalPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn is_ended(&self) -> bool {
        self.phase == TacticalPhase::Ended
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn grid(&self) -> &CombatGrid {
        &self.grid
    }

    pub fn location(&self) -> Vec2 {
        self.location
    }

    pub fn factions(&self) -> (FactionId, FactionId) {
        self.factions
    }

    pub fn controlled_side(&self) -> Option<Side> {
        self.controlled
    }

    pub fn events(&self) -> &[TacticalEvent] {
        &self.events
    }

    /// Take the event log, leaving it empty
    pub fn drain_events(&mut self) -> Vec<TacticalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Roster of one side, dead units included
    pub fn units(&self, side: Side) -> &[CombatUnit] {
        match side {
            Side::Initiator => &self.initiator,
            Side::Responder => &self.responder,
        }
    }

    pub fn living(&self, side: Side) -> usize {
        self.units(side).iter().filter(|u| u.is_alive()).count()
    }

    /// Initiative order fixed at setup
    pub fn initiative(&self) -> Vec<CombatantId> {
        self.initiative.iter().map(|r| self.unit(*r).id()).collect()
    }

    pub fn unit_by_id(&self, id: CombatantId) -> Option<&CombatUnit> {
        self.find(id).map(|r| self.unit(r))
    }

    /// Living unit standing on a tile
    pub fn unit_at(&self, pos: GridPosition) -> Option<&CombatUnit> {
        self.all_units().find(|u| u.is_alive() && u.position == pos)
    }

    /// Tiles held by living units
    pub fn occupied_positions(&self) -> AHashSet<GridPosition> {
        self.all_units()
            .filter(|u| u.is_alive())
            .map(|u| u.position)
            .collect()
    }

    /// Living enemies within the unit's weapon range
    pub fn targets_in_range(&self, id: CombatantId) -> Vec<&CombatUnit> {
        let Some(unit) = self.unit_by_id(id) else {
            return Vec::new();
        };
        self.units(unit.side.opposite())
            .iter()
            .filter(|e| e.is_alive() && unit.in_weapon_range(e.position))
            .collect()
    }

    /// Free tiles the unit could move to right now
    pub fn reachable_cells(&self, id: CombatantId) -> Vec<GridPosition> {
        let Some(unit) = self.unit_by_id(id) else {
            return Vec::new();
        };
        if !unit.is_alive() || !unit.state.can_move() {
            return Vec::new();
        }
        let occupied = self.occupied_positions();
        self.grid
            .neighbors(unit.position, unit.movement_points)
            .into_iter()
            .filter(|p| !occupied.contains(p))
            .collect()
    }

    /// Unit holding the turn
    pub fn current_unit(&self) -> Option<&CombatUnit> {
        self.current_ref().map(|r| self.unit(r))
    }

    pub(crate) fn current_ref(&self) -> Option<UnitRef> {
        match self.phase {
            TacticalPhase::AwaitingTurn(_) => self.initiative.get(self.cursor).copied(),
            _ => None,
        }
    }

    pub(crate) fn find(&self, id: CombatantId) -> Option<UnitRef> {
        let locate = |side: Side, roster: &[CombatUnit]| {
            roster
                .iter()
                .position(|u| u.id() == id)
                .map(|index| UnitRef { side, index })
        };
        locate(Side::Initiator, &self.initiator).or_else(|| locate(Side::Responder, &self.responder))
    }

    pub(crate) fn unit(&self, r: UnitRef) -> &CombatUnit {
        &self.units(r.side)[r.index]
    }

    fn unit_mut(&mut self, r: UnitRef) -> &mut CombatUnit {
        match r.side {
            Side::Initiator => &mut self.initiator[r.index],
            Side::Responder => &mut self.responder[r.index],
        }
    }

    fn all_units(&self) -> impl Iterator<Item = &CombatUnit> {
        self.initiator.iter().chain(self.responder.iter())
    }

    // === ACTIONS ===

    /// Move a unit. Rejections leave the engagement untouched.
    pub(crate) fn perform_move(
        &mut self,
        actor: UnitRef,
        target: GridPosition,
    ) -> std::result::Result<ActionEffect, ActionError> {
        if self.is_ended() {
            return Err(ActionError::EngagementEnded);
        }
        let unit = self.unit(actor);
        if !unit.is_alive() {
            return Err(ActionError::UnitDestroyed(unit.id()));
        }
        if !unit.state.can_move() {
            return Err(ActionError::AlreadyMoved(unit.id()));
        }
        if !self.grid.in_bounds(target) {
            return Err(ActionError::OutOfBounds(target));
        }
        let occupied = self.occupied_positions();
        if occupied.contains(&target) {
            return Err(ActionError::CellOccupied(target));
        }
        if !unit.can_reach(target) {
            return Err(ActionError::OutOfMovementRange {
                distance: unit.position.distance(&target),
                movement_points: unit.movement_points,
            });
        }

        let id = unit.id();
        let from = unit.position;
        let path = self.grid.path(from, target, &occupied);

        let unit = self.unit_mut(actor);
        unit.movement_points = unit.movement_points.saturating_sub(from.distance(&target));
        unit.position = target;
        unit.state = unit.state.after_move();

        let effect = ActionEffect::Moved {
            unit: id,
            from,
            to: target,
            path,
        };
        self.log(effect.clone());
        Ok(effect)
    }

    /// Attack a unit. Ends the engagement if the target's side is wiped out.
    pub(crate) fn perform_attack(
        &mut self,
        actor: UnitRef,
        target_id: CombatantId,
    ) -> std::result::Result<ActionEffect, ActionError> {
        if self.is_ended() {
            return Err(ActionError::EngagementEnded);
        }
        let unit = self.unit(actor);
        if !unit.is_alive() {
            return Err(ActionError::UnitDestroyed(unit.id()));
        }
        if !unit.state.can_attack() {
            return Err(ActionError::AlreadyAttacked(unit.id()));
        }
        let target = self
            .find(target_id)
            .ok_or(ActionError::UnitNotFound(target_id))?;
        let defender = self.unit(target);
        if defender.side == unit.side {
            return Err(ActionError::FriendlyTarget(target_id));
        }
        if !defender.is_alive() {
            return Err(ActionError::TargetDestroyed(target_id));
        }
        if !unit.in_weapon_range(defender.position) {
            return Err(ActionError::OutOfWeaponRange {
                distance: unit.position.distance(&defender.position),
                weapon_range: unit.weapon_range(),
            });
        }

        let attacker = unit.combatant.clone();
        let defender = defender.combatant.clone();
        let damage = calculate_damage(&attacker, &defender, &mut self.rng);

        let destroyed = self.unit_mut(target).combatant.take_damage(damage);
        let unit = self.unit_mut(actor);
        unit.state = unit.state.after_attack();

        let effect = ActionEffect::Attacked {
            attacker: attacker.id,
            target: target_id,
            damage,
            destroyed,
        };
        self.log(effect.clone());

        if destroyed {
            tracing::debug!("{} destroyed by {} in round {}", target_id, attacker.id, self.round);
            if self.living(target.side) == 0 {
                self.finish(Termination::Decided);
            }
        }

        Ok(effect)
    }

    /// Give up whatever the unit has left this round
    pub(crate) fn forfeit(&mut self, actor: UnitRef) -> ActionEffect {
        let unit = self.unit_mut(actor);
        unit.state = TurnState::Done;
        let effect = ActionEffect::Passed { unit: unit.id() };
        self.log(effect.clone());
        effect
    }

    /// Leave the field with `side`. Both sides keep their survivors.
    pub(crate) fn withdraw(&mut self, side: Side) {
        tracing::info!(
            "{:?} withdraws from engagement at ({:.0}, {:.0}) in round {}",
            side,
            self.location.x,
            self.location.y,
            self.round
        );
        self.log(ActionEffect::Retreated { side });
        self.finish(Termination::Withdrawn(side));
    }

    /// Pass the turn to the next living unit, rolling the round over when
    /// the queue runs out
    pub(crate) fn advance_turn(&mut self) {
        if self.is_ended() {
            return;
        }
        self.cursor += 1;
        self.settle_cursor();
    }

    /// Run automated units until the engagement ends or an interactively
    /// controlled unit holds the turn
    pub fn play_automated_turns(&mut self) {
        while let Some(actor) = self.current_ref() {
            if Some(actor.side) == self.controlled {
                break;
            }
            ai::take_turn(self, actor);
            self.advance_turn();
        }
    }

    /// Play every remaining turn with the automated policy, controlled side
    /// included
    pub fn auto_resolve(&mut self) -> BattleResult {
        while let Some(actor) = self.current_ref() {
            ai::take_turn(self, actor);
            self.advance_turn();
        }
        self.final_result()
    }

    // === LIFECYCLE ===

    /// Sort by speed, fastest first. Ties use one random draw per unit,
    /// made here and never again.
    fn roll_initiative(&mut self) {
        let mut order: Vec<(OrderedFloat<f32>, OrderedFloat<f32>, UnitRef)> = Vec::new();
        for side in [Side::Initiator, Side::Responder] {
            for index in 0..self.units(side).len() {
                let speed = self.units(side)[index].combatant.speed;
                let tiebreak: f32 = self.rng.gen();
                order.push((OrderedFloat(speed), OrderedFloat(tiebreak), UnitRef { side, index }));
            }
        }
        order.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        self.initiative = order.into_iter().map(|(_, _, r)| r).collect();
    }

    /// Move the cursor onto the next living unit, completing rounds as
    /// needed
    fn settle_cursor(&mut self) {
        loop {
            while self.cursor < self.initiative.len()
                && !self.unit(self.initiative[self.cursor]).is_alive()
            {
                self.cursor += 1;
            }

            if let Some(r) = self.initiative.get(self.cursor) {
                self.phase = TacticalPhase::AwaitingTurn(self.unit(*r).id());
                return;
            }

            if !self.complete_round() {
                return;
            }
        }
    }

    /// End-of-round checks. Returns false if the engagement ended.
    fn complete_round(&mut self) -> bool {
        self.phase = TacticalPhase::RoundComplete;

        if self.living(Side::Initiator) == 0 || self.living(Side::Responder) == 0 {
            self.finish(Termination::Decided);
            return false;
        }
        if self.round >= self.max_rounds {
            self.finish(Termination::Timeout);
            return false;
        }

        self.round += 1;
        self.cursor = 0;
        for unit in self.initiator.iter_mut().chain(self.responder.iter_mut()) {
            if unit.is_alive() {
                unit.reset_for_round();
            }
        }
        tracing::debug!("Tactical round {} begins", self.round);
        true
    }

    fn finish(&mut self, termination: Termination) {
        let result = self.build_result(termination);
        tracing::info!(
            "Tactical engagement {:?} vs {:?} ended after {} rounds: {:?}",
            self.factions.0,
            self.factions.1,
            self.round,
            result.outcome
        );
        self.result = Some(result);
        self.phase = TacticalPhase::Ended;
        self.selected = None;
    }

    fn build_result(&self, termination: Termination) -> BattleResult {
        let initiator: Vec<Combatant> = self.initiator.iter().map(|u| u.combatant.clone()).collect();
        let responder: Vec<Combatant> = self.responder.iter().map(|u| u.combatant.clone()).collect();
        BattleResult::conclude(
            self.factions,
            &initiator,
            &responder,
            self.round,
            self.location,
            termination,
        )
    }

    fn final_result(&self) -> BattleResult {
        match &self.result {
            Some(result) => result.clone(),
            None => self.build_result(Termination::Decided),
        }
    }

    fn log(&mut self, effect: ActionEffect) {
        self.events.push(TacticalEvent {
            round: self.round,
            effect,
        });
    }
}

/// Preferred tile for the `index`-th unit of a side: row-major within the
/// side's deployment columns, overflow clamped to the last row
pub fn deployment_slot(arena: &ArenaConfig, side: Side, index: usize) -> GridPosition {
    let columns = arena.deployment_columns.max(1) as usize;
    let column = (index % columns) as i32;
    let row = (index / columns).min(arena.height.saturating_sub(1) as usize) as i32;
    let x = match side {
        Side::Initiator => column,
        Side::Responder => arena.width as i32 - 1 - column,
    };
    GridPosition::new(x, row)
}

/// Place a side on the grid. Units whose slot is taken go to the nearest
/// free tile in their own half.
fn deploy(
    grid: &CombatGrid,
    arena: &ArenaConfig,
    side: Side,
    combatants: Vec<Combatant>,
    taken: &mut AHashSet<GridPosition>,
) -> Result<Vec<CombatUnit>> {
    let half = (grid.width / 2) as i32;
    let in_own_half = |p: &GridPosition| match side {
        Side::Initiator => p.x < half,
        Side::Responder => p.x >= half,
    };

    let mut units = Vec::with_capacity(combatants.len());
    for (index, combatant) in combatants.into_iter().enumerate() {
        let preferred = deployment_slot(arena, side, index);
        let position = if taken.contains(&preferred) {
            grid.cells_in_range(preferred, grid.width + grid.height)
                .into_iter()
                .filter(|p| in_own_half(p) && !taken.contains(p))
                .min_by_key(|p| (p.distance(&preferred), p.y, p.x))
                .ok_or_else(|| {
                    CombatError::Deployment(format!(
                        "{:?} side has more units than its half of a {}x{} arena can hold",
                        side, grid.width, grid.height
                    ))
                })?
        } else {
            preferred
        };

        taken.insert(position);
        units.push(CombatUnit::new(combatant, side, position));
    }
    Ok(units)
}
