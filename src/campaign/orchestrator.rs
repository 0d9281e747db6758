//! Per-turn combat lifecycle
//!
//! Each game turn the caller hands over every combatant and the relation
//! table. The orchestrator detects encounters, resolves AI-only fights on the
//! spot, opens tactical engagements for interactive factions, sweeps finished
//! engagements and reports casualties back.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::execution::TacticalEngagement;
use crate::campaign::history::{BattleHistory, BattleReport, ResolutionMode};
use crate::combat::combatant::Combatant;
use crate::combat::encounter::{detect_encounters, Encounter, EncounterKey};
use crate::combat::relations::FactionRelations;
use crate::combat::result::{BattleResult, Side};
use crate::combat::strategic::StrategicBattle;
use crate::core::config::CombatConfig;
use crate::core::error::Result;
use crate::core::types::{BattleId, CombatantId, FactionId, Vec2};

/// What one call to [`CombatOrchestrator::process`] did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub battles_started: usize,
    pub battles_resolved: usize,
    /// Every combatant destroyed this turn, sorted, no duplicates
    pub casualties: Vec<CombatantId>,
    /// Battles finished this turn, in resolution order
    pub reports: Vec<BattleReport>,
}

/// An interactive engagement carried across turns
#[derive(Debug, Clone)]
struct TrackedEngagement {
    id: BattleId,
    engagement: TacticalEngagement,
}

/// Combat manager for the whole galaxy
#[derive(Debug, Clone)]
pub struct CombatOrchestrator {
    config: CombatConfig,
    interactive: AHashSet<FactionId>,
    active: BTreeMap<EncounterKey, TrackedEngagement>,
    history: BattleHistory,
    next_battle_id: u64,
    turn: u64,
}

impl Default for CombatOrchestrator {
    fn default() -> Self {
        Self::build(CombatConfig::default())
    }
}

impl CombatOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a validated configuration
    pub fn with_config(config: CombatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CombatConfig) -> Self {
        Self {
            history: BattleHistory::new(config.history_capacity),
            config,
            interactive: AHashSet::new(),
            active: BTreeMap::new(),
            next_battle_id: 0,
            turn: 0,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Whether two ships are close enough to fight, using the configured
    /// `combat_range`. Encounter grouping itself is by cell; this is for
    /// callers deciding whether to bring ships together.
    pub fn in_combat_range(&self, a: &Combatant, b: &Combatant) -> bool {
        a.in_combat_range(b, self.config.combat_range)
    }

    /// Mark a faction as player-driven. Its battles go to the tactical grid.
    pub fn set_interactive(&mut self, faction: FactionId, interactive: bool) {
        if interactive {
            self.interactive.insert(faction);
        } else {
            self.interactive.remove(&faction);
        }
    }

    pub fn is_interactive(&self, faction: FactionId) -> bool {
        self.interactive.contains(&faction)
    }

    /// Number of game turns processed so far
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Resolve this turn's combat.
    ///
    /// Encounters resolve in key order. Damage carries over between
    /// overlapping encounters through a per-turn hit point ledger, so a unit
    /// destroyed in one encounter is absent from the next. Units locked in an
    /// unfinished tactical engagement are left out of other encounters; an
    /// encounter with a side made up only of such units waits for a later
    /// turn.
    pub fn process<R: Rng + ?Sized>(
        &mut self,
        combatants: &[Combatant],
        relations: &FactionRelations,
        rng: &mut R,
    ) -> TurnReport {
        self.turn += 1;
        let mut report = TurnReport::default();
        let mut ledger: AHashMap<CombatantId, f32> = AHashMap::new();
        let mut locked = self.locked_units();

        let encounters = detect_encounters(combatants, relations, self.config.encounter_cell_size);
        for encounter in &encounters {
            if self.active.contains_key(&encounter.key) {
                continue;
            }

            let initiator = free_units(&encounter.initiator, &locked);
            let responder = free_units(&encounter.responder, &locked);
            if initiator.is_empty() || responder.is_empty() {
                tracing::debug!(
                    "Encounter {:?} vs {:?} at {:?} deferred: a side is locked in another engagement",
                    encounter.key.initiator,
                    encounter.key.responder,
                    encounter.key.cell
                );
                continue;
            }

            let initiator = current_snapshot(&initiator, &ledger);
            let responder = current_snapshot(&responder, &ledger);
            report.battles_started += 1;

            let controlled = self.controlled_side(encounter);
            if controlled.is_some() && !initiator.is_empty() && !responder.is_empty() {
                let opened = self.open_engagement(
                    encounter,
                    initiator.clone(),
                    responder.clone(),
                    controlled,
                    rng,
                );
                match opened {
                    Ok(engagement) => {
                        record_roster_hp(&mut ledger, engagement);
                        if !engagement.is_ended() {
                            locked.extend(roster_ids(engagement));
                        }
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Falling back to strategic resolution at {:?}: {}",
                            encounter.key.cell,
                            e
                        );
                    }
                }
            }

            let mut battle = StrategicBattle::new(
                (encounter.key.initiator, encounter.key.responder),
                initiator,
                responder,
                encounter.location,
                self.config.max_rounds,
            );
            let result = battle.resolve(rng);
            record_hp(&mut ledger, &result);

            let id = self.allocate_id();
            report.reports.push(BattleReport {
                id,
                turn: self.turn,
                key: encounter.key,
                mode: ResolutionMode::Strategic,
                result,
            });
        }

        self.sweep_finished(&mut report);

        let mut casualties: Vec<CombatantId> = report
            .reports
            .iter()
            .flat_map(|r| r.result.casualties.iter().copied())
            .collect();
        casualties.sort();
        casualties.dedup();
        report.casualties = casualties;
        report.battles_resolved = report.reports.len();

        for battle in &report.reports {
            tracing::info!(
                "Battle {:?} at ({:.0}, {:.0}): {:?} vs {:?} -> {:?} after {} rounds",
                battle.id,
                battle.result.location.x,
                battle.result.location.y,
                battle.key.initiator,
                battle.key.responder,
                battle.result.outcome,
                battle.result.rounds
            );
            self.history.push(battle.clone());
        }

        tracing::debug!(
            "Turn {}: {} encounters, {} started, {} resolved, {} casualties, {} engagements open",
            self.turn,
            encounters.len(),
            report.battles_started,
            report.battles_resolved,
            report.casualties.len(),
            self.active.len()
        );

        report
    }

    fn controlled_side(&self, encounter: &Encounter<'_>) -> Option<Side> {
        if self.is_interactive(encounter.key.initiator) {
            Some(Side::Initiator)
        } else if self.is_interactive(encounter.key.responder) {
            Some(Side::Responder)
        } else {
            None
        }
    }

    fn open_engagement<R: Rng + ?Sized>(
        &mut self,
        encounter: &Encounter<'_>,
        initiator: Vec<Combatant>,
        responder: Vec<Combatant>,
        controlled: Option<Side>,
        rng: &mut R,
    ) -> Result<&TacticalEngagement> {
        let engagement = TacticalEngagement::new(
            (encounter.key.initiator, encounter.key.responder),
            initiator,
            responder,
            encounter.location,
            controlled,
            &self.config,
            rng.gen(),
        )?;
        let id = self.allocate_id();
        tracing::info!(
            "Battle {:?} opened as tactical engagement at {:?}",
            id,
            encounter.key.cell
        );
        let tracked = self
            .active
            .entry(encounter.key)
            .or_insert(TrackedEngagement { id, engagement });
        Ok(&tracked.engagement)
    }

    /// Units fighting in an engagement that has not ended yet. They stay out
    /// of other encounters until it does.
    fn locked_units(&self) -> AHashSet<CombatantId> {
        self.active
            .values()
            .filter(|t| !t.engagement.is_ended())
            .flat_map(|t| roster_ids(&t.engagement))
            .collect()
    }

    /// Move ended engagements out of the active set into the report
    fn sweep_finished(&mut self, report: &mut TurnReport) {
        let finished: Vec<EncounterKey> = self
            .active
            .iter()
            .filter(|(_, tracked)| tracked.engagement.is_ended())
            .map(|(key, _)| *key)
            .collect();

        for key in finished {
            let Some(tracked) = self.active.remove(&key) else {
                continue;
            };
            let Some(result) = tracked.engagement.result().cloned() else {
                continue;
            };
            report.reports.push(BattleReport {
                id: tracked.id,
                turn: self.turn,
                key,
                mode: ResolutionMode::Tactical,
                result,
            });
        }
    }

    fn allocate_id(&mut self) -> BattleId {
        let id = BattleId(self.next_battle_id);
        self.next_battle_id += 1;
        id
    }

    // === INTERACTIVE ACCESS ===

    pub fn engagement(&self, key: &EncounterKey) -> Option<&TacticalEngagement> {
        self.active.get(key).map(|t| &t.engagement)
    }

    pub fn engagement_mut(&mut self, key: &EncounterKey) -> Option<&mut TacticalEngagement> {
        self.active.get_mut(key).map(|t| &mut t.engagement)
    }

    /// Keys of tracked tactical engagements, finished ones included until
    /// the next sweep
    pub fn active_engagements(&self) -> Vec<EncounterKey> {
        self.active.keys().copied().collect()
    }

    /// Nearest engagement still in progress within `radius` of `location`
    pub fn engagement_at(
        &self,
        location: Vec2,
        radius: f32,
    ) -> Option<(EncounterKey, &TacticalEngagement)> {
        self.active
            .iter()
            .filter(|(_, t)| !t.engagement.is_ended())
            .map(|(key, t)| (*key, &t.engagement, t.engagement.location().distance(&location)))
            .filter(|(_, _, distance)| *distance <= radius)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(key, engagement, _)| (key, engagement))
    }

    // === HISTORY ===

    pub fn history(&self) -> &BattleHistory {
        &self.history
    }

    pub fn recent_reports(&self, count: usize) -> Vec<&BattleReport> {
        self.history.recent(count)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

fn free_units<'a>(group: &[&'a Combatant], locked: &AHashSet<CombatantId>) -> Vec<&'a Combatant> {
    group
        .iter()
        .filter(|c| !locked.contains(&c.id))
        .copied()
        .collect()
}

fn roster_ids(engagement: &TacticalEngagement) -> impl Iterator<Item = CombatantId> + '_ {
    [Side::Initiator, Side::Responder]
        .into_iter()
        .flat_map(move |side| engagement.units(side).iter().map(|u| u.id()))
}

/// Snapshot a group with this turn's damage applied, dropping the dead
fn current_snapshot(group: &[&Combatant], ledger: &AHashMap<CombatantId, f32>) -> Vec<Combatant> {
    group
        .iter()
        .map(|c| match ledger.get(&c.id) {
            Some(&hp) => (*c).clone().with_hp(hp),
            None => (*c).clone(),
        })
        .filter(|c| c.is_alive())
        .collect()
}

fn record_hp(ledger: &mut AHashMap<CombatantId, f32>, result: &BattleResult) {
    for survivor in result
        .initiator_survivors
        .iter()
        .chain(result.responder_survivors.iter())
    {
        ledger.insert(survivor.id, survivor.hp);
    }
    for id in &result.casualties {
        ledger.insert(*id, 0.0);
    }
}

/// Carry hit points out of a freshly opened engagement. Its opening
/// automated turns may already have destroyed units.
fn record_roster_hp(ledger: &mut AHashMap<CombatantId, f32>, engagement: &TacticalEngagement) {
    for side in [Side::Initiator, Side::Responder] {
        for unit in engagement.units(side) {
            ledger.insert(unit.id(), unit.combatant.hp);
        }
    }
}

/// Apply a turn's outcome to the caller's store: copy surviving hit points,
/// then remove every casualty. Returns how many combatants were removed.
pub fn apply_casualties(store: &mut Vec<Combatant>, report: &TurnReport) -> usize {
    let mut hp: AHashMap<CombatantId, f32> = AHashMap::new();
    for battle in &report.reports {
        for survivor in battle
            .result
            .initiator_survivors
            .iter()
            .chain(battle.result.responder_survivors.iter())
        {
            hp.insert(survivor.id, survivor.hp);
        }
    }

    for combatant in store.iter_mut() {
        if let Some(&value) = hp.get(&combatant.id) {
            combatant.hp = value;
        }
    }

    let dead: AHashSet<CombatantId> = report.casualties.iter().copied().collect();
    let before = store.len();
    store.retain(|c| !dead.contains(&c.id));
    before - store.len()
}
