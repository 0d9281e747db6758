//! Combat core - damage, encounter detection and strategic auto-resolve
//!
//! Everything here works on combatant snapshots handed in by the caller.

pub mod combatant;
pub mod constants;
pub mod damage;
pub mod encounter;
pub mod relations;
pub mod result;
pub mod strategic;
pub mod weapons;

pub use combatant::{CombatStats, Combatant};
pub use damage::{calculate_damage, damage_with_roll, defense_reduction};
pub use encounter::{cell_center, cell_of, detect_encounters, Cell, Encounter, EncounterKey};
pub use relations::{FactionRelations, Relation};
pub use result::{BattleResult, Outcome, Side, Termination};
pub use strategic::{StrategicBattle, StrategicPhase};
pub use weapons::{ClassStats, ShipClass, WeaponClass};
