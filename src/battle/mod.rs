//! Tactical battles - turn-based combat on a square grid
//!
//! Units deploy on opposite edges of a small arena and act one at a time in
//! a fixed initiative order. Either side may be driven by a player through
//! the control surface or by the automated policy.

pub mod ai;
pub mod control;
pub mod execution;
pub mod grid;
pub mod units;

// Re-exports for convenient access
pub use ai::{nearest_enemy, plan_turn, PlannedAction};
pub use control::{ActionEffect, ActionError, ActionReport, LegalOptions};
pub use execution::{deployment_slot, TacticalEngagement, TacticalEvent, TacticalPhase};
pub use grid::{CombatGrid, GridPosition};
pub use units::{movement_points_for, CombatUnit, TurnState, UnitRef};
