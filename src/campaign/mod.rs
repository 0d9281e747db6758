//! Galaxy-level combat management across game turns

pub mod history;
pub mod orchestrator;

pub use history::{BattleHistory, BattleReport, ResolutionMode};
pub use orchestrator::{apply_casualties, CombatOrchestrator, TurnReport};
