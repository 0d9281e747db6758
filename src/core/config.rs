//! Combat configuration with documented tunables
//!
//! The encounter cell size and round ceiling have no derivation behind them;
//! they are kept here so a game can tune them for its own stat ranges.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::combat::constants::{DEFAULT_ENCOUNTER_CELL_SIZE, DEFAULT_MAX_ROUNDS};
use crate::core::error::{CombatError, Result};

/// Dimensions of the tactical arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width in tiles
    pub width: u32,

    /// Arena height in tiles
    pub height: u32,

    /// Number of columns each side deploys into (left for the initiator,
    /// right for the responder)
    pub deployment_columns: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 8,
            deployment_columns: 3,
        }
    }
}

/// Configuration for the combat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === ENCOUNTERS ===
    /// Size of the square cell used to group co-located combatants
    /// (galaxy units)
    ///
    /// Forces inside the same cell are considered to share a location even
    /// without exact position equality.
    pub encounter_cell_size: f32,

    /// Euclidean distance at which two combatants are in combat range
    pub combat_range: f32,

    // === RESOLUTION ===
    /// Round ceiling shared by strategic and tactical resolution
    ///
    /// Bounds worst-case runtime when both sides are too weak to finish
    /// each other off. Reaching it with both sides alive is a timeout draw.
    pub max_rounds: u32,

    /// Tactical arena layout
    pub arena: ArenaConfig,

    // === BOOKKEEPING ===
    /// Number of battle reports kept in the orchestrator's history
    ///
    /// Oldest reports are evicted first. Memory bound only.
    pub history_capacity: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            encounter_cell_size: DEFAULT_ENCOUNTER_CELL_SIZE,
            combat_range: 100.0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            arena: ArenaConfig::default(),
            history_capacity: 100,
        }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CombatConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded combat config from {:?}", path);
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.encounter_cell_size.is_nan() || self.encounter_cell_size <= 0.0 {
            return Err(CombatError::Config(format!(
                "encounter_cell_size ({}) must be positive",
                self.encounter_cell_size
            )));
        }

        if self.combat_range < 0.0 {
            return Err(CombatError::Config(format!(
                "combat_range ({}) must not be negative",
                self.combat_range
            )));
        }

        if self.max_rounds == 0 {
            return Err(CombatError::Config("max_rounds must be at least 1".into()));
        }

        if self.history_capacity == 0 {
            return Err(CombatError::Config(
                "history_capacity must be at least 1".into(),
            ));
        }

        let arena = &self.arena;
        if arena.height == 0 || arena.deployment_columns == 0 {
            return Err(CombatError::Config(
                "arena height and deployment_columns must be positive".into(),
            ));
        }

        // Both deployment zones must fit without overlapping
        if arena.width < arena.deployment_columns * 2 {
            return Err(CombatError::Config(format!(
                "arena width ({}) cannot hold two deployment zones of {} columns",
                arena.width, arena.deployment_columns
            )));
        }

        if arena.width == arena.deployment_columns * 2 {
            tracing::warn!("Arena has no gap between deployment zones; sides start adjacent");
        }

        Ok(())
    }
}
