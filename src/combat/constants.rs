//! Combat constants shared by strategic and tactical resolution
//!
//! The damage formula uses these verbatim in both modes so outcomes stay
//! balanced against each other.

// Damage model
pub const DEFENSE_SOFTENING: f32 = 50.0;
pub const MAX_DEFENSE_REDUCTION: f32 = 0.8;
pub const DAMAGE_VARIANCE_MIN: f32 = 0.8;
pub const DAMAGE_VARIANCE_MAX: f32 = 1.2;
pub const MIN_DAMAGE: f32 = 1.0;

// Defaults used when the caller does not supply a config
pub const DEFAULT_ENCOUNTER_CELL_SIZE: f32 = 50.0;
pub const DEFAULT_MAX_ROUNDS: u32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_cap_leaves_damage_through() {
        assert!(MAX_DEFENSE_REDUCTION > 0.0 && MAX_DEFENSE_REDUCTION < 1.0);
    }

    #[test]
    fn test_variance_band_centered_on_one() {
        assert!(DAMAGE_VARIANCE_MIN < 1.0 && DAMAGE_VARIANCE_MAX > 1.0);
        assert!(((DAMAGE_VARIANCE_MIN + DAMAGE_VARIANCE_MAX) / 2.0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_damage_positive() {
        assert!(MIN_DAMAGE > 0.0);
    }
}
