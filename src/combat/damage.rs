//! Damage model shared by strategic and tactical resolution
//!
//! damage = attack * (1 - min(0.8, def / (def + 50))) * U(0.8, 1.2), floored at 1.

use rand::Rng;

use crate::combat::combatant::Combatant;
use crate::combat::constants::{
    DAMAGE_VARIANCE_MAX, DAMAGE_VARIANCE_MIN, DEFENSE_SOFTENING, MAX_DEFENSE_REDUCTION,
    MIN_DAMAGE,
};

/// Fraction of incoming damage blocked by a defense rating
pub fn defense_reduction(defense: f32) -> f32 {
    let defense = defense.max(0.0);
    (defense / (defense + DEFENSE_SOFTENING)).min(MAX_DEFENSE_REDUCTION)
}

/// Damage for a given variance roll. `roll` is clamped into the variance band.
pub fn damage_with_roll(attack: f32, defense: f32, roll: f32) -> f32 {
    let roll = roll.clamp(DAMAGE_VARIANCE_MIN, DAMAGE_VARIANCE_MAX);
    let after_defense = attack * (1.0 - defense_reduction(defense));
    (after_defense * roll).max(MIN_DAMAGE)
}

/// Damage of a single attack, drawing the variance roll from `rng`
pub fn calculate_damage<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    rng: &mut R,
) -> f32 {
    let roll = rng.gen_range(DAMAGE_VARIANCE_MIN..=DAMAGE_VARIANCE_MAX);
    damage_with_roll(attacker.attack, defender.defense, roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::weapons::ShipClass;
    use crate::core::types::{CombatantId, FactionId, Vec2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ship(class: ShipClass) -> Combatant {
        Combatant::from_class(CombatantId::new(0), FactionId::new(0), Vec2::default(), class)
    }

    #[test]
    fn test_reduction_diminishing_returns() {
        assert_eq!(defense_reduction(0.0), 0.0);
        assert!((defense_reduction(50.0) - 0.5).abs() < 1e-6);
        assert!(defense_reduction(100.0) > defense_reduction(50.0));
        // Gain from the second 50 points is smaller than from the first
        let first = defense_reduction(50.0) - defense_reduction(0.0);
        let second = defense_reduction(100.0) - defense_reduction(50.0);
        assert!(second < first);
    }

    #[test]
    fn test_reduction_capped_at_eighty_percent() {
        assert!((defense_reduction(200.0) - 0.8).abs() < 1e-6);
        assert!((defense_reduction(1.0e9) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_fighter_vs_fighter_known_values() {
        // 15 * (1 - 5/55) = 13.636...
        let base = 15.0 * (1.0 - 5.0 / 55.0);
        assert!((damage_with_roll(15.0, 5.0, 1.0) - base).abs() < 1e-4);
        assert!((damage_with_roll(15.0, 5.0, 0.8) - base * 0.8).abs() < 1e-4);
        assert!((damage_with_roll(15.0, 5.0, 1.2) - base * 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_minimum_damage_floor() {
        assert_eq!(damage_with_roll(0.0, 5.0, 1.0), 1.0);
        assert_eq!(damage_with_roll(1.0, 1000.0, 0.8), 1.0);
    }

    #[test]
    fn test_roll_outside_band_is_clamped() {
        assert_eq!(
            damage_with_roll(40.0, 0.0, 5.0),
            damage_with_roll(40.0, 0.0, 1.2)
        );
    }

    #[test]
    fn test_sampled_damage_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let attacker = ship(ShipClass::Battleship);
        let defender = ship(ShipClass::Scout);

        for _ in 0..1000 {
            let dmg = calculate_damage(&attacker, &defender, &mut rng);
            assert!(dmg >= 1.0);
            assert!(dmg <= attacker.attack * 1.2 + 1e-4);
        }
    }

    #[test]
    fn test_same_seed_same_damage() {
        let attacker = ship(ShipClass::Cruiser);
        let defender = ship(ShipClass::Fighter);
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                calculate_damage(&attacker, &defender, &mut a),
                calculate_damage(&attacker, &defender, &mut b)
            );
        }
    }
}
