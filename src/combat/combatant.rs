//! Combatant snapshots consumed by the combat engine
//!
//! The caller owns the persistent ships; the engine works on copies taken at
//! the start of a turn and reports back hit points and casualties.

use serde::{Deserialize, Serialize};

use crate::combat::weapons::{ShipClass, WeaponClass};
use crate::core::types::{CombatantId, FactionId, Vec2};

/// Raw combat stats for building a snapshot by hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
}

/// A single ship as seen by the combat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub faction: FactionId,
    pub position: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    weapon: WeaponClass,
    weapon_range: u32,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        faction: FactionId,
        position: Vec2,
        stats: CombatStats,
        weapon: WeaponClass,
    ) -> Self {
        Self {
            id,
            faction,
            position,
            hp: stats.hp.clamp(0.0, stats.max_hp.max(0.0)),
            max_hp: stats.max_hp.max(0.0),
            attack: stats.attack,
            defense: stats.defense.max(0.0),
            speed: stats.speed.max(0.0),
            weapon,
            weapon_range: weapon.range(),
        }
    }

    /// Build a full-health snapshot from a hull class's default stats
    pub fn from_class(id: CombatantId, faction: FactionId, position: Vec2, class: ShipClass) -> Self {
        let stats = class.stats();
        Self::new(
            id,
            faction,
            position,
            CombatStats {
                hp: stats.hp,
                max_hp: stats.hp,
                attack: stats.attack,
                defense: stats.defense,
                speed: stats.speed,
            },
            stats.weapon,
        )
    }

    /// Same snapshot with a different current hit point value
    pub fn with_hp(mut self, hp: f32) -> Self {
        self.hp = hp.clamp(0.0, self.max_hp);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn weapon(&self) -> WeaponClass {
        self.weapon
    }

    /// Tactical attack range in tiles, fixed by weapon class at construction
    pub fn weapon_range(&self) -> u32 {
        self.weapon_range
    }

    pub fn hp_percentage(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        self.hp / self.max_hp * 100.0
    }

    /// Apply damage, flooring hit points at zero. Returns true if this hit
    /// destroyed the combatant.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        !self.is_alive()
    }

    /// Euclidean range check on the galaxy map
    pub fn in_combat_range(&self, other: &Combatant, range: f32) -> bool {
        self.position.distance(&other.position) <= range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(id: u32) -> Combatant {
        Combatant::from_class(
            CombatantId::new(id),
            FactionId::new(0),
            Vec2::new(0.0, 0.0),
            ShipClass::Fighter,
        )
    }

    #[test]
    fn test_from_class_uses_stat_table() {
        let ship = fighter(1);
        assert_eq!(ship.hp, 80.0);
        assert_eq!(ship.max_hp, 80.0);
        assert_eq!(ship.attack, 15.0);
        assert_eq!(ship.defense, 5.0);
        assert_eq!(ship.speed, 2.5);
        assert_eq!(ship.weapon_range(), 3);
    }

    #[test]
    fn test_weapon_and_range_agree() {
        for class in ShipClass::all() {
            let ship = Combatant::from_class(CombatantId::new(1), FactionId::new(0), Vec2::default(), class);
            assert_eq!(ship.weapon(), class.stats().weapon);
            assert_eq!(ship.weapon_range(), ship.weapon().range());
        }
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut ship = fighter(1);
        assert!(!ship.take_damage(30.0));
        assert_eq!(ship.hp, 50.0);

        assert!(ship.take_damage(500.0));
        assert_eq!(ship.hp, 0.0);
        assert!(!ship.is_alive());

        // Already dead: no second kill reported
        assert!(!ship.take_damage(10.0));
        assert_eq!(ship.hp, 0.0);
    }

    #[test]
    fn test_hp_clamped_on_construction() {
        let ship = Combatant::new(
            CombatantId::new(1),
            FactionId::new(0),
            Vec2::default(),
            CombatStats {
                hp: 500.0,
                max_hp: 100.0,
                attack: 10.0,
                defense: 5.0,
                speed: 2.0,
            },
            WeaponClass::Short,
        );
        assert_eq!(ship.hp, 100.0);
        assert_eq!(ship.with_hp(-4.0).hp, 0.0);
    }

    #[test]
    fn test_hp_percentage() {
        let ship = fighter(1).with_hp(20.0);
        assert!((ship.hp_percentage() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_combat_range() {
        let a = fighter(1);
        let mut b = fighter(2);
        b.position = Vec2::new(60.0, 80.0);
        assert!(a.in_combat_range(&b, 100.0));
        b.position = Vec2::new(60.0, 81.0);
        assert!(!a.in_combat_range(&b, 100.0));
    }
}
