//! Weapon and hull classes
//!
//! Weapon range and default stats come from lookup tables keyed by class.
//! They are resolved once when a combatant snapshot is built, never per action.

use serde::{Deserialize, Serialize};

/// Weapon tier - determines attack range in tactical combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    /// No weapons fitted (colony ships)
    Unarmed,
    Short,
    Medium,
    Long,
    VeryLong,
}

impl WeaponClass {
    /// Attack range in arena tiles
    pub fn range(&self) -> u32 {
        match self {
            WeaponClass::Unarmed => 0,
            WeaponClass::Short => 2,
            WeaponClass::Medium => 3,
            WeaponClass::Long => 4,
            WeaponClass::VeryLong => 5,
        }
    }
}

/// Hull class of a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    Scout,
    Fighter,
    Cruiser,
    Battleship,
    ColonyShip,
    Transport,
}

/// Default combat stats for a hull class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub hp: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub weapon: WeaponClass,
}

impl ShipClass {
    pub fn all() -> [ShipClass; 6] {
        [
            ShipClass::Scout,
            ShipClass::Fighter,
            ShipClass::Cruiser,
            ShipClass::Battleship,
            ShipClass::ColonyShip,
            ShipClass::Transport,
        ]
    }

    /// Default stats for newly built ships of this class
    pub fn stats(&self) -> ClassStats {
        match self {
            ShipClass::Scout => ClassStats {
                hp: 50.0,
                attack: 5.0,
                defense: 2.0,
                speed: 3.0,
                weapon: WeaponClass::Short,
            },
            ShipClass::Fighter => ClassStats {
                hp: 80.0,
                attack: 15.0,
                defense: 5.0,
                speed: 2.5,
                weapon: WeaponClass::Medium,
            },
            ShipClass::Cruiser => ClassStats {
                hp: 150.0,
                attack: 25.0,
                defense: 10.0,
                speed: 2.0,
                weapon: WeaponClass::Long,
            },
            ShipClass::Battleship => ClassStats {
                hp: 300.0,
                attack: 50.0,
                defense: 20.0,
                speed: 1.5,
                weapon: WeaponClass::VeryLong,
            },
            ShipClass::ColonyShip => ClassStats {
                hp: 100.0,
                attack: 0.0,
                defense: 5.0,
                speed: 1.5,
                weapon: WeaponClass::Unarmed,
            },
            ShipClass::Transport => ClassStats {
                hp: 80.0,
                attack: 5.0,
                defense: 5.0,
                speed: 2.0,
                weapon: WeaponClass::Medium,
            },
        }
    }

    /// Parse a lowercase class name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "scout" => Some(ShipClass::Scout),
            "fighter" => Some(ShipClass::Fighter),
            "cruiser" => Some(ShipClass::Cruiser),
            "battleship" => Some(ShipClass::Battleship),
            "colony" | "colony_ship" | "colonyship" => Some(ShipClass::ColonyShip),
            "transport" => Some(ShipClass::Transport),
            _ => None,
        }
    }
}
