//! Star Armada - combat simulation for a 4X space strategy game
//!
//! Detects hostile fleets sharing a location, resolves their battles either
//! instantly or on an interactive tactical grid, and reports the casualties
//! back to the caller.

pub mod battle;
pub mod campaign;
pub mod combat;
pub mod core;
