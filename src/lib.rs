//! Gravity Sandbox - 2D trajectory simulator
//!
//! A library crate simulating a ship flying between spinning planets:
//! adaptive trajectory integration, landing and exit detection, random
//! planet placement, and Bevy plugins driving a game clock.

pub mod config;
pub mod game;
pub mod generator;
pub mod geometry;
pub mod orbit;
pub mod outcome;
pub mod physics;
pub mod ship;
pub mod time;
pub mod trajectory;
pub mod types;

#[cfg(test)]
pub mod test_utils;
