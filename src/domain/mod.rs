//! Domain entities for the naval simulation.
//!
//! - class: Ship classes, hulls and performance figures
//! - ship: A single ship and its hydrodynamics
//! - world: Every ship in play and the arena
//! - navigation: Chart maths shared by the client views

mod class;
pub mod navigation;
mod ship;
mod world;

pub use class::{Hull, ShipClass, ShipStats};
pub use navigation::Viewport;
pub use ship::{Ship, MAX_POWER, MIN_POWER};
pub use world::{World, WorldEvent};
