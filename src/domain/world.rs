//! The simulated sea: every ship in play and the arena around them.

use super::class::ShipClass;
use super::ship::Ship;
use crate::protocol::{ClientMessage, Colour, ShipReport};
use rand::Rng;
use std::collections::BTreeMap;

/// Fraction of full health lost per second outside the arena
const OUT_OF_BOUNDS_DAMAGE_RATE: f32 = 0.05;

/// Colours handed out in join order
const PALETTE: [Colour; 8] = [
    Colour::rgb(230, 57, 70),
    Colour::rgb(244, 162, 97),
    Colour::rgb(233, 196, 106),
    Colour::rgb(42, 157, 143),
    Colour::rgb(131, 197, 190),
    Colour::rgb(168, 218, 220),
    Colour::rgb(181, 131, 255),
    Colour::rgb(255, 255, 255),
];

/// Something that happened during a world step
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Sunk(String),
}

#[derive(Debug, Clone)]
pub struct World {
    ships: BTreeMap<String, Ship>,
    radius: f32,
    spawn_radius: f32,
    joined: usize,
}

impl World {
    pub fn new(radius: f32, spawn_radius: f32) -> Self {
        Self {
            ships: BTreeMap::new(),
            radius,
            spawn_radius: spawn_radius.min(radius),
            joined: 0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ships.contains_key(name)
    }

    pub fn ship(&self, name: &str) -> Option<&Ship> {
        self.ships.get(name)
    }

    /// Place a new ship of a random class somewhere inside the spawn area
    pub fn spawn<R: Rng + ?Sized>(&mut self, name: &str, rng: &mut R) -> &Ship {
        let class = ShipClass::random(rng);
        let distance = self.spawn_radius * rng.gen::<f32>().sqrt();
        let bearing = rng.gen_range(0.0..std::f32::consts::TAU);
        let coords = (distance * bearing.sin(), -distance * bearing.cos());
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        let colour = PALETTE[self.joined % PALETTE.len()];
        self.joined += 1;
        self.insert(name, Ship::new(class, coords, heading, colour))
    }

    /// Put a ship into the world, replacing any ship of the same name
    pub fn insert(&mut self, name: &str, ship: Ship) -> &Ship {
        self.ships.insert(name.to_string(), ship);
        &self.ships[name]
    }

    pub fn remove(&mut self, name: &str) -> Option<Ship> {
        self.ships.remove(name)
    }

    /// Apply a command from the named ship's captain
    pub fn apply(&mut self, name: &str, message: &ClientMessage) {
        let Some(ship) = self.ships.get_mut(name) else {
            return;
        };
        match message {
            ClientMessage::Sail { power, helm } => ship.sail(*power, *helm),
            ClientMessage::Anchor => ship.anchor(),
            ClientMessage::Smoke | ClientMessage::Weapon(_) => {
                tracing::debug!("{} sent {}, which has no effect", name, message);
            }
            ClientMessage::Ship { .. } => {
                tracing::debug!("{} repeated its handshake", name);
            }
        }
    }

    /// Advance every ship by `dt` seconds
    pub fn step(&mut self, dt: f32) -> Vec<WorldEvent> {
        let mut sunk = Vec::new();
        for (name, ship) in &mut self.ships {
            ship.step(dt);
            if ship.distance_from_origin() > self.radius {
                let damage = ship.stats().health * OUT_OF_BOUNDS_DAMAGE_RATE * dt;
                if ship.damage(damage) {
                    sunk.push(name.clone());
                }
            }
        }
        for name in &sunk {
            self.ships.remove(name);
        }
        sunk.into_iter().map(WorldEvent::Sunk).collect()
    }

    /// Reports for every ship, ordered by name
    pub fn reports(&self) -> Vec<ShipReport> {
        self.ships
            .iter()
            .map(|(name, ship)| ship.report(name))
            .collect()
    }
}
