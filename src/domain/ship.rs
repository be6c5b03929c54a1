//! Ship state and hydrodynamics.

use super::class::{ShipClass, ShipStats};
use crate::protocol::{Colour, ShipReport};

/// Density of sea water, kg/m³
const RHO: f32 = 1025.0;
/// Kinematic viscosity of sea water, m²/s
const NU: f32 = 1.19e-6;
const GRAVITY: f32 = 9.81;
/// Thrust is computed as if the ship were moving at least this fast, m/s
const MIN_THRUST_SPEED: f32 = 5.0;
/// Turning circle radius in ship lengths at full helm
const TURNING_RADIUS_LENGTHS: f32 = 2.5;
/// Fraction of speed kept per tick while anchored
const ANCHOR_DRAG: f32 = 0.95;

pub const MIN_POWER: f32 = -0.5;
pub const MAX_POWER: f32 = 1.0;

/// A ship in the world
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub class: ShipClass,
    /// World position in metres; `y` grows southwards
    pub coords: (f32, f32),
    /// Heading in radians, 0 is north, clockwise positive
    pub angle: f32,
    /// Speed through the water in m/s, negative when going astern
    pub velocity: f32,
    pub helm: f32,
    pub power: f32,
    pub health: f32,
    pub anchored: bool,
    pub colour: Colour,
}

impl Ship {
    pub fn new(class: ShipClass, coords: (f32, f32), angle: f32, colour: Colour) -> Self {
        Self {
            class,
            coords,
            angle,
            velocity: 0.0,
            helm: 0.0,
            power: 0.0,
            health: class.stats().health,
            anchored: false,
            colour,
        }
    }

    pub fn stats(&self) -> ShipStats {
        self.class.stats()
    }

    /// Set throttle and helm; any throttle weighs anchor
    pub fn sail(&mut self, power: f32, helm: f32) {
        self.power = clamp_finite(power, MIN_POWER, MAX_POWER);
        self.helm = clamp_finite(helm, -1.0, 1.0);
        if self.power != 0.0 {
            self.anchored = false;
        }
    }

    pub fn anchor(&mut self) {
        self.anchored = true;
        self.power = 0.0;
    }

    /// Water resistance in newtons at the given speed, always non-negative
    pub fn resistance(&self, velocity: f32) -> f32 {
        let speed = velocity.abs();
        if speed < f32::EPSILON {
            return 0.0;
        }
        let stats = self.stats();
        let reynolds = speed * stats.length / NU;
        // ITTC-57 friction line
        let log_re = reynolds.log10() - 2.0;
        let friction = 0.075 / (log_re * log_re);
        let froude = speed / (GRAVITY * stats.length).sqrt();
        let wave = stats.froude_scale_factor * froude.powi(6);
        0.5 * RHO * stats.surface_area * speed * speed * (friction * (1.0 + stats.k) + wave)
    }

    /// Propeller thrust in newtons for the current throttle
    pub fn thrust(&self) -> f32 {
        if self.anchored {
            return 0.0;
        }
        let watts = self.stats().power * 1000.0;
        self.power * watts / self.velocity.abs().max(MIN_THRUST_SPEED)
    }

    /// Advance the ship by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let stats = self.stats();
        let mass = stats.mass * 1000.0;
        let drag = self.resistance(self.velocity).copysign(self.velocity);
        let accel = (self.thrust() - drag) / mass;
        let mut velocity = self.velocity + accel * dt;
        // Resistance alone never reverses the direction of travel.
        if self.power == 0.0 && velocity.signum() != self.velocity.signum() {
            velocity = 0.0;
        }
        if self.anchored {
            velocity *= ANCHOR_DRAG;
        }
        self.velocity = velocity;

        let yaw_rate = self.helm * self.velocity / (TURNING_RADIUS_LENGTHS * stats.length);
        self.angle = (self.angle + yaw_rate * dt).rem_euclid(std::f32::consts::TAU);

        self.coords.0 += self.velocity * self.angle.sin() * dt;
        self.coords.1 -= self.velocity * self.angle.cos() * dt;
    }

    /// Reduce health, returning true when the ship has sunk
    pub fn damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.is_sunk()
    }

    pub fn is_sunk(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health / self.stats().health).clamp(0.0, 1.0)
    }

    pub fn distance_from_origin(&self) -> f32 {
        self.coords.0.hypot(self.coords.1)
    }

    pub fn report(&self, name: &str) -> ShipReport {
        let stats = self.stats();
        ShipReport {
            name: name.to_string(),
            x: self.coords.0,
            y: self.coords.1,
            angle: self.angle,
            velocity: self.velocity,
            size: stats.length,
            hull: stats.hull,
            colour: self.colour,
            health: self.health_fraction(),
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn destroyer() -> Ship {
        Ship::new(ShipClass::Destroyer, (0.0, 0.0), 0.0, Colour::GRAY)
    }

    fn run(ship: &mut Ship, seconds: u32) {
        for _ in 0..seconds * 60 {
            ship.step(DT);
        }
    }

    #[test]
    fn test_idle_ship_stays_put() {
        let mut ship = destroyer();
        run(&mut ship, 5);
        assert_eq!(ship.coords, (0.0, 0.0));
        assert_eq!(ship.velocity, 0.0);
    }

    #[test]
    fn test_full_ahead_heads_north() {
        let mut ship = destroyer();
        ship.sail(1.0, 0.0);
        run(&mut ship, 30);
        assert!(ship.velocity > 5.0, "velocity {}", ship.velocity);
        // North is negative y
        assert!(ship.coords.1 < -100.0);
        assert!(ship.coords.0.abs() < 1e-3);
    }

    #[test]
    fn test_top_speed_is_bounded() {
        let mut ship = destroyer();
        ship.sail(1.0, 0.0);
        run(&mut ship, 600);
        let settled = ship.velocity;
        run(&mut ship, 60);
        assert!((ship.velocity - settled).abs() < 0.1);
        // Somewhere between 20 and 60 knots
        assert!(settled > 10.0 && settled < 31.0, "top speed {settled}");
    }

    #[test]
    fn test_astern_goes_backwards() {
        let mut ship = destroyer();
        ship.sail(MIN_POWER, 0.0);
        run(&mut ship, 20);
        assert!(ship.velocity < 0.0);
        assert!(ship.coords.1 > 0.0);
    }

    #[test]
    fn test_coasting_slows_without_reversing() {
        let mut ship = destroyer();
        ship.sail(1.0, 0.0);
        run(&mut ship, 60);
        let cruising = ship.velocity;
        ship.sail(0.0, 0.0);
        run(&mut ship, 60);
        assert!(ship.velocity < cruising);
        assert!(ship.velocity >= 0.0);
    }

    #[test]
    fn test_helm_turns_to_starboard() {
        let mut ship = destroyer();
        ship.sail(1.0, 1.0);
        run(&mut ship, 10);
        assert!(ship.angle > 0.0 && ship.angle < std::f32::consts::PI);
        assert!(ship.coords.0 > 0.0);
    }

    #[test]
    fn test_sail_clamps_inputs() {
        let mut ship = destroyer();
        ship.sail(3.0, -7.0);
        assert_eq!(ship.power, MAX_POWER);
        assert_eq!(ship.helm, -1.0);
        ship.sail(f32::NAN, f32::INFINITY);
        assert_eq!(ship.power, 0.0);
        assert_eq!(ship.helm, 0.0);
    }

    #[test]
    fn test_anchor_stops_ship() {
        let mut ship = destroyer();
        ship.sail(1.0, 0.0);
        run(&mut ship, 30);
        ship.anchor();
        run(&mut ship, 5);
        assert!(ship.velocity.abs() < 0.01);
        assert!(ship.anchored);

        ship.sail(0.5, 0.0);
        assert!(!ship.anchored);
    }

    #[test]
    fn test_damage_and_report() {
        let mut ship = destroyer();
        let full = ship.stats().health;
        assert!(!ship.damage(full / 2.0));
        let report = ship.report("Fletcher");
        assert_eq!(report.name, "Fletcher");
        assert!((report.health - 0.5).abs() < 1e-6);
        assert_eq!(report.size, 112.5);
        assert!(ship.damage(full));
        assert_eq!(ship.health_fraction(), 0.0);
    }
}
