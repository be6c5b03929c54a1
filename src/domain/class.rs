//! Ship classes, their hulls and performance figures.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fmt;

/// Hull silhouette a ship is drawn with. The discriminant is the wire texture index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hull {
    #[default]
    Missing,
    DestroyerEscort,
    Destroyer,
    LightCruiser,
    HeavyCruiser,
    BattleCruiser,
    Battleship,
    LazerKiwi,
    Kraken,
}

impl Hull {
    pub const ALL: [Hull; 9] = [
        Self::Missing,
        Self::DestroyerEscort,
        Self::Destroyer,
        Self::LightCruiser,
        Self::HeavyCruiser,
        Self::BattleCruiser,
        Self::Battleship,
        Self::LazerKiwi,
        Self::Kraken,
    ];

    /// Look up a hull by texture index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Texture index used on the wire
    pub fn index(self) -> usize {
        self as usize
    }

    /// Chart glyph for this hull
    pub fn glyph(self) -> char {
        match self {
            Self::Missing => '?',
            Self::DestroyerEscort => 'e',
            Self::Destroyer => 'd',
            Self::LightCruiser => 'c',
            Self::HeavyCruiser => 'C',
            Self::BattleCruiser => 'B',
            Self::Battleship => 'W',
            Self::LazerKiwi => 'k',
            Self::Kraken => 'K',
        }
    }
}

/// Performance figures of a ship class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipStats {
    pub hull: Hull,
    /// Waterline length in metres
    pub length: f32,
    /// Displacement in tonnes
    pub mass: f32,
    pub health: f32,
    /// Shaft power in kilowatts
    pub power: f32,
    /// Form factor applied to frictional resistance
    pub k: f32,
    /// Wetted surface in square metres
    pub surface_area: f32,
    /// Scales wave-making resistance
    pub froude_scale_factor: f32,
}

/// Classes a newly joined ship may be assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipClass {
    Escort,
    Destroyer,
    LightCruiser,
    HeavyCruiser,
    BattleCruiser,
    SlowBattleship,
    FastBattleship,
    Bird,
}

impl ShipClass {
    pub const ALL: [ShipClass; 8] = [
        Self::Escort,
        Self::Destroyer,
        Self::LightCruiser,
        Self::HeavyCruiser,
        Self::BattleCruiser,
        Self::SlowBattleship,
        Self::FastBattleship,
        Self::Bird,
    ];

    /// Relative spawn frequency, parallel to `ALL`
    pub const WEIGHTS: [u32; 8] = [15, 25, 4, 3, 1, 1, 1, 1];

    /// Pick a class according to `WEIGHTS`
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // WEIGHTS is a non-empty constant with positive entries.
        match WeightedIndex::new(Self::WEIGHTS) {
            Ok(dist) => Self::ALL[dist.sample(rng)],
            Err(_) => Self::Destroyer,
        }
    }

    pub const fn stats(self) -> ShipStats {
        match self {
            Self::Escort => ShipStats {
                hull: Hull::DestroyerEscort,
                length: 93.3,
                mass: 1740.0,
                health: 1740.0,
                power: 5340.0,
                k: 0.043,
                surface_area: 608.4,
                froude_scale_factor: 2.2,
            },
            Self::Destroyer => ShipStats {
                hull: Hull::Destroyer,
                length: 112.5,
                mass: 2050.0,
                health: 2050.0,
                power: 27000.0,
                k: 0.034,
                surface_area: 903.3,
                froude_scale_factor: 0.3,
            },
            Self::LightCruiser => ShipStats {
                hull: Hull::LightCruiser,
                length: 180.0,
                mass: 11932.0,
                health: 11932.0,
                power: 45000.0,
                k: 0.038,
                surface_area: 2301.0,
                froude_scale_factor: 2.3,
            },
            Self::HeavyCruiser => ShipStats {
                hull: Hull::HeavyCruiser,
                length: 176.0,
                mass: 12663.0,
                health: 12663.0,
                power: 47900.0,
                k: 0.035,
                surface_area: 1960.0,
                froude_scale_factor: 2.64,
            },
            Self::BattleCruiser => ShipStats {
                hull: Hull::BattleCruiser,
                length: 228.7,
                mass: 27200.0,
                health: 27200.0,
                power: 50400.0,
                k: 0.044,
                surface_area: 3668.0,
                froude_scale_factor: 4.19,
            },
            Self::SlowBattleship => ShipStats {
                hull: Hull::Battleship,
                length: 190.27,
                mass: 33100.0,
                health: 33100.0,
                power: 13000.0,
                k: 0.074,
                surface_area: 3343.0,
                froude_scale_factor: 25.17,
            },
            Self::FastBattleship => ShipStats {
                hull: Hull::Battleship,
                length: 262.13,
                mass: 48880.0,
                health: 48800.0,
                power: 94800.0,
                k: 0.048,
                surface_area: 5257.0,
                froude_scale_factor: 5.63,
            },
            Self::Bird => ShipStats {
                hull: Hull::LazerKiwi,
                length: 51.0,
                mass: 617.0,
                health: 617.0,
                power: 490.0,
                k: 0.097,
                surface_area: 336.4,
                froude_scale_factor: 14.48,
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Escort => "Destroyer escort",
            Self::Destroyer => "Destroyer",
            Self::LightCruiser => "Light cruiser",
            Self::HeavyCruiser => "Heavy cruiser",
            Self::BattleCruiser => "Battlecruiser",
            Self::SlowBattleship => "Battleship",
            Self::FastBattleship => "Fast battleship",
            Self::Bird => "Bird",
        }
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
