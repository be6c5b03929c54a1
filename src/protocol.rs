//! Line-oriented wire protocol spoken between Enterprise clients and the Midway server.
//!
//! Every message is a single line of whitespace separated words. Encoding goes
//! through `Display`; decoding through the `parse` constructors.

use crate::domain::Hull;
use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::{FromStr, SplitWhitespace};

/// Default Midway port
pub const DEFAULT_PORT: u16 = 25565;

/// Ship size assumed when a report omits it
pub const DEFAULT_SHIP_SIZE: f32 = 60.0;

/// An RGB colour, written on the wire as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const GRAY: Self = Self::rgb(160, 160, 160);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Messages sent by a client to Midway
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Handshake, must be the first line of a session
    Ship { name: String },
    /// Set throttle and helm
    Sail { power: f32, helm: f32 },
    /// Drop anchor
    Anchor,
    /// Make smoke
    Smoke,
    /// Select a weapon
    Weapon(u32),
}

impl ClientMessage {
    /// Decode a single line
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ProtocolError::Empty)?;
        match command {
            "ship" => Ok(Self::Ship {
                name: required_word(&mut words, "ship", "name")?.to_string(),
            }),
            "sail" => Ok(Self::Sail {
                power: required(&mut words, "sail", "power")?,
                helm: required(&mut words, "sail", "helm")?,
            }),
            "anchor" => Ok(Self::Anchor),
            "smoke" => Ok(Self::Smoke),
            "weapon" => Ok(Self::Weapon(required(&mut words, "weapon", "weapon")?)),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Encode with the trailing newline
    pub fn encode_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship { name } => write!(f, "ship {name}"),
            Self::Sail { power, helm } => write!(f, "sail {power} {helm}"),
            Self::Anchor => write!(f, "anchor"),
            Self::Smoke => write!(f, "smoke"),
            Self::Weapon(weapon) => write!(f, "weapon {weapon}"),
        }
    }
}

/// Position and appearance of one ship as broadcast by Midway
#[derive(Debug, Clone, PartialEq)]
pub struct ShipReport {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub velocity: f32,
    pub size: f32,
    pub hull: Hull,
    pub colour: Colour,
    /// Remaining health as a fraction of full health
    pub health: f32,
}

impl ShipReport {
    fn parse_words(words: &mut SplitWhitespace<'_>) -> ProtocolResult<Self> {
        let name = required_word(words, "ship", "name")?.to_string();
        let x = required(words, "ship", "x")?;
        let y = required(words, "ship", "y")?;
        let angle = required(words, "ship", "angle")?;
        let velocity = required(words, "ship", "velocity")?;
        // Optional fields are positional: each consumes a word even when it fails to parse.
        let size = words
            .next()
            .and_then(|w| w.parse().ok())
            .unwrap_or(DEFAULT_SHIP_SIZE);
        let hull = words
            .next()
            .and_then(|w| w.parse::<usize>().ok())
            .and_then(Hull::from_index)
            .unwrap_or_default();
        let colour = words
            .next()
            .and_then(Colour::from_hex)
            .unwrap_or(Colour::GRAY);
        let health = required(words, "ship", "health")?;
        Ok(Self {
            name,
            x,
            y,
            angle,
            velocity,
            size,
            hull,
            colour,
            health,
        })
    }
}

impl fmt::Display for ShipReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ship {} {} {} {} {} {} {} {} {}",
            self.name,
            self.x,
            self.y,
            self.angle,
            self.velocity,
            self.size,
            self.hull.index(),
            self.colour,
            self.health
        )
    }
}

/// Messages broadcast by Midway to clients
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Ship(ShipReport),
    Sunk(String),
    Radius(f32),
}

impl ServerMessage {
    /// Decode a single line
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ProtocolError::Empty)?;
        match command {
            "ship" => Ok(Self::Ship(ShipReport::parse_words(&mut words)?)),
            "sunk" => Ok(Self::Sunk(
                required_word(&mut words, "sunk", "name")?.to_string(),
            )),
            "radius" => Ok(Self::Radius(required(&mut words, "radius", "radius")?)),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Encode with the trailing newline
    pub fn encode_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ship(report) => report.fmt(f),
            Self::Sunk(name) => write!(f, "sunk {name}"),
            Self::Radius(radius) => write!(f, "radius {radius}"),
        }
    }
}

fn required_word<'a>(
    words: &mut SplitWhitespace<'a>,
    command: &'static str,
    field: &'static str,
) -> ProtocolResult<&'a str> {
    words
        .next()
        .ok_or(ProtocolError::MissingField { command, field })
}

fn required<T: FromStr>(
    words: &mut SplitWhitespace<'_>,
    command: &'static str,
    field: &'static str,
) -> ProtocolResult<T> {
    let word = required_word(words, command, field)?;
    word.parse().map_err(|_| ProtocolError::InvalidField {
        command,
        field,
        value: word.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_commands() {
        assert_eq!(
            ClientMessage::parse("ship Yorktown\n").unwrap(),
            ClientMessage::Ship {
                name: "Yorktown".to_string()
            }
        );
        assert_eq!(
            ClientMessage::parse("sail 0.5 -1").unwrap(),
            ClientMessage::Sail {
                power: 0.5,
                helm: -1.0
            }
        );
        assert_eq!(ClientMessage::parse("anchor").unwrap(), ClientMessage::Anchor);
        assert_eq!(ClientMessage::parse("smoke").unwrap(), ClientMessage::Smoke);
        assert_eq!(
            ClientMessage::parse("weapon 2").unwrap(),
            ClientMessage::Weapon(2)
        );
    }

    #[test]
    fn test_parse_client_errors() {
        assert_eq!(ClientMessage::parse("   \n"), Err(ProtocolError::Empty));
        assert_eq!(
            ClientMessage::parse("ship"),
            Err(ProtocolError::MissingField {
                command: "ship",
                field: "name"
            })
        );
        assert!(matches!(
            ClientMessage::parse("sail fast 0"),
            Err(ProtocolError::InvalidField { field: "power", .. })
        ));
        assert_eq!(
            ClientMessage::parse("torpedo"),
            Err(ProtocolError::UnknownCommand("torpedo".to_string()))
        );
    }

    #[test]
    fn test_client_encoding() {
        let sail = ClientMessage::Sail {
            power: 0.25,
            helm: 0.0,
        };
        assert_eq!(sail.encode_line(), "sail 0.25 0\n");
        assert_eq!(ClientMessage::Anchor.to_string(), "anchor");
    }

    #[test]
    fn test_full_ship_report() {
        let message =
            ServerMessage::parse("ship Hiryu 10.5 -20 1.57 3.2 112.5 2 #ff8000 0.75").unwrap();
        let ServerMessage::Ship(report) = message else {
            panic!("expected ship report");
        };
        assert_eq!(report.name, "Hiryu");
        assert_eq!(report.x, 10.5);
        assert_eq!(report.y, -20.0);
        assert_eq!(report.size, 112.5);
        assert_eq!(report.hull, Hull::Destroyer);
        assert_eq!(report.colour, Colour::rgb(255, 128, 0));
        assert_eq!(report.health, 0.75);
    }

    #[test]
    fn test_ship_report_optional_defaults() {
        let message = ServerMessage::parse("ship Hiryu 0 0 0 0 big 99 blue 1").unwrap();
        let ServerMessage::Ship(report) = message else {
            panic!("expected ship report");
        };
        assert_eq!(report.size, DEFAULT_SHIP_SIZE);
        assert_eq!(report.hull, Hull::Missing);
        assert_eq!(report.colour, Colour::GRAY);
        assert_eq!(report.health, 1.0);
    }

    #[test]
    fn test_ship_report_requires_health() {
        assert!(matches!(
            ServerMessage::parse("ship Hiryu 0 0 0 0"),
            Err(ProtocolError::MissingField {
                field: "health",
                ..
            })
        ));
        assert!(matches!(
            ServerMessage::parse("ship Hiryu 0 north 0 0 60 1 #000000 1"),
            Err(ProtocolError::InvalidField { field: "y", .. })
        ));
    }

    #[test]
    fn test_server_report_encoding_is_decodable() {
        let report = ShipReport {
            name: "Akagi".to_string(),
            x: -1500.25,
            y: 320.0,
            angle: 0.5,
            velocity: 12.0,
            size: 228.7,
            hull: Hull::BattleCruiser,
            colour: Colour::rgb(1, 2, 3),
            health: 0.5,
        };
        let line = ServerMessage::Ship(report.clone()).encode_line();
        assert!(line.starts_with("ship Akagi -1500.25 320 0.5 12 228.7 5 #010203 0.5"));
        assert_eq!(
            ServerMessage::parse(&line).unwrap(),
            ServerMessage::Ship(report)
        );
    }

    #[test]
    fn test_sunk_and_radius() {
        assert_eq!(
            ServerMessage::parse("sunk Soryu").unwrap(),
            ServerMessage::Sunk("Soryu".to_string())
        );
        assert_eq!(
            ServerMessage::parse("radius 20000").unwrap(),
            ServerMessage::Radius(20000.0)
        );
        assert!(ServerMessage::parse("radius").is_err());
    }

    #[test]
    fn test_colour_hex() {
        assert_eq!(Colour::from_hex("#00ff7f"), Some(Colour::rgb(0, 255, 127)));
        assert_eq!(Colour::from_hex("00ff7f"), None);
        assert_eq!(Colour::from_hex("#00ff7"), None);
        assert_eq!(Colour::from_hex("#zzzzzz"), None);
        assert_eq!(Colour::rgb(0, 255, 127).to_string(), "#00ff7f");
    }
}
