//! Networking services.
//!
//! This module contains:
//! - MidwayServer: The game server lobby and tick loop
//! - MidwayConnection: A client session with Midway

pub mod connection;
pub mod server;

pub use connection::{MidwayConnection, MidwayEvent};
pub use server::MidwayServer;
