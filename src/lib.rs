//! enterprise: WW2 naval combat simulator
//!
//! This crate provides the Midway game server and the Enterprise terminal
//! client, which share the line-oriented wire protocol and the ship model.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod services;
pub mod ui;

pub use app::App;
pub use config::Settings;
pub use error::{AppError, Result};
