//! UI components for the Enterprise client.
//!
//! This module contains:
//! - layout: Main layout rendering
//! - input: Keyboard input handling
//! - widgets: Chart, bridge panel and menu widgets

pub mod input;
pub mod layout;
pub mod widgets;
