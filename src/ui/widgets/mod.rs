//! Reusable UI widgets for the Enterprise bridge.

pub mod chart;
pub mod help;
pub mod helm;
pub mod text_input;
