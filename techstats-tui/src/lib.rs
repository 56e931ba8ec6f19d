//! Tech-stats TUI library exports.

pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod render;
pub mod state;
pub mod surface;
pub mod theme;
pub mod views;
