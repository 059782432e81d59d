//! Subcommand implementations.

pub mod profile;
pub mod session;
pub mod settings;
pub mod throttle;
