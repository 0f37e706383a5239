//! CLI-specific utilities for osm-route-updater
//!
//! This module contains code specific to the command-line interface,
//! separate from the core library functionality.

pub mod logging;
pub mod progress;

pub use logging::LogSettings;
pub use progress::ProgressObserver;
