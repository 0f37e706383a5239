//! Run observers
//!
//! The pipeline never logs directly. It reports to a [`RunObserver`] handed in
//! by the caller, so the binary, tests and embedders each decide where the
//! messages end up.

use std::sync::Mutex;

use log::Level;

/// Receives progress and diagnostics from a run
pub trait RunObserver {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Called right before the map-matching request for a feature is sent
    fn matching_started(&self, _feature: usize, _total: usize) {}

    /// Called once the map-matching request for a feature has returned, successfully or not
    fn matching_finished(&self, _feature: usize) {}
}

/// Forwards everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }

    fn matching_started(&self, feature: usize, total: usize) {
        log::debug!("Matching feature {feature}/{total}");
    }
}

/// Keeps every message in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages with their level
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Messages recorded at `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    fn push(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RunObserver for RecordingObserver {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
