//! CLI-specific progress handling for osm-route-updater
//!
//! Shows a spinner while a map-matching request is in flight. Log lines are
//! printed with the spinner suspended so they never interleave with it.

use std::cell::RefCell;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use osm_route_updater::{LogObserver, RunObserver};

/// Creates a spinner for CLI display
pub fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb
}

/// Observer used by the binary: logs through `log`, spins during requests
#[derive(Default)]
pub struct ProgressObserver {
    inner: LogObserver,
    spinner: RefCell<Option<ProgressBar>>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, emit: impl FnOnce()) {
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(emit),
            None => emit(),
        }
    }
}

impl RunObserver for ProgressObserver {
    fn info(&self, message: &str) {
        self.print(|| self.inner.info(message));
    }

    fn warn(&self, message: &str) {
        self.print(|| self.inner.warn(message));
    }

    fn error(&self, message: &str) {
        self.print(|| self.inner.error(message));
    }

    fn matching_started(&self, feature: usize, total: usize) {
        self.inner.matching_started(feature, total);

        let pb = create_spinner(format!("📡 Matching feature {feature}/{total}"));
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Some(previous) = self.spinner.replace(Some(pb)) {
            previous.finish_and_clear();
        }
    }

    fn matching_finished(&self, _feature: usize) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner_message() {
        let pb = create_spinner("📡 Matching feature 1/2".to_string());
        assert_eq!(pb.message(), "📡 Matching feature 1/2");
        pb.finish_and_clear();
    }

    #[test]
    fn test_spinner_lifecycle() {
        let observer = ProgressObserver::new();
        observer.matching_started(1, 2);
        assert!(observer.spinner.borrow().is_some());

        observer.info("📡 Valhalla response received.");
        observer.matching_finished(1);
        assert!(observer.spinner.borrow().is_none());
    }
}
