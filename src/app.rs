//! Application state and the per-cycle collection pass.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{DeviceReport, DiskReport, History, RateEstimator, Thresholds};
use crate::source::{DeviceProbe, InventorySource};
use crate::ui::Theme;

/// Main application state.
///
/// Owns the two collaborator seams (inventory and probe), the estimator
/// state, and everything the UI needs to render.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Collaborators and core state
    inventory: Box<dyn InventorySource>,
    probe: Box<dyn DeviceProbe>,
    estimator: RateEstimator,
    pub thresholds: Thresholds,

    // Latest cycle output
    pub report: Option<DiskReport>,
    pub history: History,

    // Navigation state
    pub selected_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given collaborators.
    pub fn new(
        inventory: Box<dyn InventorySource>,
        probe: Box<dyn DeviceProbe>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            show_detail_overlay: false,
            inventory,
            probe,
            estimator: RateEstimator::default(),
            thresholds,
            report: None,
            history: History::new(),
            selected_index: 0,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the inventory source.
    pub fn source_description(&self) -> &str {
        self.inventory.description()
    }

    /// Error from the last inventory pass, if any.
    pub fn load_error(&self) -> Option<&str> {
        self.inventory.error()
    }

    /// Run one full collection cycle: inventory, grouping, attributes,
    /// temperature, throughput, rate estimation.
    pub fn refresh(&mut self) {
        let report = DiskReport::collect(
            self.inventory.as_mut(),
            self.probe.as_mut(),
            &mut self.estimator,
            &self.thresholds,
        );

        self.history.record(&report);

        // Clamp selection to the new device list.
        let count = report.device_count();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }

        self.report = Some(report);
    }

    /// The device report currently under the selection cursor.
    pub fn selected_device(&self) -> Option<&DeviceReport> {
        let report = self.report.as_ref()?;
        report.rows().get(self.selected_index).copied()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Move selection down by one device.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one device.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n devices.
    pub fn select_next_n(&mut self, n: usize) {
        if let Some(ref report) = self.report {
            let max = report.device_count().saturating_sub(1);
            self.selected_index = (self.selected_index + n).min(max);
        }
    }

    /// Move selection up by n devices.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first device.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last device.
    pub fn select_last(&mut self) {
        if let Some(ref report) = self.report {
            self.selected_index = report.device_count().saturating_sub(1);
        }
    }

    /// Open the detail overlay for the selected device.
    pub fn enter_detail(&mut self) {
        if self.selected_device().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Navigate back: close whichever overlay is open.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.show_help {
            self.show_help = false;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current report to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref report) = self.report else {
            anyhow::bail!("No data to export");
        };
        std::fs::write(path, report.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DeviceAttributes, DeviceId, TemperatureReading, ThroughputSample};

    #[derive(Debug)]
    struct FixedInventory(Vec<DeviceId>);

    impl InventorySource for FixedInventory {
        fn external_devices(&mut self) -> Vec<DeviceId> {
            self.0.clone()
        }

        fn raid_memberships(&mut self) -> Vec<(String, Vec<DeviceId>)> {
            Vec::new()
        }

        fn description(&self) -> &str {
            "fixed"
        }

        fn error(&self) -> Option<&str> {
            None
        }
    }

    #[derive(Debug)]
    struct SilentProbe;

    impl DeviceProbe for SilentProbe {
        fn attributes(&mut self, id: &DeviceId) -> DeviceAttributes {
            DeviceAttributes::degraded(id)
        }

        fn temperature(&mut self, _id: &DeviceId) -> TemperatureReading {
            TemperatureReading::Unavailable
        }

        fn throughput(&mut self, _id: &DeviceId) -> Option<ThroughputSample> {
            None
        }
    }

    fn app_with_disks(names: &[&str]) -> App {
        let inventory = FixedInventory(names.iter().map(|n| DeviceId::new(*n)).collect());
        App::new(
            Box::new(inventory),
            Box::new(SilentProbe),
            Thresholds::default(),
        )
    }

    #[test]
    fn test_refresh_populates_report() {
        let mut app = app_with_disks(&["disk4", "disk5"]);
        assert!(app.report.is_none());

        app.refresh();
        let report = app.report.as_ref().unwrap();
        assert_eq!(report.device_count(), 2);
    }

    #[test]
    fn test_selection_is_clamped_to_device_count() {
        let mut app = app_with_disks(&["disk4", "disk5"]);
        app.refresh();

        app.select_next_n(10);
        assert_eq!(app.selected_index, 1);

        app.select_prev();
        assert_eq!(app.selected_index, 0);
        app.select_prev();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_selected_device_follows_cursor() {
        let mut app = app_with_disks(&["disk4", "disk5"]);
        app.refresh();

        app.select_last();
        let selected = app.selected_device().unwrap();
        assert_eq!(selected.id, DeviceId::new("disk5"));
    }

    #[test]
    fn test_export_without_data_fails() {
        let app = app_with_disks(&["disk4"]);
        assert!(app.export_state(Path::new("/tmp/never-written.json")).is_err());
    }

    #[test]
    fn test_export_writes_json_file() {
        let mut app = app_with_disks(&["disk4"]);
        app.refresh();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        app.export_state(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("disk4"));
    }
}
