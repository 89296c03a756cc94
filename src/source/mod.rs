//! OS tool integration: device inventory and per-device metrics.
//!
//! Two trait seams separate the engine from the operating system. The
//! [`InventorySource`] answers "which external devices exist and how are
//! they grouped"; the [`DeviceProbe`] answers "what do we know about one
//! device right now". The real implementations shell out to command-line
//! utilities with bounded timeouts; tests substitute fixtures.

mod command;
mod diskutil;
mod iostat;
mod smartctl;

pub use command::{CommandError, CommandRunner};
pub use diskutil::DiskutilInventory;

use std::fmt::Debug;
use std::sync::Arc;

use crate::data::{DeviceAttributes, DeviceId, TemperatureReading, ThroughputSample};

/// Provider of the per-cycle device inventory.
///
/// Both listings degrade to empty on failure: the caller sees "no
/// external disks" rather than an error.
pub trait InventorySource: Send + Debug {
    /// Currently attached external physical devices, in tool order.
    fn external_devices(&mut self) -> Vec<DeviceId>;

    /// RAID name -> ordered member devices, as declared by the volume
    /// manager.
    fn raid_memberships(&mut self) -> Vec<(String, Vec<DeviceId>)>;

    /// Human-readable label for the status bar.
    fn description(&self) -> &str;

    /// Error from the last inventory pass, if any.
    fn error(&self) -> Option<&str>;
}

/// Per-device metrics fetcher.
///
/// Every method is best-effort: missing tools, timeouts, permission
/// problems, and parse failures degrade to sentinel values instead of
/// propagating.
pub trait DeviceProbe: Send + Debug {
    /// Identity attributes; degraded defaults on failure.
    fn attributes(&mut self, id: &DeviceId) -> DeviceAttributes;

    /// Temperature reading; never fails.
    fn temperature(&mut self, id: &DeviceId) -> TemperatureReading;

    /// One cumulative-transfer sample; `None` on failure.
    fn throughput(&mut self, id: &DeviceId) -> Option<ThroughputSample>;
}

/// Probe backed by the real OS tools.
#[derive(Debug)]
pub struct ToolProbe {
    runner: Arc<CommandRunner>,
}

impl ToolProbe {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self { runner }
    }
}

impl DeviceProbe for ToolProbe {
    fn attributes(&mut self, id: &DeviceId) -> DeviceAttributes {
        diskutil::fetch_attributes(&self.runner, id)
    }

    fn temperature(&mut self, id: &DeviceId) -> TemperatureReading {
        smartctl::fetch_temperature(&self.runner, id)
    }

    fn throughput(&mut self, id: &DeviceId) -> Option<ThroughputSample> {
        iostat::sample_transfer(&self.runner, id)
    }
}
