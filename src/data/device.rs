//! Core device-level data types.
//!
//! These types are the vocabulary shared by the probes, the rate
//! estimator, and the UI: device identity, fetched attributes,
//! temperature readings, throughput samples, and RAID grouping.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

/// Identifier of one physical external device, e.g. `disk4`.
///
/// Stable for the lifetime of a monitoring session only; the OS may hand
/// out a different identifier after a reconnect or reboot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Device node path, e.g. `/dev/disk4`.
    pub fn dev_path(&self) -> String {
        format!("/dev/{}", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Static-ish identity of a device, re-fetched every poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceAttributes {
    /// Display name reported by the disk utility (media name).
    pub name: String,
    /// Human-readable size, e.g. "500.1 GB".
    pub size: String,
}

impl DeviceAttributes {
    /// Fallback attributes used when the attribute query fails.
    pub fn degraded(id: &DeviceId) -> Self {
        Self {
            name: id.to_string(),
            size: "Unknown".to_string(),
        }
    }
}

/// Outcome of a temperature query. The fetch itself never fails; every
/// failure mode maps onto one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureReading {
    /// Temperature in degrees Celsius.
    Celsius(i64),
    /// The tool ran but reported no usable temperature (includes
    /// permission failures).
    Unavailable,
    /// The temperature tool is not installed on this host.
    ToolMissing,
    /// The tool did not respond within its timeout.
    TimedOut,
}

/// One reading of a device's cumulative transfer counter.
///
/// The counter is monotonic in theory but may reset or go backward when
/// the underlying tool re-initializes; consumers must treat a negative
/// delta as a discontinuity, never as a negative rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputSample {
    /// Running total of megabytes transferred, as reported by the tool.
    pub total_mb: f64,
    /// When the sample was taken.
    pub observed_at: Instant,
}

/// A derived transfer rate for one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RateEstimate {
    /// Not enough samples yet to derive a rate.
    WarmingUp,
    /// Activity below the noise floor (includes counter resets).
    Idle,
    /// Meaningful activity, in megabytes per second.
    Rate(f64),
    /// The last sample could not be taken.
    Unavailable,
}

/// Grouping of a device within one poll cycle.
///
/// Membership is recomputed every cycle; a device belongs to exactly one
/// group per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeviceGroup {
    /// A device that is not part of any RAID set.
    Standalone(DeviceId),
    /// A named RAID set and its currently-attached members, in
    /// declaration order.
    Raid {
        name: String,
        members: Vec<DeviceId>,
    },
}

impl DeviceGroup {
    /// Devices in this group, in display order.
    pub fn members(&self) -> &[DeviceId] {
        match self {
            DeviceGroup::Standalone(id) => std::slice::from_ref(id),
            DeviceGroup::Raid { members, .. } => members,
        }
    }
}

/// Health classification for display colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARM",
            HealthStatus::Critical => "HOT",
        }
    }
}

/// Temperature thresholds for health classification.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Temperature at which a device is considered warm, in Celsius.
    pub temp_warning: i64,
    /// Temperature at which a device is considered hot, in Celsius.
    pub temp_critical: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_warning: 45,
            temp_critical: 55,
        }
    }
}

impl Thresholds {
    /// Classify a temperature reading. Readings without a temperature are
    /// healthy: missing data is not an alarm.
    pub fn classify(&self, reading: TemperatureReading) -> HealthStatus {
        match reading {
            TemperatureReading::Celsius(t) if t >= self.temp_critical => HealthStatus::Critical,
            TemperatureReading::Celsius(t) if t >= self.temp_warning => HealthStatus::Warning,
            _ => HealthStatus::Healthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_dev_path() {
        let id = DeviceId::new("disk4");
        assert_eq!(id.as_str(), "disk4");
        assert_eq!(id.dev_path(), "/dev/disk4");
        assert_eq!(id.to_string(), "disk4");
    }

    #[test]
    fn test_degraded_attributes_fall_back_to_id() {
        let attrs = DeviceAttributes::degraded(&DeviceId::new("disk7"));
        assert_eq!(attrs.name, "disk7");
        assert_eq!(attrs.size, "Unknown");
    }

    #[test]
    fn test_classify_temperature() {
        let thresholds = Thresholds::default();
        assert_eq!(
            thresholds.classify(TemperatureReading::Celsius(38)),
            HealthStatus::Healthy
        );
        assert_eq!(
            thresholds.classify(TemperatureReading::Celsius(45)),
            HealthStatus::Warning
        );
        assert_eq!(
            thresholds.classify(TemperatureReading::Celsius(60)),
            HealthStatus::Critical
        );
    }

    #[test]
    fn test_missing_data_is_not_an_alarm() {
        let thresholds = Thresholds::default();
        assert_eq!(
            thresholds.classify(TemperatureReading::ToolMissing),
            HealthStatus::Healthy
        );
        assert_eq!(
            thresholds.classify(TemperatureReading::Unavailable),
            HealthStatus::Healthy
        );
        assert_eq!(
            thresholds.classify(TemperatureReading::TimedOut),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn test_group_members() {
        let standalone = DeviceGroup::Standalone(DeviceId::new("disk4"));
        assert_eq!(standalone.members(), &[DeviceId::new("disk4")]);

        let raid = DeviceGroup::Raid {
            name: "Mirror".to_string(),
            members: vec![DeviceId::new("disk4"), DeviceId::new("disk5")],
        };
        assert_eq!(raid.members().len(), 2);
    }
}
