//! Historical rate tracking for sparklines.

use std::collections::{HashMap, VecDeque};

use super::device::{DeviceId, RateEstimate};
use super::report::DiskReport;

/// Maximum number of historical readings to keep per device.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks recent transfer rates per device for visual trend indicators.
///
/// Session-memory only; nothing is persisted across restarts.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Recent rates per device, in MB/s. Idle cycles record 0.0; cycles
    /// without a usable estimate record nothing.
    rates: HashMap<DeviceId, VecDeque<f64>>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rates from one poll cycle.
    pub fn record(&mut self, report: &DiskReport) {
        for device in report.devices.values() {
            let rate = match device.rate {
                RateEstimate::Rate(r) => r,
                RateEstimate::Idle => 0.0,
                RateEstimate::WarmingUp | RateEstimate::Unavailable => continue,
            };

            let rates = self.rates.entry(device.id.clone()).or_default();
            rates.push_back(rate);
            if rates.len() > MAX_HISTORY_SIZE {
                rates.pop_front();
            }
        }
    }

    /// Get sparkline data for a device (normalized to 0-7 for 8 bar
    /// levels). Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, id: &DeviceId) -> Vec<u8> {
        let Some(values) = self.rates.get(id) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return values.iter().map(|_| 0).collect();
        }

        values
            .iter()
            .map(|&v| {
                let normalized = (v / max * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }
}
