//! Data models and processing for disk monitoring.
//!
//! This module turns raw probe results into structured, health-annotated
//! per-cycle reports, and owns the only persistent state in the core:
//! the rate estimator's per-device cache.
//!
//! ## Submodules
//!
//! - [`device`]: Core vocabulary types ([`DeviceId`], [`TemperatureReading`],
//!   [`RateEstimate`], [`DeviceGroup`], ...)
//! - [`estimator`]: Debounced rate derivation from cumulative counters
//! - [`history`]: Per-device rate history for sparklines
//! - [`report`]: Per-cycle collection and RAID-aware grouping
//!
//! ## Data Flow
//!
//! ```text
//! InventorySource + DeviceProbe (raw tool output)
//!        │
//!        ▼
//! DiskReport::collect()
//!        │
//!        ├──▶ group_devices() (RAID partitioning)
//!        ├──▶ RateEstimator::estimate() (debounced rates)
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod device;
pub mod estimator;
pub mod history;
pub mod report;

pub use device::{
    DeviceAttributes, DeviceGroup, DeviceId, HealthStatus, RateEstimate, TemperatureReading,
    Thresholds, ThroughputSample,
};
pub use estimator::{RateEstimator, DEFAULT_DEBOUNCE};
pub use history::History;
pub use report::{group_devices, DeviceReport, DiskReport};
