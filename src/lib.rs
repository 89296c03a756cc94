// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # diskwatch
//!
//! A terminal dashboard and library for monitoring external disk
//! temperature and I/O throughput.
//!
//! Diskwatch polls operating-system utilities on a fixed cadence,
//! derives a stable per-device transfer rate from their cumulative
//! counters, resolves RAID membership into groups, and renders the
//! result in an interactive terminal UI. Everything is best-effort: a
//! missing tool, a timed-out query, or an unreadable output line
//! degrades to an explicit placeholder rather than an error.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (state) │    │(estimator)    │(rendering)   │         │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── DiskutilInventory | ToolProbe               │
//! │  │ (tools) │                                                 │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, selection, and the per-cycle
//!   collection pass
//! - **[`source`]**: Collaborator seams ([`InventorySource`],
//!   [`DeviceProbe`]) with implementations that shell out to the OS
//!   tools under bounded timeouts
//! - **[`data`]**: Core types, RAID-aware grouping, the debounced
//!   [`RateEstimator`], and rate history for sparklines
//! - **[`ui`]**: Terminal rendering using ratatui - grouped device
//!   table, detail overlay, and theme support
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll every 2 seconds (the default)
//! diskwatch
//!
//! # Poll every 5 seconds
//! diskwatch --interval 5
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use diskwatch::{App, CommandRunner, DiskutilInventory, Thresholds, ToolProbe};
//!
//! let runner = Arc::new(CommandRunner::new().unwrap());
//! let inventory = Box::new(DiskutilInventory::new(Arc::clone(&runner)));
//! let probe = Box::new(ToolProbe::new(runner));
//! let mut app = App::new(inventory, probe, Thresholds::default());
//! app.refresh();
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    group_devices, DeviceAttributes, DeviceGroup, DeviceId, DeviceReport, DiskReport,
    HealthStatus, History, RateEstimate, RateEstimator, TemperatureReading, Thresholds,
    ThroughputSample,
};
pub use source::{
    CommandError, CommandRunner, DeviceProbe, DiskutilInventory, InventorySource, ToolProbe,
};
