//! Per-cycle report assembly.
//!
//! This module runs one full collection pass - inventory, grouping,
//! attributes, temperature, throughput, rate estimation - and packages
//! the result as a read-only [`DiskReport`] for the presentation layer.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use super::device::{
    DeviceAttributes, DeviceGroup, DeviceId, HealthStatus, RateEstimate, TemperatureReading,
    Thresholds,
};
use super::estimator::RateEstimator;
use crate::source::{DeviceProbe, InventorySource};

/// Everything known about one device in one poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub id: DeviceId,
    pub attributes: DeviceAttributes,
    pub temperature: TemperatureReading,
    pub rate: RateEstimate,
    pub health: HealthStatus,
}

/// Read-only snapshot handed to the presentation layer each cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DiskReport {
    /// RAID groups first (declaration order), then standalone devices
    /// (inventory order).
    pub groups: Vec<DeviceGroup>,
    /// Per-device data for every device in the inventory.
    pub devices: BTreeMap<DeviceId, DeviceReport>,
    #[serde(skip_serializing)]
    pub last_updated: Instant,
}

impl DiskReport {
    /// Run one full collection pass, sequentially per device.
    ///
    /// Never fails: every per-device fetch degrades to a sentinel value,
    /// and inventory failure degrades to an empty report.
    pub fn collect(
        inventory: &mut dyn InventorySource,
        probe: &mut dyn DeviceProbe,
        estimator: &mut RateEstimator,
        thresholds: &Thresholds,
    ) -> Self {
        let external = inventory.external_devices();
        let raids = inventory.raid_memberships();
        let groups = group_devices(&external, &raids);

        let mut devices = BTreeMap::new();
        for id in &external {
            let attributes = probe.attributes(id);
            let temperature = probe.temperature(id);
            let sample = probe.throughput(id);
            let rate = estimator.estimate(id, sample);
            let health = thresholds.classify(temperature);

            devices.insert(
                id.clone(),
                DeviceReport {
                    id: id.clone(),
                    attributes,
                    temperature,
                    rate,
                    health,
                },
            );
        }

        Self {
            groups,
            devices,
            last_updated: Instant::now(),
        }
    }

    /// Device reports flattened into display order (group by group).
    pub fn rows(&self) -> Vec<&DeviceReport> {
        self.groups
            .iter()
            .flat_map(|group| group.members())
            .filter_map(|id| self.devices.get(id))
            .collect()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Sum of the currently measured rates, in MB/s.
    pub fn total_rate(&self) -> f64 {
        self.devices
            .values()
            .filter_map(|d| match d.rate {
                RateEstimate::Rate(r) => Some(r),
                _ => None,
            })
            .sum()
    }

    /// True when every device reported the temperature tool as missing,
    /// used to surface an install hint.
    pub fn temperature_tool_missing(&self) -> bool {
        !self.devices.is_empty()
            && self
                .devices
                .values()
                .all(|d| d.temperature == TemperatureReading::ToolMissing)
    }

    /// Serialize the report for export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Partition the external-device inventory against the RAID membership
/// listing.
///
/// A device appearing in both a RAID's member list and the external list
/// joins that RAID group, preserving declaration order; a RAID with no
/// currently-external members is omitted; every other external device
/// becomes standalone. Pure and idempotent.
pub fn group_devices(
    external: &[DeviceId],
    raids: &[(String, Vec<DeviceId>)],
) -> Vec<DeviceGroup> {
    let external_set: HashSet<&DeviceId> = external.iter().collect();

    let mut groups = Vec::new();
    let mut grouped: HashSet<&DeviceId> = HashSet::new();

    for (name, members) in raids {
        let present: Vec<DeviceId> = members
            .iter()
            .filter(|m| external_set.contains(m) && !grouped.contains(m))
            .cloned()
            .collect();
        if present.is_empty() {
            continue;
        }
        grouped.extend(members.iter().filter(|m| external_set.contains(m)));
        groups.push(DeviceGroup::Raid {
            name: name.clone(),
            members: present,
        });
    }

    for id in external {
        if !grouped.contains(id) {
            groups.push(DeviceGroup::Standalone(id.clone()));
        }
    }

    groups
}
