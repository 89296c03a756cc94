//! Inventory and attribute queries via the system disk utility.
//!
//! The disk utility reports three things the monitor needs: which
//! attached devices are external and physical, how RAID sets are
//! composed, and per-device identity (media name and size). All three
//! arrive as free text; parsing is kept in pure functions so it can be
//! tested without spawning processes.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::command::CommandRunner;
use super::InventorySource;
use crate::data::{DeviceAttributes, DeviceId};

const DISKUTIL: &str = "diskutil";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Whole-device token in a device-list line, e.g. `/dev/disk4`.
static DEVICE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"/dev/(disk\d+)").unwrap());

/// Numbered member row in a RAID listing: index, then a device column.
static MEMBER_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+(\S+)").unwrap());

/// Whole-disk number inside a member column like `disk5s2`.
static DISK_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"disk(\d+)").unwrap());

/// Extract external physical devices from the device listing.
pub fn parse_external_devices(output: &str) -> Vec<DeviceId> {
    output
        .lines()
        .filter(|line| line.contains("external, physical"))
        .filter_map(|line| DEVICE_TOKEN.captures(line))
        .map(|caps| DeviceId::new(&caps[1]))
        .collect()
}

/// Extract RAID name -> member devices from the RAID listing.
///
/// A `Name:` line opens a set; subsequent numbered rows contribute
/// members. Member columns name slices (`disk5s2`); the whole disk is
/// what the inventory tracks.
pub fn parse_raid_memberships(output: &str) -> Vec<(String, Vec<DeviceId>)> {
    let mut raids: Vec<(String, Vec<DeviceId>)> = Vec::new();
    let mut current: Option<(String, Vec<DeviceId>)> = None;

    for line in output.lines() {
        if let Some((_, rest)) = line.split_once("Name:") {
            if let Some(raid) = current.take() {
                if !raid.1.is_empty() {
                    raids.push(raid);
                }
            }
            current = Some((rest.trim().to_string(), Vec::new()));
        } else if let Some(caps) = MEMBER_ROW.captures(line.trim()) {
            if let Some((_, members)) = current.as_mut() {
                if let Some(num) = DISK_NUMBER.captures(&caps[1]) {
                    members.push(DeviceId::new(format!("disk{}", &num[1])));
                }
            }
        }
    }

    if let Some(raid) = current.take() {
        if !raid.1.is_empty() {
            raids.push(raid);
        }
    }

    raids
}

/// Extract the display name and size from a per-device info dump.
///
/// The size value carries a trailing byte-count parenthetical which is
/// stripped for display.
pub fn parse_attributes(id: &DeviceId, output: &str) -> DeviceAttributes {
    let mut name = None;
    let mut size = None;

    for line in output.lines() {
        if line.contains("Device / Media Name:") {
            name = line.splitn(2, ':').nth(1).map(|v| v.trim().to_string());
        } else if line.contains("Disk Size:") {
            size = line
                .splitn(2, ':')
                .nth(1)
                .map(|v| v.split('(').next().unwrap_or(v).trim().to_string());
        }
    }

    DeviceAttributes {
        name: name.unwrap_or_else(|| id.to_string()),
        size: size.unwrap_or_else(|| "Unknown".to_string()),
    }
}

/// Fetch identity attributes for one device. Any invocation or parse
/// failure returns the degraded default, never an error.
pub fn fetch_attributes(runner: &CommandRunner, id: &DeviceId) -> DeviceAttributes {
    match runner.run(DISKUTIL, &["info", id.as_str()], TIMEOUT) {
        Ok(output) => parse_attributes(id, &output),
        Err(err) => {
            debug!(device = %id, %err, "attribute query failed, using defaults");
            DeviceAttributes::degraded(id)
        }
    }
}

/// Inventory provider backed by the system disk utility.
#[derive(Debug)]
pub struct DiskutilInventory {
    runner: Arc<CommandRunner>,
    description: String,
    last_error: Option<String>,
}

impl DiskutilInventory {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self {
            runner,
            description: format!("{} inventory", DISKUTIL),
            last_error: None,
        }
    }
}

impl InventorySource for DiskutilInventory {
    fn external_devices(&mut self) -> Vec<DeviceId> {
        match self.runner.run(DISKUTIL, &["list"], TIMEOUT) {
            Ok(output) => {
                self.last_error = None;
                parse_external_devices(&output)
            }
            Err(err) => {
                warn!(%err, "device inventory failed");
                self.last_error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    fn raid_memberships(&mut self) -> Vec<(String, Vec<DeviceId>)> {
        // Absence of the RAID subsystem is not an inventory error; the
        // devices simply all end up standalone.
        match self.runner.run(DISKUTIL, &["appleRAID", "list"], TIMEOUT) {
            Ok(output) => parse_raid_memberships(&output),
            Err(err) => {
                debug!(%err, "raid membership query failed");
                Vec::new()
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_LIST: &str = "\
/dev/disk0 (internal, physical):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      GUID_partition_scheme                        *500.3 GB   disk0
   1:                        EFI EFI                     314.6 MB   disk0s1

/dev/disk4 (external, physical):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      GUID_partition_scheme                        *2.0 TB     disk4
   1:                  Apple_HFS Backup                  2.0 TB     disk4s2

/dev/disk5 (external, physical):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      GUID_partition_scheme                        *2.0 TB     disk5
";

    const RAID_LIST: &str = "\
AppleRAID sets (1 found)
===============================================================================
Name:                 Mirror
Unique ID:            8A7F9D52-1234-4C6B-9D1E-ABCDEF012345
Level Type:           Mirror
Status:               Online
Size:                 2.0 TB (2000398934016 Bytes)

#  DevNode       UUID                                  Status
-------------------------------------------------------------------------------
0  disk4s2       11111111-2222-3333-4444-555555555555  Online
1  disk5s2       66666666-7777-8888-9999-AAAAAAAAAAAA  Online
-------------------------------------------------------------------------------
";

    const DISK_INFO: &str = "\
   Device Identifier:         disk4
   Device Node:               /dev/disk4
   Whole:                     Yes
   Part of Whole:             disk4

   Device / Media Name:       Samsung PSSD T7

   Volume Name:               Not applicable (no file system)
   Mounted:                   Not applicable (no file system)

   Disk Size:                 500.1 GB (500107862016 Bytes) (exactly 976773168 512-Byte-Units)
";

    #[test]
    fn test_parse_external_devices() {
        let devices = parse_external_devices(DEVICE_LIST);
        assert_eq!(devices, vec![DeviceId::new("disk4"), DeviceId::new("disk5")]);
    }

    #[test]
    fn test_internal_devices_are_ignored() {
        let devices = parse_external_devices("/dev/disk0 (internal, physical):\n");
        assert!(devices.is_empty());
    }

    #[test]
    fn test_parse_external_devices_empty_output() {
        assert!(parse_external_devices("").is_empty());
    }

    #[test]
    fn test_parse_raid_memberships() {
        let raids = parse_raid_memberships(RAID_LIST);
        assert_eq!(raids.len(), 1);
        assert_eq!(raids[0].0, "Mirror");
        // Member slices resolve to their whole disks.
        assert_eq!(
            raids[0].1,
            vec![DeviceId::new("disk4"), DeviceId::new("disk5")]
        );
    }

    #[test]
    fn test_raid_without_members_is_dropped() {
        let output = "Name:                 Empty\nStatus:               Offline\n";
        assert!(parse_raid_memberships(output).is_empty());
    }

    #[test]
    fn test_parse_raid_memberships_no_raid_support() {
        let raids = parse_raid_memberships("Error: AppleRAID is not supported\n");
        assert!(raids.is_empty());
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(&DeviceId::new("disk4"), DISK_INFO);
        assert_eq!(attrs.name, "Samsung PSSD T7");
        // Trailing parentheticals are stripped from the size.
        assert_eq!(attrs.size, "500.1 GB");
    }

    #[test]
    fn test_parse_attributes_missing_fields() {
        let attrs = parse_attributes(&DeviceId::new("disk4"), "nothing useful here\n");
        assert_eq!(attrs.name, "disk4");
        assert_eq!(attrs.size, "Unknown");
    }
}
