//! Temperature queries via smartmontools.
//!
//! `smartctl` may be absent entirely (it is a third-party install), may
//! need elevated privileges, and prints a different diagnostic dump for
//! every drive family. The fetch therefore never fails: every outcome
//! maps onto a [`TemperatureReading`] variant.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::command::{CommandError, CommandRunner};
use crate::data::{DeviceId, TemperatureReading};

const SMARTCTL: &str = "smartctl";
const TIMEOUT: Duration = Duration::from_secs(5);

/// First integer immediately followed by the Celsius unit marker.
static TEMP_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*C").unwrap());

/// Extract a temperature from one line of diagnostic output, if the line
/// mentions temperature at all.
pub fn parse_temperature_line(line: &str) -> Option<i64> {
    if !line.to_lowercase().contains("temperature") {
        return None;
    }
    TEMP_VALUE
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

/// Scan a full diagnostic dump for the first usable temperature line.
pub fn parse_temperature(output: &str) -> Option<i64> {
    output.lines().find_map(parse_temperature_line)
}

/// Fetch the device temperature.
///
/// A permission failure looks identical to a run that printed no
/// temperature: both resolve to `Unavailable`. The exit status is
/// ignored because unprivileged runs exit non-zero while still printing
/// the attribute table.
pub fn fetch_temperature(runner: &CommandRunner, id: &DeviceId) -> TemperatureReading {
    fetch_temperature_with(runner, SMARTCTL, id)
}

/// Tool-name-explicit variant of [`fetch_temperature`].
fn fetch_temperature_with(
    runner: &CommandRunner,
    tool: &str,
    id: &DeviceId,
) -> TemperatureReading {
    if which::which(tool).is_err() {
        return TemperatureReading::ToolMissing;
    }

    match runner.run_unchecked(tool, &["-a", &id.dev_path()], TIMEOUT) {
        Ok(output) => match parse_temperature(&output) {
            Some(celsius) => TemperatureReading::Celsius(celsius),
            None => TemperatureReading::Unavailable,
        },
        Err(CommandError::TimedOut { .. }) => TemperatureReading::TimedOut,
        Err(err) => {
            debug!(device = %id, %err, "temperature query failed");
            TemperatureReading::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCSI_DUMP: &str = "\
smartctl 7.4 2023-08-01 r5530 [Darwin 23.1.0 arm64] (local build)
Copyright (C) 2002-23, Bruce Allen, Christian Franke, www.smartmontools.org

=== START OF READ SMART DATA SECTION ===
SMART Health Status: OK

Current Drive Temperature:     34 C
Drive Trip Temperature:        65 C
";

    const NVME_DUMP: &str = "\
=== START OF SMART DATA SECTION ===
SMART overall-health self-assessment test result: PASSED

Critical Warning:                   0x00
Temperature:                        41 Celsius
Available Spare:                    100%
";

    #[test]
    fn test_parse_scsi_temperature() {
        assert_eq!(parse_temperature(SCSI_DUMP), Some(34));
    }

    #[test]
    fn test_parse_nvme_temperature() {
        assert_eq!(parse_temperature(NVME_DUMP), Some(41));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            parse_temperature_line("Airflow_Temperature_Cel value: 38 C"),
            Some(38)
        );
        assert_eq!(parse_temperature_line("TEMPERATURE: 29 C"), Some(29));
    }

    #[test]
    fn test_line_without_unit_marker_is_skipped() {
        // An ATA attribute row ends in a bare raw value with no unit, so
        // it contributes nothing.
        let line = "194 Temperature_Celsius 0x0022   062   045   000    Old_age   Always       -       38";
        assert_eq!(parse_temperature_line(line), None);
    }

    #[test]
    fn test_dump_without_temperature_is_none() {
        let output = "SMART Health Status: OK\nPower On Hours: 1234\n";
        assert_eq!(parse_temperature(output), None);
    }

    #[test]
    fn test_non_temperature_lines_are_ignored() {
        assert_eq!(parse_temperature_line("Capacity: 500 GB (500 C...)"), None);
    }

    #[test]
    fn test_missing_tool_is_tool_missing_every_call() {
        let runner = CommandRunner::new().unwrap();
        let id = DeviceId::new("disk4");

        for _ in 0..2 {
            let reading = fetch_temperature_with(&runner, "diskwatch-no-such-smartctl", &id);
            assert_eq!(reading, TemperatureReading::ToolMissing);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_present_tool_without_temperature_is_unavailable() {
        let runner = CommandRunner::new().unwrap();
        let id = DeviceId::new("disk4");

        // `true` exists everywhere and prints nothing, which is exactly
        // what an unreadable device looks like.
        let reading = fetch_temperature_with(&runner, "true", &id);
        assert_eq!(reading, TemperatureReading::Unavailable);
    }
}
