//! Cumulative transfer sampling via the I/O statistics tool.
//!
//! `iostat -Id <device>` prints a short table whose last row carries the
//! running totals since boot. The third whitespace-separated column is
//! the cumulative megabytes transferred; rate derivation from successive
//! samples happens in the estimator, not here.

use std::time::{Duration, Instant};

use tracing::debug;

use super::command::CommandRunner;
use crate::data::{DeviceId, ThroughputSample};

const IOSTAT: &str = "iostat";
const TIMEOUT: Duration = Duration::from_secs(2);

/// Parse the cumulative megabytes column from tabular output.
///
/// Expects at least the two header rows plus a data row; the last row's
/// third column is the running MB total.
pub fn parse_total_megabytes(output: &str) -> Option<f64> {
    let lines: Vec<&str> = output.trim().lines().collect();
    if lines.len() < 3 {
        return None;
    }

    let fields: Vec<&str> = lines.last()?.split_whitespace().collect();
    if fields.len() < 3 {
        return None;
    }

    fields[2].parse().ok()
}

/// Take one cumulative-transfer sample for a device.
///
/// `None` on timeout, malformed output, or missing columns; callers must
/// treat that differently from a sample of zero.
pub fn sample_transfer(runner: &CommandRunner, id: &DeviceId) -> Option<ThroughputSample> {
    let output = match runner.run(IOSTAT, &["-Id", id.as_str()], TIMEOUT) {
        Ok(output) => output,
        Err(err) => {
            debug!(device = %id, %err, "throughput query failed");
            return None;
        }
    };

    let total_mb = parse_total_megabytes(&output)?;
    Some(ThroughputSample {
        total_mb,
        observed_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IOSTAT_OUTPUT: &str = "\
              disk4
    KB/t  xfrs   MB
   21.53  1034 21.74
";

    #[test]
    fn test_parse_cumulative_megabytes() {
        assert_eq!(parse_total_megabytes(IOSTAT_OUTPUT), Some(21.74));
    }

    #[test]
    fn test_headers_only_is_none() {
        let output = "              disk4\n    KB/t  xfrs   MB\n";
        assert_eq!(parse_total_megabytes(output), None);
    }

    #[test]
    fn test_short_row_is_none() {
        let output = "              disk4\n    KB/t  xfrs   MB\n   21.53  1034\n";
        assert_eq!(parse_total_megabytes(output), None);
    }

    #[test]
    fn test_non_numeric_column_is_none() {
        let output = "              disk4\n    KB/t  xfrs   MB\n   21.53  1034  n/a\n";
        assert_eq!(parse_total_megabytes(output), None);
    }

    #[test]
    fn test_empty_output_is_none() {
        assert_eq!(parse_total_megabytes(""), None);
    }
}
