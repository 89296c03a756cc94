//! Debounced transfer-rate estimation.
//!
//! The I/O statistics tool reports a cumulative megabyte counter, not a
//! rate. This module derives an instantaneous rate by differencing two
//! successive samples per device, and caches the result so that a caller
//! polling faster than the tool's own refresh granularity does not see
//! misleading jitter or a rate of exactly zero.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use super::device::{DeviceId, RateEstimate, ThroughputSample};

/// Minimum rate considered meaningful activity, in MB/s. Anything below
/// (including negative deltas from counter resets) is reported as idle.
const IDLE_FLOOR: f64 = 0.01;

/// Default minimum time between two accepted rate recomputations for the
/// same device.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Per-device estimator state.
#[derive(Debug, Clone)]
struct DeviceState {
    /// Last successful sample, kept across failed polls so the next good
    /// sample can still produce a delta.
    prior: Option<ThroughputSample>,
    /// Last computed estimate, served while the debounce window is open.
    estimate: RateEstimate,
    /// When `estimate` was computed.
    estimated_at: Instant,
}

/// Derives smoothed per-device transfer rates from successive
/// cumulative-counter samples.
///
/// State is owned by the instance and lives for the process lifetime.
/// Entries for devices that disappear are not purged; growth is bounded
/// by realistic device churn within one session.
#[derive(Debug)]
pub struct RateEstimator {
    states: HashMap<DeviceId, DeviceState>,
    debounce: Duration,
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RateEstimator {
    /// Create an estimator with the given debounce window.
    pub fn new(debounce: Duration) -> Self {
        Self {
            states: HashMap::new(),
            debounce,
        }
    }

    /// Compute (or serve the cached) rate estimate for one device.
    ///
    /// Called once per device per poll cycle.
    pub fn estimate(
        &mut self,
        id: &DeviceId,
        sample: Option<ThroughputSample>,
    ) -> RateEstimate {
        self.estimate_at(id, sample, Instant::now())
    }

    /// Clock-explicit variant of [`RateEstimator::estimate`]; tests drive
    /// `now` directly instead of sleeping.
    pub fn estimate_at(
        &mut self,
        id: &DeviceId,
        sample: Option<ThroughputSample>,
        now: Instant,
    ) -> RateEstimate {
        // Inside the debounce window the cached estimate is returned
        // unchanged and the new sample is not consulted at all.
        if let Some(state) = self.states.get(id) {
            if now.saturating_duration_since(state.estimated_at) < self.debounce {
                return state.estimate;
            }
        }

        let Some(sample) = sample else {
            // A failed sample is not data: keep the stored prior sample,
            // but restart the debounce window from here.
            let state = self.states.entry(id.clone()).or_insert(DeviceState {
                prior: None,
                estimate: RateEstimate::Unavailable,
                estimated_at: now,
            });
            state.estimate = RateEstimate::Unavailable;
            state.estimated_at = now;
            return RateEstimate::Unavailable;
        };

        let prior = self.states.get(id).and_then(|s| s.prior);
        let estimate = match prior {
            None => RateEstimate::WarmingUp,
            Some(prior) => {
                let elapsed = sample
                    .observed_at
                    .checked_duration_since(prior.observed_at)
                    .filter(|d| !d.is_zero());
                let Some(elapsed) = elapsed else {
                    // Clock anomaly or duplicate sample: not ready yet,
                    // and the stored state stays untouched.
                    return RateEstimate::WarmingUp;
                };

                let delta = sample.total_mb - prior.total_mb;
                let rate = delta / elapsed.as_secs_f64();
                if delta < 0.0 {
                    debug!(device = %id, delta, "counter discontinuity, reporting idle");
                }
                if rate < IDLE_FLOOR {
                    RateEstimate::Idle
                } else {
                    RateEstimate::Rate(rate)
                }
            }
        };

        let state = self.states.entry(id.clone()).or_insert(DeviceState {
            prior: None,
            estimate,
            estimated_at: now,
        });
        state.prior = Some(sample);
        state.estimate = estimate;
        state.estimated_at = now;
        estimate
    }

    /// Number of devices the estimator has seen this session.
    pub fn tracked_devices(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(total_mb: f64, at: Instant) -> Option<ThroughputSample> {
        Some(ThroughputSample {
            total_mb,
            observed_at: at,
        })
    }

    fn disk(n: u32) -> DeviceId {
        DeviceId::new(format!("disk{}", n))
    }

    #[test]
    fn test_first_sample_warms_up() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();

        let result = estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        assert_eq!(result, RateEstimate::WarmingUp);
    }

    #[test]
    fn test_rate_from_two_samples() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t10 = t0 + Duration::from_secs(10);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        let result = estimator.estimate_at(&disk(4), sample(150.0, t10), t10);
        assert_eq!(result, RateEstimate::Rate(5.0));
    }

    #[test]
    fn test_negative_delta_is_idle() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t10 = Instant::now() + Duration::from_secs(10);
        let t12 = t10 + Duration::from_secs(2);

        estimator.estimate_at(&disk(4), sample(150.0, t10), t10);
        // delta = -10 over 2s: a counter reset, never a negative rate.
        let result = estimator.estimate_at(&disk(4), sample(140.0, t12), t12);
        assert_eq!(result, RateEstimate::Idle);
    }

    #[test]
    fn test_near_zero_rate_is_idle() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t10 = t0 + Duration::from_secs(10);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        // 0.05 MB over 10s = 0.005 MB/s, below the noise floor.
        let result = estimator.estimate_at(&disk(4), sample(100.05, t10), t10);
        assert_eq!(result, RateEstimate::Idle);
    }

    #[test]
    fn test_debounce_serves_cached_estimate() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);

        let first = estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        assert_eq!(first, RateEstimate::WarmingUp);

        // One second later, inside the window: identical result no matter
        // what the new sample says.
        let second = estimator.estimate_at(&disk(4), sample(9999.0, t1), t1);
        assert_eq!(second, first);
    }

    #[test]
    fn test_debounced_sample_is_not_consumed() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let t10 = t0 + Duration::from_secs(10);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        estimator.estimate_at(&disk(4), sample(9999.0, t1), t1);

        // The debounced 9999.0 sample was never stored: the rate after the
        // window comes from the original 100.0 sample.
        let result = estimator.estimate_at(&disk(4), sample(150.0, t10), t10);
        assert_eq!(result, RateEstimate::Rate(5.0));
    }

    #[test]
    fn test_non_positive_elapsed_leaves_state_unchanged() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t3 = t0 + Duration::from_secs(3);
        let t10 = t0 + Duration::from_secs(10);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);

        // Duplicate timestamp: zero elapsed.
        let result = estimator.estimate_at(&disk(4), sample(150.0, t0), t3);
        assert_eq!(result, RateEstimate::WarmingUp);

        // Sample observed before the stored prior: negative elapsed.
        let t_before = t0 - Duration::from_secs(1);
        let result = estimator.estimate_at(&disk(4), sample(150.0, t_before), t10);
        assert_eq!(result, RateEstimate::WarmingUp);

        // The stored prior is still (100.0, t0), so a later good sample
        // produces a rate against it.
        let result = estimator.estimate_at(&disk(4), sample(150.0, t10), t10);
        assert_eq!(result, RateEstimate::Rate(5.0));
    }

    #[test]
    fn test_failed_sample_reports_unavailable_and_preserves_prior() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t3 = t0 + Duration::from_secs(3);
        let t6 = t0 + Duration::from_secs(6);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);

        let result = estimator.estimate_at(&disk(4), None, t3);
        assert_eq!(result, RateEstimate::Unavailable);

        // The prior sample survived the failure: the next good sample is
        // differenced against (100.0, t0).
        let result = estimator.estimate_at(&disk(4), sample(160.0, t6), t6);
        assert_eq!(result, RateEstimate::Rate(10.0));
    }

    #[test]
    fn test_failed_sample_restarts_debounce_window() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t3 = t0 + Duration::from_secs(3);
        let t4 = t0 + Duration::from_secs(4);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        estimator.estimate_at(&disk(4), None, t3);

        // One second after the failure the window is still open, so the
        // cached Unavailable is served even though a good sample arrived.
        let result = estimator.estimate_at(&disk(4), sample(150.0, t4), t4);
        assert_eq!(result, RateEstimate::Unavailable);
    }

    #[test]
    fn test_failed_sample_for_unknown_device() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t3 = t0 + Duration::from_secs(3);

        let result = estimator.estimate_at(&disk(9), None, t0);
        assert_eq!(result, RateEstimate::Unavailable);

        // First real sample still warms up as usual.
        let result = estimator.estimate_at(&disk(9), sample(10.0, t3), t3);
        assert_eq!(result, RateEstimate::WarmingUp);
    }

    #[test]
    fn test_devices_are_tracked_independently() {
        let mut estimator = RateEstimator::new(DEFAULT_DEBOUNCE);
        let t0 = Instant::now();
        let t10 = t0 + Duration::from_secs(10);

        estimator.estimate_at(&disk(4), sample(100.0, t0), t0);
        estimator.estimate_at(&disk(5), sample(500.0, t0), t0);

        let a = estimator.estimate_at(&disk(4), sample(150.0, t10), t10);
        let b = estimator.estimate_at(&disk(5), sample(500.0, t10), t10);
        assert_eq!(a, RateEstimate::Rate(5.0));
        assert_eq!(b, RateEstimate::Idle);
        assert_eq!(estimator.tracked_devices(), 2);
    }
}
