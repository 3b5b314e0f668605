//! Sampling-interval jitter accounting.

use embassy_time::{
    Duration,
    Instant,
};

use crate::config::JITTER_BUCKETS;

/// Histogram of how far each sampler interval strayed from the expected period.
#[derive(Debug, Clone)]
pub struct JitterMonitor {
    period: Duration,
    unit: Duration,
    last: Option<Instant>,
    histogram: [u32; JITTER_BUCKETS],
    max: u32,
}

impl JitterMonitor {
    pub const fn new(period: Duration, unit: Duration) -> Self {
        Self {
            period,
            unit,
            last: None,
            histogram: [0; JITTER_BUCKETS],
            max: 0,
        }
    }

    /// Record an invocation at `now` and return its jitter in units.
    ///
    /// The first call after construction or [`reset`](Self::reset) only
    /// stores the timestamp and returns `None`.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        let last = self.last.replace(now)?;
        let elapsed = now.saturating_duration_since(last).as_ticks();
        let deviation = elapsed.abs_diff(self.period.as_ticks());

        let unit = self.unit.as_ticks().max(1);
        let jitter = u32::try_from((deviation + unit / 2) / unit).unwrap_or(u32::MAX);

        self.max = self.max.max(jitter);
        let bucket = (jitter as usize).min(JITTER_BUCKETS - 1);
        self.histogram[bucket] = self.histogram[bucket].saturating_add(1);
        Some(jitter)
    }

    /// Largest jitter seen since the last reset, unsaturated.
    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn histogram(&self) -> &[u32; JITTER_BUCKETS] {
        &self.histogram
    }

    /// Forget everything, including the previous timestamp.
    pub fn reset(&mut self) {
        self.last = None;
        self.histogram = [0; JITTER_BUCKETS];
        self.max = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> JitterMonitor {
        JitterMonitor::new(Duration::from_millis(50), Duration::from_micros(1))
    }

    fn at_us(us: u64) -> Instant {
        Instant::from_micros(us)
    }

    #[test]
    fn first_invocation_is_not_recorded() {
        let mut jitter = monitor();
        assert_eq!(jitter.record(at_us(1_000)), None);
        assert_eq!(jitter.histogram().iter().sum::<u32>(), 0);
    }

    #[test]
    fn on_time_sample_lands_in_bucket_zero() {
        let mut jitter = monitor();
        jitter.record(at_us(0));
        assert_eq!(jitter.record(at_us(50_000)), Some(0));
        assert_eq!(jitter.histogram()[0], 1);
        assert_eq!(jitter.max(), 0);
    }

    #[test]
    fn early_and_late_samples_count_the_same() {
        let mut jitter = monitor();
        jitter.record(at_us(0));
        assert_eq!(jitter.record(at_us(50_007)), Some(7));
        assert_eq!(jitter.record(at_us(100_000)), Some(7));
        assert_eq!(jitter.histogram()[7], 2);
    }

    #[test]
    fn large_deviation_saturates_last_bucket() {
        let mut jitter = monitor();
        jitter.record(at_us(0));
        assert_eq!(jitter.record(at_us(80_000)), Some(30_000));
        assert_eq!(jitter.histogram()[JITTER_BUCKETS - 1], 1);
        assert_eq!(jitter.max(), 30_000);
    }

    #[test]
    fn reset_skips_the_next_interval() {
        let mut jitter = monitor();
        jitter.record(at_us(0));
        jitter.record(at_us(50_100));
        jitter.reset();
        assert_eq!(jitter.max(), 0);
        assert_eq!(jitter.record(at_us(900_000)), None);
    }
}
