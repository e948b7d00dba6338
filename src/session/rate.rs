//! Pose arrival-rate statistics.

use std::time::{Duration, Instant};

/// Running statistics over the interval between consecutive pose arrivals.
#[derive(Debug, Clone, Default)]
pub struct PoseRateMeter {
    last_arrival: Option<Instant>,
    poses: u64,
    intervals: u64,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
}

/// Snapshot of [`PoseRateMeter`] for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSummary {
    pub poses: u64,
    pub mean_interval_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
    /// Mean arrival frequency derived from the mean interval.
    pub hz: f64,
}

impl PoseRateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now: Instant) {
        self.poses += 1;
        if let Some(last) = self.last_arrival {
            let delta = now.saturating_duration_since(last);
            self.intervals += 1;
            self.total += delta;
            self.min = Some(self.min.map_or(delta, |m| m.min(delta)));
            self.max = Some(self.max.map_or(delta, |m| m.max(delta)));
        }
        self.last_arrival = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn poses(&self) -> u64 {
        self.poses
    }

    /// `None` until at least two poses have arrived.
    pub fn summary(&self) -> Option<RateSummary> {
        if self.intervals == 0 {
            return None;
        }
        let mean_ms = self.total.as_secs_f64() * 1000.0 / self.intervals as f64;
        let hz = if mean_ms > 0.0 { 1000.0 / mean_ms } else { 0.0 };
        Some(RateSummary {
            poses: self.poses,
            mean_interval_ms: mean_ms,
            min_interval_ms: self.min.unwrap_or_default().as_secs_f64() * 1000.0,
            max_interval_ms: self.max.unwrap_or_default().as_secs_f64() * 1000.0,
            hz,
        })
    }
}

/// One-line summary printed when a viewer session ends.
pub fn format_rate_summary(summary: &RateSummary) -> String {
    format!(
        "poses={} mean_dt={:.1}ms (~{:.1} Hz) min_dt={:.1}ms max_dt={:.1}ms",
        summary.poses,
        summary.mean_interval_ms,
        summary.hz,
        summary.min_interval_ms,
        summary.max_interval_ms
    )
}
