//! Per-sample twist qualification.
//!
//! This module provides the low-level feature extraction for gesture
//! classification:
//! - Adaptive noise-floor estimation from recent sub-threshold samples
//! - Dominant-axis selection with off-axis rejection
//! - Spike detection against the adaptive floor
//!
//! Design note: all updates are incremental with a fixed-capacity window.
//! The median over the window is recomputed per sample, but the window is
//! bounded (20 entries), so the hot path stays constant-cost with no
//! allocation beyond the window itself.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{TwistDirection, TwistEvent};

/// Parameters for twist qualification.
///
/// The defaults are tuned for a wrist-mounted gyroscope sampled at full
/// rate. Thresholds are deliberately conservative: a missed twist costs one
/// retry, a false accept fires a user-visible action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifierConfig {
    /// Lower bound on rotation speed for a spike (rad/s). Samples below
    /// this feed the noise-floor window instead; samples above never do,
    /// so a twist cannot contaminate its own baseline.
    pub min_twist_speed: f32,

    /// Upper bound on rotation speed for a spike (rad/s). Filters impacts
    /// and arm flails that exceed any deliberate wrist twist.
    pub max_twist_speed: f32,

    /// Capacity of the noise-floor window (samples).
    pub baseline_capacity: usize,

    /// Noise floor reported while the window holds fewer than
    /// `baseline_min_samples` entries (rad/s).
    pub baseline_default: f32,

    /// Minimum window occupancy before the median is trusted.
    pub baseline_min_samples: usize,

    /// A spike must exceed baseline × this ratio.
    pub spike_ratio: f32,

    /// Minimum magnitude on the dominant axis (rad/s). Rotations weaker
    /// than this on every axis are ambient wrist movement.
    pub min_primary_axis_speed: f32,

    /// Dominant axis magnitude divided by the sum of the other two must be
    /// at least this ratio.
    pub min_axis_dominance_ratio: f32,

    /// Neither off-axis magnitude may exceed dominant × this fraction.
    pub max_off_axis_fraction: f32,

    /// Denominator guard for the dominance ratio.
    pub dominance_epsilon: f32,
}

impl Default for QualifierConfig {
    fn default() -> Self {
        Self {
            min_twist_speed: 5.5,
            max_twist_speed: 35.0,
            baseline_capacity: 20,
            baseline_default: 2.0,
            baseline_min_samples: 3,
            spike_ratio: 2.0,
            min_primary_axis_speed: 4.2,
            min_axis_dominance_ratio: 1.35,
            max_off_axis_fraction: 0.8,
            dominance_epsilon: 0.001,
        }
    }
}

/// Fixed-capacity FIFO of recent sub-threshold rotation magnitudes.
///
/// The median of its contents is the adaptive noise floor. Only samples
/// below the spike lower bound are admitted, so the floor tracks ambient
/// jitter rather than the gestures it is meant to separate from it.
#[derive(Debug, Clone)]
pub struct BaselineWindow {
    window: VecDeque<f32>,
    capacity: usize,
    default_floor: f32,
    min_samples: usize,
}

impl BaselineWindow {
    pub fn new(capacity: usize, default_floor: f32, min_samples: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            default_floor,
            min_samples,
        }
    }

    /// Push a sub-threshold magnitude, evicting the oldest entry past
    /// capacity. The caller is responsible for the sub-threshold check.
    pub fn push(&mut self, magnitude: f32) {
        self.window.push_back(magnitude);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// Median of the window contents, or the default floor while the
    /// window is too sparse to trust.
    pub fn noise_floor(&self) -> f32 {
        if self.window.len() < self.min_samples {
            return self.default_floor;
        }
        let mut sorted: Vec<f32> = self.window.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted[sorted.len() / 2]
    }

    /// Number of magnitudes currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all contents, returning the floor to its default.
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Per-sample twist qualifier: noise floor + axis dominance + spike test.
///
/// This is the hot-path front end of the classifier. A gyroscope sample
/// becomes a [`TwistEvent`] only when the axis qualification and the spike
/// test both pass.
#[derive(Debug, Clone)]
pub struct TwistQualifier {
    config: QualifierConfig,
    baseline: BaselineWindow,
}

impl TwistQualifier {
    pub fn new(config: QualifierConfig) -> Self {
        let baseline = BaselineWindow::new(
            config.baseline_capacity,
            config.baseline_default,
            config.baseline_min_samples,
        );
        Self { config, baseline }
    }

    /// Absorb a gyroscope reading into the noise floor and return its
    /// magnitude. Must be called once per gyroscope sample, before
    /// [`qualify`](Self::qualify), regardless of any downstream gating.
    pub fn observe(&mut self, axes: [f32; 3]) -> f32 {
        let magnitude = (axes[0] * axes[0] + axes[1] * axes[1] + axes[2] * axes[2]).sqrt();
        if magnitude < self.config.min_twist_speed {
            self.baseline.push(magnitude);
        }
        magnitude
    }

    /// Evaluate a gyroscope reading against axis qualification and the
    /// spike test. Returns a twist event only when both pass.
    pub fn qualify(
        &self,
        timestamp_ms: u64,
        axes: [f32; 3],
        magnitude: f32,
    ) -> Option<TwistEvent> {
        let (axis, direction) = self.axis_qualification(axes)?;

        if !self.is_spike(magnitude) {
            return None;
        }

        Some(TwistEvent::new(timestamp_ms, magnitude, axis, direction))
    }

    /// Current adaptive noise floor (rad/s).
    pub fn noise_floor(&self) -> f32 {
        self.baseline.noise_floor()
    }

    /// Occupancy of the baseline window, for diagnostics.
    pub fn baseline_len(&self) -> usize {
        self.baseline.len()
    }

    /// Restore power-on state: empty window, default floor.
    pub fn reset(&mut self) {
        self.baseline.clear();
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    /// Dominant-axis selection with off-axis rejection.
    ///
    /// Rejects rotations that are too weak on every axis, or whose energy
    /// is spread across axes (wrist twists concentrate on one).
    fn axis_qualification(&self, axes: [f32; 3]) -> Option<(usize, TwistDirection)> {
        let abs = [axes[0].abs(), axes[1].abs(), axes[2].abs()];

        let mut axis = 0;
        if abs[1] > abs[axis] {
            axis = 1;
        }
        if abs[2] > abs[axis] {
            axis = 2;
        }
        let dominant = abs[axis];

        if dominant < self.config.min_primary_axis_speed {
            return None;
        }

        let (off_a, off_b) = match axis {
            0 => (abs[1], abs[2]),
            1 => (abs[0], abs[2]),
            _ => (abs[0], abs[1]),
        };

        if off_a.max(off_b) > dominant * self.config.max_off_axis_fraction {
            trace!(axis, dominant, off_a, off_b, "off-axis energy too high");
            return None;
        }

        let dominance = dominant / (off_a + off_b + self.config.dominance_epsilon);
        if dominance < self.config.min_axis_dominance_ratio {
            trace!(axis, dominance, "axis dominance below ratio");
            return None;
        }

        Some((axis, TwistDirection::from_component(axes[axis])))
    }

    /// Spike test: within the speed band and clear of the noise floor.
    fn is_spike(&self, magnitude: f32) -> bool {
        magnitude > self.config.min_twist_speed
            && magnitude < self.config.max_twist_speed
            && magnitude > self.noise_floor() * self.config.spike_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualifier() -> TwistQualifier {
        TwistQualifier::new(QualifierConfig::default())
    }

    #[test]
    fn test_baseline_defaults_when_sparse() {
        let window = BaselineWindow::new(20, 2.0, 3);
        assert_eq!(window.noise_floor(), 2.0);

        let mut window = BaselineWindow::new(20, 2.0, 3);
        window.push(0.5);
        window.push(0.7);
        // Two entries: still below min_samples, still the default.
        assert_eq!(window.noise_floor(), 2.0);
    }

    #[test]
    fn test_baseline_median() {
        let mut window = BaselineWindow::new(20, 2.0, 3);
        for m in [0.2, 0.4, 0.6, 0.8, 1.0] {
            window.push(m);
        }
        assert!((window.noise_floor() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_baseline_eviction_past_capacity() {
        let mut window = BaselineWindow::new(3, 2.0, 3);
        for m in [5.0, 0.1, 0.1, 0.1] {
            window.push(m);
        }
        assert_eq!(window.len(), 3);
        // The 5.0 was evicted; the median reflects only recent entries.
        assert!((window.noise_floor() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_observe_excludes_spikes_from_baseline() {
        let mut q = qualifier();
        q.observe([8.0, 0.0, 0.0]); // above min_twist_speed, not absorbed
        q.observe([0.3, 0.1, 0.0]);
        assert_eq!(q.baseline_len(), 1);
    }

    #[test]
    fn test_qualify_accepts_clean_dominant_twist() {
        let mut q = qualifier();
        for _ in 0..10 {
            q.observe([0.2, 0.1, 0.1]);
        }
        let axes = [9.0, 0.5, 0.5];
        let magnitude = q.observe(axes);
        let event = q.qualify(1000, axes, magnitude).expect("should qualify");
        assert_eq!(event.axis, 0);
        assert_eq!(event.direction, TwistDirection::Positive);
        assert_eq!(event.timestamp_ms, 1000);
    }

    #[test]
    fn test_qualify_selects_dominant_axis() {
        let mut q = qualifier();
        for _ in 0..10 {
            q.observe([0.2, 0.1, 0.1]);
        }
        let axes = [0.5, -9.0, 0.5];
        let magnitude = q.observe(axes);
        let event = q.qualify(1000, axes, magnitude).expect("should qualify");
        assert_eq!(event.axis, 1);
        assert_eq!(event.direction, TwistDirection::Negative);
    }

    #[test]
    fn test_qualify_rejects_weak_primary_axis() {
        let mut q = qualifier();
        let axes = [4.0, 0.1, 0.1]; // below min_primary_axis_speed
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_none());
    }

    #[test]
    fn test_qualify_rejects_off_axis_energy() {
        let mut q = qualifier();
        for _ in 0..10 {
            q.observe([0.2, 0.1, 0.1]);
        }
        // Off-axis y = 8.0 > 9.0 * 0.8, rejected despite a strong dominant.
        let axes = [9.0, 8.0, 0.1];
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_none());
    }

    #[test]
    fn test_qualify_rejects_spread_rotation() {
        let mut q = qualifier();
        for _ in 0..10 {
            q.observe([0.2, 0.1, 0.1]);
        }
        // Dominance ratio 6 / (4 + 4) < 1.35: energy spread across axes.
        let axes = [6.0, 4.0, 4.0];
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_none());
    }

    #[test]
    fn test_spike_band_upper_bound() {
        let mut q = qualifier();
        for _ in 0..10 {
            q.observe([0.2, 0.1, 0.1]);
        }
        // Far beyond max_twist_speed: an impact, not a twist.
        let axes = [40.0, 1.0, 1.0];
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_none());
    }

    #[test]
    fn test_spike_requires_clearance_over_noise_floor() {
        let mut q = qualifier();
        // Noisy environment: floor near 4.0, so a 6.0 spike fails the
        // ratio test (needs > 8.0) while still being inside the band.
        for _ in 0..20 {
            q.observe([4.0, 0.5, 0.5]);
        }
        let axes = [6.0, 0.5, 0.5];
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_none());

        let axes = [9.5, 0.5, 0.5];
        let magnitude = q.observe(axes);
        assert!(q.qualify(0, axes, magnitude).is_some());
    }

    #[test]
    fn test_reset_restores_default_floor() {
        let mut q = qualifier();
        for _ in 0..20 {
            q.observe([3.0, 0.2, 0.2]);
        }
        assert!(q.noise_floor() > 2.0);
        q.reset();
        assert_eq!(q.baseline_len(), 0);
        assert_eq!(q.noise_floor(), 2.0);
    }
}
