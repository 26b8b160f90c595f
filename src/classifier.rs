//! Triple-twist gesture classifier.
//!
//! Composes the per-sample qualifier and the sequence state machine into
//! the single entry point the pipeline feeds gyroscope samples through.
//! The classifier owns the gate ordering: noise-floor update happens on
//! every sample, then cooldown, sequence expiry, and debounce run before
//! qualification is even attempted.
//!
//! The classification path is total: every well-formed sample returns
//! either a completed direction or `None`, and `None` is the overwhelmingly
//! common, non-error outcome.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::qualifier::{QualifierConfig, TwistQualifier};
use crate::sequence::{SequenceAdvance, SequenceConfig, TwistSequence};
use crate::types::TwistDirection;

/// How often the periodic status line is traced (samples).
const STATUS_LOG_INTERVAL: u64 = 200;

/// Bundled configuration for the full classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Qualification parameters (noise floor, axis dominance, spike band).
    pub qualifier: QualifierConfig,
    /// Sequence machine parameters (timing windows, axis policy).
    pub sequence: SequenceConfig,
}

impl ClassifierConfig {
    /// The axis-free, unbounded-minimum sequence policy with default
    /// qualification. See [`SequenceConfig::permissive`].
    pub fn permissive() -> Self {
        Self {
            qualifier: QualifierConfig::default(),
            sequence: SequenceConfig::permissive(),
        }
    }
}

/// Streaming triple-twist classifier.
///
/// Feed it every gyroscope sample in delivery order; it emits at most one
/// completed direction per sample. State is confined to this instance and
/// reconstructed entirely from live samples after a [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct TwistGestureClassifier {
    qualifier: TwistQualifier,
    sequence: TwistSequence,

    /// Timestamp of the last processed sample, for the monotonicity defense.
    last_timestamp_ms: Option<u64>,

    /// Samples seen since construction or reset.
    sample_count: u64,
}

impl TwistGestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            qualifier: TwistQualifier::new(config.qualifier),
            sequence: TwistSequence::new(config.sequence),
            last_timestamp_ms: None,
            sample_count: 0,
        }
    }

    /// Process one gyroscope sample.
    ///
    /// Returns the gesture direction on the rare sample that completes a
    /// triple twist; `None` otherwise.
    pub fn process_sample(
        &mut self,
        timestamp_ms: u64,
        axes: [f32; 3],
    ) -> Option<TwistDirection> {
        self.sample_count += 1;

        // Defensive: a non-increasing timestamp means the source reordered
        // or reset. Drop the active sequence and treat the sample as a
        // no-op rather than propagate an error.
        if let Some(last) = self.last_timestamp_ms {
            if timestamp_ms <= last {
                warn!(
                    timestamp_ms,
                    last_timestamp_ms = last,
                    "non-monotonic timestamp, dropping active sequence"
                );
                self.sequence.abandon();
                return None;
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        // The noise floor absorbs every sub-threshold sample, even ones
        // that later gates would ignore.
        let magnitude = self.qualifier.observe(axes);

        if self.sample_count % STATUS_LOG_INTERVAL == 0 {
            trace!(
                magnitude,
                noise_floor = self.qualifier.noise_floor(),
                sequence_len = self.sequence.len(),
                samples = self.sample_count,
                "classifier status"
            );
        }

        if self.sequence.in_cooldown(timestamp_ms) {
            return None;
        }

        self.sequence.expire_stale(timestamp_ms);

        if self.sequence.in_debounce(timestamp_ms) {
            return None;
        }

        let candidate = self.qualifier.qualify(timestamp_ms, axes, magnitude)?;

        match self.sequence.accept(candidate) {
            SequenceAdvance::Completed(direction) => Some(direction),
            _ => None,
        }
    }

    /// Current adaptive noise floor (rad/s).
    pub fn noise_floor(&self) -> f32 {
        self.qualifier.noise_floor()
    }

    /// Members currently pending in the sequence machine.
    pub fn sequence_len(&self) -> usize {
        self.sequence.len()
    }

    /// Axis the pending sequence is locked to, if any.
    pub fn locked_axis(&self) -> Option<usize> {
        self.sequence.locked_axis()
    }

    /// Samples processed since construction or reset.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Lifetime statistics: (accepted twist candidates, completions).
    pub fn statistics(&self) -> (u64, u64) {
        self.sequence.statistics()
    }

    /// Restore power-on state: empty sequence, empty baseline window, no
    /// locked axis, zeroed counters. Safe at any time, including with a
    /// sequence mid-flight.
    pub fn reset(&mut self) {
        self.qualifier.reset();
        self.sequence.reset();
        self.last_timestamp_ms = None;
        self.sample_count = 0;
    }
}

impl Default for TwistGestureClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A gyro vector that qualifies cleanly on the x axis.
    fn spike(direction: f32) -> [f32; 3] {
        [9.0 * direction.signum(), 0.4, 0.4]
    }

    /// Ambient jitter well below every threshold.
    fn quiet() -> [f32; 3] {
        [0.2, 0.1, 0.1]
    }

    fn seeded_classifier() -> TwistGestureClassifier {
        let mut c = TwistGestureClassifier::default();
        // Settle the noise floor with ambient samples.
        for i in 0..10 {
            assert!(c.process_sample(i * 20, quiet()).is_none());
        }
        c
    }

    #[test]
    fn test_triple_twist_recognized() {
        let mut c = seeded_classifier();
        assert!(c.process_sample(1000, spike(1.0)).is_none());
        assert!(c.process_sample(1300, spike(-1.0)).is_none());
        assert_eq!(
            c.process_sample(1600, spike(1.0)),
            Some(TwistDirection::Positive)
        );
    }

    #[test]
    fn test_quiet_stream_emits_nothing() {
        let mut c = TwistGestureClassifier::default();
        for i in 0..500 {
            assert!(c.process_sample(i * 20, quiet()).is_none());
        }
        assert_eq!(c.statistics(), (0, 0));
    }

    #[test]
    fn test_debounce_suppresses_ringing() {
        let mut c = seeded_classifier();
        assert!(c.process_sample(1000, spike(1.0)).is_none());
        assert_eq!(c.sequence_len(), 1);
        // 30ms later: inside the debounce window, pure drop.
        assert!(c.process_sample(1030, spike(-1.0)).is_none());
        assert_eq!(c.sequence_len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_back_to_back_gestures() {
        let mut c = seeded_classifier();
        c.process_sample(1000, spike(1.0));
        c.process_sample(1300, spike(-1.0));
        assert!(c.process_sample(1600, spike(1.0)).is_some());

        // A full second pattern inside the cooldown is ignored outright.
        assert!(c.process_sample(1800, spike(1.0)).is_none());
        assert!(c.process_sample(2100, spike(-1.0)).is_none());
        assert!(c.process_sample(2400, spike(1.0)).is_none());
        assert_eq!(c.sequence_len(), 0);
    }

    #[test]
    fn test_non_monotonic_timestamp_is_noop() {
        let mut c = seeded_classifier();
        c.process_sample(1000, spike(1.0));
        c.process_sample(1300, spike(-1.0));
        assert_eq!(c.sequence_len(), 2);

        // Clock went backwards: active sequence dropped, sample discarded.
        assert!(c.process_sample(1200, spike(1.0)).is_none());
        assert_eq!(c.sequence_len(), 0);

        // Forward samples recover normally.
        assert!(c.process_sample(1400, spike(1.0)).is_none());
        assert_eq!(c.sequence_len(), 1);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let mut used = seeded_classifier();
        used.process_sample(1000, spike(1.0));
        used.process_sample(1300, spike(-1.0));
        used.process_sample(1600, spike(1.0));
        used.reset();

        let mut fresh = TwistGestureClassifier::default();

        // Identical stream through both; identical outputs.
        let stream: Vec<(u64, [f32; 3])> = (0..10)
            .map(|i| (i * 20, quiet()))
            .chain([(1000, spike(1.0)), (1300, spike(-1.0)), (1600, spike(1.0))])
            .collect();

        for (ts, axes) in stream {
            assert_eq!(used.process_sample(ts, axes), fresh.process_sample(ts, axes));
        }
        assert_eq!(used.statistics(), fresh.statistics());
    }
}
