//! Stress tests: long streams, hostile inputs, sustained throughput.
//!
//! These validate the engine's bounded-state guarantees rather than its
//! recognition quality: hours of samples must not grow memory, emit
//! spurious gestures, or corrupt internal state.

use crate::classifier::TwistGestureClassifier;
use crate::pipeline::{GesturePipeline, PipelineConfig, SensorCaps};
use crate::types::{EngineEvent, SensorSample};

/// Deterministic pseudo-random f32 in [-1, 1] without a clock or an RNG
/// dependency: a simple multiplicative hash over the sample index.
fn jitter(index: u64, salt: u64) -> f32 {
    let h = index
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(salt)
        .rotate_left(17);
    ((h % 2000) as f32 / 1000.0) - 1.0
}

fn fallback_pipeline() -> GesturePipeline {
    GesturePipeline::new(PipelineConfig::default(), SensorCaps::gyro_only())
        .expect("gyroscope present")
}

#[test]
fn test_hour_of_ambient_noise_emits_nothing() {
    let mut pipeline = fallback_pipeline();

    // One hour at 50Hz: 180k samples of sub-threshold jitter.
    let mut events = 0;
    for i in 0..180_000_u64 {
        let ts = i * 20;
        let axes = [jitter(i, 1) * 2.0, jitter(i, 2) * 2.0, jitter(i, 3) * 2.0];
        if pipeline.process_sample(&SensorSample::gyro(ts, axes)).is_some() {
            events += 1;
        }
    }

    assert_eq!(events, 0);
    assert_eq!(pipeline.gestures_emitted(), 0);
    // Bounded state: the pending sequence can never exceed its capacity.
    assert!(pipeline.sequence_len() <= 3);
}

#[test]
fn test_violent_motion_storm_stays_bounded() {
    let mut pipeline = fallback_pipeline();

    // Alternating hard spikes on random-ish axes at full rate. The engine
    // may legitimately complete gestures here; it must simply never panic
    // and never hold more than three pending members.
    for i in 0..50_000_u64 {
        let ts = i * 20;
        let axis = (i % 3) as usize;
        let mut axes = [jitter(i, 4) * 6.0, jitter(i, 5) * 6.0, jitter(i, 6) * 6.0];
        axes[axis] = if i % 2 == 0 { 30.0 } else { -30.0 };
        pipeline.process_sample(&SensorSample::gyro(ts, axes));
        assert!(pipeline.sequence_len() <= 3);
    }
}

#[test]
fn test_interleaved_wear_cycling_never_corrupts() {
    let mut pipeline = fallback_pipeline();
    let mut ts = 0_u64;

    for cycle in 0..20 {
        // Motion, then a gesture attempt.
        ts += 100;
        pipeline.process_sample(&SensorSample::accel(ts, [0.5, 0.2, 0.1]));
        ts += 1500; // clear of any cooldown from the previous cycle
        pipeline.process_sample(&SensorSample::gyro(ts, [9.0, 0.4, 0.4]));
        pipeline.process_sample(&SensorSample::gyro(ts + 300, [-9.0, 0.4, 0.4]));
        let completed = pipeline
            .process_sample(&SensorSample::gyro(ts + 600, [9.0, 0.4, 0.4]))
            .is_some();
        assert!(completed, "cycle {cycle}: gesture should land while worn");
        ts += 600;

        // 31 seconds of stillness: off-wrist, path suspended.
        ts += 31_000;
        let event = pipeline.process_sample(&SensorSample::accel(ts, [0.01, 0.0, 0.0]));
        assert_eq!(event, Some(EngineEvent::WearStateChanged { worn: false }));
        assert_eq!(pipeline.sequence_len(), 0);
    }
}

#[test]
fn test_timestamp_regressions_are_survivable() {
    let mut classifier = TwistGestureClassifier::default();
    let mut ts: u64 = 1000;

    for i in 0..10_000_u64 {
        // Every 97th sample the clock jumps backwards.
        if i % 97 == 0 && ts > 500 {
            classifier.process_sample(ts - 500, [9.0, 0.4, 0.4]);
        }
        let axes = if i % 11 == 0 {
            [9.0, 0.4, 0.4]
        } else {
            [jitter(i, 7), jitter(i, 8), jitter(i, 9)]
        };
        classifier.process_sample(ts, axes);
        assert!(classifier.sequence_len() <= 3);
        ts += 20;
    }
}

#[test]
fn test_reset_storm_mid_sequence() {
    let mut pipeline = fallback_pipeline();

    for round in 0..1000_u64 {
        let base = round * 2000;
        pipeline.process_sample(&SensorSample::gyro(base + 1, [9.0, 0.4, 0.4]));
        pipeline.process_sample(&SensorSample::gyro(base + 301, [-9.0, 0.4, 0.4]));
        // Reset with two members pending: must be safe every time.
        pipeline.reset();
        assert_eq!(pipeline.sequence_len(), 0);
    }
    assert_eq!(pipeline.gestures_emitted(), 0);
}
