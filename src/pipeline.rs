//! Gesture pipeline controller.
//!
//! Orchestrates the full data flow from raw sensor samples to engine
//! events: raw samples → wear-state gate → twist qualification → sequence
//! matching → completed-gesture event.
//!
//! The pipeline owns its classifier and wear detector explicitly; there is
//! no global state anywhere in the crate. It performs no I/O, no
//! networking, and no persistence: classifier state is ephemeral and
//! reconstructed from live samples only.
//!
//! # Gating
//!
//! Two independent gates decide whether a gyroscope sample reaches the
//! classifier:
//! - the externally-owned **enabled** gate (service paused/resumed); while
//!   disabled every sample is suppressed, and re-enabling resets state;
//! - the inferred **wear** gate; while off-wrist the gesture path is fully
//!   suspended and classifier state cleared, while the wear path keeps
//!   running so re-worn can be observed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{ClassifierConfig, TwistGestureClassifier};
use crate::error::{EngineError, Result};
use crate::types::{EngineEvent, SensorKind, SensorSample, WearState};
use crate::wear::{WearDetector, WearDetectorConfig, WearStrategy, WornFlag};

/// Boot-time hardware capabilities, probed once by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCaps {
    /// A gyroscope is present. Without one the engine cannot run at all.
    pub has_gyroscope: bool,
    /// A dedicated low-latency on-body sensor is present.
    pub has_dedicated_wear_sensor: bool,
}

impl SensorCaps {
    /// Typical wearable: gyroscope plus dedicated wear sensor.
    pub fn full() -> Self {
        Self {
            has_gyroscope: true,
            has_dedicated_wear_sensor: true,
        }
    }

    /// Gyroscope only; wear state falls back to motion inference.
    pub fn gyro_only() -> Self {
        Self {
            has_gyroscope: true,
            has_dedicated_wear_sensor: false,
        }
    }
}

/// Bundled configuration for the complete pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Classifier configuration (qualification + sequence machine).
    pub classifier: ClassifierConfig,
    /// Wear detection configuration.
    pub wear: WearDetectorConfig,
}

/// Complete gesture pipeline.
///
/// Single-writer by construction: all mutation happens through `&mut self`
/// on whatever thread the host confines the instance to. The only value
/// that crosses threads is the worn boolean, published through
/// [`WornFlag`].
#[derive(Debug)]
pub struct GesturePipeline {
    classifier: TwistGestureClassifier,
    wear: WearDetector,
    enabled: bool,

    // Statistics
    gestures_emitted: u64,
}

impl GesturePipeline {
    /// Build the pipeline, failing fast when required hardware is absent.
    ///
    /// A missing gyroscope is a fatal capability error surfaced here,
    /// exactly once; it is never re-checked per-sample.
    pub fn new(config: PipelineConfig, caps: SensorCaps) -> Result<Self> {
        if !caps.has_gyroscope {
            return Err(EngineError::GyroscopeUnavailable);
        }

        let qualifier = &config.classifier.qualifier;
        if qualifier.min_twist_speed >= qualifier.max_twist_speed {
            return Err(EngineError::invalid_config(
                "min_twist_speed must be below max_twist_speed",
            ));
        }
        let sequence = &config.classifier.sequence;
        if sequence.min_total_time_ms > sequence.max_total_time_ms {
            return Err(EngineError::invalid_config(
                "min_total_time_ms must not exceed max_total_time_ms",
            ));
        }

        Ok(Self {
            classifier: TwistGestureClassifier::new(config.classifier),
            wear: WearDetector::new(config.wear, caps.has_dedicated_wear_sensor),
            enabled: true,
            gestures_emitted: 0,
        })
    }

    /// Process one sensor sample in delivery order.
    ///
    /// Returns at most one event; `None` is the default outcome for the
    /// overwhelming majority of samples and is not a failure signal.
    pub fn process_sample(&mut self, sample: &SensorSample) -> Option<EngineEvent> {
        if !self.enabled {
            return None;
        }

        match sample.kind {
            SensorKind::Accelerometer => self.process_accel(sample),
            SensorKind::Gyroscope => self.process_gyro(sample),
        }
    }

    /// Process a dedicated on-body sensor reading.
    ///
    /// These arrive on their own cadence, outside the gyro/accel stream.
    pub fn process_wear_sensor(&mut self, normalized_value: f32) -> Option<EngineEvent> {
        if !self.enabled {
            return None;
        }
        let worn = self.wear.process_wear_sensor(normalized_value)?;
        Some(self.on_wear_transition(worn))
    }

    /// Flip the externally-owned enabled gate.
    ///
    /// Disabling suppresses all processing and clears classifier state;
    /// re-enabling resets again so stale partial sequences can never leak
    /// across a pause.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.classifier.reset();
        if enabled {
            info!("pipeline resumed");
        } else {
            info!("pipeline paused");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current worn belief.
    pub fn is_worn(&self) -> bool {
        self.wear.is_worn()
    }

    /// Whether the host should keep gyroscope delivery registered. False
    /// while paused or off-wrist; the wear feed stays registered
    /// regardless so the pipeline can observe re-worn.
    pub fn wants_gesture_sensors(&self) -> bool {
        self.enabled && self.wear.is_worn()
    }

    /// Whether accelerometer samples are needed at all (only under the
    /// motion-fallback wear strategy).
    pub fn needs_accelerometer_feed(&self) -> bool {
        self.wear.needs_accelerometer_feed()
    }

    /// Strategy the wear detector was built with.
    pub fn wear_strategy(&self) -> WearStrategy {
        self.wear.strategy()
    }

    /// Full wear state, for diagnostics.
    pub fn wear_state(&self) -> WearState {
        self.wear.state()
    }

    /// Handle to the atomic worn flag for cross-thread readers.
    pub fn worn_flag(&self) -> WornFlag {
        self.wear.worn_flag()
    }

    /// Completed gestures since construction.
    pub fn gestures_emitted(&self) -> u64 {
        self.gestures_emitted
    }

    /// Current adaptive noise floor (rad/s), for tests and diagnostics.
    pub fn noise_floor(&self) -> f32 {
        self.classifier.noise_floor()
    }

    /// Pending sequence length, for tests and diagnostics.
    pub fn sequence_len(&self) -> usize {
        self.classifier.sequence_len()
    }

    /// Clear all classifier state atomically: sequence, baseline window,
    /// locked axis, counters. Safe at any time, including mid-sequence.
    pub fn reset(&mut self) {
        self.classifier.reset();
        debug!("pipeline reset");
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn process_accel(&mut self, sample: &SensorSample) -> Option<EngineEvent> {
        if !self.wear.needs_accelerometer_feed() {
            return None;
        }
        let worn = self
            .wear
            .process_accelerometer(sample.axes, sample.timestamp_ms)?;
        Some(self.on_wear_transition(worn))
    }

    fn process_gyro(&mut self, sample: &SensorSample) -> Option<EngineEvent> {
        // Off-wrist: gesture path suspended entirely.
        if !self.wear.is_worn() {
            return None;
        }

        let direction = self
            .classifier
            .process_sample(sample.timestamp_ms, sample.axes)?;

        self.gestures_emitted += 1;
        Some(EngineEvent::GestureCompleted { direction })
    }

    fn on_wear_transition(&mut self, worn: bool) -> EngineEvent {
        if worn {
            info!("worn: resuming gesture sensing");
        } else {
            info!("off-wrist: suspending gesture sensing");
            self.classifier.reset();
        }
        EngineEvent::WearStateChanged { worn }
    }
}
