//! Core data types for the wrist-twist gesture engine.
//!
//! This module defines the fundamental types used throughout the gesture
//! recognition pipeline. All types are designed to minimize allocation and
//! make intent obvious: if a concept exists, it gets a type. Raw tuples and
//! untyped collections never cross module boundaries.
//!
//! Output types are structured for downstream dispatchers that map a
//! completed gesture onto a user-configured action; the engine itself never
//! interprets what a gesture means.

/// Which physical sensor produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Three-axis angular rate sensor. Drives gesture classification.
    Gyroscope,
    /// Three-axis linear acceleration sensor. Drives the wear-state
    /// fallback when no dedicated wear sensor exists.
    Accelerometer,
}

/// A single raw inertial sample.
///
/// This is the minimal input contract: a monotonic timestamp, the sensor
/// that produced the reading, and its three-axis value. Samples are never
/// interpreted here, only preserved.
///
/// Design note: f32 components for on-device execution; gesture
/// classification does not need double precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Monotonic timestamp in milliseconds. Required for temporal ordering;
    /// wall-clock time is never used anywhere in the engine.
    pub timestamp_ms: u64,

    /// Sensor that produced this sample.
    pub kind: SensorKind,

    /// Raw reading [x, y, z]. rad/s for the gyroscope, m/s² (linear,
    /// gravity-removed) for the accelerometer.
    pub axes: [f32; 3],
}

impl SensorSample {
    /// Creates a gyroscope sample.
    ///
    /// Assumption: `timestamp_ms` is monotonically non-decreasing within a
    /// delivery sequence. Out-of-order samples are tolerated defensively
    /// downstream but indicate a misbehaving source.
    pub fn gyro(timestamp_ms: u64, axes: [f32; 3]) -> Self {
        Self {
            timestamp_ms,
            kind: SensorKind::Gyroscope,
            axes,
        }
    }

    /// Creates a linear-acceleration sample.
    pub fn accel(timestamp_ms: u64, axes: [f32; 3]) -> Self {
        Self {
            timestamp_ms,
            kind: SensorKind::Accelerometer,
            axes,
        }
    }

    /// Euclidean magnitude of the reading.
    pub fn magnitude(&self) -> f32 {
        let [x, y, z] = self.axes;
        (x * x + y * y + z * z).sqrt()
    }
}

/// Rotation direction of a twist, as seen on the dominant axis.
///
/// The engine only ever distinguishes the two signs; which physical wrist
/// motion each sign corresponds to depends on how the device is worn and is
/// the dispatcher's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwistDirection {
    /// Dominant-axis component was non-negative.
    Positive,
    /// Dominant-axis component was negative.
    Negative,
}

impl TwistDirection {
    /// Derive the direction from the dominant-axis component of a reading.
    pub fn from_component(component: f32) -> Self {
        if component >= 0.0 {
            TwistDirection::Positive
        } else {
            TwistDirection::Negative
        }
    }

    /// Direction as a sign, +1 or -1.
    pub fn sign(&self) -> i8 {
        match self {
            TwistDirection::Positive => 1,
            TwistDirection::Negative => -1,
        }
    }

    /// The opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            TwistDirection::Positive => TwistDirection::Negative,
            TwistDirection::Negative => TwistDirection::Positive,
        }
    }
}

/// A single qualifying angular-rate spike on one axis.
///
/// Twist events are created only when a gyroscope sample passes both axis
/// qualification and the spike test; they are the sole currency of the
/// sequence state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistEvent {
    /// Timestamp of the sample that produced this event (ms, monotonic).
    pub timestamp_ms: u64,
    /// Rotation-speed magnitude of the full gyro vector (rad/s).
    pub rotation_speed: f32,
    /// Dominant axis index: 0 = x, 1 = y, 2 = z.
    pub axis: usize,
    /// Sign of the dominant-axis component.
    pub direction: TwistDirection,
}

impl TwistEvent {
    pub fn new(
        timestamp_ms: u64,
        rotation_speed: f32,
        axis: usize,
        direction: TwistDirection,
    ) -> Self {
        Self {
            timestamp_ms,
            rotation_speed,
            axis,
            direction,
        }
    }
}

/// Current wear state as tracked by the wear detector.
///
/// Mutated only by [`crate::wear::WearDetector`]; everything else reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WearState {
    /// True while the device is believed to be on the wrist.
    pub worn: bool,
    /// Timestamp of the last accelerometer sample that exceeded the
    /// movement threshold. None until motion has been observed; the
    /// stationary countdown only arms once this is set.
    pub last_motion_ms: Option<u64>,
}

impl WearState {
    /// Power-on state: worn, no motion observed yet.
    pub fn initial() -> Self {
        Self {
            worn: true,
            last_motion_ms: None,
        }
    }
}

/// An event emitted by the gesture pipeline.
///
/// These are the engine's only outputs. The overwhelming majority of
/// processed samples emit nothing at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A complete triple twist was recognized. `direction` is the direction
    /// of the first (and therefore third) twist in the sequence.
    GestureCompleted { direction: TwistDirection },
    /// The inferred wear state changed.
    WearStateChanged { worn: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_magnitude() {
        let sample = SensorSample::gyro(0, [3.0, 4.0, 0.0]);
        assert_eq!(sample.magnitude(), 5.0);
        assert_eq!(sample.kind, SensorKind::Gyroscope);
    }

    #[test]
    fn test_direction_from_component() {
        assert_eq!(
            TwistDirection::from_component(1.5),
            TwistDirection::Positive
        );
        assert_eq!(
            TwistDirection::from_component(-0.1),
            TwistDirection::Negative
        );
        // Zero maps to positive, matching sign-of-component semantics.
        assert_eq!(
            TwistDirection::from_component(0.0),
            TwistDirection::Positive
        );
    }

    #[test]
    fn test_direction_sign_and_opposite() {
        assert_eq!(TwistDirection::Positive.sign(), 1);
        assert_eq!(TwistDirection::Negative.sign(), -1);
        assert_eq!(
            TwistDirection::Positive.opposite(),
            TwistDirection::Negative
        );
        assert_eq!(
            TwistDirection::Negative.opposite(),
            TwistDirection::Positive
        );
    }

    #[test]
    fn test_wear_state_initial() {
        let state = WearState::initial();
        assert!(state.worn);
        assert!(state.last_motion_ms.is_none());
    }
}
