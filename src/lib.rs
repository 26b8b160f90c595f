//! Wrist-Twist Gesture Sensing Engine
//!
//! A real-time gesture recognition kernel for wrist-worn devices: it
//! consumes a live stream of gyroscope and accelerometer samples and
//! recognizes a triple-twist wrist rotation, while power-gating itself
//! using an inferred on-wrist / off-wrist state.
//!
//! # Design Philosophy
//!
//! - **Bounded by construction**: fixed-capacity windows, a three-slot
//!   sequence, no unbounded allocation anywhere on the sample path.
//! - **Timestamps are the only clock**: every timing window (debounce,
//!   cooldown, expiry, total duration) derives from sample timestamps, so
//!   correctness is independent of processing jitter.
//! - **No gesture is the default**: the overwhelming majority of samples
//!   produce no output, and that is not an error.
//! - **Battery awareness**: constant cost per sample, and the whole
//!   gesture path suspends while the device is off the wrist.
//!
//! # Example
//!
//! ```
//! use twist_sensing::{GesturePipeline, PipelineConfig, SensorCaps, SensorSample};
//!
//! let mut pipeline =
//!     GesturePipeline::new(PipelineConfig::default(), SensorCaps::gyro_only())?;
//!
//! // Settle the noise floor, then feed three alternating twists.
//! for i in 0..10 {
//!     pipeline.process_sample(&SensorSample::gyro(i * 20, [0.2, 0.1, 0.1]));
//! }
//! pipeline.process_sample(&SensorSample::gyro(1000, [9.0, 0.4, 0.4]));
//! pipeline.process_sample(&SensorSample::gyro(1300, [-9.0, 0.4, 0.4]));
//! let event = pipeline.process_sample(&SensorSample::gyro(1600, [9.0, 0.4, 0.4]));
//! assert!(event.is_some());
//! # Ok::<(), twist_sensing::EngineError>(())
//! ```

pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod qualifier;
pub mod runner;
pub mod sequence;
pub mod settings;
pub mod types;
pub mod wear;

#[cfg(test)]
mod stress_tests;

// Re-export commonly used types
pub use classifier::{ClassifierConfig, TwistGestureClassifier};
pub use error::{EngineError, Result};
pub use pipeline::{GesturePipeline, PipelineConfig, SensorCaps};
pub use qualifier::{BaselineWindow, QualifierConfig, TwistQualifier};
pub use runner::{EngineRunner, RunnerConfig};
pub use sequence::{SequenceAdvance, SequenceConfig, TwistSequence};
pub use settings::{GestureAction, SyncSettings, SETTINGS_VERSION};
pub use types::{
    EngineEvent, SensorKind, SensorSample, TwistDirection, TwistEvent, WearState,
};
pub use wear::{WearDetector, WearDetectorConfig, WearStrategy, WornFlag};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
