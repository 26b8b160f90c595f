//! Wear-state detection.
//!
//! Infers whether the device is on the wrist so the gesture pipeline can
//! power-gate itself. Exactly one strategy is selected at startup from the
//! hardware capability flags and never switches at runtime:
//!
//! - **Dedicated**: the device has a low-latency on-body sensor; each
//!   reading sets the state directly and every transition is reported.
//! - **MotionFallback**: no such sensor; sustained accelerometer silence
//!   marks the device off-wrist, any motion marks it worn again.
//!
//! The detector owns the [`WearState`] and is its only writer. The worn
//! boolean crosses to the sample-processing thread through [`WornFlag`],
//! an atomic published with release/acquire ordering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::WearState;

/// Parameters for wear-state inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WearDetectorConfig {
    /// Linear-acceleration magnitude above which the device is considered
    /// moving (m/s²).
    pub movement_threshold: f32,

    /// How long the device may sit motionless before being marked
    /// off-wrist (ms). Only evaluated under the motion fallback.
    pub stationary_duration_ms: u64,

    /// Normalized dedicated-sensor value above which the device counts as
    /// on-body.
    pub on_body_threshold: f32,
}

impl Default for WearDetectorConfig {
    fn default() -> Self {
        Self {
            movement_threshold: 0.1,
            stationary_duration_ms: 30_000,
            on_body_threshold: 0.5,
        }
    }
}

/// Which inference strategy the detector was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WearStrategy {
    /// Dedicated low-latency on-body sensor drives the state directly.
    Dedicated,
    /// Worn state inferred from accelerometer motion absence.
    MotionFallback,
}

/// Shared worn flag for the cross-thread handoff.
///
/// The wear detector may run on an independently-scheduled callback while
/// the gesture pipeline reads the flag on every sample; release/acquire
/// ordering makes each transition visible before any sample processed
/// after it.
#[derive(Debug, Clone)]
pub struct WornFlag(Arc<AtomicBool>);

impl WornFlag {
    pub fn new(initially_worn: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initially_worn)))
    }

    pub fn store(&self, worn: bool) {
        self.0.store(worn, Ordering::Release);
    }

    pub fn load(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for WornFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Worn / off-wrist detector.
///
/// Feed it dedicated-sensor readings or accelerometer samples depending on
/// the strategy; each call returns `Some(worn)` exactly when the state
/// transitioned, which the owning pipeline converts into an event.
#[derive(Debug)]
pub struct WearDetector {
    config: WearDetectorConfig,
    strategy: WearStrategy,
    state: WearState,
    flag: WornFlag,

    // Statistics
    transitions: u64,
}

impl WearDetector {
    /// Select the strategy from the boot-time capability flag. The choice
    /// is permanent for the life of the detector.
    pub fn new(config: WearDetectorConfig, has_dedicated_sensor: bool) -> Self {
        let strategy = if has_dedicated_sensor {
            info!("wear detection via dedicated on-body sensor");
            WearStrategy::Dedicated
        } else {
            info!("wear detection via accelerometer motion fallback");
            WearStrategy::MotionFallback
        };
        Self {
            config,
            strategy,
            state: WearState::initial(),
            flag: WornFlag::default(),
            transitions: 0,
        }
    }

    /// The strategy fixed at construction.
    pub fn strategy(&self) -> WearStrategy {
        self.strategy
    }

    /// Whether the host must keep feeding accelerometer samples for wear
    /// inference. False when a dedicated sensor carries the state.
    pub fn needs_accelerometer_feed(&self) -> bool {
        self.strategy == WearStrategy::MotionFallback
    }

    /// Process a dedicated on-body sensor reading.
    ///
    /// Returns `Some(worn)` on every transition. Ignored under the motion
    /// fallback strategy, where no such sensor exists.
    pub fn process_wear_sensor(&mut self, normalized_value: f32) -> Option<bool> {
        if self.strategy != WearStrategy::Dedicated {
            return None;
        }
        let on_body = normalized_value > self.config.on_body_threshold;
        debug!(normalized_value, on_body, "on-body sensor reading");
        self.update_worn(on_body)
    }

    /// Process a linear-acceleration sample for the motion fallback.
    ///
    /// Motion above the threshold refreshes the stationary countdown and
    /// flips the state to worn immediately if it was off. Sustained
    /// silence past `stationary_duration_ms` flips to not-worn exactly
    /// once; the countdown arms only after motion has been observed, since
    /// sample timestamps are the only clock available.
    pub fn process_accelerometer(&mut self, axes: [f32; 3], timestamp_ms: u64) -> Option<bool> {
        let magnitude =
            (axes[0] * axes[0] + axes[1] * axes[1] + axes[2] * axes[2]).sqrt();

        if magnitude > self.config.movement_threshold {
            self.state.last_motion_ms = Some(timestamp_ms);
            if !self.state.worn {
                return self.update_worn(true);
            }
            return None;
        }

        if self.strategy == WearStrategy::MotionFallback && self.state.worn {
            if let Some(last_motion) = self.state.last_motion_ms {
                let stationary_ms = timestamp_ms.saturating_sub(last_motion);
                if stationary_ms > self.config.stationary_duration_ms {
                    info!(stationary_ms, "no motion, marking off-wrist");
                    return self.update_worn(false);
                }
            }
        }

        None
    }

    /// Current worn belief.
    pub fn is_worn(&self) -> bool {
        self.state.worn
    }

    /// Full wear state, for diagnostics.
    pub fn state(&self) -> WearState {
        self.state
    }

    /// Handle to the atomic worn flag for cross-thread readers.
    pub fn worn_flag(&self) -> WornFlag {
        self.flag.clone()
    }

    /// Number of worn transitions since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn update_worn(&mut self, worn: bool) -> Option<bool> {
        if self.state.worn == worn {
            return None;
        }
        self.state.worn = worn;
        self.flag.store(worn);
        self.transitions += 1;
        info!(worn, "wear state changed");
        Some(worn)
    }
}
