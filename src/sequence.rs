//! Twist sequence state machine.
//!
//! Accumulates qualifying twist events into a three-event
//! alternating-direction sequence and emits a completed-gesture direction
//! when the pattern closes inside its timing bounds.
//!
//! States are implicit in sequence length {0, 1, 2, 3 → emit}. Every
//! candidate passes a fixed gate precedence:
//! cooldown → expiry → debounce → axis lock → fast merge →
//! same-direction restart → append → completion check.
//!
//! The machine is a pure transformation of (candidate, internal state):
//! no clocks, no I/O, no hidden effects. All timing derives from the
//! candidate timestamps handed in.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::types::{TwistDirection, TwistEvent};

/// Maximum number of members in a candidate sequence.
const SEQUENCE_CAPACITY: usize = 3;

/// Timing and policy parameters for the sequence machine.
///
/// Two policies ship under this one interface. [`SequenceConfig::default`]
/// is the axis-locked, duration-bounded policy: all members must share a
/// dominant axis and the full pattern must take at least
/// `min_total_time_ms`. [`SequenceConfig::permissive`] reproduces the older
/// axis-free acceptance for hosts that prefer the looser behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Minimum interval between distinct twists (ms). Anything faster with
    /// a matching direction is the same physical motion still in flight.
    pub min_interval_ms: u64,

    /// Minimum total duration of a complete pattern (ms). Rejects
    /// sub-human jitter bursts that happen to alternate.
    pub min_total_time_ms: u64,

    /// Maximum total duration of a complete pattern (ms). A pending
    /// sequence older than this is abandoned.
    pub max_total_time_ms: u64,

    /// Quiet period after a completion (ms). Candidates inside it are
    /// ignored entirely so one gesture cannot chain into the next.
    pub cooldown_ms: u64,

    /// Suppression window after an accepted candidate (ms). Absorbs the
    /// ringing tail of a single twist.
    pub debounce_ms: u64,

    /// When true, every member of a sequence must share the dominant axis
    /// of its first member.
    pub lock_axis: bool,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 100,
            min_total_time_ms: 250,
            max_total_time_ms: 1200,
            cooldown_ms: 1000,
            debounce_ms: 50,
            lock_axis: true,
        }
    }
}

impl SequenceConfig {
    /// The axis-free, unbounded-minimum policy. Accepts everything the
    /// default policy accepts, plus cross-axis and very fast patterns.
    pub fn permissive() -> Self {
        Self {
            min_total_time_ms: 0,
            lock_axis: false,
            ..Self::default()
        }
    }
}

/// Outcome of offering a candidate to the machine, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceAdvance {
    /// Candidate dropped by the axis lock; sequence untouched.
    AxisMismatch,
    /// Candidate merged into (or shadowed by) the previous member.
    Merged,
    /// Sequence discarded and restarted with the candidate as first member.
    Restarted,
    /// Candidate became member 1 or 2 of a pending sequence.
    Accepted,
    /// Third member arrived and the pattern matched.
    Completed(TwistDirection),
    /// Third member arrived but the pattern failed; sequence cleared.
    PatternMismatch,
}

/// Temporal pattern matcher for the triple-twist gesture.
#[derive(Debug, Clone)]
pub struct TwistSequence {
    config: SequenceConfig,

    events: Vec<TwistEvent>,
    locked_axis: Option<usize>,

    last_completion_ms: Option<u64>,
    last_accept_ms: Option<u64>,

    // Statistics
    total_twists: u64,
    completions: u64,
}

impl TwistSequence {
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            config,
            events: Vec::with_capacity(SEQUENCE_CAPACITY),
            locked_axis: None,
            last_completion_ms: None,
            last_accept_ms: None,
            total_twists: 0,
            completions: 0,
        }
    }

    /// Cooldown gate: true while the quiet period after the last completed
    /// gesture is still running. Candidates must be ignored entirely.
    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        match self.last_completion_ms {
            Some(t) => now_ms.saturating_sub(t) < self.config.cooldown_ms,
            None => false,
        }
    }

    /// Expiry gate: clear a pending sequence whose first member is older
    /// than the maximum total time. Called on every processed sample so a
    /// stale sequence never lingers; the triggering candidate may still
    /// start a fresh sequence in the same pass.
    pub fn expire_stale(&mut self, now_ms: u64) {
        if let Some(first) = self.events.first() {
            let elapsed = now_ms.saturating_sub(first.timestamp_ms);
            if elapsed > self.config.max_total_time_ms {
                debug!(elapsed_ms = elapsed, "sequence expired");
                self.clear_sequence();
            }
        }
    }

    /// Drop the pending sequence and its axis lock without touching the
    /// cooldown, debounce, or counters. Used when the sample stream itself
    /// becomes untrustworthy (non-monotonic timestamps).
    pub fn abandon(&mut self) {
        self.clear_sequence();
    }

    /// Debounce gate: true while the suppression window after the last
    /// accepted candidate is still running.
    pub fn in_debounce(&self, now_ms: u64) -> bool {
        match self.last_accept_ms {
            Some(t) => now_ms.saturating_sub(t) < self.config.debounce_ms,
            None => false,
        }
    }

    /// Offer a qualifying candidate to the machine (gates 4 through 8).
    ///
    /// The caller is responsible for the cooldown, expiry, and debounce
    /// gates, in that order, before calling this. Returns the completed
    /// direction on the rare sample that closes a pattern.
    pub fn accept(&mut self, candidate: TwistEvent) -> SequenceAdvance {
        // Axis lock: a cross-axis candidate is dropped, never a reset.
        if self.config.lock_axis {
            if let Some(axis) = self.locked_axis {
                if candidate.axis != axis {
                    trace!(
                        candidate_axis = candidate.axis,
                        locked_axis = axis,
                        "candidate dropped by axis lock"
                    );
                    return SequenceAdvance::AxisMismatch;
                }
            }
        }

        self.total_twists += 1;
        self.last_accept_ms = Some(candidate.timestamp_ms);

        let previous = match self.events.last().copied() {
            None => {
                self.push_first(candidate);
                return SequenceAdvance::Accepted;
            }
            Some(prev) => prev,
        };

        let interval = candidate.timestamp_ms.saturating_sub(previous.timestamp_ms);

        // Fast same-direction merge: the same physical motion, sampled
        // twice. Keep whichever reading was stronger.
        if interval < self.config.min_interval_ms && candidate.direction == previous.direction {
            if candidate.rotation_speed > previous.rotation_speed {
                let last_index = self.events.len() - 1;
                self.events[last_index] = candidate;
            }
            trace!(interval_ms = interval, "fast same-direction merge");
            return SequenceAdvance::Merged;
        }

        // Same-direction restart: a fresh first half-twist, not a
        // continuation of the pending pattern.
        if candidate.direction == previous.direction {
            debug!(
                interval_ms = interval,
                "same direction after full interval, restarting sequence"
            );
            self.clear_sequence();
            self.push_first(candidate);
            return SequenceAdvance::Restarted;
        }

        // Opposite direction: append.
        self.events.push(candidate);
        trace!(
            members = self.events.len(),
            direction = candidate.direction.sign(),
            "twist appended"
        );

        if self.events.len() < SEQUENCE_CAPACITY {
            return SequenceAdvance::Accepted;
        }

        self.check_completion(candidate.timestamp_ms)
    }

    /// Number of members in the pending sequence.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Axis shared by the pending sequence, if one is locked.
    pub fn locked_axis(&self) -> Option<usize> {
        self.locked_axis
    }

    /// Pending members, oldest first.
    pub fn members(&self) -> &[TwistEvent] {
        &self.events
    }

    /// Lifetime statistics: (candidates accepted into the machine,
    /// completed gestures).
    pub fn statistics(&self) -> (u64, u64) {
        (self.total_twists, self.completions)
    }

    /// Restore power-on state: empty sequence, no lock, no timing memory,
    /// zeroed counters.
    pub fn reset(&mut self) {
        self.clear_sequence();
        self.last_completion_ms = None;
        self.last_accept_ms = None;
        self.total_twists = 0;
        self.completions = 0;
    }

    // =========================================================================
    // PRIVATE METHODS
    // =========================================================================

    fn push_first(&mut self, candidate: TwistEvent) {
        self.locked_axis = Some(candidate.axis);
        self.events.push(candidate);
        debug!(
            direction = candidate.direction.sign(),
            axis = candidate.axis,
            "twist 1/3"
        );
    }

    fn clear_sequence(&mut self) {
        self.events.clear();
        self.locked_axis = None;
    }

    /// Completion check on reaching three members.
    fn check_completion(&mut self, now_ms: u64) -> SequenceAdvance {
        let (first, second, third) = (self.events[0], self.events[1], self.events[2]);

        let pattern_ok = first.direction == third.direction
            && second.direction != first.direction;

        let total_time = third.timestamp_ms.saturating_sub(first.timestamp_ms);
        let timing_ok = total_time >= self.config.min_total_time_ms
            && total_time <= self.config.max_total_time_ms;

        self.clear_sequence();

        if pattern_ok && timing_ok {
            self.completions += 1;
            self.last_completion_ms = Some(now_ms);
            info!(
                d1 = first.direction.sign(),
                d2 = second.direction.sign(),
                d3 = third.direction.sign(),
                total_time_ms = total_time,
                "triple twist complete"
            );
            SequenceAdvance::Completed(first.direction)
        } else {
            debug!(
                pattern_ok,
                total_time_ms = total_time,
                "pattern mismatch at third twist, clearing"
            );
            SequenceAdvance::PatternMismatch
        }
    }
}
