//! Threaded engine runner.
//!
//! Hosts that deliver sensor events from multiple callbacks can confine
//! the pipeline to one dedicated consumer thread with this runner: samples
//! go in through a bounded channel strictly in delivery order, engine
//! events come out through another. The pipeline is the channel's only
//! consumer, which preserves the single-writer ownership the classifier
//! state requires without any locking.
//!
//! Shutdown is the channel disconnect: dropping the sample sender stops
//! delivery and the worker performs a final `reset()` before exiting, so
//! samples racing a shutdown are simply never delivered and cannot corrupt
//! state.
//!
//! Thread priority is the host's concern; the worker is named
//! `twist-sensing` so it can be found and re-prioritized.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::pipeline::GesturePipeline;
use crate::types::{EngineEvent, SensorSample};
use crate::wear::WornFlag;

/// Channel capacities for the runner.
///
/// Both channels are bounded so the sample path never allocates without
/// limit; a stalled consumer sheds load instead of growing a queue.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Capacity of the inbound sample channel.
    pub sample_capacity: usize,
    /// Capacity of the outbound event channel.
    pub event_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 256,
            event_capacity: 16,
        }
    }
}

/// Handle to a pipeline running on its own consumer thread.
pub struct EngineRunner {
    samples: Option<Sender<SensorSample>>,
    events: Receiver<EngineEvent>,
    worn: WornFlag,
    handle: Option<JoinHandle<GesturePipeline>>,
}

impl EngineRunner {
    /// Move the pipeline onto a dedicated consumer thread.
    pub fn spawn(pipeline: GesturePipeline, config: RunnerConfig) -> Self {
        let (sample_tx, sample_rx) = bounded::<SensorSample>(config.sample_capacity);
        let (event_tx, event_rx) = bounded::<EngineEvent>(config.event_capacity);
        let worn = pipeline.worn_flag();

        let handle = thread::spawn(move || {
            let mut pipeline = pipeline;
            // Iteration ends when every sender has been dropped.
            for sample in sample_rx {
                if let Some(event) = pipeline.process_sample(&sample) {
                    if let Err(TrySendError::Full(event)) = event_tx.try_send(event) {
                        // The sample path must never block; a consumer that
                        // stopped draining loses events, not samples.
                        warn!(?event, "event channel full, dropping event");
                    }
                }
            }
            debug!("sample source disconnected, resetting");
            pipeline.reset();
            pipeline
        });

        Self {
            samples: Some(sample_tx),
            events: event_rx,
            worn,
            handle: Some(handle),
        }
    }

    /// Offer a sample without blocking. Returns false when the channel is
    /// full (load shed) or the runner is already shut down.
    pub fn try_send(&self, sample: SensorSample) -> bool {
        match &self.samples {
            Some(tx) => tx.try_send(sample).is_ok(),
            None => false,
        }
    }

    /// Outbound engine events.
    pub fn events(&self) -> &Receiver<EngineEvent> {
        &self.events
    }

    /// Latest published worn state, readable from any thread.
    pub fn is_worn(&self) -> bool {
        self.worn.load()
    }

    /// Disconnect the sample source, wait for the worker to drain and
    /// reset, and recover the pipeline. Returns `None` only if the worker
    /// panicked.
    pub fn shutdown(mut self) -> Option<GesturePipeline> {
        self.samples = None;
        self.handle.take().and_then(|h| h.join().ok())
    }
}

impl Drop for EngineRunner {
    fn drop(&mut self) {
        // Disconnect so the worker exits instead of waiting forever.
        self.samples = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
