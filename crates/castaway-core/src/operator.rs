//! Operator control state for a running simulation.
//!
//! The tick loop and whoever drives it (the engine binary, a test, a future
//! control surface) share one [`OperatorState`]. It lets the driver pause,
//! resume, change tick speed, queue external messages, and request a clean
//! stop without owning the simulation.
//!
//! # Architecture
//!
//! Control flags are atomics so the loop can read them without locking.
//! Pausing parks the loop on a [`Notify`]; the message queue and the end
//! reason sit behind async mutexes because they are touched once per tick
//! at most.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use castaway_types::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::SimulationBoundsConfig;

/// Smallest tick interval accepted at runtime.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// An operator issued a stop command.
    OperatorStop,
    /// Nobody is left alive.
    Extinction,
}

impl core::fmt::Display for SimulationEndReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MaxTicksReached => write!(f, "max ticks reached"),
            Self::OperatorStop => write!(f, "operator stop"),
            Self::Extinction => write!(f, "extinction"),
        }
    }
}

/// A message queued for delivery before the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Free text.
    pub message: String,
    /// Intended recipients. Empty means everyone alive.
    #[serde(default)]
    pub recipients: Vec<AgentId>,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the loop should hold before the next tick.
    paused: AtomicBool,

    /// Wakes the loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds.
    tick_interval_ms: AtomicU64,

    /// Wall-clock time the operator was created.
    started_at: DateTime<Utc>,

    /// Stop once the world clock reaches this tick.
    max_ticks: Option<u64>,

    /// Messages awaiting delivery.
    queued_messages: Mutex<Vec<QueuedMessage>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            queued_messages: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause before the next tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused. A stop request also wakes
    /// it.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop after the current tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record why the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// Why the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick speed
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the tick interval. Returns the previous value, or `None` if
    /// `ms` is below [`MIN_TICK_INTERVAL_MS`].
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether the world clock has reached the configured limit.
    pub fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks.is_some_and(|max| current_tick >= max)
    }

    /// Configured tick limit.
    pub const fn max_ticks(&self) -> Option<u64> {
        self.max_ticks
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Queue a message for delivery before the next tick.
    pub async fn queue_message(&self, message: QueuedMessage) {
        self.queued_messages.lock().await.push(message);
    }

    /// Take every queued message, oldest first.
    pub async fn drain_messages(&self) -> Vec<QueuedMessage> {
        std::mem::take(&mut *self.queued_messages.lock().await)
    }
}
