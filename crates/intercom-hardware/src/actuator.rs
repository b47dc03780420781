//! Door actuator task.
//!
//! The actuator is the sole owner of the door latch. It blocks on a
//! single-slot unlock queue and, for each command, drives the latch open,
//! holds it for the configured duration and locks it again. A pulse is never
//! cancelled once started.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  try_send   ┌──────────────┐  recv   ┌──────────────┐
//! │ Call handler │────────────►│ Unlock queue │────────►│ Actuator     │──► latch
//! │ (any task)   │  drop if    │ (capacity 1) │         │ task         │
//! └──────────────┘  full       └──────────────┘         └──────────────┘
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use intercom_hardware::actuator::{Actuator, ActuatorConfig, unlock_queue};
//! use intercom_hardware::mock::MockLatch;
//!
//! #[tokio::main]
//! async fn main() -> intercom_hardware::Result<()> {
//!     let (latch, _latch_handle) = MockLatch::new();
//!     let (unlock_tx, unlock_rx) = unlock_queue();
//!
//!     let handle = Actuator::new(latch, ActuatorConfig::default(), unlock_rx).start();
//!
//!     unlock_tx.request();
//!
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::Result;
use crate::traits::DoorLatch;
use crate::types::LatchState;
use intercom_core::UnlockCommand;
use intercom_core::constants::{DEFAULT_UNLOCK_DURATION_MS, UNLOCK_QUEUE_CAPACITY};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Create the single-slot unlock queue shared by producers and the actuator.
pub fn unlock_queue() -> (UnlockSender, UnlockReceiver) {
    let (tx, rx) = mpsc::channel(UNLOCK_QUEUE_CAPACITY);
    (UnlockSender { tx }, UnlockReceiver { rx })
}

/// Result of a best-effort unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The command is in the queue.
    Queued,

    /// A command is already pending; this one was dropped.
    Dropped,

    /// The actuator has stopped.
    Closed,
}

/// Producer side of the unlock queue.
///
/// Never waits: the enqueue timeout is zero. A full queue means an unlock
/// is already pending, and a repeat trigger is redundant.
#[derive(Debug, Clone)]
pub struct UnlockSender {
    tx: mpsc::Sender<UnlockCommand>,
}

impl UnlockSender {
    /// Enqueue one unlock command without waiting.
    pub fn request(&self) -> UnlockOutcome {
        match self.tx.try_send(UnlockCommand) {
            Ok(()) => UnlockOutcome::Queued,
            Err(TrySendError::Full(_)) => UnlockOutcome::Dropped,
            Err(TrySendError::Closed(_)) => UnlockOutcome::Closed,
        }
    }
}

/// Consumer side of the unlock queue.
#[derive(Debug)]
pub struct UnlockReceiver {
    rx: mpsc::Receiver<UnlockCommand>,
}

impl UnlockReceiver {
    /// Wait for the next command. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<UnlockCommand> {
        self.rx.recv().await
    }
}

/// Configuration for the actuator task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorConfig {
    /// How long the latch stays unlocked per command.
    pub unlock_duration: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            unlock_duration: Duration::from_millis(DEFAULT_UNLOCK_DURATION_MS),
        }
    }
}

/// Counters reported when the actuator stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorStats {
    /// Completed unlock pulses.
    pub pulses: u64,

    /// Failed latch writes.
    pub latch_errors: u64,
}

/// Door actuator owning a latch and the receiving end of the unlock queue.
pub struct Actuator<L> {
    latch: L,
    config: ActuatorConfig,
    commands: UnlockReceiver,
    stats: ActuatorStats,
}

impl<L: DoorLatch + 'static> Actuator<L> {
    pub fn new(latch: L, config: ActuatorConfig, commands: UnlockReceiver) -> Self {
        Self {
            latch,
            config,
            commands,
            stats: ActuatorStats::default(),
        }
    }

    /// Spawn the actuator on the runtime and return its handle.
    pub fn start(self) -> ActuatorHandle {
        ActuatorHandle {
            task: tokio::spawn(self.run()),
        }
    }

    /// Serve unlock commands until every sender is dropped.
    ///
    /// Latch failures are logged and counted; the actuator keeps serving.
    pub async fn run(mut self) -> ActuatorStats {
        match self.latch.get_info().await {
            Ok(info) => info!(
                "Door actuator ready on {} ({}), unlock duration {}ms",
                info.name,
                info.model,
                self.config.unlock_duration.as_millis()
            ),
            Err(e) => warn!("Door latch did not report device info: {}", e),
        }

        while let Some(UnlockCommand) = self.commands.recv().await {
            self.pulse().await;
        }

        info!("Unlock queue closed, door actuator stopping");
        self.stats
    }

    async fn pulse(&mut self) {
        if let Err(e) = self.latch.set_state(LatchState::Unlocked).await {
            error!("Failed to unlock door: {}", e);
            self.stats.latch_errors += 1;
            self.relock().await;
            return;
        }
        info!("Door unlocked");

        tokio::time::sleep(self.config.unlock_duration).await;

        if self.relock().await {
            info!("Door locked");
        }
        self.stats.pulses += 1;
    }

    async fn relock(&mut self) -> bool {
        match self.latch.set_state(LatchState::Locked).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to lock door: {}", e);
                self.stats.latch_errors += 1;
                false
            }
        }
    }
}

/// Handle to a running actuator task.
pub struct ActuatorHandle {
    task: JoinHandle<ActuatorStats>,
}

impl ActuatorHandle {
    /// Wait for the actuator to stop on its own (all senders dropped).
    ///
    /// Returns `None` if the task panicked or was aborted.
    pub async fn join(self) -> Option<ActuatorStats> {
        match self.task.await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Door actuator task ended abnormally: {}", e);
                None
            }
        }
    }

    /// Abort the actuator task and wait for it to terminate.
    ///
    /// An in-progress pulse is abandoned; the caller owns making the line
    /// safe afterwards. Never fails for a cancelled task.
    pub async fn shutdown(self) -> Result<()> {
        self.task.abort();
        match self.task.await {
            Ok(stats) => debug!("Door actuator stopped: {:?}", stats),
            Err(e) if e.is_cancelled() => debug!("Door actuator cancelled"),
            Err(e) => warn!("Door actuator panicked: {}", e),
        }
        Ok(())
    }

    /// Returns `true` if the task has terminated.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
