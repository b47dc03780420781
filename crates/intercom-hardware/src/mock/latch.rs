//! Mock door latch for testing and development.
//!
//! This module provides a simulated door opener output that records every
//! write, so tests can assert on the exact unlock pulse the actuator produced.

use crate::{
    HardwareError, Result,
    traits::DoorLatch,
    types::{DeviceInfo, LatchState},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;

/// A single write to the latch output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchTransition {
    /// State written.
    pub state: LatchState,

    /// When the write happened (tokio clock, so paused-time tests see exact offsets).
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Recorder {
    transitions: Vec<LatchTransition>,
    fail_writes: bool,
}

fn lock(recorder: &Mutex<Recorder>) -> MutexGuard<'_, Recorder> {
    recorder.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock door latch.
///
/// Writes are recorded and published to a [`MockLatchHandle`]. The handle
/// can also make subsequent writes fail to exercise the actuator's error
/// path.
///
/// # Examples
///
/// ```
/// use intercom_hardware::mock::MockLatch;
/// use intercom_hardware::traits::DoorLatch;
/// use intercom_hardware::types::LatchState;
///
/// #[tokio::main]
/// async fn main() -> intercom_hardware::Result<()> {
///     let (mut latch, handle) = MockLatch::new();
///
///     latch.set_state(LatchState::Unlocked).await?;
///     latch.set_state(LatchState::Locked).await?;
///
///     assert_eq!(handle.unlock_count(), 1);
///     assert_eq!(handle.current_state(), LatchState::Locked);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLatch {
    /// Device name
    name: String,

    /// Last successfully written state
    state: LatchState,

    /// Write log shared with the handle
    recorder: Arc<Mutex<Recorder>>,

    /// State notifications for the handle
    state_tx: watch::Sender<LatchState>,
}

impl MockLatch {
    /// Create a new mock latch with the default name.
    ///
    /// Returns a tuple of (MockLatch, MockLatchHandle) where the handle
    /// observes every write to the latch.
    pub fn new() -> (Self, MockLatchHandle) {
        Self::with_name("Mock Latch".to_string())
    }

    /// Create a new mock latch with a custom name.
    pub fn with_name(name: String) -> (Self, MockLatchHandle) {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let (state_tx, state_rx) = watch::channel(LatchState::Locked);

        let latch = Self {
            name: name.clone(),
            state: LatchState::Locked,
            recorder: Arc::clone(&recorder),
            state_tx,
        };

        let handle = MockLatchHandle {
            name,
            recorder,
            state_rx,
        };

        (latch, handle)
    }
}

impl Default for MockLatch {
    fn default() -> Self {
        Self::new().0
    }
}

impl DoorLatch for MockLatch {
    async fn set_state(&mut self, state: LatchState) -> Result<()> {
        {
            let mut recorder = lock(&self.recorder);
            if recorder.fail_writes {
                return Err(HardwareError::communication(format!(
                    "{}: simulated write failure",
                    self.name
                )));
            }
            recorder.transitions.push(LatchTransition {
                state,
                at: Instant::now(),
            });
        }

        self.state = state;
        self.state_tx.send_replace(state);
        Ok(())
    }

    fn state(&self) -> LatchState {
        self.state
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Latch v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for observing and controlling a mock latch.
///
/// Can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockLatchHandle {
    /// Device name
    name: String,

    /// Write log shared with the latch
    recorder: Arc<Mutex<Recorder>>,

    /// State notifications from the latch
    state_rx: watch::Receiver<LatchState>,
}

impl MockLatchHandle {
    /// All writes so far, oldest first.
    pub fn transitions(&self) -> Vec<LatchTransition> {
        lock(&self.recorder).transitions.clone()
    }

    /// Number of writes so far.
    pub fn transition_count(&self) -> usize {
        lock(&self.recorder).transitions.len()
    }

    /// Number of unlock writes so far.
    pub fn unlock_count(&self) -> usize {
        lock(&self.recorder)
            .transitions
            .iter()
            .filter(|t| t.state.is_unlocked())
            .count()
    }

    /// Last state written to the latch.
    pub fn current_state(&self) -> LatchState {
        *self.state_rx.borrow()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.recorder).fail_writes = fail;
    }

    /// Wait until at least `count` writes have been recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the latch is dropped before enough writes arrive.
    pub async fn wait_for_transitions(&mut self, count: usize) -> Result<()> {
        loop {
            if self.transition_count() >= count {
                return Ok(());
            }
            self.state_rx
                .changed()
                .await
                .map_err(|_| HardwareError::disconnected(self.name.clone()))?;
        }
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
