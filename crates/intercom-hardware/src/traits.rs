//! Hardware device trait definitions.
//!
//! This module defines the interface between the actuator task and the
//! physical door opener, enabling substitution between mock and real
//! output implementations.
//!
//! Methods return `impl Future + Send` (Rust 1.90 + Edition 2024 RPITIT) so
//! the actuator can be spawned generically; implementations still write
//! plain `async fn`.

use std::future::Future;

use crate::error::Result;
use crate::types::{DeviceInfo, LatchState};

/// Door opener output abstraction.
///
/// Represents the single output line that releases the door. The actuator
/// task is the sole owner of a latch and drives it from one task only.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrapper
/// [`AnyDoorLatch`](crate::devices::AnyDoorLatch) when the concrete latch is
/// chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use intercom_hardware::traits::DoorLatch;
/// use intercom_hardware::types::LatchState;
/// use intercom_hardware::error::Result;
/// use std::time::Duration;
///
/// async fn buzz<L: DoorLatch>(latch: &mut L) -> Result<()> {
///     latch.set_state(LatchState::Unlocked).await?;
///     tokio::time::sleep(Duration::from_secs(3)).await;
///     latch.set_state(LatchState::Locked).await
/// }
/// ```
pub trait DoorLatch: Send + Sync {
    /// Drive the output to `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - Writing the output fails
    fn set_state(&mut self, state: LatchState) -> impl Future<Output = Result<()>> + Send;

    /// Last state successfully written to the output.
    fn state(&self) -> LatchState;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be queried.
    fn get_info(&self) -> impl Future<Output = Result<DeviceInfo>> + Send;
}
