//! Door actuator hardware layer for the intercom appliance.
//!
//! This crate owns everything between an unlock decision and the physical
//! door opener:
//!
//! - [`DoorLatch`]: trait for the output line, with a mock
//!   ([`mock::MockLatch`]) and a Linux sysfs GPIO implementation
//!   ([`gpio::GpioLatch`]).
//! - [`AnyDoorLatch`]: enum dispatch so the latch can be chosen at runtime.
//! - [`actuator`]: the single-slot unlock queue and the actuator task that
//!   turns each [`UnlockCommand`](intercom_core::UnlockCommand) into one
//!   timed unlock pulse.
//!
//! # Design Philosophy
//!
//! - **Async-first**: native `async fn` in traits (Edition 2024 RPITIT).
//! - **Single owner**: the actuator task is the only writer of the latch.
//! - **Lossy handoff**: unlock requests never wait; a full queue drops the
//!   request.
//!
//! ```no_run
//! use intercom_hardware::{Actuator, ActuatorConfig, AnyDoorLatch, unlock_queue};
//! use intercom_hardware::mock::MockLatch;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (latch, _handle) = MockLatch::new();
//!     let (unlock_tx, unlock_rx) = unlock_queue();
//!     let config = ActuatorConfig { unlock_duration: Duration::from_secs(3) };
//!
//!     let actuator = Actuator::new(AnyDoorLatch::Mock(latch), config, unlock_rx).start();
//!     unlock_tx.request();
//!
//!     drop(unlock_tx);
//!     actuator.join().await;
//! }
//! ```

pub mod actuator;
pub mod devices;
pub mod error;
pub mod gpio;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use actuator::{
    Actuator, ActuatorConfig, ActuatorHandle, ActuatorStats, UnlockOutcome, UnlockReceiver,
    UnlockSender, unlock_queue,
};
pub use devices::AnyDoorLatch;
pub use error::{HardwareError, Result};
pub use traits::DoorLatch;
pub use types::{DeviceInfo, LatchState};
