//! Enum wrapper for door latch dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) is not
//! object-safe, so `Box<dyn DoorLatch>` is unavailable. [`AnyDoorLatch`]
//! provides concrete type dispatch instead, letting the composition pick a
//! latch at runtime from configuration.
//!
//! # Examples
//!
//! ```
//! use intercom_hardware::devices::AnyDoorLatch;
//! use intercom_hardware::mock::MockLatch;
//!
//! let (latch, _handle) = MockLatch::new();
//! let any_latch = AnyDoorLatch::Mock(latch);
//! ```

use crate::gpio::GpioLatch;
use crate::mock::MockLatch;
use crate::traits::DoorLatch;
use crate::{DeviceInfo, LatchState, Result};

/// Enum wrapper for door latch dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyDoorLatch {
    /// Mock latch for development and testing.
    Mock(MockLatch),

    /// Linux sysfs GPIO output.
    Gpio(GpioLatch),
}

impl DoorLatch for AnyDoorLatch {
    async fn set_state(&mut self, state: LatchState) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_state(state).await,
            Self::Gpio(device) => device.set_state(state).await,
        }
    }

    fn state(&self) -> LatchState {
        match self {
            Self::Mock(device) => device.state(),
            Self::Gpio(device) => device.state(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Gpio(device) => device.get_info().await,
        }
    }
}
