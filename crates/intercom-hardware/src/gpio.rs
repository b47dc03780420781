//! Door latch driven through a Linux sysfs GPIO `value` file.
//!
//! The pin must already be exported and configured as an output; this
//! module only writes levels.

use crate::{
    HardwareError, Result,
    traits::DoorLatch,
    types::{DeviceInfo, LatchState},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Door opener on a sysfs GPIO line.
#[derive(Debug)]
pub struct GpioLatch {
    /// Path to the pin's `value` file
    value_path: PathBuf,

    /// Unlock drives the line low instead of high
    active_low: bool,

    /// Last successfully written state
    state: LatchState,
}

impl GpioLatch {
    /// Open the output and drive it to the locked level.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the value file
    /// does not exist, or an I/O error if the initial write fails.
    pub async fn open(value_path: impl Into<PathBuf>, active_low: bool) -> Result<Self> {
        let value_path = value_path.into();
        if !tokio::fs::try_exists(&value_path).await? {
            return Err(HardwareError::initialization_failed(format!(
                "GPIO value file {} not found",
                value_path.display()
            )));
        }

        let mut latch = Self {
            value_path,
            active_low,
            state: LatchState::Locked,
        };
        latch.set_state(LatchState::Locked).await?;
        Ok(latch)
    }

    /// Path of the pin's `value` file.
    pub fn value_path(&self) -> &Path {
        &self.value_path
    }

    fn level_for(&self, state: LatchState) -> &'static [u8] {
        match (state.is_unlocked(), self.active_low) {
            (true, false) | (false, true) => b"1",
            (false, false) | (true, true) => b"0",
        }
    }
}

impl DoorLatch for GpioLatch {
    async fn set_state(&mut self, state: LatchState) -> Result<()> {
        let level = self.level_for(state);
        tokio::fs::write(&self.value_path, level).await?;
        debug!(
            "GPIO {} set to {} ({})",
            self.value_path.display(),
            String::from_utf8_lossy(level),
            state
        );
        self.state = state;
        Ok(())
    }

    fn state(&self) -> LatchState {
        self.state
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(
            self.value_path.display().to_string(),
            "sysfs GPIO Latch",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_level(path: &Path) -> String {
        tokio::fs::read_to_string(path).await.unwrap()
    }

    #[tokio::test]
    async fn test_gpio_latch_open_writes_locked_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        tokio::fs::write(&path, "1").await.unwrap();

        let latch = GpioLatch::open(&path, false).await.unwrap();
        assert_eq!(latch.state(), LatchState::Locked);
        assert_eq!(read_level(&path).await, "0");
    }

    #[tokio::test]
    async fn test_gpio_latch_active_high() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        tokio::fs::write(&path, "0").await.unwrap();

        let mut latch = GpioLatch::open(&path, false).await.unwrap();
        latch.set_state(LatchState::Unlocked).await.unwrap();
        assert_eq!(read_level(&path).await, "1");

        latch.set_state(LatchState::Locked).await.unwrap();
        assert_eq!(read_level(&path).await, "0");
    }

    #[tokio::test]
    async fn test_gpio_latch_active_low() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        tokio::fs::write(&path, "0").await.unwrap();

        let mut latch = GpioLatch::open(&path, true).await.unwrap();
        assert_eq!(read_level(&path).await, "1");

        latch.set_state(LatchState::Unlocked).await.unwrap();
        assert_eq!(read_level(&path).await, "0");
        assert_eq!(latch.state(), LatchState::Unlocked);
    }

    #[tokio::test]
    async fn test_gpio_latch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GpioLatch::open(dir.path().join("gpio99/value"), false).await;
        assert!(matches!(
            result,
            Err(HardwareError::InitializationFailed { .. })
        ));
    }
}
