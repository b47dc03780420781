//! Appliance configuration.
//!
//! All sections are optional in the TOML file; missing keys fall back to the
//! defaults in [`constants`](crate::constants).
//!
//! ```
//! use intercom_core::IntercomConfig;
//!
//! let config = IntercomConfig::from_toml_str(r#"
//! [access]
//! code = "4711"
//!
//! [door]
//! unlock_duration_ms = 3000
//! "#).unwrap();
//!
//! assert_eq!(config.access.code.len(), 4);
//! assert_eq!(config.door.unlock_duration().as_millis(), 3000);
//! ```

use crate::constants::*;
use crate::{AccessCode, Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntercomConfig {
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub door: DoorConfig,
    #[serde(default)]
    pub sip: SipConfig,
    #[serde(default)]
    pub mqtt: MqttConfig,
}

impl IntercomConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed TOML or an invalid access
    /// code, and `Error::InvalidConfig` if [`validate`](Self::validate) fails.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: IntercomConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the errors
    /// of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.door.unlock_duration_ms == 0 {
            return Err(Error::invalid_config(
                "door.unlock_duration_ms",
                "must be greater than zero",
            ));
        }
        if self.sip.connect_timeout_ms == 0 {
            return Err(Error::invalid_config(
                "sip.connect_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.sip.init_retry_delay_ms == 0 {
            return Err(Error::invalid_config(
                "sip.init_retry_delay_ms",
                "must be greater than zero",
            ));
        }
        if self.sip.port == 0 {
            return Err(Error::invalid_config("sip.port", "must not be zero"));
        }

        let topics = [
            ("mqtt.topic_out", &self.mqtt.topic_out),
            ("mqtt.topic_in", &self.mqtt.topic_in),
            ("mqtt.topic_status", &self.mqtt.topic_status),
            ("mqtt.topic_version", &self.mqtt.topic_version),
        ];
        for (key, topic) in topics {
            if topic.trim().is_empty() {
                return Err(Error::invalid_config(key, "topic must not be empty"));
            }
        }

        Ok(())
    }

    /// Returns `true` if the built-in access code is in effect.
    pub fn uses_default_access_code(&self) -> bool {
        AccessCode::new(DEFAULT_ACCESS_CODE).is_ok_and(|default| default == self.access.code)
    }
}

/// Access code matching.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// The door code, entered as tones during a call.
    #[serde(default = "default_access_code")]
    pub code: AccessCode,

    /// Presses shorter than this are treated as mismatches.
    ///
    /// Unset means press duration is ignored.
    #[serde(default)]
    pub min_press_ms: Option<u32>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            code: default_access_code(),
            min_press_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoorConfig {
    #[serde(default = "default_unlock_duration")]
    pub unlock_duration_ms: u64,

    /// GPIO `value` file driving the door opener (e.g.
    /// `/sys/class/gpio/gpio23/value`). Unset runs a simulated latch.
    #[serde(default)]
    pub gpio_value_path: Option<PathBuf>,

    /// Drive the line low to unlock.
    #[serde(default)]
    pub active_low: bool,
}

impl DoorConfig {
    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_duration_ms)
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            unlock_duration_ms: default_unlock_duration(),
            gpio_value_path: None,
            active_low: false,
        }
    }
}

/// Signalling session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SipConfig {
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Registrar host. Replaced by the link gateway when
    /// `server_from_gateway` is set.
    #[serde(default)]
    pub server: String,

    #[serde(default = "default_sip_port")]
    pub port: u16,

    /// Local address announced to the peer until the link reports one.
    #[serde(default)]
    pub local_address: Option<String>,

    #[serde(default = "default_true")]
    pub server_from_gateway: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_init_retry_delay")]
    pub init_retry_delay_ms: u64,
}

impl SipConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn init_retry_delay(&self) -> Duration {
        Duration::from_millis(self.init_retry_delay_ms)
    }
}

impl Default for SipConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            server: String::new(),
            port: default_sip_port(),
            local_address: None,
            server_from_gateway: true,
            connect_timeout_ms: default_connect_timeout(),
            init_retry_delay_ms: default_init_retry_delay(),
        }
    }
}

/// Home-automation bus topics.
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_topic_out")]
    pub topic_out: String,

    #[serde(default = "default_topic_in")]
    pub topic_in: String,

    #[serde(default = "default_topic_status")]
    pub topic_status: String,

    #[serde(default = "default_topic_version")]
    pub topic_version: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            topic_out: default_topic_out(),
            topic_in: default_topic_in(),
            topic_status: default_topic_status(),
            topic_version: default_topic_version(),
        }
    }
}

fn default_access_code() -> AccessCode {
    AccessCode::new(DEFAULT_ACCESS_CODE).expect("built-in access code is valid")
}

fn default_unlock_duration() -> u64 {
    DEFAULT_UNLOCK_DURATION_MS
}

fn default_sip_port() -> u16 {
    DEFAULT_SIP_PORT
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_init_retry_delay() -> u64 {
    DEFAULT_INIT_RETRY_DELAY_MS
}

fn default_client_id() -> String {
    DEFAULT_MQTT_CLIENT_ID.to_string()
}

fn default_topic_out() -> String {
    DEFAULT_TOPIC_OUT.to_string()
}

fn default_topic_in() -> String {
    DEFAULT_TOPIC_IN.to_string()
}

fn default_topic_status() -> String {
    DEFAULT_TOPIC_STATUS.to_string()
}

fn default_topic_version() -> String {
    DEFAULT_TOPIC_VERSION.to_string()
}
