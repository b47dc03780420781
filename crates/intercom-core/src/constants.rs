//! Core constants for the intercom appliance.
//!
//! This module collects the defaults and protocol-level constants shared by
//! every crate in the workspace: access code limits, actuator timing,
//! signalling retry timing, queue capacities and the home-automation bus
//! topics and payloads.
//!
//! # Usage
//!
//! ```
//! use intercom_core::constants::*;
//! use std::time::Duration;
//!
//! let pulse = Duration::from_millis(DEFAULT_UNLOCK_DURATION_MS);
//! assert!(pulse > Duration::ZERO);
//! assert_eq!(UNLOCK_QUEUE_CAPACITY, 1);
//! ```

// ============================================================================
// Access Code
// ============================================================================

/// Access code used when the configuration does not provide one.
///
/// Startup logs a warning whenever this value is in effect.
pub const DEFAULT_ACCESS_CODE: &str = "1234";

/// Minimum number of symbols in an access code.
pub const MIN_ACCESS_CODE_LENGTH: usize = 1;

/// Maximum number of symbols in an access code.
pub const MAX_ACCESS_CODE_LENGTH: usize = 16;

// ============================================================================
// Door Actuator
// ============================================================================

/// How long the door latch stays unlocked after a matching code (milliseconds).
pub const DEFAULT_UNLOCK_DURATION_MS: u64 = 5_000;

/// Capacity of the unlock command queue.
///
/// A single slot gives at-most-one-in-flight semantics: a second request
/// while one is pending is dropped by the sender.
pub const UNLOCK_QUEUE_CAPACITY: usize = 1;

// ============================================================================
// Signalling Session
// ============================================================================

/// Default SIP registrar port.
pub const DEFAULT_SIP_PORT: u16 = 5060;

/// How long the session driver waits for the network before retrying (milliseconds).
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Backoff after a failed session initialization (milliseconds).
pub const DEFAULT_INIT_RETRY_DELAY_MS: u64 = 2_000;

// ============================================================================
// Home-Automation Bus
// ============================================================================

/// Capacity of the relay handoff queue between call handling and the bus.
pub const RELAY_QUEUE_CAPACITY: usize = 1;

/// Default bus client identifier.
pub const DEFAULT_MQTT_CLIENT_ID: &str = "intercom";

/// Default topic for outbound doorbell messages.
pub const DEFAULT_TOPIC_OUT: &str = "test/haus/klingel/set";

/// Default topic for inbound commands.
pub const DEFAULT_TOPIC_IN: &str = "test/haus/klingel";

/// Default topic carrying the retained online/offline status.
pub const DEFAULT_TOPIC_STATUS: &str = "test/haus/klingel/status";

/// Default topic carrying the retained firmware version.
pub const DEFAULT_TOPIC_VERSION: &str = "test/haus/klingel/version";

/// Status payload published once the bus connection is up.
pub const STATUS_ONLINE: &str = "online";

/// Status payload registered as the last-will message.
pub const STATUS_OFFLINE: &str = "offline";

/// Payload for a ring (call start).
pub const PAYLOAD_DING: &str = "ding";

/// Payload for the end of a ring (call end or cancel).
pub const PAYLOAD_DONG: &str = "dong";

/// Payload for a test message.
pub const PAYLOAD_TEST: &str = "test";

/// Inbound command requesting a test message.
pub const COMMAND_TEST: &str = "test";

/// Inbound command requesting a status and version re-announcement.
pub const COMMAND_STATUS: &str = "status";
