//! Bus message model.
//!
//! Outbound call notifications, inbound commands and the publish options
//! used for them.

use intercom_core::MqttConfig;
use intercom_core::constants::{
    COMMAND_STATUS, COMMAND_TEST, PAYLOAD_DING, PAYLOAD_DONG, PAYLOAD_TEST, STATUS_OFFLINE,
    STATUS_ONLINE,
};
use std::fmt;

/// Notification relayed to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayMessage {
    /// A call started (someone rang)
    Ding,

    /// The call ended or was cancelled
    Dong,

    /// Answer to an inbound test command
    Test,
}

impl RelayMessage {
    /// Wire payload for this message.
    pub fn payload(self) -> &'static str {
        match self {
            RelayMessage::Ding => PAYLOAD_DING,
            RelayMessage::Dong => PAYLOAD_DONG,
            RelayMessage::Test => PAYLOAD_TEST,
        }
    }
}

impl fmt::Display for RelayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload())
    }
}

/// Command received on the inbound topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCommand {
    /// Publish a test notification
    Test,

    /// Re-announce status and version
    Status,
}

impl InboundCommand {
    /// Parse a raw payload. Surrounding whitespace is ignored, case is not.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(payload).ok()?.trim();
        match text {
            COMMAND_TEST => Some(InboundCommand::Test),
            COMMAND_STATUS => Some(InboundCommand::Status),
            _ => None,
        }
    }
}

/// MQTT delivery guarantee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// A message to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publish {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

impl Publish {
    /// Fire-and-forget notification: at-most-once, not retained.
    pub fn notify(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtMostOnce,
            retain: false,
        }
    }

    /// Retained state: at-most-once, kept by the broker for late subscribers.
    pub fn retained(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtMostOnce,
            retain: true,
        }
    }

    /// Payload as text, if valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Message the broker publishes when the connection drops uncleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Topics the relay publishes and listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTopics {
    /// Call notifications
    pub outbound: String,

    /// Commands for the intercom
    pub inbound: String,

    /// Retained online/offline status
    pub status: String,

    /// Retained firmware version
    pub version: String,
}

impl From<&MqttConfig> for RelayTopics {
    fn from(config: &MqttConfig) -> Self {
        Self {
            outbound: config.topic_out.clone(),
            inbound: config.topic_in.clone(),
            status: config.topic_status.clone(),
            version: config.topic_version.clone(),
        }
    }
}

impl Default for RelayTopics {
    fn default() -> Self {
        Self::from(&MqttConfig::default())
    }
}

/// Connection options handed to the bus client before it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusOptions {
    pub client_id: String,
    pub last_will: LastWill,
}

impl BusOptions {
    /// Options for `config`, with the retained "offline" last will on the
    /// status topic.
    pub fn from_config(config: &MqttConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            last_will: LastWill {
                topic: config.topic_status.clone(),
                payload: STATUS_OFFLINE.as_bytes().to_vec(),
                qos: QoS::AtMostOnce,
                retain: true,
            },
        }
    }
}

/// The retained online announcement for `topics`.
pub(crate) fn online_status(topics: &RelayTopics) -> Publish {
    Publish::retained(topics.status.clone(), STATUS_ONLINE)
}
