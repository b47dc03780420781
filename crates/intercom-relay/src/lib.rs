//! # Intercom Relay
//!
//! Bridges call notifications to a home-automation message bus (MQTT).
//!
//! - [`RelayMessage`]: the `ding` / `dong` / `test` notifications
//! - [`BusClient`]: the MQTT client collaborator
//! - [`CommandRelay`]: the task that publishes notifications, announces
//!   online status and version on connect, and answers inbound commands
//! - [`BusOptions`]: client id and the retained "offline" last will
//!
//! ## Example
//!
//! ```no_run
//! use intercom_core::{MqttConfig, VERSION};
//! use intercom_relay::{BusOptions, CommandRelay, RelayMessage, RelayTopics, relay_queue};
//! use intercom_relay::mock::MockBus;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MqttConfig::default();
//!     let (bus, handle) = MockBus::new(BusOptions::from_config(&config));
//!     let (tx, rx) = relay_queue();
//!
//!     let relay = CommandRelay::new(bus, RelayTopics::from(&config), VERSION, rx).spawn();
//!
//!     handle.connect();
//!     tx.send(RelayMessage::Ding);
//!     drop(tx);
//!     relay.await.unwrap();
//! }
//! ```

pub mod bus;
pub mod error;
pub mod message;
pub mod mock;
pub mod relay;

pub use bus::{BusClient, BusEvent};
pub use error::{BusError, Result};
pub use message::{BusOptions, InboundCommand, LastWill, Publish, QoS, RelayMessage, RelayTopics};
pub use relay::{CommandRelay, RelayOutcome, RelayReceiver, RelaySender, RelayStats, relay_queue};
