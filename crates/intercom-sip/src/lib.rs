//! # Intercom SIP
//!
//! Signalling session handling for the intercom.
//!
//! This crate provides:
//! - Call lifecycle and keypad tone events ([`CallEvent`])
//! - The handler interface those events are delivered to ([`EventHandler`])
//! - The signalling client collaborator trait ([`SignallingClient`])
//! - The session driver that keeps the client initialized and pumped
//!   while the network is up ([`SessionDriver`])
//! - A scriptable mock client for tests and development
//!
//! ## Example
//!
//! ```no_run
//! use intercom_network::{ConnectivityGate, MockLink};
//! use intercom_sip::{CallEvent, DriverConfig, SessionDriver};
//! use intercom_sip::mock::MockSignallingClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, session) = MockSignallingClient::new();
//!     let gate = ConnectivityGate::new();
//!     let handler = Box::new(|event: &CallEvent| println!("{}", event));
//!
//!     let driver = SessionDriver::new(
//!         client,
//!         gate.clone(),
//!         Arc::new(MockLink::new()),
//!         handler,
//!         DriverConfig::default(),
//!     );
//!     let task = driver.spawn();
//!
//!     gate.signal_connected();
//!     session.push_event(CallEvent::CallStart);
//!     # task.abort();
//! }
//! ```

pub mod client;
pub mod driver;
pub mod error;
pub mod events;
pub mod mock;

pub use client::SignallingClient;
pub use driver::{DriverConfig, DriverStats, DriverStep, SessionDriver};
pub use error::{Result, SignallingError};
pub use events::{CallEvent, CancelReason, EventHandler};
