//! Network readiness layer for the intercom appliance.
//!
//! This crate sits between the link layer and the signalling session:
//!
//! - **ConnectivityGate**: level-triggered "network ready" flag with a
//!   bounded wait, plus the address handoff from the latest link acquisition
//! - **LinkMonitor**: turns link events into gate updates and reconnect
//!   requests
//! - **LinkLayer**: the control surface of the external link collaborator
//!
//! # Example
//!
//! ```
//! use intercom_network::{ConnectivityGate, LinkEvent, LinkMonitor, MockLink};
//! use std::sync::Arc;
//!
//! let gate = ConnectivityGate::new();
//! let monitor = LinkMonitor::new(gate.clone(), Arc::new(MockLink::new()));
//!
//! monitor.handle(LinkEvent::Disconnected);
//! assert!(!gate.is_connected());
//! ```

mod connectivity;
mod error;
mod link;

pub use connectivity::{ConnectivityGate, LinkAddresses};
pub use error::{NetworkError, Result};
pub use link::{
    LinkEvent, LinkLayer, LinkMonitor, MockLink, SharedLink, request_reconnect_logged,
};
