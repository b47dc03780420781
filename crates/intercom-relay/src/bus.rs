//! Message bus collaborator.
//!
//! The MQTT client itself lives outside this crate. The relay needs a
//! stream of connection and message events plus publish and subscribe.

use crate::error::Result;
use crate::message::Publish;
use std::future::Future;

/// Event reported by the bus client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Connected (or reconnected) to the broker
    Connected,

    /// Connection to the broker lost
    Disconnected,

    /// Message received on a subscribed topic
    Message { topic: String, payload: Vec<u8> },
}

/// MQTT client abstraction used by the command relay.
///
/// Not object-safe; use it as a generic parameter.
pub trait BusClient: Send {
    /// Wait for the next event. Returns `None` once the client has shut down.
    ///
    /// Must be cancel-safe: the relay polls it inside `select!`.
    fn next_event(&mut self) -> impl Future<Output = Option<BusEvent>> + Send;

    /// Publish a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed to the broker.
    fn publish(&mut self, message: Publish) -> impl Future<Output = Result<()>> + Send;

    /// Subscribe to a topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription request fails.
    fn subscribe(&mut self, topic: &str) -> impl Future<Output = Result<()>> + Send;
}
