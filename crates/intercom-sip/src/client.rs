//! Signalling client collaborator.
//!
//! The SIP protocol stack lives outside this crate. The session driver only
//! needs the narrow surface below: address configuration, a retryable
//! initialization step, one-time handler registration and a pump that
//! processes pending protocol work.

use std::future::Future;
use std::net::IpAddr;

use crate::error::Result;
use crate::events::EventHandler;

/// Signalling session client.
///
/// Driven from a single task. Event callbacks registered through
/// [`set_event_handler`](Self::set_event_handler) fire from inside
/// [`run`](Self::run), on the caller's task.
///
/// Not object-safe because `init` and `run` return `impl Future`; use it as
/// a generic parameter.
pub trait SignallingClient: Send {
    /// Address of the registrar/peer to use on the next initialization.
    fn set_server_address(&mut self, address: IpAddr);

    /// Our own address as reported to the peer.
    fn set_local_address(&mut self, address: IpAddr);

    /// Whether the session is registered and ready to be pumped.
    fn is_initialized(&self) -> bool;

    /// Register the session.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails. The driver retries after a
    /// fixed delay.
    fn init(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Install the call event handler. Called once per process.
    fn set_event_handler(&mut self, handler: Box<dyn EventHandler>);

    /// Process pending protocol work, dispatching events to the handler.
    ///
    /// Returns after one unit of work. Errors are informational; the driver
    /// calls `run` again regardless.
    fn run(&mut self) -> impl Future<Output = Result<()>> + Send;
}
