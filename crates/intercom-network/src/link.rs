//! Link-layer collaborator and event monitor.
//!
//! The link layer (Wi-Fi station, Ethernet, ...) is brought up outside this
//! crate. It reports [`LinkEvent`]s and accepts reconnect requests through
//! [`LinkLayer`]. The [`LinkMonitor`] translates those events into the
//! [`ConnectivityGate`] flag:
//!
//! ```text
//! Started              ──► request_reconnect()
//! GotAddress{..}       ──► gate.set_addresses(), gate.signal_connected()
//! Disconnected         ──► request_reconnect(), gate.signal_disconnected()
//! ```

use crate::connectivity::{ConnectivityGate, LinkAddresses};
use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Events reported by the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Interface started, not yet associated
    Started,

    /// Associated and addressed
    GotAddress(LinkAddresses),

    /// Association lost
    Disconnected,
}

/// Control surface of the link-layer collaborator.
pub trait LinkLayer: Send + Sync {
    /// Ask the link to (re)associate. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    fn request_reconnect(&self) -> Result<()>;
}

/// Shared handle to the link layer, used by the monitor and the session driver.
pub type SharedLink = Arc<dyn LinkLayer>;

/// Issue a reconnect request, logging instead of failing.
pub fn request_reconnect_logged(link: &dyn LinkLayer) {
    if let Err(e) = link.request_reconnect() {
        warn!("Link reconnect request failed: {}", e);
    }
}

/// Translates link events into connectivity gate updates.
pub struct LinkMonitor {
    gate: ConnectivityGate,
    link: SharedLink,
}

impl LinkMonitor {
    pub fn new(gate: ConnectivityGate, link: SharedLink) -> Self {
        Self { gate, link }
    }

    /// Apply a single link event.
    pub fn handle(&self, event: LinkEvent) {
        match event {
            LinkEvent::Started => {
                debug!("Link started, requesting connection");
                request_reconnect_logged(self.link.as_ref());
            }
            LinkEvent::GotAddress(addresses) => {
                info!(
                    "Link up: local {} gateway {}",
                    addresses.local, addresses.gateway
                );
                self.gate.set_addresses(addresses);
                self.gate.signal_connected();
            }
            LinkEvent::Disconnected => {
                warn!("Link lost, requesting reconnection");
                request_reconnect_logged(self.link.as_ref());
                self.gate.signal_disconnected();
            }
        }
    }

    /// Consume link events until the feed closes.
    pub async fn run(self, mut events: mpsc::Receiver<LinkEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("Link event feed closed");
    }

    /// Spawn [`run`](Self::run) on the runtime.
    pub fn spawn(self, events: mpsc::Receiver<LinkEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}

/// Link layer stand-in that counts reconnect requests.
///
/// Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    reconnects: Arc<AtomicUsize>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reconnect requests received so far.
    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }
}

impl LinkLayer for MockLink {
    fn request_reconnect(&self) -> Result<()> {
        let count = self.reconnects.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Mock link reconnect request #{}", count);
        Ok(())
    }
}
