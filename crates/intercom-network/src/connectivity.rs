//! Network readiness gate.
//!
//! A level-triggered "network ready" flag written by the link monitor and
//! read by the signalling session driver. Waiting on the gate returns as soon
//! as the flag is set, or `false` once the timeout elapses; there is no
//! history of past edges.
//!
//! The gate also carries the addresses from the most recent link
//! acquisition. Each acquisition is handed out once, so the driver
//! reconfigures its session exactly once per address change.
//!
//! # Example
//!
//! ```
//! use intercom_network::ConnectivityGate;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let gate = ConnectivityGate::new();
//! assert!(!gate.wait_connected(Duration::from_millis(10)).await);
//!
//! gate.signal_connected();
//! assert!(gate.wait_connected(Duration::from_millis(10)).await);
//! # }
//! ```

use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Addresses obtained by the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkAddresses {
    /// Our own address on the link
    pub local: IpAddr,

    /// Default gateway, which also hosts the SIP registrar on typical home routers
    pub gateway: IpAddr,
}

#[derive(Debug)]
struct GateInner {
    /// Connected flag; watch gives synchronized reads and wakeups
    state: watch::Sender<bool>,

    /// Addresses from the latest acquisition not yet taken by the driver
    addresses: Mutex<Option<LinkAddresses>>,
}

/// Shared network readiness flag.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    inner: Arc<GateInner>,
}

impl ConnectivityGate {
    /// Create a gate in the not-connected state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(GateInner {
                state,
                addresses: Mutex::new(None),
            }),
        }
    }

    /// Mark the network as usable and wake every waiter.
    pub fn signal_connected(&self) {
        if !self.inner.state.send_replace(true) {
            info!("Network connected");
        }
    }

    /// Mark the network as unusable.
    ///
    /// Session state is left alone; the driver decides what a disconnect means.
    pub fn signal_disconnected(&self) {
        if self.inner.state.send_replace(false) {
            info!("Network disconnected");
        }
    }

    /// Current value of the flag, without waiting.
    pub fn is_connected(&self) -> bool {
        *self.inner.state.borrow()
    }

    /// Wait until the network is connected, for at most `timeout`.
    ///
    /// Returns `true` immediately if already connected.
    pub async fn wait_connected(&self, timeout: Duration) -> bool {
        let mut rx = self.inner.state.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|connected| *connected)).await {
            Ok(Ok(_)) => true,
            Ok(Err(_)) => false,
            Err(_) => {
                debug!("Network not ready after {}ms", timeout.as_millis());
                false
            }
        }
    }

    /// Record the addresses of a new link acquisition.
    pub fn set_addresses(&self, addresses: LinkAddresses) {
        *self
            .inner
            .addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(addresses);
    }

    /// Take the addresses of the latest acquisition, if not taken already.
    pub fn take_addresses(&self) -> Option<LinkAddresses> {
        self.inner
            .addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Default for ConnectivityGate {
    fn default() -> Self {
        Self::new()
    }
}
