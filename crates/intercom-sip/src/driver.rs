//! Signalling session driver.
//!
//! Keeps the signalling session alive for the lifetime of the process:
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   wait_connected(timeout) ──timeout──► request reconnect ─┤
//!            │ connected                                    │
//!            ▼                                              │
//!   apply fresh link addresses                              │
//!            │                                              │
//!            ▼                                              │
//!   initialized? ──no──► init() ──err──► sleep(retry) ──────┤
//!            │ yes           │ ok: install handler (once)   │
//!            ▼               ▼                              │
//!   run() once: events dispatched to the handler ───────────┘
//! ```
//!
//! The driver never gives up and never tears the session down; a link loss
//! only pauses pumping until the gate reports connected again.

use crate::client::SignallingClient;
use crate::events::EventHandler;
use intercom_core::SipConfig;
use intercom_core::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_INIT_RETRY_DELAY_MS};
use intercom_network::{ConnectivityGate, SharedLink, request_reconnect_logged};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Driver timing and addressing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Longest single wait for the network before asking for a reconnect
    pub connect_timeout: Duration,

    /// Delay between failed initialization attempts
    pub init_retry_delay: Duration,

    /// Use the link's gateway as the signalling server
    pub server_from_gateway: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            init_retry_delay: Duration::from_millis(DEFAULT_INIT_RETRY_DELAY_MS),
            server_from_gateway: true,
        }
    }
}

impl From<&SipConfig> for DriverConfig {
    fn from(config: &SipConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            init_retry_delay: config.init_retry_delay(),
            server_from_gateway: config.server_from_gateway,
        }
    }
}

/// Driver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Gate waits that timed out
    pub connect_timeouts: u64,

    /// Failed `init` calls
    pub init_failures: u64,

    /// Successful `init` calls
    pub inits: u64,

    /// Calls to `run`
    pub pumps: u64,

    /// `run` calls that returned an error
    pub pump_errors: u64,
}

/// Outcome of one driver iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStep {
    /// The network did not come up within the connect timeout.
    Disconnected,

    /// Initialization failed; the retry delay has already elapsed.
    InitFailed,

    /// The session was pumped once.
    Pumped,
}

/// Owns the signalling client and keeps it initialized and pumped.
pub struct SessionDriver<C> {
    client: C,
    gate: ConnectivityGate,
    link: SharedLink,
    handler: Option<Box<dyn EventHandler>>,
    config: DriverConfig,
    stats: DriverStats,
}

impl<C: SignallingClient + 'static> SessionDriver<C> {
    /// Create a driver. `handler` is installed on the first successful init.
    pub fn new(
        client: C,
        gate: ConnectivityGate,
        link: SharedLink,
        handler: Box<dyn EventHandler>,
        config: DriverConfig,
    ) -> Self {
        Self {
            client,
            gate,
            link,
            handler: Some(handler),
            config,
            stats: DriverStats::default(),
        }
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one iteration of the driver loop.
    pub async fn step(&mut self) -> DriverStep {
        if !self.gate.wait_connected(self.config.connect_timeout).await {
            self.stats.connect_timeouts += 1;
            warn!(
                "Network not connected after {}ms, requesting reconnect",
                self.config.connect_timeout.as_millis()
            );
            request_reconnect_logged(self.link.as_ref());
            return DriverStep::Disconnected;
        }

        self.apply_addresses();

        if !self.client.is_initialized() {
            if let Err(e) = self.client.init().await {
                self.stats.init_failures += 1;
                warn!(
                    "Signalling init failed: {}, retrying in {}ms",
                    e,
                    self.config.init_retry_delay.as_millis()
                );
                tokio::time::sleep(self.config.init_retry_delay).await;
                return DriverStep::InitFailed;
            }

            self.stats.inits += 1;
            info!("Signalling session initialized");
            if let Some(handler) = self.handler.take() {
                self.client.set_event_handler(handler);
                debug!("Call event handler installed");
            }
        }

        self.stats.pumps += 1;
        match self.client.run().await {
            Ok(()) => trace!("Signalling pump returned"),
            Err(e) => {
                self.stats.pump_errors += 1;
                debug!("Signalling pump returned error: {}", e);
            }
        }

        // A client whose run() is always ready would otherwise starve the worker.
        tokio::task::yield_now().await;
        DriverStep::Pumped
    }

    /// Drive the session forever.
    pub async fn run(mut self) {
        info!(
            "Signalling driver started (connect timeout {}ms, init retry {}ms)",
            self.config.connect_timeout.as_millis(),
            self.config.init_retry_delay.as_millis()
        );
        loop {
            self.step().await;
        }
    }

    /// Spawn [`run`](Self::run) on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn apply_addresses(&mut self) {
        let Some(addresses) = self.gate.take_addresses() else {
            return;
        };

        debug!("Using local address {}", addresses.local);
        self.client.set_local_address(addresses.local);
        if self.config.server_from_gateway {
            info!("Using gateway {} as signalling server", addresses.gateway);
            self.client.set_server_address(addresses.gateway);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CallEvent;
    use crate::mock::{MockSessionHandle, MockSignallingClient};
    use intercom_network::{LinkAddresses, MockLink};
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    struct Fixture {
        driver: SessionDriver<MockSignallingClient>,
        session: MockSessionHandle,
        gate: ConnectivityGate,
        link: MockLink,
        events: mpsc::UnboundedReceiver<CallEvent>,
    }

    fn fixture(config: DriverConfig) -> Fixture {
        let (client, session) = MockSignallingClient::new();
        let gate = ConnectivityGate::new();
        let link = MockLink::new();
        let (tx, events) = mpsc::unbounded_channel();
        let handler = Box::new(move |event: &CallEvent| {
            let _ = tx.send(event.clone());
        });
        let driver = SessionDriver::new(
            client,
            gate.clone(),
            Arc::new(link.clone()),
            handler,
            config,
        );
        Fixture {
            driver,
            session,
            gate,
            link,
            events,
        }
    }

    fn addresses() -> LinkAddresses {
        LinkAddresses {
            local: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)),
            gateway: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
        }
    }

    #[test]
    fn test_config_from_sip_section() {
        let sip = SipConfig::default();
        let config = DriverConfig::from(&sip);
        assert_eq!(config, DriverConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_requests_reconnect() {
        let mut f = fixture(DriverConfig::default());
        let start = Instant::now();

        assert_eq!(f.driver.step().await, DriverStep::Disconnected);

        assert!(start.elapsed() >= Duration::from_secs(10));
        assert_eq!(f.link.reconnect_count(), 1);
        assert_eq!(f.session.init_calls(), 0);
        assert_eq!(f.driver.stats().connect_timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_retried_with_fixed_delay() {
        let mut f = fixture(DriverConfig::default());
        f.gate.signal_connected();
        f.session.fail_next_inits(2);

        let start = Instant::now();
        assert_eq!(f.driver.step().await, DriverStep::InitFailed);
        assert_eq!(f.driver.step().await, DriverStep::InitFailed);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(4));
        assert!(waited < Duration::from_millis(4001));
        assert_eq!(f.session.handler_installs(), 0);

        f.session.push_event(CallEvent::CallStart);
        assert_eq!(f.driver.step().await, DriverStep::Pumped);

        let stats = f.driver.stats();
        assert_eq!(stats.init_failures, 2);
        assert_eq!(stats.inits, 1);
        assert_eq!(f.session.init_calls(), 3);
        assert_eq!(f.session.handler_installs(), 1);
        assert_eq!(f.events.recv().await, Some(CallEvent::CallStart));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_installed_once_across_reinit() {
        let mut f = fixture(DriverConfig::default());
        f.gate.signal_connected();

        f.session.push_event(CallEvent::CallStart);
        f.driver.step().await;

        f.session.deinitialize();
        f.session.push_event(CallEvent::CallEnd);
        f.driver.step().await;

        assert_eq!(f.session.init_calls(), 2);
        assert_eq!(f.session.handler_installs(), 1);
        assert_eq!(f.events.recv().await, Some(CallEvent::CallStart));
        assert_eq!(f.events.recv().await, Some(CallEvent::CallEnd));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialized_session_is_not_reinitialized() {
        let mut f = fixture(DriverConfig::default());
        f.gate.signal_connected();

        for _ in 0..3 {
            f.session.push_event(CallEvent::CallEnd);
            assert_eq!(f.driver.step().await, DriverStep::Pumped);
        }

        assert_eq!(f.session.init_calls(), 1);
        assert_eq!(f.driver.stats().pumps, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_becomes_server() {
        let mut f = fixture(DriverConfig::default());
        f.gate.set_addresses(addresses());
        f.gate.signal_connected();
        f.session.push(Vec::new());

        f.driver.step().await;

        assert_eq!(f.session.server_address(), Some(addresses().gateway));
        assert_eq!(f.session.local_address(), Some(addresses().local));
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_server_kept_when_gateway_disabled() {
        let mut f = fixture(DriverConfig {
            server_from_gateway: false,
            ..DriverConfig::default()
        });
        f.gate.set_addresses(addresses());
        f.gate.signal_connected();
        f.session.push(Vec::new());

        f.driver.step().await;

        assert_eq!(f.session.server_address(), None);
        assert_eq!(f.session.local_address(), Some(addresses().local));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_error_is_not_fatal() {
        let f = fixture(DriverConfig::default());
        f.gate.signal_connected();
        let Fixture {
            mut driver,
            session,
            ..
        } = f;
        // Closing the script makes every run() return SessionEnded.
        drop(session);

        assert_eq!(driver.step().await, DriverStep::Pumped);
        assert_eq!(driver.step().await, DriverStep::Pumped);
        assert_eq!(driver.stats().pump_errors, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_driver_waits_for_network() {
        let f = fixture(DriverConfig::default());
        let Fixture {
            driver,
            session,
            gate,
            link,
            mut events,
        } = f;
        let task = driver.spawn();

        session.push(vec![
            CallEvent::CallStart,
            CallEvent::ButtonPress {
                symbol: '4',
                duration_ms: 100,
            },
        ]);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(link.reconnect_count(), 2);
        assert_eq!(session.init_calls(), 0);

        gate.signal_connected();
        assert_eq!(events.recv().await, Some(CallEvent::CallStart));
        assert_eq!(
            events.recv().await,
            Some(CallEvent::ButtonPress {
                symbol: '4',
                duration_ms: 100,
            })
        );
        assert!(session.is_initialized());

        task.abort();
    }
}
