//! Simulated link layer and message bus for running off-device.

use intercom_network::LinkLayer;
use intercom_relay::{BusClient, BusEvent, BusOptions, Publish};
use tracing::{debug, info};

/// Link layer that is always up; reconnect requests are only logged.
#[derive(Debug, Default)]
pub struct AlwaysUpLink;

impl LinkLayer for AlwaysUpLink {
    fn request_reconnect(&self) -> intercom_network::Result<()> {
        debug!("Reconnect requested on simulated link");
        Ok(())
    }
}

/// Bus client that connects once and logs every publish.
#[derive(Debug)]
pub struct LoggingBus {
    connected: bool,
}

impl LoggingBus {
    pub fn connect(options: &BusOptions) -> Self {
        info!(
            "Simulated bus client '{}', last will '{}' on '{}'",
            options.client_id,
            String::from_utf8_lossy(&options.last_will.payload),
            options.last_will.topic
        );
        Self { connected: false }
    }
}

impl BusClient for LoggingBus {
    async fn next_event(&mut self) -> Option<BusEvent> {
        if !self.connected {
            self.connected = true;
            return Some(BusEvent::Connected);
        }
        std::future::pending().await
    }

    async fn publish(&mut self, message: Publish) -> intercom_relay::Result<()> {
        info!(
            "MQTT {} <- {}{}",
            message.topic,
            String::from_utf8_lossy(&message.payload),
            if message.retain { " (retained)" } else { "" }
        );
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> intercom_relay::Result<()> {
        info!("MQTT subscribed to {}", topic);
        Ok(())
    }
}
