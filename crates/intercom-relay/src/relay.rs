//! Command relay task.
//!
//! Forwards call notifications to the message bus and answers commands
//! received from it. Call handling never waits on the bus: notifications
//! pass through a single-slot queue and are dropped while one is pending.
//!
//! ```text
//! ┌──────────────┐ try_send ┌─────────────┐        ┌──────────────┐
//! │ Call handler │─────────►│ Relay queue │───────►│              │──► publish
//! └──────────────┘          │ (capacity 1)│        │ CommandRelay │
//!                           └─────────────┘        │    task      │◄── bus events
//!                                                  └──────────────┘
//! ```
//!
//! On every (re)connect the relay publishes the retained "online" status
//! and the version, then subscribes to the inbound topic.

use crate::bus::{BusClient, BusEvent};
use crate::message::{InboundCommand, Publish, RelayMessage, RelayTopics, online_status};
use intercom_core::constants::RELAY_QUEUE_CAPACITY;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Create the single-slot relay queue.
pub fn relay_queue() -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::channel(RELAY_QUEUE_CAPACITY);
    (RelaySender { tx }, RelayReceiver { rx })
}

/// Result of a best-effort relay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Queued,
    Dropped,
    Closed,
}

/// Producer side of the relay queue.
#[derive(Debug, Clone)]
pub struct RelaySender {
    tx: mpsc::Sender<RelayMessage>,
}

impl RelaySender {
    /// Queue `message` without waiting.
    pub fn send(&self, message: RelayMessage) -> RelayOutcome {
        match self.tx.try_send(message) {
            Ok(()) => RelayOutcome::Queued,
            Err(TrySendError::Full(message)) => {
                debug!("Relay busy, dropping '{}'", message);
                RelayOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => RelayOutcome::Closed,
        }
    }
}

/// Consumer side of the relay queue.
#[derive(Debug)]
pub struct RelayReceiver {
    rx: mpsc::Receiver<RelayMessage>,
}

impl RelayReceiver {
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        self.rx.recv().await
    }
}

/// Relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Successful publishes, announcements included
    pub published: u64,

    /// Failed publishes
    pub publish_errors: u64,

    /// Status/version announcements made
    pub announcements: u64,

    /// Inbound commands acted upon
    pub commands: u64,
}

/// Relay between the call handler and the message bus.
pub struct CommandRelay<B> {
    bus: B,
    topics: RelayTopics,
    version: String,
    messages: RelayReceiver,
    stats: RelayStats,
}

impl<B: BusClient + 'static> CommandRelay<B> {
    pub fn new(
        bus: B,
        topics: RelayTopics,
        version: impl Into<String>,
        messages: RelayReceiver,
    ) -> Self {
        Self {
            bus,
            topics,
            version: version.into(),
            messages,
            stats: RelayStats::default(),
        }
    }

    /// Spawn [`run`](Self::run) on the runtime.
    pub fn spawn(self) -> JoinHandle<RelayStats> {
        tokio::spawn(self.run())
    }

    /// Serve until the relay queue or the bus closes.
    pub async fn run(mut self) -> RelayStats {
        info!("Command relay started (outbound topic '{}')", self.topics.outbound);

        loop {
            tokio::select! {
                event = self.bus.next_event() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Bus client closed, command relay stopping");
                        break;
                    }
                },
                message = self.messages.recv() => match message {
                    Some(message) => self.forward(message).await,
                    None => {
                        info!("Relay queue closed, command relay stopping");
                        break;
                    }
                },
            }
        }

        self.stats
    }

    async fn handle_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::Connected => {
                info!("Bus connected");
                self.announce().await;
                let topic = self.topics.inbound.clone();
                match self.bus.subscribe(&topic).await {
                    Ok(()) => debug!("Subscribed to '{}'", topic),
                    Err(e) => warn!("{}", e),
                }
            }
            BusEvent::Disconnected => warn!("Bus disconnected"),
            BusEvent::Message { topic, payload } => {
                if topic != self.topics.inbound {
                    trace!("Ignoring message on '{}'", topic);
                    return;
                }
                self.handle_command(&payload).await;
            }
        }
    }

    async fn handle_command(&mut self, payload: &[u8]) {
        match InboundCommand::parse(payload) {
            Some(InboundCommand::Test) => {
                info!("Test command received");
                self.stats.commands += 1;
                self.forward(RelayMessage::Test).await;
            }
            Some(InboundCommand::Status) => {
                info!("Status command received");
                self.stats.commands += 1;
                self.announce().await;
            }
            None => debug!(
                "Ignoring unknown command '{}'",
                String::from_utf8_lossy(payload)
            ),
        }
    }

    async fn announce(&mut self) {
        self.stats.announcements += 1;
        self.publish(online_status(&self.topics)).await;
        let version = Publish::retained(self.topics.version.clone(), self.version.clone());
        self.publish(version).await;
    }

    async fn forward(&mut self, message: RelayMessage) {
        debug!("Relaying '{}'", message);
        let publish = Publish::notify(self.topics.outbound.clone(), message.payload());
        self.publish(publish).await;
    }

    async fn publish(&mut self, message: Publish) {
        match self.bus.publish(message).await {
            Ok(()) => self.stats.published += 1,
            Err(e) => {
                self.stats.publish_errors += 1;
                warn!("{}", e);
            }
        }
    }
}
