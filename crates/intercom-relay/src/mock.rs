//! In-memory bus client for tests and development.

use crate::bus::{BusClient, BusEvent};
use crate::error::{BusError, Result};
use crate::message::{BusOptions, Publish};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Default)]
struct BusLog {
    published: Vec<Publish>,
    subscriptions: Vec<String>,
    fail_publishes: bool,
}

fn lock(log: &Mutex<BusLog>) -> MutexGuard<'_, BusLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock bus client.
///
/// Events are injected through a [`MockBusHandle`]; publishes and
/// subscriptions are recorded for inspection.
#[derive(Debug)]
pub struct MockBus {
    options: BusOptions,
    events: mpsc::UnboundedReceiver<BusEvent>,
    log: Arc<Mutex<BusLog>>,
    published_tx: watch::Sender<usize>,
}

/// Test-side control of a [`MockBus`].
#[derive(Debug, Clone)]
pub struct MockBusHandle {
    events: mpsc::UnboundedSender<BusEvent>,
    log: Arc<Mutex<BusLog>>,
    published_rx: watch::Receiver<usize>,
}

impl MockBus {
    pub fn new(options: BusOptions) -> (Self, MockBusHandle) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (published_tx, published_rx) = watch::channel(0);
        let log = Arc::new(Mutex::new(BusLog::default()));

        let bus = Self {
            options,
            events,
            log: Arc::clone(&log),
            published_tx,
        };
        let handle = MockBusHandle {
            events: events_tx,
            log,
            published_rx,
        };
        (bus, handle)
    }

    /// Options the bus was created with.
    pub fn options(&self) -> &BusOptions {
        &self.options
    }
}

impl BusClient for MockBus {
    async fn next_event(&mut self) -> Option<BusEvent> {
        self.events.recv().await
    }

    async fn publish(&mut self, message: Publish) -> Result<()> {
        let count = {
            let mut log = lock(&self.log);
            if log.fail_publishes {
                return Err(BusError::publish_failed(
                    message.topic,
                    "simulated publish failure",
                ));
            }
            log.published.push(message);
            log.published.len()
        };
        self.published_tx.send_replace(count);
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        lock(&self.log).subscriptions.push(topic.to_string());
        Ok(())
    }
}

impl MockBusHandle {
    /// Simulate the broker accepting the connection.
    pub fn connect(&self) {
        self.inject(BusEvent::Connected);
    }

    /// Simulate losing the broker connection.
    pub fn disconnect(&self) {
        self.inject(BusEvent::Disconnected);
    }

    /// Simulate a message arriving on `topic`.
    pub fn deliver(&self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.inject(BusEvent::Message {
            topic: topic.into(),
            payload: payload.into(),
        });
    }

    fn inject(&self, event: BusEvent) {
        // Receiver gone means the bus was dropped; nothing to deliver to.
        let _ = self.events.send(event);
    }

    /// Every successful publish so far, oldest first.
    pub fn published(&self) -> Vec<Publish> {
        lock(&self.log).published.clone()
    }

    /// Payloads published to `topic`, as text.
    pub fn payloads_on(&self, topic: &str) -> Vec<String> {
        lock(&self.log)
            .published
            .iter()
            .filter(|p| p.topic == topic)
            .map(|p| String::from_utf8_lossy(&p.payload).into_owned())
            .collect()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.log).subscriptions.clone()
    }

    /// Make subsequent publishes fail (or succeed again).
    pub fn set_fail_publishes(&self, fail: bool) {
        lock(&self.log).fail_publishes = fail;
    }

    /// Wait until at least `count` publishes have been recorded.
    ///
    /// Returns `false` if the bus is dropped first.
    pub async fn wait_for_published(&mut self, count: usize) -> bool {
        self.published_rx.wait_for(|n| *n >= count).await.is_ok()
    }
}
