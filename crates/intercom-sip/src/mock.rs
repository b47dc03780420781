//! Scriptable signalling client for tests and development.

use crate::client::SignallingClient;
use crate::error::{Result, SignallingError};
use crate::events::{CallEvent, EventHandler};
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Default)]
struct SessionState {
    initialized: bool,
    init_calls: usize,
    failing_inits: usize,
    handler_installs: usize,
    server: Option<IpAddr>,
    local: Option<IpAddr>,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock signalling client.
///
/// Each call to `run` waits for one batch of events pushed through the
/// [`MockSessionHandle`] and dispatches it to the installed handler. Once
/// the handle is dropped, `run` returns [`SignallingError::SessionEnded`].
pub struct MockSignallingClient {
    state: Arc<Mutex<SessionState>>,
    script: mpsc::UnboundedReceiver<Vec<CallEvent>>,
    handler: Option<Box<dyn EventHandler>>,
}

/// Test-side control of a [`MockSignallingClient`].
#[derive(Debug, Clone)]
pub struct MockSessionHandle {
    state: Arc<Mutex<SessionState>>,
    script: mpsc::UnboundedSender<Vec<CallEvent>>,
}

impl MockSignallingClient {
    pub fn new() -> (Self, MockSessionHandle) {
        let state = Arc::new(Mutex::new(SessionState::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                state: Arc::clone(&state),
                script: rx,
                handler: None,
            },
            MockSessionHandle { state, script: tx },
        )
    }
}

impl SignallingClient for MockSignallingClient {
    fn set_server_address(&mut self, address: IpAddr) {
        lock(&self.state).server = Some(address);
    }

    fn set_local_address(&mut self, address: IpAddr) {
        lock(&self.state).local = Some(address);
    }

    fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    async fn init(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.init_calls += 1;
        if state.failing_inits > 0 {
            state.failing_inits -= 1;
            return Err(SignallingError::init_failed("scripted failure"));
        }
        state.initialized = true;
        Ok(())
    }

    fn set_event_handler(&mut self, handler: Box<dyn EventHandler>) {
        lock(&self.state).handler_installs += 1;
        self.handler = Some(handler);
    }

    async fn run(&mut self) -> Result<()> {
        let Some(batch) = self.script.recv().await else {
            return Err(SignallingError::SessionEnded);
        };

        match self.handler.as_mut() {
            Some(handler) => {
                for event in &batch {
                    handler.on_event(event);
                }
            }
            None => debug!("No handler installed, dropping {} events", batch.len()),
        }
        Ok(())
    }
}

impl MockSessionHandle {
    /// Queue a batch of events for one `run` call.
    pub fn push(&self, events: Vec<CallEvent>) {
        // Receiver gone means the client was dropped; nothing left to drive.
        let _ = self.script.send(events);
    }

    /// Queue a single event for one `run` call.
    pub fn push_event(&self, event: CallEvent) {
        self.push(vec![event]);
    }

    /// Make the next `count` calls to `init` fail.
    pub fn fail_next_inits(&self, count: usize) {
        lock(&self.state).failing_inits = count;
    }

    /// Simulate the peer dropping the registration.
    pub fn deinitialize(&self) {
        lock(&self.state).initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    pub fn init_calls(&self) -> usize {
        lock(&self.state).init_calls
    }

    pub fn handler_installs(&self) -> usize {
        lock(&self.state).handler_installs
    }

    pub fn server_address(&self) -> Option<IpAddr> {
        lock(&self.state).server
    }

    pub fn local_address(&self) -> Option<IpAddr> {
        lock(&self.state).local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_scripted_init_failures() {
        let (mut client, handle) = MockSignallingClient::new();
        handle.fail_next_inits(1);

        assert!(client.init().await.is_err());
        assert!(!client.is_initialized());
        assert!(client.init().await.is_ok());
        assert!(handle.is_initialized());
        assert_eq!(handle.init_calls(), 2);
    }

    #[tokio::test]
    async fn test_run_dispatches_batch_in_order() {
        let (mut client, handle) = MockSignallingClient::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client.set_event_handler(Box::new(move |event: &CallEvent| {
            sink.lock().unwrap().push(event.clone());
        }));

        handle.push(vec![
            CallEvent::CallStart,
            CallEvent::ButtonPress {
                symbol: '1',
                duration_ms: 80,
            },
        ]);
        client.run().await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], CallEvent::CallStart);
        assert_eq!(handle.handler_installs(), 1);
    }

    #[tokio::test]
    async fn test_run_ends_when_handle_dropped() {
        let (mut client, handle) = MockSignallingClient::new();
        drop(handle);

        assert!(matches!(
            client.run().await,
            Err(SignallingError::SessionEnded)
        ));
    }
}
