//! Call event handler.
//!
//! [`AccessController`] is the handler registered with the signalling
//! session. It runs on the session driver's task, so it never waits: unlock
//! commands and bus notifications go out through single-slot queues and are
//! dropped when one is already pending.

use crate::matcher::{ButtonPolicy, CodeMatcher, MatchOutcome};
use intercom_core::AccessConfig;
use intercom_hardware::{UnlockOutcome, UnlockSender};
use intercom_relay::{RelayMessage, RelayOutcome, RelaySender};
use intercom_sip::{CallEvent, EventHandler};
use tracing::{debug, info, warn};

/// Notified whenever a call ends or is cancelled.
///
/// Used to re-arm the bell button so a new ring can start a new call.
pub trait CallEndHandler: Send {
    fn call_ended(&mut self);
}

impl<F> CallEndHandler for F
where
    F: FnMut() + Send,
{
    fn call_ended(&mut self) {
        self()
    }
}

/// Handler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStats {
    /// Calls started
    pub calls: u64,

    /// Completed code entries
    pub codes_accepted: u64,

    /// Unlock commands that found the queue full
    pub unlocks_dropped: u64,
}

/// Wires call events to the matcher, the door actuator and the bus relay.
pub struct AccessController {
    matcher: CodeMatcher,
    unlock: UnlockSender,
    relay: Option<RelaySender>,
    call_end: Option<Box<dyn CallEndHandler>>,
    stats: AccessStats,
}

impl AccessController {
    pub fn new(matcher: CodeMatcher, unlock: UnlockSender) -> Self {
        Self {
            matcher,
            unlock,
            relay: None,
            call_end: None,
            stats: AccessStats::default(),
        }
    }

    /// Build a controller from the `[access]` configuration section.
    pub fn from_config(config: &AccessConfig, unlock: UnlockSender) -> Self {
        let policy = ButtonPolicy::from_min_press(config.min_press_ms);
        Self::new(CodeMatcher::with_policy(config.code.clone(), policy), unlock)
    }

    /// Relay call start/end notifications to the bus.
    pub fn with_relay(mut self, relay: RelaySender) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn with_call_end_handler(mut self, handler: impl CallEndHandler + 'static) -> Self {
        self.call_end = Some(Box::new(handler));
        self
    }

    /// Number of code symbols entered correctly in the current call.
    pub fn position(&self) -> usize {
        self.matcher.position()
    }

    pub fn stats(&self) -> AccessStats {
        self.stats
    }

    fn call_finished(&mut self) {
        self.matcher.reset();
        if let Some(handler) = self.call_end.as_mut() {
            handler.call_ended();
        }
        self.notify(RelayMessage::Dong);
    }

    fn notify(&self, message: RelayMessage) {
        let Some(relay) = &self.relay else {
            return;
        };
        if relay.send(message) == RelayOutcome::Closed {
            warn!("Command relay stopped, '{}' not sent", message);
        }
    }

    fn request_unlock(&mut self) {
        match self.unlock.request() {
            UnlockOutcome::Queued => debug!("Unlock command queued"),
            UnlockOutcome::Dropped => {
                self.stats.unlocks_dropped += 1;
                debug!("Unlock already pending, command dropped");
            }
            UnlockOutcome::Closed => warn!("Door actuator stopped, unlock command lost"),
        }
    }
}

impl EventHandler for AccessController {
    fn on_event(&mut self, event: &CallEvent) {
        match event {
            CallEvent::CallStart => {
                info!("Call started");
                self.stats.calls += 1;
                self.matcher.reset();
                self.notify(RelayMessage::Ding);
            }
            CallEvent::CallEnd => {
                info!("Call ended");
                self.call_finished();
            }
            CallEvent::CallCancelled { reason } => {
                info!("Call cancelled: {} (code {})", reason, reason.code());
                self.call_finished();
            }
            CallEvent::ButtonPress {
                symbol,
                duration_ms,
            } => match self.matcher.press(*symbol, *duration_ms) {
                MatchOutcome::Advanced { position } => {
                    debug!(
                        "Tone accepted ({}ms), {} of {}",
                        duration_ms,
                        position,
                        self.matcher.code_len()
                    );
                }
                MatchOutcome::Reset => debug!("Tone rejected ({}ms), entry reset", duration_ms),
                MatchOutcome::Unlock => {
                    info!("Access code accepted, opening door");
                    self.stats.codes_accepted += 1;
                    self.request_unlock();
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intercom_core::AccessCode;
    use intercom_hardware::{UnlockReceiver, unlock_queue};
    use intercom_relay::{RelayReceiver, relay_queue};
    use intercom_sip::CancelReason;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn press(symbol: char) -> CallEvent {
        CallEvent::ButtonPress {
            symbol,
            duration_ms: 100,
        }
    }

    fn controller() -> (AccessController, UnlockReceiver, RelayReceiver) {
        let (unlock_tx, unlock_rx) = unlock_queue();
        let (relay_tx, relay_rx) = relay_queue();
        let matcher = CodeMatcher::new(AccessCode::new("1234").unwrap());
        let controller = AccessController::new(matcher, unlock_tx).with_relay(relay_tx);
        (controller, unlock_rx, relay_rx)
    }

    #[tokio::test]
    async fn test_code_entry_queues_unlock() {
        let (mut c, mut unlock_rx, _relay_rx) = controller();

        for s in ['1', '2', '3', '4'] {
            c.on_event(&press(s));
        }

        assert_eq!(c.stats().codes_accepted, 1);
        assert!(unlock_rx.recv().await.is_some());
    }

    #[rstest::rstest]
    #[case(CallEvent::CallStart)]
    #[case(CallEvent::CallEnd)]
    #[case(CallEvent::CallCancelled { reason: CancelReason::TargetBusy })]
    fn test_call_lifecycle_resets_entry(#[case] event: CallEvent) {
        let (mut c, _unlock_rx, _relay_rx) = controller();
        c.on_event(&press('1'));
        c.on_event(&press('2'));
        assert_eq!(c.position(), 2);

        c.on_event(&event);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_second_unlock_dropped_while_pending() {
        let (mut c, _unlock_rx, _relay_rx) = controller();

        for s in "12341234".chars() {
            c.on_event(&press(s));
        }

        let stats = c.stats();
        assert_eq!(stats.codes_accepted, 2);
        assert_eq!(stats.unlocks_dropped, 1);
    }

    #[tokio::test]
    async fn test_call_start_and_end_relayed() {
        let (mut c, _unlock_rx, mut relay_rx) = controller();

        c.on_event(&CallEvent::CallStart);
        assert_eq!(relay_rx.recv().await, Some(RelayMessage::Ding));

        c.on_event(&CallEvent::CallCancelled {
            reason: CancelReason::CallDeclined,
        });
        assert_eq!(relay_rx.recv().await, Some(RelayMessage::Dong));
    }

    #[test]
    fn test_call_end_handler_notified() {
        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        let (unlock_tx, _unlock_rx) = unlock_queue();
        let matcher = CodeMatcher::new(AccessCode::new("1").unwrap());
        let mut c = AccessController::new(matcher, unlock_tx).with_call_end_handler(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        c.on_event(&CallEvent::CallStart);
        c.on_event(&CallEvent::CallEnd);
        c.on_event(&CallEvent::CallCancelled {
            reason: CancelReason::Unknown,
        });

        assert_eq!(ended.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stopped_actuator_does_not_panic() {
        let (mut c, unlock_rx, relay_rx) = controller();
        drop(unlock_rx);
        drop(relay_rx);

        c.on_event(&CallEvent::CallStart);
        for s in "1234".chars() {
            c.on_event(&press(s));
        }
        assert_eq!(c.stats().codes_accepted, 1);
    }

    #[test]
    fn test_from_config_applies_press_policy() {
        let config = AccessConfig {
            code: AccessCode::new("12").unwrap(),
            min_press_ms: Some(50),
        };
        let (unlock_tx, _unlock_rx) = unlock_queue();
        let mut c = AccessController::from_config(&config, unlock_tx);

        c.on_event(&CallEvent::ButtonPress {
            symbol: '1',
            duration_ms: 20,
        });
        assert_eq!(c.position(), 0);
        c.on_event(&press('1'));
        assert_eq!(c.position(), 1);
    }
}
