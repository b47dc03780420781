//! End-to-end call flows: scripted signalling session, session driver,
//! access controller, door actuator and command relay wired together.

use intercom_access::{AccessController, CodeMatcher};
use intercom_core::{AccessCode, MqttConfig};
use intercom_hardware::mock::{MockLatch, MockLatchHandle};
use intercom_hardware::{Actuator, ActuatorConfig, LatchState, unlock_queue};
use intercom_network::{ConnectivityGate, MockLink};
use intercom_relay::mock::{MockBus, MockBusHandle};
use intercom_relay::{BusOptions, CommandRelay, RelayTopics, relay_queue};
use intercom_sip::mock::{MockSessionHandle, MockSignallingClient};
use intercom_sip::{CallEvent, CancelReason, DriverConfig, SessionDriver};
use std::sync::Arc;
use std::time::Duration;

const UNLOCK_MS: u64 = 3000;

struct Intercom {
    session: MockSessionHandle,
    latch: MockLatchHandle,
    bus: MockBusHandle,
    topics: RelayTopics,
    gate: ConnectivityGate,
}

fn start(code: &str) -> Intercom {
    let (client, session) = MockSignallingClient::new();
    let (latch, latch_handle) = MockLatch::new();
    let mqtt = MqttConfig::default();
    let (bus, bus_handle) = MockBus::new(BusOptions::from_config(&mqtt));
    let topics = RelayTopics::from(&mqtt);
    let gate = ConnectivityGate::new();

    let (unlock_tx, unlock_rx) = unlock_queue();
    let (relay_tx, relay_rx) = relay_queue();

    Actuator::new(
        latch,
        ActuatorConfig {
            unlock_duration: Duration::from_millis(UNLOCK_MS),
        },
        unlock_rx,
    )
    .start();
    CommandRelay::new(bus, topics.clone(), "1.9", relay_rx).spawn();

    let matcher = CodeMatcher::new(AccessCode::new(code).unwrap());
    let controller = AccessController::new(matcher, unlock_tx).with_relay(relay_tx);
    SessionDriver::new(
        client,
        gate.clone(),
        Arc::new(MockLink::new()),
        Box::new(controller),
        DriverConfig::default(),
    )
    .spawn();

    gate.signal_connected();

    Intercom {
        session,
        latch: latch_handle,
        bus: bus_handle,
        topics,
        gate,
    }
}

fn tones(symbols: &str) -> Vec<CallEvent> {
    symbols
        .chars()
        .map(|symbol| CallEvent::ButtonPress {
            symbol,
            duration_ms: 150,
        })
        .collect()
}

fn call(symbols: &str) -> Vec<CallEvent> {
    let mut events = vec![CallEvent::CallStart];
    events.extend(tones(symbols));
    events.push(CallEvent::CallEnd);
    events
}

/// Let every task run and all timers (including a full unlock pulse) expire.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(UNLOCK_MS * 3)).await;
}

#[tokio::test(start_paused = true)]
async fn test_correct_code_opens_door_once() {
    let mut intercom = start("1234");

    intercom.session.push(call("1234"));
    intercom.latch.wait_for_transitions(2).await.unwrap();
    settle().await;

    let transitions = intercom.latch.transitions();
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].state, LatchState::Unlocked);
    assert_eq!(transitions[1].state, LatchState::Locked);
    assert!(transitions[1].at - transitions[0].at >= Duration::from_millis(UNLOCK_MS));
}

#[tokio::test(start_paused = true)]
async fn test_interrupted_entry_does_not_open() {
    let intercom = start("1234");

    intercom.session.push(call("13234"));
    settle().await;

    assert_eq!(intercom.latch.unlock_count(), 0);
    assert_eq!(intercom.latch.current_state(), LatchState::Locked);
}

#[tokio::test(start_paused = true)]
async fn test_entry_does_not_survive_call_end() {
    let intercom = start("1234");

    intercom.session.push(call("12"));
    intercom.session.push(call("34"));
    settle().await;

    assert_eq!(intercom.latch.unlock_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_entry_does_not_survive_cancel() {
    let intercom = start("1234");

    let mut events = vec![CallEvent::CallStart];
    events.extend(tones("12"));
    events.push(CallEvent::CallCancelled {
        reason: CancelReason::TargetBusy,
    });
    events.push(CallEvent::CallStart);
    events.extend(tones("34"));
    intercom.session.push(events);
    settle().await;

    assert_eq!(intercom.latch.unlock_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_mistake_opens() {
    let mut intercom = start("1234");

    intercom.session.push(call("1291234"));
    intercom.latch.wait_for_transitions(2).await.unwrap();
    settle().await;

    assert_eq!(intercom.latch.unlock_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ring_relayed_to_bus() {
    let mut intercom = start("1234");

    intercom.bus.connect();
    assert!(intercom.bus.wait_for_published(2).await);

    intercom.session.push(vec![CallEvent::CallStart]);
    assert!(intercom.bus.wait_for_published(3).await);
    intercom.session.push(vec![CallEvent::CallEnd]);
    assert!(intercom.bus.wait_for_published(4).await);

    assert_eq!(
        intercom.bus.payloads_on(&intercom.topics.outbound),
        vec!["ding", "dong"]
    );
    assert_eq!(
        intercom.bus.payloads_on(&intercom.topics.status),
        vec!["online"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_code_entered_after_network_returns() {
    let mut intercom = start("1234");

    intercom.gate.signal_disconnected();
    intercom.session.push(call("1234"));
    settle().await;
    assert_eq!(intercom.latch.unlock_count(), 0);

    intercom.gate.signal_connected();
    intercom.latch.wait_for_transitions(2).await.unwrap();
    assert_eq!(intercom.latch.unlock_count(), 1);
}
