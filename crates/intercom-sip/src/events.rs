//! Call lifecycle and keypad tone events.
//!
//! The signalling client reports everything that happens during a call as a
//! [`CallEvent`] delivered to a registered [`EventHandler`]. Events from one
//! session are delivered in the order the client produces them, on the task
//! that pumps the session.

use std::fmt;

/// Why a call was cancelled before it was answered or completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CancelReason {
    /// The peer gave no reason.
    Unknown,

    /// The callee declined the call.
    CallDeclined,

    /// The callee was busy.
    TargetBusy,
}

impl CancelReason {
    /// Numeric reason code, as reported in logs.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            CancelReason::Unknown => 0,
            CancelReason::CallDeclined => 1,
            CancelReason::TargetBusy => 2,
        }
    }

    /// Map a numeric reason code; unrecognized codes become `Unknown`.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => CancelReason::CallDeclined,
            2 => CancelReason::TargetBusy,
            _ => CancelReason::Unknown,
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Unknown => write!(f, "unknown"),
            CancelReason::CallDeclined => write!(f, "call declined"),
            CancelReason::TargetBusy => write!(f, "target busy"),
        }
    }
}

/// Event emitted by the signalling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// A call was established.
    CallStart,

    /// The call ended normally.
    CallEnd,

    /// The call was cancelled.
    CallCancelled { reason: CancelReason },

    /// A keypad tone was decoded during the call.
    ButtonPress {
        /// Decoded symbol (`0`-`9`, `*`, `#`, `A`-`D`)
        symbol: char,

        /// How long the tone lasted
        duration_ms: u32,
    },
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallEvent::CallStart => write!(f, "call start"),
            CallEvent::CallEnd => write!(f, "call end"),
            CallEvent::CallCancelled { reason } => {
                write!(f, "call cancelled ({}, code {})", reason, reason.code())
            }
            CallEvent::ButtonPress {
                symbol,
                duration_ms,
            } => write!(f, "button press '{}' for {}ms", symbol, duration_ms),
        }
    }
}

/// Receiver of call events, registered once with the signalling client.
///
/// Runs synchronously on the task pumping the session, so implementations
/// must not block.
pub trait EventHandler: Send {
    fn on_event(&mut self, event: &CallEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&CallEvent) + Send,
{
    fn on_event(&mut self, event: &CallEvent) {
        self(event)
    }
}
