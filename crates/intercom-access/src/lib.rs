//! # Intercom Access
//!
//! Access control for the intercom: decides, from the tones entered during
//! a call, when the door opens.
//!
//! - [`CodeMatcher`]: the contiguous-entry matching automaton
//! - [`AccessController`]: the call event handler that feeds the matcher,
//!   queues unlock commands for the door actuator and relays call
//!   notifications to the bus
//!
//! ## Example
//!
//! ```
//! use intercom_access::{AccessController, CodeMatcher};
//! use intercom_core::AccessCode;
//! use intercom_hardware::unlock_queue;
//! use intercom_sip::{CallEvent, EventHandler};
//!
//! let (unlock_tx, _unlock_rx) = unlock_queue();
//! let matcher = CodeMatcher::new(AccessCode::new("1234").unwrap());
//! let mut controller = AccessController::new(matcher, unlock_tx);
//!
//! controller.on_event(&CallEvent::CallStart);
//! for symbol in ['1', '2', '3', '4'] {
//!     controller.on_event(&CallEvent::ButtonPress { symbol, duration_ms: 120 });
//! }
//! assert_eq!(controller.stats().codes_accepted, 1);
//! ```

pub mod handler;
pub mod matcher;

pub use handler::{AccessController, AccessStats, CallEndHandler};
pub use matcher::{ButtonPolicy, CodeMatcher, MatchOutcome};
