//! Console-driven signalling session.
//!
//! Stands in for the SIP stack when running on a workstation: each line of
//! input becomes one or more call events.
//!
//! ```text
//! call                  call start
//! end                   call end
//! cancel [code]         call cancelled (0 unknown, 1 declined, 2 busy)
//! press <symbols> [ms]  one tone per symbol, 100ms unless given
//! ```

use intercom_sip::{CallEvent, CancelReason, EventHandler, SignallingClient, SignallingError};
use std::io::BufRead;
use std::net::IpAddr;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const DEFAULT_PRESS_MS: u32 = 100;

/// A console line that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid {what} '{value}'")]
    InvalidArgument { what: &'static str, value: String },
}

/// Parse one console line into call events. Blank lines yield nothing.
pub fn parse_command(line: &str) -> Result<Vec<CallEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };

    match command {
        "call" => Ok(vec![CallEvent::CallStart]),
        "end" => Ok(vec![CallEvent::CallEnd]),
        "cancel" => {
            let code = match words.next() {
                Some(value) => value.parse::<u8>().map_err(|_| CommandError::InvalidArgument {
                    what: "cancel code",
                    value: value.to_string(),
                })?,
                None => 0,
            };
            Ok(vec![CallEvent::CallCancelled {
                reason: CancelReason::from_code(code),
            }])
        }
        "press" => {
            let symbols = words.next().ok_or(CommandError::MissingArgument {
                command: "press",
                expected: "one or more symbols",
            })?;
            let duration_ms = match words.next() {
                Some(value) => value.parse::<u32>().map_err(|_| CommandError::InvalidArgument {
                    what: "duration",
                    value: value.to_string(),
                })?,
                None => DEFAULT_PRESS_MS,
            };
            Ok(symbols
                .chars()
                .map(|symbol| CallEvent::ButtonPress {
                    symbol,
                    duration_ms,
                })
                .collect())
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Read standard input lines on a dedicated thread.
///
/// Not a runtime task: a pending read must not hold up runtime shutdown.
pub fn stdin_lines() -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Signalling session fed from console lines.
pub struct ConsoleSession {
    lines: mpsc::Receiver<String>,
    user: String,
    port: u16,
    server: Option<IpAddr>,
    local: Option<IpAddr>,
    initialized: bool,
    handler: Option<Box<dyn EventHandler>>,
}

impl ConsoleSession {
    pub fn new(lines: mpsc::Receiver<String>, user: impl Into<String>, port: u16) -> Self {
        Self {
            lines,
            user: user.into(),
            port,
            server: None,
            local: None,
            initialized: false,
            handler: None,
        }
    }

    fn dispatch(&mut self, events: &[CallEvent]) {
        let Some(handler) = self.handler.as_mut() else {
            debug!("No handler installed, dropping {} events", events.len());
            return;
        };
        for event in events {
            debug!("Console event: {}", event);
            handler.on_event(event);
        }
    }
}

impl SignallingClient for ConsoleSession {
    fn set_server_address(&mut self, address: IpAddr) {
        self.server = Some(address);
    }

    fn set_local_address(&mut self, address: IpAddr) {
        self.local = Some(address);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    async fn init(&mut self) -> intercom_sip::Result<()> {
        let Some(server) = self.server else {
            return Err(SignallingError::init_failed("no server address"));
        };

        let local = self
            .local
            .map_or_else(|| "unknown".to_string(), |a| a.to_string());
        info!(
            "Console session registered as {}@{}:{} (local {})",
            self.user, server, self.port, local
        );
        self.initialized = true;
        Ok(())
    }

    fn set_event_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.handler = Some(handler);
    }

    async fn run(&mut self) -> intercom_sip::Result<()> {
        let Some(line) = self.lines.recv().await else {
            info!("Console input closed; waiting for shutdown signal");
            std::future::pending::<()>().await;
            return Ok(());
        };

        match parse_command(&line) {
            Ok(events) => self.dispatch(&events),
            Err(e) => warn!("{}", e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::net::Ipv4Addr;
    use std::sync::{Arc, Mutex};

    fn press(symbol: char, duration_ms: u32) -> CallEvent {
        CallEvent::ButtonPress {
            symbol,
            duration_ms,
        }
    }

    #[rstest]
    #[case("call", vec![CallEvent::CallStart])]
    #[case("  end  ", vec![CallEvent::CallEnd])]
    #[case("cancel", vec![CallEvent::CallCancelled { reason: CancelReason::Unknown }])]
    #[case("cancel 2", vec![CallEvent::CallCancelled { reason: CancelReason::TargetBusy }])]
    #[case("press 5", vec![press('5', 100)])]
    #[case("press 12 250", vec![press('1', 250), press('2', 250)])]
    #[case("", vec![])]
    fn test_parse_command(#[case] line: &str, #[case] expected: Vec<CallEvent>) {
        assert_eq!(parse_command(line).unwrap(), expected);
    }

    #[rstest]
    #[case("open")]
    #[case("press")]
    #[case("press 1 long")]
    #[case("cancel busy")]
    fn test_parse_command_errors(#[case] line: &str) {
        assert!(parse_command(line).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            parse_command("ring").unwrap_err().to_string(),
            "unknown command 'ring'"
        );
        assert_eq!(
            parse_command("press").unwrap_err().to_string(),
            "'press' expects one or more symbols"
        );
    }

    fn session(input: &[&str]) -> ConsoleSession {
        let (tx, rx) = mpsc::channel(input.len().max(1));
        for line in input {
            tx.try_send(line.to_string()).unwrap();
        }
        ConsoleSession::new(rx, "door", 5060)
    }

    #[tokio::test]
    async fn test_init_requires_server() {
        let mut session = session(&[]);
        assert!(session.init().await.is_err());

        session.set_server_address(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)));
        session.init().await.unwrap();
        assert!(session.is_initialized());
    }

    #[tokio::test]
    async fn test_run_dispatches_one_line() {
        let mut session = session(&["call", "bogus", "press 42"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set_event_handler(Box::new(move |event: &CallEvent| {
            sink.lock().unwrap().push(event.clone());
        }));

        session.run().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![CallEvent::CallStart]);

        session.run().await.unwrap();
        session.run().await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![CallEvent::CallStart, press('4', 100), press('2', 100)]
        );
    }
}
