//! intercom: door intercom access-control daemon.
//!
//! Answers calls, listens for the access code entered as keypad tones and
//! pulses the door opener when it matches. Call notifications are relayed
//! to the home-automation bus.
//!
//! Off-device the SIP session is driven from the console (see
//! [`console`]) and the bus only logs what it would publish. The door
//! opener is a sysfs GPIO line when `door.gpio_value_path` is configured,
//! otherwise a logging mock.

mod console;
mod sim;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use intercom_access::AccessController;
use intercom_core::{AccessCode, IntercomConfig, VERSION};
use intercom_hardware::gpio::GpioLatch;
use intercom_hardware::mock::MockLatch;
use intercom_hardware::{Actuator, ActuatorConfig, AnyDoorLatch, unlock_queue};
use intercom_network::{ConnectivityGate, LinkAddresses, LinkEvent, LinkMonitor, SharedLink};
use intercom_relay::{BusOptions, CommandRelay, RelayTopics, relay_queue};
use intercom_sip::{DriverConfig, SessionDriver, SignallingClient};

use console::ConsoleSession;
use sim::{AlwaysUpLink, LoggingBus};

#[derive(Parser)]
#[command(name = "intercom")]
#[command(version, about = "Door intercom access-control daemon")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "intercom.toml")]
    config: PathBuf,

    /// Access code (overrides config file)
    #[arg(long, env = "INTERCOM_ACCESS_CODE", hide_env_values = true)]
    access_code: Option<String>,

    /// Door unlock duration in milliseconds (overrides config file)
    #[arg(long)]
    unlock_duration_ms: Option<u64>,

    /// Sysfs GPIO value file of the door opener (overrides config file)
    #[arg(long)]
    gpio: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intercom=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!("Starting intercom {}", VERSION);
    if config.uses_default_access_code() {
        warn!("Using the built-in default access code; set access.code or INTERCOM_ACCESS_CODE");
    }

    // Door actuator
    let latch = open_latch(&config).await?;
    let (unlock_tx, unlock_rx) = unlock_queue();
    let actuator = Actuator::new(
        latch,
        ActuatorConfig {
            unlock_duration: config.door.unlock_duration(),
        },
        unlock_rx,
    )
    .start();

    // Command relay
    let bus_options = BusOptions::from_config(&config.mqtt);
    let (relay_tx, relay_rx) = relay_queue();
    let relay = CommandRelay::new(
        LoggingBus::connect(&bus_options),
        RelayTopics::from(&config.mqtt),
        VERSION,
        relay_rx,
    )
    .spawn();

    // Link layer
    let gate = ConnectivityGate::new();
    let link: SharedLink = Arc::new(AlwaysUpLink);
    let (link_tx, link_rx) = mpsc::channel(8);
    let monitor = LinkMonitor::new(gate.clone(), Arc::clone(&link)).spawn(link_rx);
    link_tx.send(LinkEvent::Started).await?;
    link_tx
        .send(LinkEvent::GotAddress(simulated_addresses(&config)))
        .await?;

    // Signalling session
    let lines = console::stdin_lines().context("failed to start console input")?;
    let mut session = ConsoleSession::new(lines, config.sip.user.clone(), config.sip.port);
    if let Ok(server) = config.sip.server.parse::<IpAddr>() {
        session.set_server_address(server);
    }
    let controller = AccessController::from_config(&config.access, unlock_tx)
        .with_relay(relay_tx)
        .with_call_end_handler(|| debug!("Bell input re-armed"));
    let driver = SessionDriver::new(
        session,
        gate,
        link,
        Box::new(controller),
        DriverConfig::from(&config.sip),
    )
    .spawn();

    info!("Intercom running; commands: call, end, cancel [code], press <symbols> [ms]");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutting down");

    // Dropping the driver drops the handler and with it both queue senders,
    // so the relay finishes on its own.
    driver.abort();
    let _ = driver.await;
    drop(link_tx);
    let _ = monitor.await;
    if let Ok(stats) = relay.await {
        info!("Command relay stopped: {:?}", stats);
    }
    actuator.shutdown().await?;

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<IntercomConfig> {
    let mut config = if cli.config.exists() {
        IntercomConfig::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else {
        info!(
            "Config file {} not found, using defaults",
            cli.config.display()
        );
        IntercomConfig::default()
    };

    if let Some(code) = &cli.access_code {
        config.access.code = AccessCode::new(code).context("invalid access code override")?;
    }
    if let Some(ms) = cli.unlock_duration_ms {
        config.door.unlock_duration_ms = ms;
    }
    if let Some(path) = &cli.gpio {
        config.door.gpio_value_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

async fn open_latch(config: &IntercomConfig) -> anyhow::Result<AnyDoorLatch> {
    match &config.door.gpio_value_path {
        Some(path) => {
            let latch = GpioLatch::open(path, config.door.active_low)
                .await
                .with_context(|| format!("failed to open door GPIO {}", path.display()))?;
            info!("Door opener on GPIO {}", path.display());
            Ok(AnyDoorLatch::Gpio(latch))
        }
        None => {
            let (latch, _handle) = MockLatch::with_name("Simulated door".to_string());
            info!("No door GPIO configured, using simulated door opener");
            Ok(AnyDoorLatch::Mock(latch))
        }
    }
}

fn simulated_addresses(config: &IntercomConfig) -> LinkAddresses {
    let local = config
        .sip
        .local_address
        .as_deref()
        .and_then(|a| a.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let gateway = config
        .sip
        .server
        .parse()
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    LinkAddresses { local, gateway }
}
