pub mod config;
pub mod controller;
pub mod shutdown;

use crate::config::AppConfig;
use crate::shutdown::{PollOutcome, Shutdown};
use crate::controller::{
    I2cTransport, PollError, PollSettings, Poller, SeesawDriver, SystemClock, TracingObserver,
};
use color_eyre::{eyre::eyre, eyre::WrapErr, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let config_path = AppConfig::config_path()?;
    let config = AppConfig::ensure_default_config(&config_path)
        .await
        .wrap_err("Failed to load configuration")?;

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level)
    }
    setup_logging_env();
    info!("Using configuration from {}", config_path.display());

    let transport = I2cTransport::open(config.bus, config.address, config.bus_timeout_ms)
        .wrap_err_with(|| format!("Failed to open gamepad on I2C bus {}", config.bus))?;
    info!(
        "Opened I2C bus {} with device 0x{:02x}",
        transport.bus(),
        transport.address()
    );

    let clock = Arc::new(SystemClock::new());
    let driver =
        SeesawDriver::with_reset_settle(Box::new(transport), clock.clone(), config.reset_settle());
    let settings: PollSettings = config.poll_settings();
    let poller = Poller::create(driver, settings, clock, Box::new(TracingObserver::default()));

    let mut signals = shutdown::listen_for_signals().wrap_err("Failed to install signal handlers")?;
    let token = CancellationToken::new();
    let poll_task = tokio::task::spawn_blocking({
        let token = token.clone();
        move || -> Result<u64, PollError> { poller.initialize()?.run(&token) }
    });

    match shutdown::supervise(poll_task, &token, &mut signals, config.shutdown_grace()).await {
        Shutdown::Finished(result) => finish(result),
        Shutdown::Abandoned { signal } => {
            // The runtime would wait on the stuck blocking thread if dropped
            error!("Exiting on {} without releasing the bus", signal);
            std::process::exit(1)
        }
    }
}

fn finish(result: PollOutcome) -> Result<()> {
    match result {
        Ok(Ok(ticks)) => {
            info!("Poll loop finished after {} ticks, bus released", ticks);
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Poll loop terminated with error: {}", e);
            Err(e).wrap_err("Gamepad polling failed")
        }
        Err(e) => Err(eyre!("Poll task panicked: {}", e)),
    }
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
