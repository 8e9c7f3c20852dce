//! Sump pump monitor daemon.
//!
//! Reads the pump's signal line, debounces it, and reports each on/off
//! change to the console plus any configured ThingSpeak channel and
//! Healthchecks check. Runs until SIGINT or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use sumpwatch::config::{Args, MonitorConfig};
use sumpwatch::monitor::{self, MonitorSession};
use sumpwatch::tracing::prelude::*;
use sumpwatch::{gpio, sink};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    sumpwatch::tracing::init_journald_or_stdout();

    let config = MonitorConfig::try_from(args).context("invalid configuration")?;
    info!(?config, "Starting sump pump monitor");

    // Sinks first: a bad sink setup shouldn't leave an exported pin behind.
    let sinks = sink::build(&config.sinks).context("failed to set up sinks")?;

    info!(pin = config.source.pin, "Connecting to pin");
    let source = gpio::open_blocking(config.source.clone())
        .await
        .context("failed to open signal source")?;

    let mut session = MonitorSession::new(source);
    for sink in sinks {
        session.add_listener(sink);
    }

    let running = CancellationToken::new();
    tokio::spawn({
        let running = running.clone();
        async move {
            monitor::wait_for_shutdown().await;
            running.cancel();
        }
    });

    monitor::run(&mut session, config.poll_interval, running).await;

    session.release().context("failed to release signal source")?;
    info!("Exiting.");
    Ok(())
}
