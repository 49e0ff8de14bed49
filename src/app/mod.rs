//! Binary front-end: loads a configuration document, builds the router,
//! and feeds it NDJSON events from stdin until EOF or a shutdown signal.

mod cli;

pub use cli::Cli;

use crate::config::RouterConfig;
use crate::domain::LogEvent;
use crate::router::Router;
use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_filter)?;

    let raw = tokio::fs::read_to_string(&cli.config)
        .await
        .with_context(|| format!("reading {}", cli.config.display()))?;
    let config = RouterConfig::from_json_str(&raw)?;
    let mut router = Router::build(config).await?;

    if let Some(mut failures) = router.take_failure_channel() {
        tokio::spawn(async move {
            while let Some(failure) = failures.recv().await {
                error!(sink = %failure.sink_id, error = %failure.error, "sink failure");
            }
        });
    }

    info!(config = %cli.config.display(), "router ready, reading events from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<LogEvent>(&line) {
                        Ok(event) => router.dispatch(event),
                        Err(parse_error) => warn!(error = %parse_error, "skipping malformed event line"),
                    }
                }
                None => break,
            },
            () = shutdown_signal() => break,
        }
    }

    let summary = router.shutdown().await;
    info!(
        flushed = summary.flushed,
        dropped = summary.dropped,
        "router drained"
    );
    Ok(())
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(filter)?;

    // Diagnostics go to stderr; stdout belongs to the console sink.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal;
    use tokio::signal::unix::{SignalKind, signal as unix_signal};

    let Ok(mut sigterm) = unix_signal(SignalKind::terminate()) else {
        let _ = signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        result = signal::ctrl_c() => {
            if result.is_ok() {
                info!("received SIGINT, draining");
            }
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, draining");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, draining");
    }
}
