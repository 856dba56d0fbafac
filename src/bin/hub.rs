use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use status_watch::{
    actors::{poller::PollerHandle, tracker::TrackerHandle},
    alerts::AlertDispatcher,
    config::load_config,
    monitor::Monitor,
    probe::HttpProbe,
    registry::Registry,
};
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(about = "Polls service endpoints and alerts on sustained failures")]
struct Args {
    /// Config file (a template is created if it does not exist)
    #[arg(short, long, default_value = "connections.toml")]
    file: PathBuf,

    /// Bind address of the query API (overrides STATUS_WATCH_API_ADDR)
    #[arg(long)]
    api_bind: Option<SocketAddr>,

    /// Do not start the query API
    #[arg(long)]
    no_api: bool,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![("status_watch", LevelFilter::DEBUG)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match load_config(&args.file) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };
    let registry = Arc::new(Registry::from_config(config)?);
    let settings = registry.settings().clone();

    // one pooled client for every probe, dropped on shutdown
    let probe = Arc::new(
        HttpProbe::new(settings.timeout, settings.retry_count)
            .context("failed to build HTTP client")?,
    );
    info!(
        "connection pool ready (timeout={}s, retries={})",
        settings.timeout.as_secs(),
        settings.retry_count
    );

    info!("loaded {} endpoint(s):", registry.endpoints().len());
    for endpoint in registry.endpoints() {
        info!("  - {}: {}", endpoint.name, endpoint.address);
    }

    if settings.alert.is_none() {
        warn!("no alert sink configured, incidents will only be logged");
    }

    let tracker = TrackerHandle::spawn(settings.error_threshold);
    let monitor = Monitor::new(
        registry.clone(),
        probe,
        tracker.clone(),
        AlertDispatcher::new(settings.alert.clone()).with_send_timeout(settings.timeout),
    );

    let poller = PollerHandle::spawn(monitor.clone(), settings.interval);
    info!(
        "polling every {}s, alerting after {} consecutive errors",
        settings.interval.as_secs(),
        settings.error_threshold
    );

    if !args.no_api {
        spawn_api(&args, monitor).await?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    poller.shutdown().await?;
    tracker.shutdown().await;
    debug!("sent shutdown to poller and tracker");

    Ok(())
}

#[cfg(feature = "api")]
async fn spawn_api(args: &Args, monitor: Monitor) -> anyhow::Result<()> {
    use status_watch::api::{ApiConfig, ApiState, spawn_api_server};

    let mut config = ApiConfig::default();
    if let Some(bind) = args.api_bind {
        config.bind_addr = bind;
    }
    if config.auth_token.is_none() {
        info!("no API token set, query API is unauthenticated");
    }

    spawn_api_server(config, ApiState::new(monitor)).await?;
    Ok(())
}

#[cfg(not(feature = "api"))]
async fn spawn_api(_args: &Args, _monitor: Monitor) -> anyhow::Result<()> {
    debug!("built without the api feature, skipping query API");
    Ok(())
}
