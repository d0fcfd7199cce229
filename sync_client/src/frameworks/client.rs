// Framework bootstrap for the sync client runtime.

use crate::domain::Gesture;
use crate::domain::tuning::fire::FireTuning;
use crate::frameworks::config;
use crate::frameworks::headless::HeadlessAdapter;
use crate::interface_adapters::net::{
    ConnectionSettings, SessionReport, SessionSettings, connect, run_session,
};
use crate::use_cases::PublisherSettings;

use std::io::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Connects, waits for the identity handshake and syncs until Ctrl-C or server close.
pub async fn run(
    connection: ConnectionSettings,
    session: SessionSettings,
    handshake_timeout: Duration,
    auto_fire: Option<Duration>,
) -> Result<SessionReport> {
    // Connection failures surface to the caller; retry is not our policy.
    let mut handle = connect(&connection)
        .await
        .inspect_err(|e| {
            tracing::error!(endpoint = %connection.endpoint, error = %e, "failed to connect");
        })
        .map_err(std::io::Error::other)?;
    let span = handle.span().clone();

    if let Err(e) = handle
        .wait_for_identity(handshake_timeout)
        .instrument(span.clone())
        .await
    {
        span.in_scope(|| tracing::error!(error = %e, "identity handshake failed"));
        handle.disconnect();
        return Err(std::io::Error::other(e));
    }

    let (gesture_tx, gesture_rx) = mpsc::channel(config::GESTURE_CHANNEL_CAPACITY);
    if let Some(every) = auto_fire {
        tokio::spawn(auto_fire_gestures(gesture_tx, every));
    } else {
        // No gesture source: the session loop sees a closed channel and only syncs poses.
        drop(gesture_tx);
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let mut adapter = HeadlessAdapter::new();
    let report = run_session(&mut handle, &mut adapter, gesture_rx, shutdown, session)
        .instrument(span.clone())
        .await;

    span.in_scope(|| {
        tracing::info!(
            ticks = report.ticks,
            moves_published = report.moves_published,
            closed_by_peer = report.closed_by_peer,
            "session ended"
        )
    });
    Ok(report)
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let connection = ConnectionSettings {
        endpoint: config::server_url(),
        outbound_capacity: config::OUTBOUND_QUEUE_CAPACITY,
        inbound_capacity: config::INBOUND_QUEUE_CAPACITY,
    };
    let session = SessionSettings {
        tick_interval: config::tick_interval(),
        publisher: PublisherSettings {
            every_n_ticks: config::publish_every_n_ticks(),
        },
        fire: FireTuning::default(),
    };
    tracing::debug!(
        endpoint = %connection.endpoint,
        tick_interval_ms = session.tick_interval.as_millis(),
        every_n_ticks = session.publisher.every_n_ticks,
        "client configured"
    );

    run(
        connection,
        session,
        config::handshake_timeout(),
        config::auto_fire_interval(),
    )
    .await
    .map(|_| ())
}

// Stand-in for a click handler: one gesture per interval.
async fn auto_fire_gestures(gesture_tx: mpsc::Sender<Gesture>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately; wait a full period before firing.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if gesture_tx.send(Gesture::Fire).await.is_err() {
            break;
        }
    }
}
