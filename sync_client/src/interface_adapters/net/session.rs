// Session loop: one task multiplexing the tick clock, inbound events and gestures.

use crate::domain::tuning::fire::FireTuning;
use crate::domain::{Gesture, InboundEvent, ParticipantId, RenderAdapter};
use crate::interface_adapters::net::connection::ConnectionHandle;
use crate::use_cases::{
    ActionEventEmitter, LocalPosePublisher, PublisherSettings, RemoteStateCache,
};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Render tick period driving pose publication.
    pub tick_interval: Duration,
    pub publisher: PublisherSettings,
    pub fire: FireTuning,
}

/// Counters gathered over one session, returned when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub ticks: u64,
    pub moves_published: u64,
    pub moves_dropped: u64,
    pub fires_published: u64,
    pub snapshots_applied: u64,
    pub remote_fires: u64,
    // True when the server ended the session rather than the caller.
    pub closed_by_peer: bool,
}

enum LoopControl {
    Continue,
    Disconnect,
}

/// Drives one connected session until `shutdown` resolves or the server goes away.
///
/// Everything runs on the calling task: tick sampling and inbound handling interleave
/// without locks. On exit the handle is released and every remote proxy is reported as
/// vanished to the adapter.
pub async fn run_session<A, F>(
    handle: &mut ConnectionHandle,
    adapter: &mut A,
    mut gestures: mpsc::Receiver<Gesture>,
    shutdown: F,
    settings: SessionSettings,
) -> SessionReport
where
    A: RenderAdapter + ?Sized,
    F: Future<Output = ()>,
{
    let mut cache = RemoteStateCache::new();
    let mut publisher = LocalPosePublisher::new(settings.publisher);
    let mut emitter = ActionEventEmitter::new(settings.fire);
    let mut report = SessionReport::default();
    // Held for the whole session: the live state drops the id as soon as the server
    // closes, while snapshots it sent before closing are still being applied.
    let mut local_id = handle.local_id();

    let mut ticker = tokio::time::interval(settings.tick_interval);
    // A stalled frame should not be followed by a burst of catch-up publishes.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut gestures_open = true;
    tokio::pin!(shutdown);

    loop {
        let control = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested");
                LoopControl::Disconnect
            }

            _ = ticker.tick() => {
                report.ticks += 1;
                publisher.on_tick(&*handle, || adapter.sample_pose());
                LoopControl::Continue
            }

            incoming = handle.next_event() => match incoming {
                Some(event) => {
                    apply_inbound(&mut local_id, &mut cache, adapter, &mut report, event);
                    LoopControl::Continue
                }
                None => {
                    info!("session closed by server");
                    report.closed_by_peer = true;
                    LoopControl::Disconnect
                }
            },

            gesture = gestures.recv(), if gestures_open => {
                match gesture {
                    Some(Gesture::Fire) => {
                        emitter.fire(&*handle, adapter.sample_pose());
                    }
                    // The adapter stopped producing gestures; keep syncing poses.
                    None => gestures_open = false,
                }
                LoopControl::Continue
            }
        };

        if let LoopControl::Disconnect = control {
            break;
        }
    }

    handle.disconnect();
    let diff = cache.clear();
    if !diff.is_empty() {
        adapter.sync_proxies(&diff);
    }

    report.moves_published = publisher.published();
    report.moves_dropped = publisher.dropped();
    report.fires_published = emitter.fired();
    debug!(
        ticks = report.ticks,
        moves_published = report.moves_published,
        moves_dropped = report.moves_dropped,
        fires_published = report.fires_published,
        snapshots_applied = report.snapshots_applied,
        remote_fires = report.remote_fires,
        "session stats"
    );
    report
}

fn apply_inbound<A>(
    local_id: &mut Option<ParticipantId>,
    cache: &mut RemoteStateCache,
    adapter: &mut A,
    report: &mut SessionReport,
    event: InboundEvent,
) where
    A: RenderAdapter + ?Sized,
{
    match event {
        InboundEvent::Identity(id) => {
            info!(participant_id = %id, "publishing enabled");
            // A snapshot may have listed us before we knew who we are.
            let diff = cache.evict(&id);
            if !diff.is_empty() {
                adapter.sync_proxies(&diff);
            }
            *local_id = Some(id);
        }
        InboundEvent::Snapshot(snapshot) => {
            let diff = cache.apply_snapshot(snapshot, local_id.as_ref());
            report.snapshots_applied += 1;
            if !diff.is_empty() {
                adapter.sync_proxies(&diff);
            }
        }
        InboundEvent::Fire(event) => {
            let is_local = local_id
                .as_ref()
                .is_some_and(|id| event.is_authored_by(id));
            report.remote_fires += 1;
            adapter.on_remote_fire(&event, is_local);
        }
    }
}
