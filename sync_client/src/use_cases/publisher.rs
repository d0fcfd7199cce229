// Per-tick publication of the local participant's pose.

use crate::domain::{OutboundEvent, Pose, PublishError, Session};
use crate::use_cases::throttle::LogThrottle;
use crate::use_cases::types::PublishOutcome;
use tracing::warn;

/// Publish cadence for the local pose.
#[derive(Debug, Clone, Copy)]
pub struct PublisherSettings {
    /// Publish on every n-th connected tick. 1 sends the full pose every tick with no
    /// delta compression, which is the default wire behavior; 0 is treated as 1.
    pub every_n_ticks: u32,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self { every_n_ticks: 1 }
    }
}

#[derive(Debug)]
pub struct LocalPosePublisher {
    settings: PublisherSettings,
    // Ticks seen while a local identity existed.
    active_ticks: u64,
    published: u64,
    dropped: u64,
    drop_log: LogThrottle,
}

impl LocalPosePublisher {
    pub fn new(settings: PublisherSettings) -> Self {
        Self {
            settings,
            active_ticks: 0,
            published: 0,
            dropped: 0,
            drop_log: LogThrottle::new(),
        }
    }

    /// Runs one render tick: samples the pose and publishes it tagged with the local id.
    ///
    /// Never blocks and never retries. Before the session has a local id this is a no-op
    /// and `sample` is not called.
    pub fn on_tick<S, F>(&mut self, session: &S, sample: F) -> PublishOutcome
    where
        S: Session + ?Sized,
        F: FnOnce() -> Option<Pose>,
    {
        let Some(id) = session.local_id() else {
            return PublishOutcome::Inactive;
        };

        let every = u64::from(self.settings.every_n_ticks.max(1));
        let due = self.active_ticks % every == 0;
        self.active_ticks += 1;
        if !due {
            return PublishOutcome::Skipped;
        }

        let Some(pose) = sample() else {
            return PublishOutcome::NoPose;
        };

        match session.publish(OutboundEvent::Move { id, pose }) {
            Ok(()) => {
                self.published += 1;
                PublishOutcome::Published
            }
            Err(err) => {
                self.dropped += 1;
                if self.drop_log.should_log() {
                    match err {
                        PublishError::QueueFull => {
                            warn!(dropped = self.dropped, "outbound queue full; dropping pose")
                        }
                        PublishError::Closed => {
                            warn!(dropped = self.dropped, "session closed; dropping pose")
                        }
                    }
                }
                PublishOutcome::Dropped
            }
        }
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for LocalPosePublisher {
    fn default() -> Self {
        Self::new(PublisherSettings::default())
    }
}
