// One fire event per user gesture.

use crate::domain::systems::aim;
use crate::domain::tuning::fire::FireTuning;
use crate::domain::{FireEvent, OutboundEvent, Pose, Session};
use crate::use_cases::throttle::LogThrottle;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ActionEventEmitter {
    tuning: FireTuning,
    fired: u64,
    drop_log: LogThrottle,
}

impl ActionEventEmitter {
    pub fn new(tuning: FireTuning) -> Self {
        Self {
            tuning,
            fired: 0,
            drop_log: LogThrottle::new(),
        }
    }

    /// Publishes exactly one fire event aimed along the controller's forward axis.
    ///
    /// No debouncing: every call is a gesture. Returns the published event, or `None`
    /// when there is no local identity, no controller pose, or the transport refused it.
    pub fn fire<S>(&mut self, session: &S, pose: Option<Pose>) -> Option<FireEvent>
    where
        S: Session + ?Sized,
    {
        let id = session.local_id()?;
        let pose = pose?;

        let event = aim::fire_from(id, &pose, self.tuning);
        match session.publish(OutboundEvent::Shoot(event.clone())) {
            Ok(()) => {
                self.fired += 1;
                debug!(
                    origin = ?event.origin,
                    direction = ?event.direction,
                    "fire published"
                );
                Some(event)
            }
            Err(err) => {
                if self.drop_log.should_log() {
                    warn!(error = %err, "dropping fire event");
                }
                None
            }
        }
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl Default for ActionEventEmitter {
    fn default() -> Self {
        Self::new(FireTuning::default())
    }
}
