use crate::domain::errors::PublishError;
use crate::domain::events::OutboundEvent;
use crate::domain::state::{FireEvent, ParticipantId, Pose, SnapshotDiff};

// Port for the live transport session used by the publisher and emitter.
pub trait Session {
    /// Local identity, present only once the handshake has completed.
    fn local_id(&self) -> Option<ParticipantId>;

    /// Queues one outbound event without waiting for delivery.
    fn publish(&self, event: OutboundEvent) -> Result<(), PublishError>;
}

// Port for the view layer that draws remote proxies and owns the camera/controller.
pub trait RenderAdapter {
    /// Current local controller pose, or `None` while the controller is not mounted.
    fn sample_pose(&mut self) -> Option<Pose>;

    /// Create, update and destroy proxies after a snapshot replaced the visible set.
    fn sync_proxies(&mut self, diff: &SnapshotDiff);

    /// A fire action relayed by the server. `is_local` marks our own echo.
    fn on_remote_fire(&mut self, _event: &FireEvent, _is_local: bool) {}
}
