// Domain layer: participant poses, snapshots, fire events and the ports the core talks through.

pub mod errors;
pub mod events;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use errors::PublishError;
pub use events::{Gesture, InboundEvent, OutboundEvent};
pub use ports::{RenderAdapter, Session};
pub use state::{FireEvent, ParticipantId, ParticipantSnapshot, Pose, SnapshotDiff};
