// Messages crossing the session boundary, in domain terms.

use super::state::{FireEvent, ParticipantId, ParticipantSnapshot, Pose};

/// Outbound traffic from the local participant.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    Move { id: ParticipantId, pose: Pose },
    Shoot(FireEvent),
}

/// Validated inbound traffic from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    // Handshake completed; this is who we are.
    Identity(ParticipantId),
    Snapshot(ParticipantSnapshot),
    Fire(FireEvent),
}

/// Discrete user gestures delivered by the render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Fire,
}
