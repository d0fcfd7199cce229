// Use-case level session state and publish results.

use crate::domain::ParticipantId;

/// Lifecycle of one transport session. Publishing is only valid in `Connected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    // Transport is open, identity handshake still pending.
    Connecting,
    Connected { local_id: ParticipantId },
}

impl ConnectionState {
    pub fn local_id(&self) -> Option<&ParticipantId> {
        match self {
            ConnectionState::Connected { local_id } => Some(local_id),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }
}

/// What happened to one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    // No local identity yet (or any more); nothing was sent.
    Inactive,
    // Controller not mounted; nothing to sample.
    NoPose,
    // Tick skipped by the publish cadence.
    Skipped,
    // Transport refused the message; it is not retried.
    Dropped,
}
