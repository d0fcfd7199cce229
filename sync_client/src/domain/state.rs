// Domain-level participant identity, pose and snapshot types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Server-assigned participant identity, stable for the lifetime of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(Arc<str>);

impl ParticipantId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// Position plus Euler orientation (radians, XYZ order) of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: [f32; 3],
    pub orientation: [f32; 3],
}

impl Pose {
    pub fn new(position: [f32; 3], orientation: [f32; 3]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.orientation.iter())
            .all(|c| c.is_finite())
    }
}

/// Every connected participant's pose at one server-chosen instant, local participant included.
pub type ParticipantSnapshot = HashMap<ParticipantId, Pose>;

/// One discrete fire action. Relayed once, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FireEvent {
    pub originator: ParticipantId,
    pub origin: [f32; 3],
    // Unit length by convention; not enforced.
    pub direction: [f32; 3],
}

impl FireEvent {
    pub fn is_authored_by(&self, id: &ParticipantId) -> bool {
        &self.originator == id
    }
}

/// Proxy changes produced by replacing one snapshot with the next.
///
/// `appeared` and `updated` carry the new pose; `vanished` only the id. Each list is sorted by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    pub appeared: Vec<(ParticipantId, Pose)>,
    pub updated: Vec<(ParticipantId, Pose)>,
    pub vanished: Vec<ParticipantId>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty() && self.updated.is_empty() && self.vanished.is_empty()
    }
}
