// Local view of every other participant, rebuilt from each inbound snapshot.

use crate::domain::{ParticipantId, ParticipantSnapshot, Pose, SnapshotDiff};
use std::collections::HashMap;

/// Other participants' poses as of the most recent snapshot.
///
/// Never holds the local participant. Each snapshot replaces the whole set; nothing is
/// interpolated and out-of-order snapshots are not detected (last applied wins).
#[derive(Debug, Default)]
pub struct RemoteStateCache {
    participants: HashMap<ParticipantId, Pose>,
}

impl RemoteStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the visible set with `snapshot` minus the entry for `local_id`.
    ///
    /// Returns what changed relative to the previous set so a render adapter can
    /// create, update and destroy proxies.
    pub fn apply_snapshot(
        &mut self,
        mut snapshot: ParticipantSnapshot,
        local_id: Option<&ParticipantId>,
    ) -> SnapshotDiff {
        if let Some(local_id) = local_id {
            snapshot.remove(local_id);
        }

        let mut diff = SnapshotDiff::default();
        for (id, pose) in &snapshot {
            if self.participants.contains_key(id) {
                diff.updated.push((id.clone(), *pose));
            } else {
                diff.appeared.push((id.clone(), *pose));
            }
        }
        diff.vanished = self
            .participants
            .keys()
            .filter(|id| !snapshot.contains_key(*id))
            .cloned()
            .collect();

        // Whole-collection swap; no entry from the previous snapshot survives.
        self.participants = snapshot;

        diff.appeared.sort_by(|a, b| a.0.cmp(&b.0));
        diff.updated.sort_by(|a, b| a.0.cmp(&b.0));
        diff.vanished.sort();
        diff
    }

    /// Visible participants sorted by id.
    pub fn visible_participants(&self) -> Vec<(ParticipantId, Pose)> {
        let mut visible: Vec<_> = self
            .participants
            .iter()
            .map(|(id, pose)| (id.clone(), *pose))
            .collect();
        visible.sort_by(|a, b| a.0.cmp(&b.0));
        visible
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Pose> {
        self.participants.get(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Removes one participant, reporting it as vanished when it was visible.
    ///
    /// Used when the local identity becomes known after a snapshot already listed it.
    pub fn evict(&mut self, id: &ParticipantId) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();
        if self.participants.remove(id).is_some() {
            diff.vanished.push(id.clone());
        }
        diff
    }

    /// Drops every entry, reporting them all as vanished.
    pub fn clear(&mut self) -> SnapshotDiff {
        self.apply_snapshot(ParticipantSnapshot::new(), None)
    }
}
