// Render adapter without a renderer: orbits a synthetic camera and logs proxy changes.

use crate::domain::{FireEvent, ParticipantId, Pose, RenderAdapter, SnapshotDiff};
use std::collections::HashSet;
use std::f32::consts::PI;
use std::time::Instant;
use tracing::{info, trace};

const ORBIT_RADIUS: f32 = 5.0;
const ORBIT_HEIGHT: f32 = 1.0;
// Radians per second.
const ORBIT_SPEED: f32 = 0.5;

pub struct HeadlessAdapter {
    started: Instant,
    proxies: HashSet<ParticipantId>,
}

impl HeadlessAdapter {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            proxies: HashSet::new(),
        }
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}

impl Default for HeadlessAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera circling the origin while looking along its direction of travel.
pub fn orbit_pose(elapsed_secs: f32) -> Pose {
    let angle = elapsed_secs * ORBIT_SPEED;
    Pose::new(
        [
            ORBIT_RADIUS * angle.cos(),
            ORBIT_HEIGHT,
            ORBIT_RADIUS * angle.sin(),
        ],
        // Forward starts at -Z; yawing by PI - angle turns it onto the tangent of travel.
        [0.0, PI - angle, 0.0],
    )
}

impl RenderAdapter for HeadlessAdapter {
    fn sample_pose(&mut self) -> Option<Pose> {
        Some(orbit_pose(self.started.elapsed().as_secs_f32()))
    }

    fn sync_proxies(&mut self, diff: &SnapshotDiff) {
        for (id, pose) in &diff.appeared {
            self.proxies.insert(id.clone());
            info!(participant_id = %id, position = ?pose.position, "proxy created");
        }
        for (id, pose) in &diff.updated {
            trace!(participant_id = %id, position = ?pose.position, "proxy moved");
        }
        for id in &diff.vanished {
            self.proxies.remove(id);
            info!(participant_id = %id, "proxy destroyed");
        }
    }

    fn on_remote_fire(&mut self, event: &FireEvent, is_local: bool) {
        if is_local {
            return;
        }
        info!(
            originator = %event.originator,
            origin = ?event.origin,
            direction = ?event.direction,
            "remote fire"
        );
    }
}
