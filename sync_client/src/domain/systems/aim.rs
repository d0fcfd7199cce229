use crate::domain::state::{FireEvent, ParticipantId, Pose};
use crate::domain::tuning::fire::FireTuning;
use glam::{EulerRot, Quat, Vec3};

/// Forward axis of a controller with the given Euler orientation.
///
/// The unrotated controller looks down -Z; the orientation is applied in XYZ order.
pub fn forward(orientation: [f32; 3]) -> Vec3 {
    let [x, y, z] = orientation;
    Quat::from_euler(EulerRot::XYZ, x, y, z) * Vec3::NEG_Z
}

pub fn fire_from(originator: ParticipantId, pose: &Pose, tuning: FireTuning) -> FireEvent {
    let direction = forward(pose.orientation);
    // Spawn slightly ahead of the camera, not inside it.
    let origin = Vec3::from_array(pose.position) + direction * tuning.spawn_offset;

    FireEvent {
        originator,
        origin: origin.to_array(),
        direction: direction.to_array(),
    }
}
