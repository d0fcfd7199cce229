// Tuning for locally originated fire actions.

#[derive(Debug, Clone, Copy)]
pub struct FireTuning {
    /// Distance along the forward axis where the projectile spawns, in world units.
    /// Keeps the marker out of the originator's own geometry.
    pub spawn_offset: f32,
}

impl Default for FireTuning {
    fn default() -> Self {
        Self { spawn_offset: 2.0 }
    }
}
