use glam::Vec3;

/// Per-actor settings for the playback engine.
#[derive(Clone, Debug)]
pub struct AnimationConfig {
    /// Bone whose keyframed translation carries the clip's root motion. Its parent is the
    /// accumulation root, offset back so accumulated motion is not shown twice.
    pub non_accum_root: String,
    /// Share of root motion converted to world displacement, per axis, each in `[0, 1]`.
    pub accumulation: Vec3,
    /// Also notify listeners about markers crossed by states that currently drive no region.
    pub dispatch_inactive_markers: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            non_accum_root: "Bip01".to_string(),
            accumulation: Vec3::ZERO,
            dispatch_inactive_markers: false,
        }
    }
}
