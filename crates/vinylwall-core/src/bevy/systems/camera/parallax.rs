//! Pointer parallax: a small per-frame camera offset around the fitted
//! baseline, re-aimed at the frame center so the framing guarantee holds.

use bevy::prelude::*;

use crate::bevy::components::{MainShelfCamera, ShelfCamera};
use crate::bevy::resources::{PointerSignal, ViewFlags};

/// Offsets the camera by `leeway * signal` around the baseline.
///
/// Suspended while paused (picker overlay open): the camera holds its last
/// pose. The baseline itself is never written here.
pub fn apply_parallax(
    flags: Res<ViewFlags>,
    signal: Res<PointerSignal>,
    mut cameras: Query<(&ShelfCamera, &mut Transform), With<MainShelfCamera>>,
) {
    if flags.paused {
        return;
    }

    for (camera, mut transform) in cameras.iter_mut() {
        let Some(pose) = camera.baseline else {
            continue;
        };
        let offset = signal.value * camera.leeway;
        let position = pose.position + Vec3::new(offset.x, offset.y, 0.0);
        *transform = Transform::from_translation(position).looking_at(pose.target, Vec3::Y);
    }
}
