//! Bounding fit: frames all visible parts in the viewport.

use bevy::prelude::*;

use crate::bevy::components::{GridCell, MainShelfCamera, PartExtent, ShelfCamera};
use crate::bevy::events::RefitNeeded;
use crate::bevy::resources::ViewportInfo;
use crate::framing::{self, BoundingFrame, VERTICAL_FOV};

/// Recomputes the camera baseline whenever the visible set or the viewport
/// changes.
///
/// An empty visible set is a no-op: the previous pose is retained, so the
/// camera never jumps to a degenerate position while a snapshot is in
/// flight.
pub fn refit_camera(
    mut refit: MessageReader<RefitNeeded>,
    viewport: Res<ViewportInfo>,
    parts: Query<(&Transform, &PartExtent), With<GridCell>>,
    mut cameras: Query<
        (&mut ShelfCamera, &mut Transform),
        (With<MainShelfCamera>, Without<GridCell>),
    >,
) {
    let triggered = !refit.is_empty() || viewport.is_changed();
    refit.clear();
    if !triggered {
        return;
    }

    let Some(frame) =
        BoundingFrame::from_boxes(parts.iter().map(|(t, e)| (*t, e.0)))
    else {
        return;
    };

    let pose = framing::fit(&frame, viewport.aspect(), VERTICAL_FOV);

    for (mut camera, mut transform) in cameras.iter_mut() {
        camera.baseline = Some(pose);
        *transform = Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y);
    }
}
