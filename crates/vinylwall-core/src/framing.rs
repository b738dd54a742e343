//! Viewport fitting: bounding frame accumulation and camera placement.
//!
//! The fit law mirrors a 35mm lens framing a wall: from the axis-aligned
//! bounds of everything visible, derive the horizontal field of view from
//! the vertical one and the aspect ratio, then back the camera off far
//! enough that both extents fit with a margin.

use bevy::math::{Mat3, Vec3};
use bevy::transform::components::Transform;

use crate::layout::PartPlacement;

/// Vertical field of view of the shelf camera, radians (35mm equivalent).
pub const VERTICAL_FOV: f32 = 54.4 * std::f32::consts::PI / 180.0;

/// Extra framing slack around the fitted bounds.
pub const FIT_MARGIN: f32 = 1.1;

/// The fitted distance is pushed out by this factor before placing the
/// camera, leaving room for the parallax offset to stay inside the frame.
pub const DISTANCE_BIAS: f32 = 1.2;

/// Axis-aligned bounds of the currently visible geometry, with the derived
/// bounding sphere. Ephemeral: rebuilt on every content or viewport change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingFrame {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingFrame {
    /// Builds bounds over a set of placed parts. `None` when the set is
    /// empty: an empty scene has no frame and the caller keeps its pose.
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a PartPlacement>) -> Option<Self> {
        Self::from_boxes(parts.into_iter().map(|p| (p.transform, p.half_extents)))
    }

    /// Builds bounds over raw (transform, half-extents) boxes.
    pub fn from_boxes(boxes: impl IntoIterator<Item = (Transform, Vec3)>) -> Option<Self> {
        let mut frame: Option<Self> = None;
        for (transform, half_extents) in boxes {
            let (min, max) = world_aabb(&transform, half_extents);
            frame = Some(match frame {
                None => Self { min, max },
                Some(f) => Self {
                    min: f.min.min(min),
                    max: f.max.max(max),
                },
            });
        }
        frame
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    /// Bounding sphere radius: half the box diagonal.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() / 2.0
    }
}

/// World-space axis-aligned bounds of a rotated box.
fn world_aabb(transform: &Transform, half_extents: Vec3) -> (Vec3, Vec3) {
    let rot = Mat3::from_quat(transform.rotation);
    let abs_rot = Mat3::from_cols(rot.x_axis.abs(), rot.y_axis.abs(), rot.z_axis.abs());
    let world_half = abs_rot * half_extents;
    let center = transform.translation;
    (center - world_half, center + world_half)
}

/// A fitted camera pose. Owned by the fit controller; the parallax
/// controller reads it as a baseline and perturbs position only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    pub vertical_fov: f32,
    pub aspect: f32,
}

/// Places the camera so the whole frame is visible at the given aspect.
///
/// `h_fov = 2·atan(aspect·tan(v_fov/2))`; the required distance is whichever
/// of the horizontal/vertical half extents needs more room, scaled by the
/// margin. The pose looks at the bounding sphere center.
pub fn fit(frame: &BoundingFrame, aspect: f32, vertical_fov: f32) -> CameraPose {
    let half_w = (frame.max.x - frame.min.x) / 2.0;
    let half_h = (frame.max.y - frame.min.y) / 2.0;

    let h_fov = 2.0 * (aspect * (vertical_fov / 2.0).tan()).atan();
    let dist = (half_w / (h_fov / 2.0).tan())
        .max(half_h / (vertical_fov / 2.0).tan())
        .max(f32::EPSILON)
        * FIT_MARGIN;

    let center = frame.center();
    CameraPose {
        position: Vec3::new(center.x, center.y, dist * DISTANCE_BIAS),
        target: center,
        vertical_fov,
        aspect,
    }
}

/// Distance along a ray to a rotated box, if it is hit.
///
/// The ray is transformed into the box's local frame and slab-tested
/// against the half extents. Used for spot picking.
pub fn ray_box_distance(
    origin: Vec3,
    dir: Vec3,
    transform: &Transform,
    half_extents: Vec3,
) -> Option<f32> {
    let inv_rot = transform.rotation.conjugate();
    let local_origin = inv_rot * (origin - transform.translation);
    let local_dir = inv_rot * dir;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = local_origin[axis];
        let d = local_dir[axis];
        let h = half_extents[axis];
        if d.abs() < 1e-8 {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        let (t_min, t_max) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        t_near = t_near.max(t_min);
        t_far = t_far.min(t_max);
        if t_near > t_far {
            return None;
        }
    }

    (t_far >= 0.0).then(|| t_near.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Quat;

    fn unit_box_at(pos: Vec3) -> PartPlacement {
        PartPlacement {
            transform: Transform::from_translation(pos),
            half_extents: Vec3::splat(0.5),
        }
    }

    #[test]
    fn test_empty_set_has_no_frame() {
        assert!(BoundingFrame::from_parts([]).is_none());
    }

    #[test]
    fn test_single_unit_box_fit_is_finite() {
        let part = unit_box_at(Vec3::ZERO);
        let frame = BoundingFrame::from_parts([&part]).unwrap();
        let pose = fit(&frame, 16.0 / 9.0, VERTICAL_FOV);

        assert!(pose.position.is_finite());
        assert!(pose.position.z > 0.0);
        assert!((pose.target - Vec3::ZERO).length() < 1e-5);
    }

    #[test]
    fn test_rotated_box_grows_bounds() {
        let tilted = PartPlacement {
            transform: Transform::from_translation(Vec3::ZERO)
                .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_4)),
            half_extents: Vec3::new(1.0, 1.0, 0.1),
        };
        let frame = BoundingFrame::from_parts([&tilted]).unwrap();
        // A 45-degree tilt about x spreads the plate across y and z.
        assert!(frame.max.y > 0.7);
        assert!(frame.max.z > 0.7);
        assert!((frame.max.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_fit_frames_all_corners() {
        let parts = [
            unit_box_at(Vec3::new(-40.0, -10.0, 0.0)),
            unit_box_at(Vec3::new(40.0, 25.0, 3.0)),
        ];
        let frame = BoundingFrame::from_parts(parts.iter()).unwrap();
        let aspect = 4.0 / 3.0;
        let pose = fit(&frame, aspect, VERTICAL_FOV);

        let h_fov = 2.0 * (aspect * (VERTICAL_FOV / 2.0).tan()).atan();
        let tan_h = (h_fov / 2.0).tan();
        let tan_v = (VERTICAL_FOV / 2.0).tan();

        for corner in [
            frame.min,
            frame.max,
            Vec3::new(frame.min.x, frame.max.y, frame.min.z),
            Vec3::new(frame.max.x, frame.min.y, frame.max.z),
        ] {
            let depth = pose.position.z - corner.z;
            assert!(depth > 0.0);
            assert!((corner.x - pose.position.x).abs() <= tan_h * depth + 1e-3);
            assert!((corner.y - pose.position.y).abs() <= tan_v * depth + 1e-3);
        }
    }

    #[test]
    fn test_ray_hits_axis_aligned_box() {
        let transform = Transform::from_xyz(0.0, 0.0, 0.0);
        let half = Vec3::splat(1.0);
        let dist = ray_box_distance(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, &transform, half);
        assert!((dist.unwrap() - 9.0).abs() < 1e-5);

        // A ray aimed past the box misses.
        let miss = ray_box_distance(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z, &transform, half);
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_respects_box_rotation() {
        // A thin plate rotated 90 degrees about y becomes deep along z.
        let transform = Transform::from_xyz(0.0, 0.0, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let half = Vec3::new(0.1, 1.0, 2.0);
        // Along x the rotated plate now extends to +-2.
        let hit = ray_box_distance(Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_X, &transform, half);
        assert!((hit.unwrap() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_wider_aspect_moves_camera_closer_for_wide_content() {
        // Content wider than tall: a wider viewport needs less distance.
        let parts = [
            unit_box_at(Vec3::new(-50.0, 0.0, 0.0)),
            unit_box_at(Vec3::new(50.0, 0.0, 0.0)),
        ];
        let frame = BoundingFrame::from_parts(parts.iter()).unwrap();
        let narrow = fit(&frame, 1.0, VERTICAL_FOV);
        let wide = fit(&frame, 2.0, VERTICAL_FOV);
        assert!(wide.position.z < narrow.position.z);
    }
}
