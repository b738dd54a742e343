//! Grid geometry mapper: grid coordinate + spot content to 3D placement.
//!
//! Each spot produces up to three parts: the album sleeve leaning against
//! the wall, the shelf board it rests on, and the hardware button sitting
//! on the board's front edge. The placement law is a pure function of the
//! coordinate and the layout parameters; identical inputs always yield
//! identical transforms.

use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;
use serde::{Deserialize, Serialize};

use crate::coord::GridCoord;
use crate::shelf::ShelfSpot;

/// Shelf layout parameters, in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Album sleeve edge length (sleeves are square).
    pub album_width: f32,
    /// Album sleeve thickness.
    pub album_depth: f32,
    /// Horizontal gap on each side of a sleeve, as an absolute length.
    pub pad_hor: f32,
    /// Vertical gap between rows, as an absolute length.
    pub pad_vert: f32,
    /// Shelf board height.
    pub shelf_height: f32,
    /// Shelf board depth (how far it protrudes from the wall).
    pub shelf_depth: f32,
    /// Lean angle of the sleeves, radians. Small and negative: the sleeve
    /// tips backward against the wall.
    pub tilt: f32,
    /// Radius of the hardware button disc.
    pub button_radius: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        let album_width = 30.0;
        Self {
            album_width,
            album_depth: 1.0,
            pad_hor: album_width * 0.15,
            pad_vert: album_width * 0.10,
            shelf_height: 3.0,
            shelf_depth: 15.0,
            tilt: -3.14 / 12.0,
            button_radius: 2.0,
        }
    }
}

/// A placed scene part: its transform plus local-space half extents, so the
/// framing module can build world bounds without a render backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartPlacement {
    pub transform: Transform,
    pub half_extents: Vec3,
}

/// Full placement for one spot.
///
/// Placeholders omit the album part (nothing to show) but keep the shelf
/// board, which edit mode renders translucent as the "add here" affordance.
/// The button only exists for persisted spots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotPlacement {
    pub album: Option<PartPlacement>,
    pub shelf: PartPlacement,
    pub button: Option<PartPlacement>,
}

impl SpotPlacement {
    /// All present parts, for bounds accumulation.
    pub fn parts(&self) -> impl Iterator<Item = &PartPlacement> {
        [self.album.as_ref(), Some(&self.shelf), self.button.as_ref()]
            .into_iter()
            .flatten()
    }
}

impl LayoutParams {
    /// Places a spot's parts on the wall.
    pub fn place(&self, spot: &ShelfSpot) -> SpotPlacement {
        self.place_at(spot.coord(), spot.playable.is_some(), !spot.is_placeholder())
    }

    /// Placement law by coordinate alone.
    ///
    /// `with_album` controls the album part, `persisted` the button part.
    pub fn place_at(&self, coord: GridCoord, with_album: bool, persisted: bool) -> SpotPlacement {
        let w = self.album_width;
        let (sin_t, cos_t) = self.tilt.sin_cos();
        let col = coord.col as f32;
        let row = coord.row as f32;

        let album_x = (2.0 * self.pad_hor + w) * col;
        let album_y = -(self.pad_vert + cos_t * w + self.shelf_height) * row;
        let album_z = self.album_depth / 2.0 - sin_t * w / 2.0;

        let album = with_album.then(|| PartPlacement {
            transform: Transform::from_xyz(album_x, album_y, album_z)
                .with_rotation(Quat::from_rotation_x(self.tilt)),
            half_extents: Vec3::new(w / 2.0, w / 2.0, self.album_depth / 2.0),
        });

        let shelf_y = album_y - (cos_t * w / 2.0 + self.shelf_height / 2.0);
        let shelf_z = self.shelf_depth / 2.0;
        let shelf = PartPlacement {
            transform: Transform::from_xyz(album_x, shelf_y, shelf_z),
            half_extents: Vec3::new(
                w / 2.0 + self.pad_hor,
                self.shelf_height / 2.0,
                self.shelf_depth / 2.0,
            ),
        };

        // The button lies flat on the board, facing the viewer, at twice
        // the board's z so it sits on the front half.
        let button = persisted.then(|| PartPlacement {
            transform: Transform::from_xyz(album_x, shelf_y, shelf_z * 2.0)
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            half_extents: Vec3::new(self.button_radius, self.button_radius, 0.25),
        });

        SpotPlacement { album, shelf, button }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;

    const EPS: f32 = 1e-5;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn test_place_is_deterministic() {
        let params = LayoutParams::default();
        let a = params.place_at(GridCoord::new(2, -1), true, true);
        let b = params.place_at(GridCoord::new(2, -1), true, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_origin_placement() {
        let params = LayoutParams::default();
        let placed = params.place_at(GridCoord::new(0, 0), true, true);
        let album = placed.album.unwrap();

        // Column and row zero pin x and y to the origin.
        assert!(album.transform.translation.x.abs() < EPS);
        assert!(album.transform.translation.y.abs() < EPS);
        // Negative tilt pushes the sleeve's center off the wall.
        let expected_z = params.album_depth / 2.0 - params.tilt.sin() * params.album_width / 2.0;
        assert!((album.transform.translation.z - expected_z).abs() < EPS);
        assert!(expected_z > 0.0);
    }

    #[test]
    fn test_row_step_only_moves_y() {
        let params = LayoutParams::default();
        let top = params.place_at(GridCoord::new(0, 0), true, true);
        let below = params.place_at(GridCoord::new(1, 0), true, true);

        let step = params.pad_vert
            + params.tilt.cos() * params.album_width
            + params.shelf_height;

        let t0 = top.album.unwrap().transform.translation;
        let t1 = below.album.unwrap().transform.translation;
        assert_vec3_eq(t1, Vec3::new(t0.x, t0.y - step, t0.z));
    }

    #[test]
    fn test_col_step_only_moves_x() {
        let params = LayoutParams::default();
        let left = params.place_at(GridCoord::new(0, 0), true, true);
        let right = params.place_at(GridCoord::new(0, 1), true, true);

        let step = 2.0 * params.pad_hor + params.album_width;
        let t0 = left.shelf.transform.translation;
        let t1 = right.shelf.transform.translation;
        assert_vec3_eq(t1, Vec3::new(t0.x + step, t0.y, t0.z));
    }

    #[test]
    fn test_shelf_sits_below_album() {
        let params = LayoutParams::default();
        let placed = params.place_at(GridCoord::new(0, 0), true, true);
        let album_y = placed.album.unwrap().transform.translation.y;
        assert!(placed.shelf.transform.translation.y < album_y);
    }

    #[test]
    fn test_placeholder_has_shelf_only() {
        let params = LayoutParams::default();
        let spot = ShelfSpot::placeholder(GridCoord::new(1, 1));
        let placed = params.place(&spot);
        assert!(placed.album.is_none());
        assert!(placed.button.is_none());
        assert_eq!(placed.parts().count(), 1);
    }

    #[test]
    fn test_button_at_twice_shelf_depth() {
        let params = LayoutParams::default();
        let placed = params.place_at(GridCoord::new(0, 0), false, true);
        let button = placed.button.unwrap();
        assert!(
            (button.transform.translation.z - params.shelf_depth).abs() < EPS
        );
        assert_eq!(
            button.transform.translation.y,
            placed.shelf.transform.translation.y
        );
    }
}
