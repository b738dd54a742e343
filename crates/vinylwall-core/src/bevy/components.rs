//! ECS components for the shelf scene.

use bevy::math::Vec3;
use bevy::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::coord::GridCoord;
use crate::framing::CameraPose;
use crate::shelf::SpotId;

/// Which part of a spot an entity represents.
///
/// Parts are tagged variants rather than scene-graph subclasses; what a
/// click on a part does is decided by the interaction table, never by the
/// entity itself.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpotPart {
    /// The album sleeve leaning against the wall.
    Album,
    /// The shelf board. The only part a placeholder has.
    Board,
    /// The hardware button affordance on the board's front edge.
    Button,
}

/// Grid cell this entity belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell(pub GridCoord);

/// Persisted spot id, if any. Placeholders carry `None`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotRef(pub Option<SpotId>);

/// Marker for placeholder parts, rendered translucent in edit mode.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlaceholderMarker;

/// Local-space half extents of a part's box, used for bounds accumulation
/// and click ray tests without a render backend.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PartExtent(pub Vec3);

/// Marker for the single shelf camera entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MainShelfCamera;

/// Camera controller state: the fitted baseline pose plus the parallax
/// leeway. The parallax system reads the baseline every frame and never
/// writes it back.
#[derive(Component, Debug, Clone)]
pub struct ShelfCamera {
    /// Last fitted pose; `None` until the first non-empty fit.
    pub baseline: Option<CameraPose>,
    /// Maximum parallax offset in scene units per unit of pointer signal.
    pub leeway: f32,
}

impl Default for ShelfCamera {
    fn default() -> Self {
        Self {
            baseline: None,
            leeway: 3.0,
        }
    }
}
