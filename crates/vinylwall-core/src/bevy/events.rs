//! ECS messages for the shelf scene.

use bevy::prelude::Message;

use crate::bevy::components::SpotPart;
use crate::coord::GridCoord;

/// The visible spot set changed (snapshot replaced, edit mode toggled);
/// the scene entities must be rebuilt.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct SceneDirty;

/// The visible set or viewport changed; the camera must be refitted.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct RefitNeeded;

/// A spot part was activated (clicked/tapped). Written by the windowed
/// input layer or by tests; routed through the interaction table.
#[derive(Message, Debug, Clone, Copy)]
pub struct SpotActivated {
    pub coord: GridCoord,
    pub part: SpotPart,
}
