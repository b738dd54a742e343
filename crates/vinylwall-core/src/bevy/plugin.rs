//! Bevy plugins for the shelf view.
//!
//! Provides:
//! - `ShelfCorePlugin`: logic-only plugin (no rendering/window
//!   dependencies) for headless testing
//! - `ShelfViewerPlugin`: `ShelfCorePlugin` + window input and render
//!   component attachment (requires the `windowed` feature)

use bevy::prelude::*;

use crate::bevy::components::{MainShelfCamera, ShelfCamera};
use crate::bevy::events::{RefitNeeded, SceneDirty, SpotActivated};
use crate::bevy::resources::{
    CommandQueue, EffectOutbox, InteractionTable, MutationLatch, PointerSignal, ShelfLayout,
    ShelfViewState, SyncChannel, ViewFlags, ViewportInfo,
};
use crate::bevy::state_store::ShelfStores;
use crate::bevy::systems;
use crate::layout::LayoutParams;

/// Edit-mode state machine: the view is either browsing or editing the
/// grid. Placeholder spots exist only while editing.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Viewing,
    Editing,
}

// ============================================================================
// Headless plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// All shelf-view logic without rendering or window dependencies.
///
/// Use this plugin in tests with `MinimalPlugins` to drive the edit-mode
/// machine, the camera fit and the sync merge without a windowing backend.
/// The queue/outbox/stores are injectable so an embedding frontend can
/// share them across the WASM boundary.
pub struct ShelfCorePlugin {
    pub layout: LayoutParams,
    pub command_queue: Option<CommandQueue>,
    pub effect_outbox: Option<EffectOutbox>,
    pub state_stores: Option<ShelfStores>,
}

impl Default for ShelfCorePlugin {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            command_queue: None,
            effect_outbox: None,
            state_stores: None,
        }
    }
}

impl Plugin for ShelfCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ViewMode>();

        app.insert_resource(ShelfViewState::default())
            .insert_resource(ShelfLayout(self.layout))
            .insert_resource(ViewFlags::default())
            .insert_resource(MutationLatch::default())
            .insert_resource(PointerSignal::default())
            .insert_resource(ViewportInfo::default())
            .insert_resource(SyncChannel::default())
            .insert_resource(InteractionTable::default())
            .insert_resource(self.command_queue.clone().unwrap_or_default())
            .insert_resource(self.effect_outbox.clone().unwrap_or_default())
            .insert_resource(self.state_stores.clone().unwrap_or_default());

        app.add_message::<SceneDirty>()
            .add_message::<RefitNeeded>()
            .add_message::<SpotActivated>();

        app.add_systems(Startup, spawn_shelf_camera);

        // One frame pass: route clicks, apply commands, rebuild the scene
        // and the interaction table, then refit and apply parallax on top.
        app.add_systems(
            Update,
            (
                systems::handle_spot_activation,
                systems::process_commands,
                systems::rebuild_scene,
                systems::rebuild_interactions,
                systems::refit_camera,
                systems::apply_parallax,
            )
                .chain(),
        );

        // Placeholders materialize/disappear with the mode; both edges
        // re-derive the scene and refit.
        app.add_systems(OnEnter(ViewMode::Editing), systems::mark_scene_dirty);
        app.add_systems(OnExit(ViewMode::Editing), systems::mark_scene_dirty);

        app.add_systems(
            PostUpdate,
            (
                systems::sync_shelf_to_stores,
                systems::sync_connection_to_stores,
                systems::sync_view_to_stores,
            )
                .chain(),
        );
    }
}

/// Spawns the logical camera entity. Render components are attached by the
/// windowed layer.
fn spawn_shelf_camera(mut commands: Commands) {
    commands.spawn((MainShelfCamera, ShelfCamera::default(), Transform::default()));
}

// ============================================================================
// Windowed plugin (headless + window input + render attachment)
// ============================================================================

/// Full shelf viewer: headless logic plus pointer input, picking, and
/// render component attachment.
#[cfg(feature = "windowed")]
pub struct ShelfViewerPlugin {
    pub layout: LayoutParams,
    pub command_queue: Option<CommandQueue>,
    pub effect_outbox: Option<EffectOutbox>,
    pub state_stores: Option<ShelfStores>,
}

#[cfg(feature = "windowed")]
impl Default for ShelfViewerPlugin {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            command_queue: None,
            effect_outbox: None,
            state_stores: None,
        }
    }
}

#[cfg(feature = "windowed")]
impl Plugin for ShelfViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ShelfCorePlugin {
            layout: self.layout,
            command_queue: self.command_queue.clone(),
            effect_outbox: self.effect_outbox.clone(),
            state_stores: self.state_stores.clone(),
        });

        app.add_systems(Startup, systems::windowed::spawn_scene_lights);

        app.add_systems(
            Update,
            (
                systems::windowed::sync_viewport_from_window,
                systems::windowed::track_pointer,
                systems::windowed::handle_pointer_clicks,
            )
                .before(systems::handle_spot_activation),
        );

        app.add_systems(
            Update,
            (
                systems::windowed::attach_camera3d,
                systems::windowed::attach_part_visuals,
                systems::windowed::update_button_colors,
                systems::windowed::update_button_visibility,
            )
                .after(systems::rebuild_scene),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::bevy::components::{GridCell, PlaceholderMarker, SpotPart};
    use crate::bevy::resources::{
        MutationLatch, MutationRequest, ShelfCommand, SideEffect, SyncChannel, ViewFlags,
    };
    use crate::bevy::test_utils::TestApp;
    use crate::coord::GridCoord;
    use crate::shelf::{ButtonState, Playable, Shelf, ShelfSpot, SpotCellRequest};
    use crate::sync::{ChannelState, StateMessage};

    fn two_spot_shelf() -> Shelf {
        Shelf {
            shelf_id: 9,
            name: "Hallway".to_string(),
            active: true,
            updated_at: "2025-06-01T12:00:00Z".to_string(),
            spot_matrix: vec![
                ShelfSpot {
                    id: 5,
                    row: 0,
                    col: 0,
                    playable: Some(Playable {
                        id: 1,
                        name: "Blue Train".to_string(),
                        image_url: "/covers/1".to_string(),
                    }),
                    associated_key: None,
                    button_state: None,
                },
                ShelfSpot {
                    id: 6,
                    row: 0,
                    col: 1,
                    playable: None,
                    associated_key: Some(2),
                    button_state: None,
                },
            ],
        }
    }

    #[test]
    fn test_snapshot_builds_scene_and_fits_camera() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());

        // Spot 5 has an album: album + board + button. Spot 6: board + button.
        assert_eq!(app.count::<GridCell>(), 5);

        let camera = app.single_camera();
        let baseline = camera.baseline.expect("camera fitted after snapshot");
        assert!(baseline.position.z > 0.0);
        assert!(baseline.position.is_finite());
    }

    #[test]
    fn test_edit_mode_materializes_placeholders() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        let fitted_viewing = app.single_camera().baseline.unwrap();

        app.enter_edit_mode();

        // Six placeholder cells around the two occupied ones, boards only.
        assert_eq!(app.count::<PlaceholderMarker>(), 6);

        // The enlarged visible set pushes the camera farther out.
        let fitted_editing = app.single_camera().baseline.unwrap();
        assert!(fitted_editing.position.z > fitted_viewing.position.z);

        // Leaving edit mode discards all placeholders again.
        app.command(ShelfCommand::ToggleEditMode);
        app.update();
        assert_eq!(app.count::<PlaceholderMarker>(), 0);
    }

    #[test]
    fn test_placeholder_click_requests_add_once() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        app.enter_edit_mode();

        // (0, 2) is a placeholder next to spot 6.
        app.activate(GridCoord::new(0, 2), SpotPart::Board);
        app.update();

        let effects = app.drain_effects();
        assert_eq!(
            effects,
            vec![SideEffect::Mutate {
                request: MutationRequest::AddSpot(SpotCellRequest {
                    shelf_id: 9,
                    row_id: 0,
                    col_id: 2,
                }),
            }]
        );

        // A second click while the mutation is in flight is ignored.
        app.activate(GridCoord::new(0, 1), SpotPart::Board);
        app.update();
        assert!(app.drain_effects().is_empty());
        assert!(app.world().resource::<MutationLatch>().is_busy());

        // The refreshed snapshot releases the latch.
        let mut refreshed = two_spot_shelf();
        refreshed.spot_matrix.push(ShelfSpot {
            id: 7,
            row: 0,
            col: 2,
            playable: None,
            associated_key: None,
            button_state: None,
        });
        app.load_snapshot(refreshed);
        assert!(!app.world().resource::<MutationLatch>().is_busy());

        // Placeholders were re-derived for the new occupancy.
        assert_eq!(app.count::<PlaceholderMarker>(), 8);
    }

    #[test]
    fn test_sync_message_merges_into_snapshot() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        app.command(ShelfCommand::ChannelConnecting { shelf_id: 9 });
        app.command(ShelfCommand::ChannelOpened);

        app.command(ShelfCommand::ApplySyncMessage {
            message: StateMessage {
                message: "7".to_string(),
                states: [(5, ButtonState::Assigned)].into_iter().collect(),
                last_message: false,
            },
        });

        let shelf = app.shelf().unwrap();
        assert_eq!(
            shelf.spot_matrix[0].button_state,
            Some(ButtonState::Assigned)
        );
        assert_eq!(shelf.spot_matrix[1].button_state, None);

        let session = app.world().resource::<SyncChannel>().0.clone().unwrap();
        assert!(session.modal_visible);
        assert_eq!(session.countdown.as_deref(), Some("7"));
    }

    #[test]
    fn test_control_press_on_closed_channel_reports_error() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        app.command(ShelfCommand::ChannelConnecting { shelf_id: 9 });
        app.command(ShelfCommand::ChannelClosed { reason: None });

        app.command(ShelfCommand::ControlPressed { spot_id: 5 });

        assert!(app.drain_effects().is_empty());
        let flags = app.world().resource::<ViewFlags>();
        assert!(flags.last_error.as_deref().is_some_and(|e| e.contains("Closed")));

        let session = app.world().resource::<SyncChannel>().0.clone().unwrap();
        assert_eq!(session.state, ChannelState::Closed);
    }

    #[test]
    fn test_control_press_sends_and_goes_pending() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        app.command(ShelfCommand::ChannelConnecting { shelf_id: 9 });
        app.command(ShelfCommand::ChannelOpened);

        app.activate(GridCoord::new(0, 1), SpotPart::Button);
        app.update();
        app.update();

        let effects = app.drain_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], SideEffect::SendControl { message } if message.shelfspot_id == 6));

        let shelf = app.shelf().unwrap();
        assert_eq!(shelf.spot_matrix[1].button_state, Some(ButtonState::Pending));
    }

    #[test]
    fn test_empty_snapshot_keeps_previous_pose() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());
        let fitted = app.single_camera().baseline.unwrap();

        let mut empty = two_spot_shelf();
        empty.spot_matrix.clear();
        app.load_snapshot(empty);

        // No visible parts: the fit is a no-op and the pose survives.
        let camera = app.single_camera();
        assert_eq!(camera.baseline, Some(fitted));
    }

    #[test]
    fn test_viewing_click_opens_picker_and_pauses() {
        let mut app = TestApp::new();
        app.load_snapshot(two_spot_shelf());

        app.activate(GridCoord::new(0, 0), SpotPart::Album);
        app.update();
        app.update();

        let flags = app.world().resource::<ViewFlags>();
        assert_eq!(flags.picker_spot, Some(5));
        assert!(flags.paused);
    }
}
