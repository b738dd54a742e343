//! Window- and render-dependent systems, compiled only with the
//! `windowed` feature: viewport tracking, pointer input, picking, and
//! attaching render components to the logical scene entities.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::components::{
    GridCell, MainShelfCamera, PartExtent, PlaceholderMarker, SpotPart, SpotRef,
};
use crate::bevy::events::SpotActivated;
use crate::bevy::plugin::ViewMode;
use crate::bevy::resources::{PointerSignal, ShelfViewState, SignalSource, ViewportInfo};
use crate::framing::{self, VERTICAL_FOV};
use crate::shelf::ButtonState;

/// Keeps the fit viewport in sync with the primary window.
pub fn sync_viewport_from_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportInfo>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = ViewportInfo {
        width: window.width(),
        height: window.height(),
    };
    if next.width > 0.0 && next.height > 0.0 && *viewport != next {
        *viewport = next;
    }
}

/// Normalizes the cursor into the parallax signal, y up, both axes in
/// [-1, 1]. Inactive when the motion source has taken over.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut signal: ResMut<PointerSignal>,
) {
    if signal.source != SignalSource::Pointer {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    signal.value = Vec2::new(
        (2.0 * cursor.x / window.width() - 1.0).clamp(-1.0, 1.0),
        (1.0 - 2.0 * cursor.y / window.height()).clamp(-1.0, 1.0),
    );
}

/// Casts a ray from the cursor on left click and reports the nearest hit
/// part. While editing only boards are pickable (buttons are hidden and
/// album clicks are disabled there).
pub fn handle_pointer_clicks(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainShelfCamera>>,
    parts: Query<(&Transform, &PartExtent, &GridCell, &SpotPart)>,
    mode: Res<State<ViewMode>>,
    mut activations: MessageWriter<SpotActivated>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let editing = *mode.get() == ViewMode::Editing;
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut nearest: Option<(f32, GridCell, SpotPart)> = None;
    for (transform, extent, cell, part) in parts.iter() {
        if editing && *part != SpotPart::Board {
            continue;
        }
        if let Some(dist) = framing::ray_box_distance(origin, dir, transform, extent.0) {
            if nearest.is_none_or(|(best, _, _)| dist < best) {
                nearest = Some((dist, *cell, *part));
            }
        }
    }

    if let Some((_, cell, part)) = nearest {
        activations.write(SpotActivated {
            coord: cell.0,
            part,
        });
    }
}

/// Gives the logical camera entity its render components.
pub fn attach_camera3d(
    mut commands: Commands,
    cameras: Query<Entity, (With<MainShelfCamera>, Without<Camera3d>)>,
) {
    for entity in cameras.iter() {
        commands.entity(entity).insert((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: VERTICAL_FOV,
                near: 0.1,
                far: 2000.0,
                ..Default::default()
            }),
        ));
    }
}

/// Scene lighting, spawned once.
pub fn spawn_scene_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..Default::default()
    });
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 1000.0,
            color: Color::srgb(1.0, 0.96, 0.96),
            shadows_enabled: true,
            ..Default::default()
        },
        Transform::from_xyz(20.0, 50.0, 200.0),
    ));
}

const SLEEVE_COLOR: Color = Color::srgb(0.16, 0.15, 0.17);
const BOARD_COLOR: Color = Color::srgb(0.55, 0.40, 0.24);

/// Attaches meshes and materials to freshly spawned part entities.
/// Placeholder boards get a translucent material as the "add here"
/// affordance; every button gets its own material so its color can track
/// the synced state.
pub fn attach_part_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    shelf_state: Res<ShelfViewState>,
    parts: Query<
        (Entity, &SpotPart, &SpotRef, &PartExtent, Option<&PlaceholderMarker>),
        (With<GridCell>, Without<Mesh3d>),
    >,
) {
    for (entity, part, spot_ref, extent, placeholder) in parts.iter() {
        let size = extent.0 * 2.0;
        let mesh = match part {
            SpotPart::Album | SpotPart::Board => meshes.add(Cuboid::new(size.x, size.y, size.z)),
            SpotPart::Button => meshes.add(Cylinder::new(extent.0.x, size.z)),
        };
        let material = match part {
            SpotPart::Album => materials.add(StandardMaterial {
                base_color: SLEEVE_COLOR,
                perceptual_roughness: 0.7,
                ..Default::default()
            }),
            SpotPart::Board => {
                if placeholder.is_some() {
                    materials.add(StandardMaterial {
                        base_color: BOARD_COLOR.with_alpha(0.6),
                        alpha_mode: AlphaMode::Blend,
                        perceptual_roughness: 0.5,
                        ..Default::default()
                    })
                } else {
                    materials.add(StandardMaterial {
                        base_color: BOARD_COLOR,
                        perceptual_roughness: 0.5,
                        ..Default::default()
                    })
                }
            }
            SpotPart::Button => {
                let state = spot_ref
                    .0
                    .and_then(|id| {
                        shelf_state
                            .shelf
                            .as_ref()
                            .and_then(|s| s.spot_matrix.iter().find(|spot| spot.id == id))
                    })
                    .map_or(ButtonState::Unassigned, |spot| spot.effective_button_state());
                materials.add(StandardMaterial {
                    base_color: button_color(state),
                    unlit: true,
                    ..Default::default()
                })
            }
        };
        commands.entity(entity).insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

fn button_color(state: ButtonState) -> Color {
    match state {
        ButtonState::Unassigned => Color::srgb(0.85, 0.15, 0.15),
        ButtonState::Pending => Color::srgb(0.95, 0.85, 0.15),
        ButtonState::Assigned => Color::srgb(0.15, 0.8, 0.25),
    }
}

/// Tracks synced button states into the per-button materials.
pub fn update_button_colors(
    shelf_state: Res<ShelfViewState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    buttons: Query<(&SpotRef, &SpotPart, &MeshMaterial3d<StandardMaterial>)>,
) {
    if !shelf_state.is_changed() {
        return;
    }
    let Some(shelf) = &shelf_state.shelf else {
        return;
    };
    for (spot_ref, part, material) in buttons.iter() {
        if *part != SpotPart::Button {
            continue;
        }
        let Some(spot_id) = spot_ref.0 else {
            continue;
        };
        let Some(spot) = shelf.spot_matrix.iter().find(|s| s.id == spot_id) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = button_color(spot.effective_button_state());
        }
    }
}

/// Hides buttons while editing; the board is the whole affordance there.
pub fn update_button_visibility(
    mode: Res<State<ViewMode>>,
    mut buttons: Query<(&SpotPart, &mut Visibility)>,
) {
    let target = if *mode.get() == ViewMode::Editing {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    for (part, mut visibility) in buttons.iter_mut() {
        if *part == SpotPart::Button && *visibility != target {
            *visibility = target;
        }
    }
}
