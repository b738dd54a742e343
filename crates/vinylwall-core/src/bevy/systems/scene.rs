//! Scene entity management: turns the shelf snapshot into placed part
//! entities. Rendering components are attached separately by the windowed
//! layer; the entities here carry only what headless logic needs.

use bevy::prelude::*;

use crate::bevy::components::{GridCell, PartExtent, PlaceholderMarker, SpotPart, SpotRef};
use crate::bevy::events::{RefitNeeded, SceneDirty};
use crate::bevy::plugin::ViewMode;
use crate::bevy::resources::{ShelfLayout, ShelfViewState};
use crate::layout::PartPlacement;
use crate::shelf::ShelfSpot;

/// Rebuilds all spot entities whenever the visible set changes.
///
/// The whole scene is despawned and respawned from the snapshot; spot
/// counts are small enough that diffing would buy nothing. Placeholders
/// only exist while editing and are derived fresh from the occupancy.
pub fn rebuild_scene(
    mut dirty: MessageReader<SceneDirty>,
    mut commands: Commands,
    existing: Query<Entity, With<GridCell>>,
    shelf_state: Res<ShelfViewState>,
    layout: Res<ShelfLayout>,
    mode: Res<State<ViewMode>>,
    mut refit: MessageWriter<RefitNeeded>,
) {
    if dirty.is_empty() {
        return;
    }
    dirty.clear();

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let Some(shelf) = &shelf_state.shelf else {
        return;
    };

    for spot in &shelf.spot_matrix {
        spawn_spot(&mut commands, &layout, spot, false);
    }

    if *mode.get() == ViewMode::Editing {
        for placeholder in shelf.placeholder_spots() {
            spawn_spot(&mut commands, &layout, &placeholder, true);
        }
    }

    refit.write(RefitNeeded);
}

fn spawn_spot(commands: &mut Commands, layout: &ShelfLayout, spot: &ShelfSpot, placeholder: bool) {
    let placement = layout.0.place(spot);
    let cell = GridCell(spot.coord());
    let spot_ref = SpotRef((!spot.is_placeholder()).then_some(spot.id));

    let mut spawn_part = |part: SpotPart, placed: &PartPlacement| {
        let mut entity = commands.spawn((
            part,
            cell,
            spot_ref,
            placed.transform,
            PartExtent(placed.half_extents),
        ));
        if placeholder {
            entity.insert(PlaceholderMarker);
        }
    };

    if let Some(album) = &placement.album {
        spawn_part(SpotPart::Album, album);
    }
    spawn_part(SpotPart::Board, &placement.shelf);
    if let Some(button) = &placement.button {
        spawn_part(SpotPart::Button, button);
    }
}
