//! Edit-mode state machine: mode transitions, the interaction table and
//! click routing.
//!
//! Click handling is data-driven: the table maps a coordinate to what
//! activating it does in the current mode. Part entities never carry
//! handlers; the input layer only reports *what* was hit.

use bevy::prelude::*;

use crate::bevy::components::SpotPart;
use crate::bevy::events::{SceneDirty, SpotActivated};
use crate::bevy::plugin::ViewMode;
use crate::bevy::resources::{
    CommandQueue, InteractionTable, ShelfCommand, ShelfViewState, SpotAction, ViewFlags,
};

/// Marks the scene dirty on every mode transition, so placeholders get
/// materialized or discarded and the camera refits to the new visible set.
pub fn mark_scene_dirty(mut dirty: MessageWriter<SceneDirty>) {
    dirty.write(SceneDirty);
}

/// Rebuilds the coordinate-to-action table for the current snapshot and
/// mode. Runs on the same dirt signal as the scene rebuild.
pub fn rebuild_interactions(
    mut dirty: MessageReader<SceneDirty>,
    shelf_state: Res<ShelfViewState>,
    mode: Res<State<ViewMode>>,
    mut table: ResMut<InteractionTable>,
) {
    if dirty.is_empty() {
        return;
    }
    dirty.clear();
    table.clear();

    let Some(shelf) = &shelf_state.shelf else {
        return;
    };

    match mode.get() {
        ViewMode::Viewing => {
            for spot in &shelf.spot_matrix {
                table.insert(spot.coord(), SpotAction::OpenPicker { spot_id: spot.id });
            }
        }
        ViewMode::Editing => {
            for spot in &shelf.spot_matrix {
                table.insert(spot.coord(), SpotAction::RemoveSpot { coord: spot.coord() });
            }
            for placeholder in shelf.placeholder_spots() {
                let coord = placeholder.coord();
                table.insert(coord, SpotAction::AddSpot { coord });
            }
        }
    }
}

/// Routes activations through the interaction table into commands.
///
/// Button parts bypass the table: pressing one is a live-sync concern and
/// only works while viewing (buttons are hidden in edit mode). Everything
/// else resolves by coordinate.
pub fn handle_spot_activation(
    mut activations: MessageReader<SpotActivated>,
    table: Res<InteractionTable>,
    shelf_state: Res<ShelfViewState>,
    mode: Res<State<ViewMode>>,
    flags: Res<ViewFlags>,
    queue: Res<CommandQueue>,
) {
    for activation in activations.read() {
        if flags.paused {
            continue;
        }

        if activation.part == SpotPart::Button {
            if *mode.get() != ViewMode::Viewing {
                continue;
            }
            let spot_id = shelf_state
                .shelf
                .as_ref()
                .and_then(|s| s.spot_at(activation.coord))
                .map(|s| s.id);
            if let Some(spot_id) = spot_id {
                queue.push(ShelfCommand::ControlPressed { spot_id });
            }
            continue;
        }

        // Album clicks are disabled while editing; the board is the whole
        // click target there.
        if *mode.get() == ViewMode::Editing && activation.part == SpotPart::Album {
            continue;
        }

        match table.get(activation.coord) {
            Some(SpotAction::OpenPicker { spot_id }) => {
                queue.push(ShelfCommand::OpenPicker { spot_id });
            }
            Some(SpotAction::RemoveSpot { coord }) => {
                queue.push(ShelfCommand::RequestRemoveSpot { coord });
            }
            Some(SpotAction::AddSpot { coord }) => {
                queue.push(ShelfCommand::RequestAddSpot { coord });
            }
            None => {
                tracing::debug!("[edit] activation at {:?} hit no table entry", activation.coord);
            }
        }
    }
}
