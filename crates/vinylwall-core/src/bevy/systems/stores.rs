//! Mirrors ECS state into the shared stores polled by the frontend.

use bevy::prelude::*;

use crate::bevy::plugin::ViewMode;
use crate::bevy::resources::{ShelfViewState, SyncChannel, ViewFlags};
use crate::bevy::state_store::{ConnectionSummary, ShelfStores, ViewSummary};
use crate::sync::ChannelState;

pub fn sync_shelf_to_stores(shelf_state: Res<ShelfViewState>, stores: Res<ShelfStores>) {
    if shelf_state.is_changed() {
        stores.shelf.set_shelf(shelf_state.shelf.clone());
    }
}

pub fn sync_connection_to_stores(channel: Res<SyncChannel>, stores: Res<ShelfStores>) {
    if !channel.is_changed() {
        return;
    }
    let summary = match &channel.0 {
        Some(session) => ConnectionSummary {
            state: session.state,
            countdown: session.countdown.clone(),
            modal_visible: session.modal_visible,
        },
        None => ConnectionSummary {
            state: ChannelState::Closed,
            countdown: None,
            modal_visible: false,
        },
    };
    stores.connection.update(summary);
}

pub fn sync_view_to_stores(
    flags: Res<ViewFlags>,
    mode: Res<State<ViewMode>>,
    stores: Res<ShelfStores>,
) {
    if !flags.is_changed() && !mode.is_changed() {
        return;
    }
    stores.view.update(ViewSummary {
        editing: *mode.get() == ViewMode::Editing,
        paused: flags.paused,
        loading: flags.loading,
        picker_spot: flags.picker_spot,
        last_error: flags.last_error.clone(),
    });
}
