//! Command processing: the single serialization point for view-state
//! mutation. Snapshot replacement, edit actions, picker state, live sync
//! merges and parallax input all pass through here, so the last write
//! always wins and the sync path can never clobber snapshot structure.

use bevy::math::Vec2;
use bevy::prelude::*;

use crate::bevy::events::SceneDirty;
use crate::bevy::plugin::ViewMode;
use crate::bevy::resources::{
    CommandQueue, EffectOutbox, MutationLatch, MutationRequest, PointerSignal, ShelfCommand,
    ShelfViewState, SideEffect, SignalSource, SyncChannel, ViewFlags, ViewportInfo,
};
use crate::shelf::{AssignRequest, SpotCellRequest};
use crate::sync::SyncSession;

#[allow(clippy::too_many_lines)]
pub fn process_commands(
    queue: Res<CommandQueue>,
    outbox: Res<EffectOutbox>,
    mut shelf_state: ResMut<ShelfViewState>,
    mut flags: ResMut<ViewFlags>,
    mut latch: ResMut<MutationLatch>,
    mut channel: ResMut<SyncChannel>,
    mut pointer: ResMut<PointerSignal>,
    mut viewport: ResMut<ViewportInfo>,
    mode: Res<State<ViewMode>>,
    mut next_mode: ResMut<NextState<ViewMode>>,
    mut scene_dirty: MessageWriter<SceneDirty>,
) {
    for command in queue.drain() {
        match command {
            ShelfCommand::ReplaceSnapshot { shelf } => {
                if let Err(e) = shelf.validate() {
                    tracing::warn!("[command] rejected snapshot: {e}");
                    flags.last_error = Some(e.to_string());
                    latch.0 = None;
                    flags.loading = false;
                    continue;
                }
                tracing::info!(
                    "[command] ReplaceSnapshot: shelf {} with {} spots",
                    shelf.shelf_id,
                    shelf.spot_matrix.len()
                );
                shelf_state.shelf = Some(shelf);
                latch.0 = None;
                flags.loading = false;
                scene_dirty.write(SceneDirty);
            }
            ShelfCommand::RequestFailed { reason } => {
                tracing::warn!("[command] request failed: {reason}");
                flags.last_error = Some(reason);
                latch.0 = None;
                flags.loading = false;
            }
            ShelfCommand::ToggleEditMode => {
                if shelf_state.shelf.is_none() {
                    tracing::warn!("[command] ToggleEditMode without a shelf, ignored");
                    continue;
                }
                let editing = *mode.get() == ViewMode::Editing;
                next_mode.set(if editing {
                    ViewMode::Viewing
                } else {
                    ViewMode::Editing
                });
            }
            ShelfCommand::SetEditMode { editing } => {
                next_mode.set(if editing {
                    ViewMode::Editing
                } else {
                    ViewMode::Viewing
                });
            }
            ShelfCommand::SetPaused { paused } => {
                flags.paused = paused;
            }
            ShelfCommand::RequestAddSpot { coord } => {
                let Some(shelf_id) = shelf_state.shelf_id() else {
                    tracing::warn!("[command] RequestAddSpot before shelf id is known");
                    continue;
                };
                if latch.is_busy() {
                    tracing::debug!("[command] mutation in flight, add ignored");
                    continue;
                }
                let request = MutationRequest::AddSpot(SpotCellRequest::new(shelf_id, coord));
                latch.0 = Some(request);
                flags.loading = true;
                outbox.push(SideEffect::Mutate { request });
            }
            ShelfCommand::RequestRemoveSpot { coord } => {
                let Some(shelf_id) = shelf_state.shelf_id() else {
                    tracing::warn!("[command] RequestRemoveSpot before shelf id is known");
                    continue;
                };
                if latch.is_busy() {
                    tracing::debug!("[command] mutation in flight, remove ignored");
                    continue;
                }
                let request = MutationRequest::RemoveSpot(SpotCellRequest::new(shelf_id, coord));
                latch.0 = Some(request);
                flags.loading = true;
                outbox.push(SideEffect::Mutate { request });
            }
            ShelfCommand::AssignPlayable {
                spot_id,
                playable_id,
            } => {
                if shelf_state.shelf.is_none() {
                    tracing::warn!("[command] AssignPlayable before shelf is known");
                    continue;
                }
                if latch.is_busy() {
                    tracing::debug!("[command] mutation in flight, assign ignored");
                    continue;
                }
                let request = MutationRequest::AssignPlayable(AssignRequest {
                    shelfspot_id: spot_id,
                    playable_id,
                });
                latch.0 = Some(request);
                flags.loading = true;
                flags.picker_spot = None;
                flags.paused = false;
                outbox.push(SideEffect::Mutate { request });
            }
            ShelfCommand::OpenPicker { spot_id } => {
                flags.picker_spot = Some(spot_id);
                flags.paused = true;
            }
            ShelfCommand::ClosePicker => {
                flags.picker_spot = None;
                flags.paused = false;
            }
            ShelfCommand::ControlPressed { spot_id } => {
                let (Some(session), Some(shelf)) =
                    (channel.0.as_mut(), shelf_state.shelf.as_mut())
                else {
                    tracing::warn!("[command] ControlPressed without an active view");
                    flags.last_error = Some("no active sync session".to_string());
                    continue;
                };
                match session.control_press(shelf, spot_id) {
                    Ok(message) => {
                        outbox.push(SideEffect::SendControl { message });
                    }
                    Err(e) => {
                        tracing::warn!("[command] control press dropped: {e}");
                        flags.last_error = Some(e.to_string());
                    }
                }
            }
            ShelfCommand::ChannelConnecting { shelf_id } => {
                tracing::info!("[command] live channel connecting for shelf {shelf_id}");
                channel.0 = Some(SyncSession::connect(shelf_id));
            }
            ShelfCommand::ChannelOpened => {
                if let Some(session) = channel.0.as_mut() {
                    session.mark_open();
                } else {
                    tracing::warn!("[command] ChannelOpened without a session");
                }
            }
            ShelfCommand::ChannelClosed { reason } => {
                if let Some(session) = channel.0.as_mut() {
                    session.mark_closed();
                }
                if let Some(reason) = reason {
                    tracing::warn!("[command] live channel closed: {reason}");
                    flags.last_error = Some(reason);
                }
            }
            ShelfCommand::ApplySyncMessage { message } => {
                let (Some(session), Some(shelf)) =
                    (channel.0.as_mut(), shelf_state.shelf.as_mut())
                else {
                    tracing::warn!("[command] sync message dropped, no active view");
                    continue;
                };
                session.apply(shelf, &message);
            }
            ShelfCommand::EnableMotionSource => {
                tracing::info!("[command] motion sensor parallax enabled");
                pointer.source = SignalSource::Motion;
            }
            ShelfCommand::SetMotionSignal { x, y } => {
                if pointer.source == SignalSource::Motion {
                    pointer.value = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
                }
            }
            ShelfCommand::SetViewport { width, height } => {
                if width > 0.0 && height > 0.0 {
                    let next = ViewportInfo { width, height };
                    if *viewport != next {
                        *viewport = next;
                    }
                }
            }
        }
    }
}
