//! ECS resources: shelf state, the command queue and the effect outbox.
//!
//! All grid-state mutation funnels through [`ShelfCommand`]s drained by a
//! single system each frame; the frontend and the live sync channel never
//! touch the shelf directly. Side effects that need I/O (HTTP mutations,
//! channel sends) leave the ECS through the [`EffectOutbox`], which the
//! frontend drains and executes.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::coord::GridCoord;
use crate::layout::LayoutParams;
use crate::shelf::{AssignRequest, Shelf, SpotCellRequest, SpotId};
use crate::sync::{ControlMessage, StateMessage, SyncSession};

/// The shelf snapshot currently on display.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShelfViewState {
    pub shelf: Option<Shelf>,
}

impl ShelfViewState {
    pub fn shelf_id(&self) -> Option<u64> {
        self.shelf.as_ref().map(|s| s.shelf_id)
    }
}

/// Shelf layout parameters as a resource.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ShelfLayout(pub LayoutParams);

/// Transient view flags mirrored to the frontend store.
#[derive(Resource, Debug, Clone, Default)]
pub struct ViewFlags {
    /// Parallax and picking are suspended (album picker open).
    pub paused: bool,
    /// A fetch or mutation is in flight.
    pub loading: bool,
    /// Spot the album picker is open for.
    pub picker_spot: Option<SpotId>,
    /// Last reportable error, for the frontend to surface.
    pub last_error: Option<String>,
}

/// One in-flight HTTP mutation per shelf. Further mutating clicks while
/// this is set are ignored, not queued.
#[derive(Resource, Debug, Clone, Default)]
pub struct MutationLatch(pub Option<MutationRequest>);

impl MutationLatch {
    pub fn is_busy(&self) -> bool {
        self.0.is_some()
    }
}

/// Where the parallax signal comes from. Sources are mutually exclusive;
/// motion only takes over after the client reports an explicit permission
/// grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalSource {
    #[default]
    Pointer,
    Motion,
}

/// Normalized parallax input in [-1, 1] on both axes.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PointerSignal {
    pub value: Vec2,
    pub source: SignalSource,
}

/// Viewport size used for camera fitting. The windowed layer keeps this in
/// sync with the primary window; headless tests set it directly.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportInfo {
    pub width: f32,
    pub height: f32,
}

impl ViewportInfo {
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// The live sync session for the current view, if one was opened.
#[derive(Resource, Debug, Clone, Default)]
pub struct SyncChannel(pub Option<SyncSession>);

/// What activating a spot's body does in the current mode. Rebuilt by the
/// edit-mode machinery whenever the snapshot or the mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotAction {
    /// Viewing: open the album picker for this spot.
    OpenPicker { spot_id: SpotId },
    /// Editing, persisted spot: request its removal.
    RemoveSpot { coord: GridCoord },
    /// Editing, placeholder: request a new spot here.
    AddSpot { coord: GridCoord },
}

/// Coordinate-to-action table for spot body clicks.
#[derive(Resource, Debug, Clone, Default)]
pub struct InteractionTable {
    actions: HashMap<GridCoord, SpotAction>,
}

impl InteractionTable {
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn insert(&mut self, coord: GridCoord, action: SpotAction) {
        self.actions.insert(coord, action);
    }

    pub fn get(&self, coord: GridCoord) -> Option<SpotAction> {
        self.actions.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Commands that mutate view state. Pushed by the frontend (as JSON over
/// the WASM boundary), by the input layer and by the sync channel; drained
/// by `process_commands` once per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShelfCommand {
    /// Replace the whole snapshot (initial fetch or mutation response).
    ReplaceSnapshot { shelf: Shelf },
    /// A fetch or mutation failed; keep prior state, release the latch.
    RequestFailed { reason: String },
    ToggleEditMode,
    SetEditMode { editing: bool },
    SetPaused { paused: bool },
    /// Body click routed through the interaction table.
    RequestAddSpot { coord: GridCoord },
    RequestRemoveSpot { coord: GridCoord },
    /// Album chosen in the picker.
    AssignPlayable { spot_id: SpotId, playable_id: u64 },
    OpenPicker { spot_id: SpotId },
    ClosePicker,
    /// Button affordance pressed; sends over the live channel.
    ControlPressed { spot_id: SpotId },
    /// Live channel lifecycle, reported by the frontend socket wiring.
    ChannelConnecting { shelf_id: u64 },
    ChannelOpened,
    ChannelClosed { reason: Option<String> },
    /// Inbound push message from the live channel.
    ApplySyncMessage { message: StateMessage },
    /// Device-orientation parallax: permission granted / new sample.
    EnableMotionSource,
    SetMotionSignal { x: f32, y: f32 },
    /// Canvas resize (the windowed layer also tracks the window itself).
    SetViewport { width: f32, height: f32 },
}

/// Thread-safe command queue bridging the frontend and the ECS.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<ShelfCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push(&self, command: ShelfCommand) {
        self.inner.lock().push_back(command);
    }

    pub fn drain(&self) -> Vec<ShelfCommand> {
        self.inner.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// An HTTP mutation the frontend must perform. The response snapshot comes
/// back as [`ShelfCommand::ReplaceSnapshot`]; failures as
/// [`ShelfCommand::RequestFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationRequest {
    AddSpot(SpotCellRequest),
    RemoveSpot(SpotCellRequest),
    AssignPlayable(AssignRequest),
}

/// A side effect the ECS cannot perform itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    /// Perform an HTTP mutation and feed the snapshot back.
    Mutate { request: MutationRequest },
    /// Send a control message over the open live channel.
    SendControl { message: ControlMessage },
}

/// Outbox of pending side effects, drained by the frontend.
#[derive(Resource, Clone)]
pub struct EffectOutbox {
    inner: Arc<Mutex<VecDeque<SideEffect>>>,
}

impl EffectOutbox {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push(&self, effect: SideEffect) {
        self.inner.lock().push_back(effect);
    }

    pub fn drain(&self) -> Vec<SideEffect> {
        self.inner.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for EffectOutbox {
    fn default() -> Self {
        Self::new()
    }
}
