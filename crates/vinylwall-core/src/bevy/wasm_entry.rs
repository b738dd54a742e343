//! WASM entry points for the shelf viewer.
//!
//! JavaScript-callable functions to start the Bevy app on a canvas, push
//! commands, poll the state stores and drain pending side effects.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use wasm_bindgen::prelude::*;

use crate::bevy::plugin::ShelfViewerPlugin;
use crate::bevy::resources::{CommandQueue, EffectOutbox, ShelfCommand};
use crate::bevy::state_store::ShelfStores;

// ============================================================================
// Global state
// ============================================================================

/// Atomic flag for signaling app shutdown (checked every frame).
static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);

/// Whether the Bevy app has been started. In WASM the event loop can only
/// be created once, so a second start is a no-op.
static APP_STARTED: AtomicBool = AtomicBool::new(false);

struct GlobalState {
    command_queue: CommandQueue,
    effect_outbox: EffectOutbox,
    state_stores: ShelfStores,
}

impl GlobalState {
    fn new() -> Self {
        Self {
            command_queue: CommandQueue::new(),
            effect_outbox: EffectOutbox::new(),
            state_stores: ShelfStores::new(),
        }
    }
}

static GLOBAL_STATE: Mutex<Option<GlobalState>> = Mutex::new(None);

fn with_global<R>(f: impl FnOnce(&GlobalState) -> R) -> R {
    let mut guard = GLOBAL_STATE.lock().unwrap();
    let state = guard.get_or_insert_with(GlobalState::new);
    f(state)
}

fn is_shutdown_requested() -> bool {
    SHOULD_EXIT.load(Ordering::SeqCst)
}

/// Request the Bevy app to exit. Called before page unload.
#[wasm_bindgen]
pub fn request_app_exit() {
    tracing::info!("[shelf] request_app_exit called");
    SHOULD_EXIT.store(true, Ordering::SeqCst);
}

/// Reset shared state. Called after the app exits or before page unload.
#[wasm_bindgen]
pub fn reset_app_state() {
    tracing::info!("[shelf] reset_app_state called");
    SHOULD_EXIT.store(true, Ordering::SeqCst);
    let guard = GLOBAL_STATE.lock().unwrap();
    if let Some(state) = guard.as_ref() {
        state.command_queue.clear();
        state.effect_outbox.clear();
    }
}

/// Sends `AppExit` once shutdown has been requested.
pub fn check_exit_system(mut exit: MessageWriter<bevy::app::AppExit>) {
    if SHOULD_EXIT.load(Ordering::SeqCst) {
        tracing::info!("[shelf] check_exit_system: sending AppExit");
        exit.write(bevy::app::AppExit::Success);
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Starts the shelf viewer on the given canvas. Idempotent: a running app
/// is reused across page navigations.
#[wasm_bindgen]
pub fn start_shelf_app(canvas_id: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if APP_STARTED.load(Ordering::SeqCst) {
        tracing::info!("[shelf] app already running, skipping creation");
        return Ok(());
    }

    let (command_queue, effect_outbox, state_stores) = with_global(|s| {
        (
            s.command_queue.clone(),
            s.effect_outbox.clone(),
            s.state_stores.clone(),
        )
    });

    tracing::info!("[shelf] creating Bevy app for canvas #{canvas_id}");

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    canvas: Some(format!("#{canvas_id}")),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: true,
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );

    app.insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::Continuous,
    });

    app.add_plugins(ShelfViewerPlugin {
        command_queue: Some(command_queue),
        effect_outbox: Some(effect_outbox),
        state_stores: Some(state_stores),
        ..Default::default()
    });

    app.add_systems(Update, check_exit_system);

    APP_STARTED.store(true, Ordering::SeqCst);
    app.run();

    Ok(())
}

/// Check if the app is currently running.
#[wasm_bindgen]
pub fn is_shelf_app_running() -> bool {
    APP_STARTED.load(Ordering::SeqCst) && !SHOULD_EXIT.load(Ordering::SeqCst)
}

// ============================================================================
// Commands and effects
// ============================================================================

/// Pushes a JSON-encoded [`ShelfCommand`] onto the queue.
#[wasm_bindgen]
pub fn send_command(command_json: &str) -> Result<(), JsValue> {
    if is_shutdown_requested() {
        return Err(JsValue::from_str("shelf app is shutting down"));
    }
    let command: ShelfCommand = serde_json::from_str(command_json)
        .map_err(|e| JsValue::from_str(&format!("invalid command JSON: {e}")))?;
    with_global(|s| s.command_queue.push(command));
    Ok(())
}

/// Drains pending side effects (HTTP mutations, channel sends) for the
/// frontend to execute.
#[wasm_bindgen]
pub fn drain_effects() -> JsValue {
    let effects = with_global(|s| s.effect_outbox.drain());
    serde_wasm_bindgen::to_value(&effects).unwrap_or(JsValue::NULL)
}

// ============================================================================
// Store getters
// ============================================================================

#[wasm_bindgen]
pub fn get_shelf() -> JsValue {
    let shelf = with_global(|s| s.state_stores.shelf.get_shelf());
    serde_wasm_bindgen::to_value(&shelf).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub fn get_shelf_version() -> u64 {
    with_global(|s| s.state_stores.shelf.get_version())
}

#[wasm_bindgen]
pub fn get_connection() -> JsValue {
    let summary = with_global(|s| s.state_stores.connection.get_summary());
    serde_wasm_bindgen::to_value(&summary).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub fn get_connection_version() -> u64 {
    with_global(|s| s.state_stores.connection.get_version())
}

#[wasm_bindgen]
pub fn get_view() -> JsValue {
    let summary = with_global(|s| s.state_stores.view.get_summary());
    serde_wasm_bindgen::to_value(&summary).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub fn get_view_version() -> u64 {
    with_global(|s| s.state_stores.view.get_version())
}
