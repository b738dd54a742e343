//! The shelf view: 3D wall canvas, edit toggle, pairing modal and the
//! album picker overlay.
//!
//! The Bevy core owns the scene and all grid state; this page fetches
//! snapshots, owns the live channel for the shown shelf, and drains the
//! core's side-effect outbox (HTTP mutations, channel sends).

use gloo::timers::callback::Interval;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use vinylwall_core::bevy::wasm_entry::drain_effects;
use vinylwall_core::bevy::{ShelfCommand, SideEffect};

use crate::api;
use crate::components::{AlbumPicker, CountdownModal};
use crate::hooks::{dispatch, use_connection, use_shelf, use_view};
use crate::services::{LiveChannel, MotionParallax};

/// Outbox drain interval in milliseconds.
const EFFECT_PUMP_MS: u32 = 100;

#[derive(Properties, PartialEq)]
pub struct ShelfViewProps {
    /// Shelf to display; `None` shows the active shelf.
    #[prop_or_default]
    pub shelf_id: Option<u64>,
}

#[function_component(ShelfView)]
pub fn shelf_view(props: &ShelfViewProps) -> Html {
    let shelf = use_shelf();
    let connection = use_connection();
    let view = use_view();
    let channel = use_mut_ref(|| None::<LiveChannel>);
    let motion = use_mut_ref(|| None::<MotionParallax>);

    // Fetch the snapshot and (re)connect the live channel whenever the
    // shelf id changes. Dropping the previous channel closes it before
    // the new one opens: at most one channel per view.
    {
        let channel = channel.clone();
        use_effect_with(props.shelf_id, move |&shelf_id| {
            let channel_setup = channel.clone();
            spawn_local(async move {
                let fetched = match shelf_id {
                    Some(id) => api::fetch_shelf(id).await,
                    None => api::fetch_active_shelf().await,
                };
                match fetched {
                    Ok(shelf) => {
                        let id = shelf.shelf_id;
                        dispatch(&ShelfCommand::ReplaceSnapshot { shelf });
                        *channel_setup.borrow_mut() = None;
                        match LiveChannel::connect(id) {
                            Ok(live) => *channel_setup.borrow_mut() = Some(live),
                            Err(e) => tracing::error!("live channel connect failed: {e}"),
                        }
                    }
                    Err(e) => {
                        tracing::error!("shelf fetch failed: {e}");
                        dispatch(&ShelfCommand::RequestFailed { reason: e });
                    }
                }
            });

            move || {
                // Unmount: tear the channel down and leave edit mode.
                *channel.borrow_mut() = None;
                dispatch(&ShelfCommand::SetEditMode { editing: false });
            }
        });
    }

    // Side-effect pump: mutations go to the HTTP API and feed back a
    // fresh snapshot; control messages go out over the live channel.
    {
        let channel = channel.clone();
        use_effect_with((), move |_| {
            let interval = Interval::new(EFFECT_PUMP_MS, move || {
                let effects = match serde_wasm_bindgen::from_value::<Vec<SideEffect>>(
                    drain_effects(),
                ) {
                    Ok(effects) => effects,
                    Err(e) => {
                        tracing::error!("effect decode failed: {e}");
                        return;
                    }
                };
                for effect in effects {
                    match effect {
                        SideEffect::Mutate { request } => {
                            spawn_local(async move {
                                match api::perform_mutation(request).await {
                                    Ok(shelf) => {
                                        dispatch(&ShelfCommand::ReplaceSnapshot { shelf });
                                    }
                                    Err(reason) => {
                                        dispatch(&ShelfCommand::RequestFailed { reason });
                                    }
                                }
                            });
                        }
                        SideEffect::SendControl { message } => {
                            if let Some(live) = channel.borrow().as_ref() {
                                live.send(&message);
                            } else {
                                tracing::warn!("control effect with no live channel");
                            }
                        }
                    }
                }
            });
            move || drop(interval)
        });
    }

    let on_edit_toggle = Callback::from(|_| dispatch(&ShelfCommand::ToggleEditMode));

    let on_enable_tilt = {
        let motion = motion.clone();
        Callback::from(move |_| {
            let motion = motion.clone();
            spawn_local(async move {
                if MotionParallax::request_permission().await {
                    match MotionParallax::start() {
                        Ok(active) => *motion.borrow_mut() = Some(active),
                        Err(e) => tracing::error!("motion subscription failed: {e}"),
                    }
                } else {
                    tracing::info!("motion permission denied, staying on pointer parallax");
                }
            });
        })
    };

    let tilt_button = if MotionParallax::supported() && motion.borrow().is_none() {
        html! {
            <button class="tilt-button" onclick={on_enable_tilt}>{ "Enable tilt" }</button>
        }
    } else {
        html! {}
    };

    html! {
        <div class="shelf-view">
            if let Some(shelf) = shelf.as_ref() {
                <h2 class="shelf-title">
                    { &shelf.name }
                    if view.editing {
                        <span class="editing-hint">{ " (editing)" }</span>
                    }
                </h2>
            }
            <button
                class={classes!("edit-button", view.editing.then_some("active"))}
                onclick={on_edit_toggle}
                title={ if view.editing { "Done editing" } else { "Edit shelf layout" } }
            >
                { "✎" }
            </button>
            { tilt_button }

            if view.loading {
                <div class="loader" />
            }

            if let Some(error) = view.last_error.clone() {
                <div class="error-toast">{ error }</div>
            }

            if let Some(spot_id) = view.picker_spot {
                <AlbumPicker {spot_id} />
            }

            <CountdownModal
                visible={connection.modal_visible}
                message={connection.countdown.clone()}
            />
        </div>
    }
}
