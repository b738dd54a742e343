//! Live sync WebSocket wiring.
//!
//! One channel per shelf view. Socket lifecycle events and inbound state
//! messages are forwarded to the view core as commands, so all merging
//! happens on the core's single mutation path. Dropping the channel (view
//! unmount or shelf change) closes the socket.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use vinylwall_core::bevy::ShelfCommand;
use vinylwall_core::sync::{ControlMessage, StateMessage};

use crate::hooks::dispatch;

#[allow(dead_code)]
struct WsHandlers {
    onopen: Closure<dyn FnMut(Event)>,
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    onerror: Closure<dyn FnMut(ErrorEvent)>,
    onclose: Closure<dyn FnMut(CloseEvent)>,
}

/// Handle for the per-shelf push channel.
pub struct LiveChannel {
    shelf_id: u64,
    ws: Rc<RefCell<Option<WebSocket>>>,
    _handlers: WsHandlers,
}

impl LiveChannel {
    /// Opens the channel for a shelf and reports lifecycle transitions to
    /// the view core.
    pub fn connect(shelf_id: u64) -> Result<Self, String> {
        let url = channel_url(shelf_id)?;
        tracing::info!("opening live channel {url}");
        dispatch(&ShelfCommand::ChannelConnecting { shelf_id });

        let ws = WebSocket::new(&url).map_err(|e| format!("{e:?}"))?;

        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            tracing::info!("live channel open");
            dispatch(&ShelfCommand::ChannelOpened);
        });
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                return;
            };
            match serde_json::from_str::<StateMessage>(&text) {
                Ok(message) => dispatch(&ShelfCommand::ApplySyncMessage { message }),
                Err(e) => tracing::warn!("malformed state message: {e}"),
            }
        });
        let onerror = Closure::<dyn FnMut(ErrorEvent)>::new(move |event: ErrorEvent| {
            tracing::error!("live channel error: {}", event.message());
        });
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            let reason = event.reason();
            dispatch(&ShelfCommand::ChannelClosed {
                reason: (!reason.is_empty()).then_some(reason),
            });
        });

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(Self {
            shelf_id,
            ws: Rc::new(RefCell::new(Some(ws))),
            _handlers: WsHandlers {
                onopen,
                onmessage,
                onerror,
                onclose,
            },
        })
    }

    /// Sends a control message. The core has already checked the session
    /// state, but the socket can still have raced shut; that surfaces as a
    /// close event rather than a silent drop.
    pub fn send(&self, message: &ControlMessage) {
        let borrowed = self.ws.borrow();
        let Some(ws) = borrowed.as_ref() else {
            tracing::warn!("control send on a torn-down channel");
            return;
        };
        if ws.ready_state() != WebSocket::OPEN {
            tracing::warn!("control send while socket not open");
            return;
        }
        match serde_json::to_string(message) {
            Ok(text) => {
                if let Err(e) = ws.send_with_str(&text) {
                    tracing::error!("control send failed: {e:?}");
                }
            }
            Err(e) => tracing::error!("control message serialization failed: {e}"),
        }
    }

    fn close(&self) {
        if let Some(ws) = self.ws.borrow_mut().take() {
            // Neutralize callbacks before closing so teardown does not
            // dispatch into an unmounting view.
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onerror(None);
            ws.set_onclose(None);
            let _ = ws.close();
            dispatch(&ShelfCommand::ChannelClosed { reason: None });
        }
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        tracing::info!("closing live channel for shelf {}", self.shelf_id);
        self.close();
    }
}

fn channel_url(shelf_id: u64) -> Result<String, String> {
    let location = web_sys::window()
        .ok_or_else(|| "no global window".to_string())?
        .location();
    let host = location.host().map_err(|e| format!("{e:?}"))?;
    let protocol = location.protocol().map_err(|e| format!("{e:?}"))?;
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    Ok(format!("{scheme}://{host}/ws/configure/{shelf_id}/"))
}
