//! Live sync channel: one WebSocket per active shelf view.
//!
//! The client sends `{shelfspot_id}` when a button affordance is pressed.
//! The server marks that spot as listening and ticks a 10-second countdown,
//! pushing one state message per second. If the hardware key endpoint fires
//! first the countdown ends with "Success" and the full per-spot state map;
//! otherwise it times out with the same full map. `last_message: true`
//! closes the client's countdown modal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use vinylwall_core::shelf::ButtonState;
use vinylwall_core::sync::{ControlMessage, StateMessage};

use crate::routes::Db;
use crate::store::ShelfDb;

/// Seconds the user has to press a hardware key.
const PAIRING_WINDOW_SECS: u32 = 10;

pub async fn ws_configure(
    ws: WebSocketUpgrade,
    Path(shelf_id): Path<u64>,
    State(db): State<Db>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, shelf_id, db))
}

async fn handle_socket(mut socket: WebSocket, shelf_id: u64, db: Arc<ShelfDb>) {
    tracing::info!("live channel opened for shelf {shelf_id}");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let control: ControlMessage = match serde_json::from_str(&message) {
            Ok(control) => control,
            Err(e) => {
                tracing::warn!("malformed control message on shelf {shelf_id}: {e}");
                continue;
            }
        };

        if db.shelf_of_spot(control.shelfspot_id) != Some(shelf_id) {
            tracing::warn!(
                "control for spot {} does not belong to shelf {shelf_id}",
                control.shelfspot_id
            );
            continue;
        }

        if run_pairing_countdown(&mut socket, &db, shelf_id, control.shelfspot_id)
            .await
            .is_err()
        {
            break;
        }
        db.reset_listening();
    }

    db.reset_listening();
    tracing::info!("live channel closed for shelf {shelf_id}");
}

/// Ticks the pairing countdown for one spot. Returns `Err` when the socket
/// goes away mid-countdown.
async fn run_pairing_countdown(
    socket: &mut WebSocket,
    db: &ShelfDb,
    shelf_id: u64,
    spot_id: u64,
) -> Result<(), axum::Error> {
    db.set_listening(spot_id);

    for elapsed in 0..=PAIRING_WINDOW_SECS {
        if db.listening() == Some(spot_id) {
            let message = StateMessage {
                message: format!("{}", PAIRING_WINDOW_SECS - elapsed),
                states: HashMap::from([(spot_id, ButtonState::Pending)]),
                last_message: false,
            };
            send_state(socket, &message).await?;
        } else {
            // The key endpoint fired: report the final assignment map.
            let message = StateMessage {
                message: "Success".to_string(),
                states: db.button_states(shelf_id).unwrap_or_default(),
                last_message: true,
            };
            send_state(socket, &message).await?;
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let message = StateMessage {
        message: "Did not receive any button input".to_string(),
        states: db.button_states(shelf_id).unwrap_or_default(),
        last_message: true,
    };
    send_state(socket, &message).await
}

async fn send_state(socket: &mut WebSocket, message: &StateMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).unwrap_or_default();
    socket.send(Message::Text(text.into())).await
}
