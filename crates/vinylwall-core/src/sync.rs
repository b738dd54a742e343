//! Live sync protocol: message shapes and the per-view session state.
//!
//! One session exists per active shelf view. The remote peer pushes state
//! messages (countdown text plus a sparse button-state map); the client
//! sends control messages when a button affordance is clicked. The session
//! only ever touches `button_state` on merge; snapshot structure belongs
//! to the HTTP round trips and is never clobbered from here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shelf::{ButtonState, Shelf, SpotId};

/// Lifecycle of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelState {
    #[default]
    Connecting,
    Open,
    Closed,
}

/// Inbound push message.
///
/// `states` is sparse: ids absent from the map keep their previous value.
/// `last_message == false` means the countdown is still running and the
/// connection modal should be visible. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub message: String,
    pub states: HashMap<SpotId, ButtonState>,
    pub last_message: bool,
}

/// Outbound control message: "start listening for a key press on this spot".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub shelfspot_id: SpotId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("sync channel for shelf {shelf_id} is {state:?}, dropping send")]
    ChannelUnavailable { shelf_id: u64, state: ChannelState },
    #[error("spot {spot_id} is not part of the current shelf")]
    UnknownSpot { spot_id: SpotId },
}

/// Per-view sync session: channel handle state, last countdown text and
/// modal visibility. Created on view mount, discarded on unmount or
/// shelf-id change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncSession {
    pub shelf_id: u64,
    pub state: ChannelState,
    pub countdown: Option<String>,
    pub modal_visible: bool,
}

impl SyncSession {
    pub fn connect(shelf_id: u64) -> Self {
        Self {
            shelf_id,
            state: ChannelState::Connecting,
            countdown: None,
            modal_visible: false,
        }
    }

    pub fn mark_open(&mut self) {
        self.state = ChannelState::Open;
    }

    pub fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// Merges an inbound state message into the shelf.
    ///
    /// Only `button_state` is written; ids not present in the shelf are
    /// ignored, so a stale message can never resurrect a removed spot.
    pub fn apply(&mut self, shelf: &mut Shelf, msg: &StateMessage) {
        for (&spot_id, &state) in &msg.states {
            if let Some(spot) = shelf.spot_by_id_mut(spot_id) {
                spot.button_state = Some(state);
            }
        }
        self.countdown = Some(msg.message.clone());
        self.modal_visible = !msg.last_message;
    }

    /// Prepares an outbound control message for a button click.
    ///
    /// The spot's state flips to `Pending` optimistically; the next inbound
    /// state message confirms or corrects it. Fails without side effects if
    /// the channel is not open or the spot is unknown.
    pub fn control_press(
        &mut self,
        shelf: &mut Shelf,
        spot_id: SpotId,
    ) -> Result<ControlMessage, SyncError> {
        if !self.is_open() {
            return Err(SyncError::ChannelUnavailable {
                shelf_id: self.shelf_id,
                state: self.state,
            });
        }
        let Some(spot) = shelf.spot_by_id_mut(spot_id) else {
            return Err(SyncError::UnknownSpot { spot_id });
        };

        spot.button_state = Some(ButtonState::Pending);
        self.modal_visible = true;
        Ok(ControlMessage {
            shelfspot_id: spot_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shelf::ShelfSpot;

    fn shelf() -> Shelf {
        Shelf {
            shelf_id: 1,
            name: "Wall".to_string(),
            active: true,
            updated_at: "2025-06-01T12:00:00Z".to_string(),
            spot_matrix: vec![
                ShelfSpot {
                    id: 5,
                    row: 0,
                    col: 0,
                    playable: None,
                    associated_key: None,
                    button_state: Some(ButtonState::Pending),
                },
                ShelfSpot {
                    id: 6,
                    row: 0,
                    col: 1,
                    playable: None,
                    associated_key: Some(3),
                    button_state: None,
                },
            ],
        }
    }

    #[test]
    fn test_apply_merges_only_named_spots() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        session.mark_open();

        let msg = StateMessage {
            message: "7".to_string(),
            states: HashMap::from([(5, ButtonState::Assigned)]),
            last_message: false,
        };
        session.apply(&mut shelf, &msg);

        assert_eq!(
            shelf.spot_by_id_mut(5).unwrap().button_state,
            Some(ButtonState::Assigned)
        );
        // Spot 6 was absent from the map and keeps its prior value.
        assert_eq!(shelf.spot_by_id_mut(6).unwrap().button_state, None);
        assert_eq!(session.countdown.as_deref(), Some("7"));
        assert!(session.modal_visible);
    }

    #[test]
    fn test_last_message_hides_modal() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        session.mark_open();
        session.modal_visible = true;

        let msg = StateMessage {
            message: "Success".to_string(),
            states: HashMap::new(),
            last_message: true,
        };
        session.apply(&mut shelf, &msg);
        assert!(!session.modal_visible);
    }

    #[test]
    fn test_apply_ignores_unknown_ids() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        let msg = StateMessage {
            message: String::new(),
            states: HashMap::from([(999, ButtonState::Assigned)]),
            last_message: true,
        };
        session.apply(&mut shelf, &msg);
        assert_eq!(shelf.spot_matrix.len(), 2);
    }

    #[test]
    fn test_control_press_is_optimistic() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        session.mark_open();

        let out = session.control_press(&mut shelf, 6).unwrap();
        assert_eq!(out.shelfspot_id, 6);
        assert_eq!(
            shelf.spot_by_id_mut(6).unwrap().button_state,
            Some(ButtonState::Pending)
        );
        assert!(session.modal_visible);
    }

    #[test]
    fn test_send_while_closed_is_an_error() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        session.mark_closed();

        let before = shelf.clone();
        let err = session.control_press(&mut shelf, 5).unwrap_err();
        assert_eq!(
            err,
            SyncError::ChannelUnavailable {
                shelf_id: 1,
                state: ChannelState::Closed,
            }
        );
        // No outbound message, no state change.
        assert_eq!(shelf, before);
    }

    #[test]
    fn test_control_press_unknown_spot() {
        let mut shelf = shelf();
        let mut session = SyncSession::connect(1);
        session.mark_open();
        assert_eq!(
            session.control_press(&mut shelf, 42),
            Err(SyncError::UnknownSpot { spot_id: 42 })
        );
    }

    #[test]
    fn test_state_message_wire_format() {
        // Keys arrive as JSON object keys (strings), values as raw signed
        // integers; extra fields from the peer are tolerated.
        let json = r#"{
            "message": "Press Button to connect",
            "states": {"5": 0, "6": -1, "7": 2},
            "last_message": false,
            "source_shelfspot_id": 5
        }"#;
        let msg: StateMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.states[&5], ButtonState::Pending);
        assert_eq!(msg.states[&6], ButtonState::Unassigned);
        assert_eq!(msg.states[&7], ButtonState::Assigned);
        assert!(!msg.last_message);
    }
}
