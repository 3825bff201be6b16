//! Read-only views broadcast to clients after every table operation.

use serde::{Deserialize, Serialize};

use super::engine::{DrawError, DrawOutcome, GrabError, GrabKind, GrabResolution, UserError};
use super::entities::{Card, Phase, PlayerId, PlayerName};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: PlayerName,
    pub draw_deck_count: usize,
    pub used_stack_count: usize,
    pub active_card: Option<Card>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub phase: Phase,
    pub players: Vec<PlayerView>,
    pub current_player_index: usize,
    pub bank_count: usize,
    pub grab_window_open: bool,
    pub grab_cooldown_active: bool,
}

impl GameStateView {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.id == id)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<(), UserError>> for JoinResult {
    fn from(value: Result<(), UserError>) -> Self {
        Self {
            success: value.is_ok(),
            reason: value.err().map(|e| e.to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
}

impl From<Result<DrawOutcome, DrawError>> for DrawResult {
    fn from(value: Result<DrawOutcome, DrawError>) -> Self {
        match value {
            Ok(DrawOutcome::Drew) => Self {
                success: true,
                reason: None,
                winner: None,
            },
            Ok(DrawOutcome::Won { winner }) => Self {
                success: true,
                reason: None,
                winner: Some(winner),
            },
            Err(e) => Self {
                success: false,
                reason: Some(e.to_string()),
                winner: None,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrabResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<GrabKind>,
}

impl From<Result<GrabResolution, GrabError>> for GrabResult {
    fn from(value: Result<GrabResolution, GrabError>) -> Self {
        match value {
            Ok(resolution) => Self {
                success: true,
                reason: None,
                kind: Some(resolution.kind),
            },
            Err(e) => Self {
                success: false,
                reason: Some(e.to_string()),
                kind: None,
            },
        }
    }
}
