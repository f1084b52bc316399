use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use lineup_core::error::{ErrorKind, LineupError};
use lineup_core::types::{Lineup, LineupId, LineupStatus, MatchId, PlayerId};

// ─── Request Types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitLineupRequest {
    pub starting_player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub substitute_player_ids: Option<Vec<PlayerId>>,
}

// ─── Response Types ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_player_ids: Option<Vec<PlayerId>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            invalid_player_ids: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            invalid_player_ids: None,
        }
    }

    /// Failure envelope for a core error, listing offending players when
    /// the error carries them.
    pub fn from_error(error: &LineupError) -> Self {
        let invalid_player_ids = match error {
            LineupError::InvalidPlayers(ids) => Some(ids.clone()),
            _ => None,
        };
        Self {
            invalid_player_ids,
            ..Self::err(error.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineupResponse {
    pub lineup_id: LineupId,
    pub match_id: MatchId,
    pub status: LineupStatus,
    pub starting_player_ids: Vec<PlayerId>,
    pub substitute_player_ids: Vec<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<NaiveDateTime>,
    pub auto_filled: bool,
}

impl From<Lineup> for LineupResponse {
    fn from(lineup: Lineup) -> Self {
        Self {
            lineup_id: lineup.id,
            match_id: lineup.match_id,
            status: lineup.status,
            starting_player_ids: lineup.starting_player_ids,
            substitute_player_ids: lineup.substitute_player_ids,
            locked_at: lineup.locked_at,
            auto_filled: lineup.auto_filled,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub draft_lineups: usize,
    pub sweep_interval_secs: u64,
    pub version: String,
}

// ─── Error Mapping ──────────────────────────────────────────────────────────

pub fn status_for(error: &LineupError) -> StatusCode {
    match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PreconditionFailed | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
