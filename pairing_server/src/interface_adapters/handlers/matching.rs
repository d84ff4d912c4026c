use crate::domain::MatchError;
use crate::interface_adapters::protocol::{
    ErrorResponse, HealthResponse, LeaveResponse, MatchRequest, MatchResponse, MatchStatus,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{self, PairingOutcome};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use std::sync::Arc;
use tracing::{Span, debug, error, warn};

// Pair the requester with the longest waiting partner, or enqueue it.
#[tracing::instrument(name = "request_match", skip_all, fields(requester_id = tracing::field::Empty))]
pub async fn request_match(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Unparseable bodies are treated like a missing id.
    let request = payload
        .map_err(|rejection| {
            debug!(error = %rejection, "rejected match payload");
            map_match_error(MatchError::InvalidInput)
        })?
        .0;
    record_requester(request.requester_id.as_deref());

    let outcome = use_cases::request_match(state.pairing.as_ref(), request.requester_id.as_deref())
        .await
        .map_err(map_match_error)?;

    let response = match outcome {
        PairingOutcome::Waiting => MatchResponse {
            status: MatchStatus::Waiting,
            room_id: None,
            partner_id: None,
        },
        PairingOutcome::Paired {
            room_id,
            partner_id,
        } => MatchResponse {
            status: MatchStatus::Paired,
            room_id: Some(room_id),
            partner_id: Some(partner_id),
        },
    };

    Ok(Json(response))
}

// Best-effort withdrawal from the queue; always answers 200.
#[tracing::instrument(name = "leave_match", skip_all, fields(requester_id = tracing::field::Empty))]
pub async fn leave(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Json<LeaveResponse> {
    let Ok(Json(request)) = payload else {
        debug!("ignoring malformed leave payload");
        return Json(LeaveResponse { removed: false });
    };
    record_requester(request.requester_id.as_deref());

    let removed = match use_cases::leave(state.pairing.as_ref(), request.requester_id.as_deref())
        .await
    {
        Ok(removed) => removed,
        Err(err) => {
            // Failures are swallowed; a stale entry is evicted later anyway.
            warn!(error = %err, "leave failed");
            false
        }
    };

    Json(LeaveResponse { removed })
}

// Liveness probe; does not touch the store.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: state.pairing.mode().as_str(),
    })
}

fn record_requester(requester_id: Option<&str>) {
    if let Some(requester_id) = requester_id {
        Span::current().record("requester_id", requester_id);
    }
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn map_match_error(err: MatchError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        MatchError::InvalidInput => {
            debug!("match request without requesterId");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        MatchError::StoreUnavailable => {
            warn!("queue store unavailable");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        MatchError::Internal => {
            error!("internal matchmaking failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}
