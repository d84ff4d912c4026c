use serde::{Deserialize, Serialize};

// Request payload shared by the match and leave endpoints.
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    // Optional so a missing id maps to 400 instead of a deserialization rejection.
    #[serde(default, rename = "requesterId")]
    pub requester_id: Option<String>,
}

// Response payload returned after one matchmaking attempt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
}

// Outcome status for the match response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Paired,
}

// Response payload for the best-effort leave endpoint.
#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub removed: bool,
}

// Liveness payload; reports which pairing strategy is active.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
