//! /users handlers — roster and per-user inspection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::ApiState;

// ── /users ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

pub async fn handle_users(State(state): State<ApiState>) -> Json<UsersResponse> {
    Json(UsersResponse {
        users: state.registry.names(),
    })
}

// ── /users/:name ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserInspectResponse {
    pub name: String,
    pub peer_addr: Option<String>,
    pub connected_secs: u64,
}

pub async fn handle_user_inspect(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<UserInspectResponse>, (StatusCode, String)> {
    let peer = state
        .registry
        .get(&name)
        .ok_or((StatusCode::NOT_FOUND, "user not found".to_string()))?;

    Ok(Json(UserInspectResponse {
        peer_addr: peer.addr().map(|a| a.to_string()),
        connected_secs: peer.connected_at().elapsed().as_secs(),
        name,
    }))
}
