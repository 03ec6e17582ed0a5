//! /status handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub users: usize,
    pub uptime_secs: u64,
    pub listen: String,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        users: state.registry.len(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        listen: state.listen_addr.to_string(),
    })
}
