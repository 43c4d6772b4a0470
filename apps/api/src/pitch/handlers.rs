//! Axum route handlers for the Pitch API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::pitch::writer::{generate_pitch, PitchRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PitchResponse {
    pub pitch: String,
}

/// POST /api/v1/pitch
pub async fn handle_generate_pitch(
    State(state): State<AppState>,
    Json(request): Json<PitchRequest>,
) -> Result<Json<PitchResponse>, AppError> {
    let pitch = generate_pitch(state.llm.as_ref(), &request).await?;
    Ok(Json(PitchResponse { pitch }))
}
