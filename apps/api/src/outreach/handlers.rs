//! Axum route handlers for the Outreach API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::outreach::{FollowUp, OutreachRequest};
use crate::state::AppState;

/// POST /api/v1/outreach/phone
pub async fn handle_phone(
    State(state): State<AppState>,
    Json(request): Json<OutreachRequest>,
) -> Result<Json<FollowUp>, AppError> {
    Ok(Json(state.phone.call(&request).await?))
}

/// POST /api/v1/outreach/messaging
pub async fn handle_messaging(
    State(state): State<AppState>,
    Json(request): Json<OutreachRequest>,
) -> Result<Json<FollowUp>, AppError> {
    Ok(Json(state.messaging.send(&request).await?))
}
