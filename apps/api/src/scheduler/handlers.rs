//! Axum route handlers for the Appointment API.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::scheduler::calendar::{AppointmentRequest, EventRecord};
use crate::state::AppState;

/// POST /api/v1/appointments
///
/// Success carries the event record (with `id`); failure carries only `error`.
pub async fn handle_schedule(
    State(state): State<AppState>,
    Json(request): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<EventRecord>), AppError> {
    let record = state.scheduler.schedule(&request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
