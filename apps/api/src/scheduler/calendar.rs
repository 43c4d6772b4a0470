//! Appointment scheduling against the user's primary calendar.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CalendarConfig;
use crate::errors::AppError;
use crate::http::error_for_status;
use crate::scheduler::credentials::TokenStore;

/// An appointment to create. Timestamps are RFC 3339 with an explicit offset,
/// e.g. `2025-04-03T10:00:00-07:00`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: BTreeSet<String>,
}

/// The provider's record of a created event. Only `id` is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<Attendee<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Debug, Serialize)]
struct Attendee<'a> {
    email: &'a str,
}

/// Validated view of an `AppointmentRequest`.
struct Window {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl AppointmentRequest {
    fn validate(&self) -> Result<Window, AppError> {
        if let Some(err) = AppError::missing_fields(&[
            ("summary", self.summary.as_str()),
            ("start_time", self.start_time.as_str()),
            ("end_time", self.end_time.as_str()),
        ]) {
            return Err(err);
        }

        let start = parse_timestamp("start_time", &self.start_time)?;
        let end = parse_timestamp("end_time", &self.end_time)?;
        if start >= end {
            return Err(AppError::Validation(format!(
                "start_time ({}) must be before end_time ({})",
                self.start_time.trim(),
                self.end_time.trim()
            )));
        }
        Ok(Window { start, end })
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|e| {
        AppError::Validation(format!(
            "{field} must be an RFC 3339 timestamp with offset, got '{}': {e}",
            value.trim()
        ))
    })
}

/// Creates events on the authenticated user's primary calendar.
#[derive(Clone)]
pub struct AppointmentScheduler {
    client: Client,
    tokens: TokenStore,
    base_url: String,
    time_zone: String,
}

impl AppointmentScheduler {
    pub fn new(client: Client, config: &CalendarConfig) -> Self {
        Self {
            tokens: TokenStore::new(
                client.clone(),
                config.token_file.clone(),
                config.client_secret_file.clone(),
            ),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            time_zone: config.time_zone.clone(),
        }
    }

    pub async fn schedule(&self, request: &AppointmentRequest) -> Result<EventRecord, AppError> {
        let window = request.validate()?;
        let access_token = self.tokens.access_token().await?;

        let body = EventBody {
            summary: request.summary.trim(),
            start: EventTime {
                date_time: window.start.to_rfc3339(),
                time_zone: &self.time_zone,
            },
            end: EventTime {
                date_time: window.end.to_rfc3339(),
                time_zone: &self.time_zone,
            },
            description: request
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty()),
            attendees: request
                .attendees
                .iter()
                .map(|email| email.trim())
                .filter(|email| !email.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|email| Attendee { email })
                .collect(),
        };

        info!(
            "Scheduling '{}' from {} to {} with {} attendee(s)",
            body.summary,
            body.start.date_time,
            body.end.date_time,
            body.attendees.len()
        );

        self.insert_event(&access_token, &body).await.map_err(|e| {
            warn!("Calendar insert failed: {e}");
            AppError::provider("calendar", format!("Failed to schedule appointment: {e}"))
        })
    }

    async fn insert_event(
        &self,
        access_token: &str,
        body: &EventBody<'_>,
    ) -> Result<EventRecord, String> {
        let response = self
            .client
            .post(format!("{}/calendars/primary/events", self.base_url))
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let response = error_for_status(response).await?;

        let record: EventRecord = response
            .json()
            .await
            .map_err(|e| format!("unreadable event record: {e}"))?;
        if record.id.is_empty() {
            return Err("event record has an empty id".to_string());
        }
        info!("Created calendar event {}", record.id);
        Ok(record)
    }
}
