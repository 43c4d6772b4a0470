pub mod chat;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers as outreach;
use crate::pitch::handlers as pitch;
use crate::scheduler::handlers as scheduler;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/chat", post(chat::handle_chat))
        .route("/api/v1/pitch", post(pitch::handle_generate_pitch))
        .route("/api/v1/appointments", post(scheduler::handle_schedule))
        .route("/api/v1/outreach/phone", post(outreach::handle_phone))
        .route("/api/v1/outreach/messaging", post(outreach::handle_messaging))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{CalendarConfig, VapiConfig, WhatsAppConfig};
    use crate::outreach::messaging::ChatOutreach;
    use crate::outreach::phone::PhoneOutreach;
    use crate::outreach::SimulatedFollowUp;
    use crate::scheduler::calendar::AppointmentScheduler;
    use crate::test_support::{test_client, unreachable_base_url, MockProvider, ScriptedChat};

    fn state(chat: ScriptedChat, dir: &TempDir, whatsapp_base_url: &str) -> AppState {
        let client = test_client();
        AppState {
            llm: Arc::new(chat),
            scheduler: AppointmentScheduler::new(
                client.clone(),
                &CalendarConfig {
                    client_secret_file: dir.path().join("client_secret.json"),
                    token_file: dir.path().join("token.json"),
                    base_url: unreachable_base_url(),
                    time_zone: "UTC".to_string(),
                },
            ),
            phone: PhoneOutreach::new(
                client.clone(),
                VapiConfig {
                    api_key: None,
                    phone_number_id: None,
                    base_url: unreachable_base_url(),
                },
                Arc::new(SimulatedFollowUp::phone()),
            ),
            messaging: ChatOutreach::new(
                client,
                WhatsAppConfig {
                    access_token: Some("EAAG".to_string()),
                    phone_number_id: Some("1098".to_string()),
                    base_url: whatsapp_base_url.to_string(),
                    template_name: "job_pitch_quotation".to_string(),
                    template_language: "en_US".to_string(),
                },
                Arc::new(SimulatedFollowUp::messaging()),
            ),
        }
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(ScriptedChat::replying("x"), &dir, "http://unused"));
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pitch_endpoint_returns_pitch() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(
            ScriptedChat::replying("A compelling pitch."),
            &dir,
            "http://unused",
        ));
        let (status, body) = post_json(
            router,
            "/api/v1/pitch",
            json!({
                "seeker_name": "Tomilola Oluwafemi",
                "job_description": "Backend engineer",
                "company_name": "TechCorp"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"pitch": "A compelling pitch."}));
    }

    #[tokio::test]
    async fn test_pitch_endpoint_rejects_blank_company() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(ScriptedChat::replying("x"), &dir, "http://unused"));
        let (status, body) = post_json(
            router,
            "/api/v1/pitch",
            json!({
                "seeker_name": "Tomilola Oluwafemi",
                "job_description": "Backend engineer",
                "company_name": ""
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chat_endpoint_maps_provider_failure_to_bad_gateway() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(
            ScriptedChat::failing(500, "upstream exploded"),
            &dir,
            "http://unused",
        ));
        let (status, body) = post_json(
            router,
            "/api/v1/chat",
            json!({"messages": [{"role": "user", "content": "hello"}]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_appointment_error_has_no_id() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(ScriptedChat::replying("x"), &dir, "http://unused"));
        let (status, body) = post_json(
            router,
            "/api/v1/appointments",
            json!({
                "summary": "Team Meeting",
                "start_time": "2025-04-03T10:00:00-07:00",
                "end_time": "2025-04-03T11:00:00-07:00"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.get("id").is_none());
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_phone_endpoint_without_credentials() {
        let dir = TempDir::new().unwrap();
        let router = build_router(state(ScriptedChat::replying("x"), &dir, "http://unused"));
        let (status, body) = post_json(
            router,
            "/api/v1/outreach/phone",
            json!({
                "seeker_name": "Tomilola Oluwafemi",
                "target_phone": "+2347013002667",
                "target_email": "client@example.com"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("VAPI_API_KEY"));
    }

    #[tokio::test]
    async fn test_messaging_endpoint_returns_simulated_follow_up() {
        let graph = MockProvider::start(
            "/1098/messages",
            StatusCode::OK,
            json!({"messages": [{"id": "wamid.1"}]}),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let router = build_router(state(ScriptedChat::replying("x"), &dir, &graph.base_url));
        let (status, body) = post_json(
            router,
            "/api/v1/outreach/messaging",
            json!({
                "seeker_name": "Tomilola Oluwafemi",
                "target_phone": "+2347013002604",
                "target_email": "client@example.com"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["simulated"], true);
        assert!(body["datetime"].is_string());
    }
}
