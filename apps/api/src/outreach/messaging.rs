//! Chat outreach: sends a pre-approved template message asking for a demo slot.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::WhatsAppConfig;
use crate::errors::AppError;
use crate::http::error_for_status;
use crate::outreach::{local_now, FollowUpEstimator, OutreachRequest, OutreachResult};

#[derive(Debug, Serialize)]
struct TemplateMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    template: Template<'a>,
}

#[derive(Debug, Serialize)]
struct Template<'a> {
    name: &'a str,
    language: Language<'a>,
    components: Vec<Component<'a>>,
}

#[derive(Debug, Serialize)]
struct Language<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<TextParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct TextParameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

impl<'a> TextParameter<'a> {
    fn new(text: &'a str) -> Self {
        Self { kind: "text", text }
    }
}

#[derive(Clone)]
pub struct ChatOutreach {
    client: Client,
    config: WhatsAppConfig,
    follow_up: Arc<dyn FollowUpEstimator>,
}

impl ChatOutreach {
    pub fn new(
        client: Client,
        config: WhatsAppConfig,
        follow_up: Arc<dyn FollowUpEstimator>,
    ) -> Self {
        Self {
            client,
            config,
            follow_up,
        }
    }

    /// Sends the template message and returns the follow-up demo time.
    ///
    /// Input and credential checks happen before any request is sent.
    pub async fn send(&self, request: &OutreachRequest) -> OutreachResult {
        request.validate()?;
        let Some(access_token) = &self.config.access_token else {
            return Err(AppError::Configuration(
                "WHATSAPP_ACCESS_TOKEN must be set".to_string(),
            ));
        };
        let Some(phone_number_id) = &self.config.phone_number_id else {
            return Err(AppError::Configuration(
                "WHATSAPP_PHONE_NUMBER_ID must be set".to_string(),
            ));
        };

        let message = TemplateMessage {
            messaging_product: "whatsapp",
            to: request.target_phone.trim(),
            kind: "template",
            template: Template {
                name: &self.config.template_name,
                language: Language {
                    code: &self.config.template_language,
                },
                components: vec![Component {
                    kind: "body",
                    parameters: vec![
                        TextParameter::new(request.seeker_name.trim()),
                        TextParameter::new(request.target_email.trim()),
                    ],
                }],
            },
        };

        info!(
            "Sending template '{}' to {}",
            message.template.name, message.to
        );
        let ack = self
            .post_message(access_token, phone_number_id, &message)
            .await
            .map_err(|e| AppError::provider("messaging", format!("Failed to send message: {e}")))?;
        let message_id = ack
            .as_ref()
            .and_then(|ack| ack.pointer("/messages/0/id"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!("Message accepted: id={message_id}");

        let follow_up = self.follow_up.follow_up(local_now());
        warn!(
            "Follow-up {} is simulated; no delivery or reply is awaited",
            follow_up.datetime
        );
        Ok(follow_up)
    }

    async fn post_message(
        &self,
        access_token: &str,
        phone_number_id: &str,
        message: &TemplateMessage<'_>,
    ) -> Result<Option<Value>, String> {
        let response = self
            .client
            .post(format!(
                "{}/{phone_number_id}/messages",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(access_token)
            .json(message)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let response = error_for_status(response).await?;
        // Acceptance is decided by the status; the body is only read for logging.
        Ok(response.json::<Value>().await.ok())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::outreach::SimulatedFollowUp;
    use crate::test_support::{test_client, unreachable_base_url, MockProvider};

    fn request() -> OutreachRequest {
        OutreachRequest {
            seeker_name: "Tomilola Oluwafemi".to_string(),
            target_phone: "+2347013002604".to_string(),
            target_email: "client@example.com".to_string(),
        }
    }

    fn config(base_url: &str, token: Option<&str>, number_id: Option<&str>) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: token.map(str::to_string),
            phone_number_id: number_id.map(str::to_string),
            base_url: base_url.to_string(),
            template_name: "job_pitch_quotation".to_string(),
            template_language: "en_US".to_string(),
        }
    }

    fn outreach(config: WhatsAppConfig) -> ChatOutreach {
        ChatOutreach::new(test_client(), config, Arc::new(SimulatedFollowUp::messaging()))
    }

    #[tokio::test]
    async fn test_send_posts_template_and_returns_follow_up() {
        let graph = MockProvider::start(
            "/10987654321/messages",
            StatusCode::OK,
            json!({
                "messaging_product": "whatsapp",
                "contacts": [{"input": "+2347013002604", "wa_id": "2347013002604"}],
                "messages": [{"id": "wamid.HBgL"}]
            }),
        )
        .await;

        let before = local_now();
        let follow_up = outreach(config(&graph.base_url, Some("EAAG"), Some("10987654321")))
            .send(&request())
            .await
            .unwrap();
        let after = local_now();

        let offset = Duration::days(1) + Duration::hours(10);
        assert!(follow_up.simulated);
        assert!(follow_up.datetime >= before + offset);
        assert!(follow_up.datetime <= after + offset);

        let requests = graph.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer EAAG"));
        assert_eq!(
            requests[0].json(),
            json!({
                "messaging_product": "whatsapp",
                "to": "+2347013002604",
                "type": "template",
                "template": {
                    "name": "job_pitch_quotation",
                    "language": {"code": "en_US"},
                    "components": [{
                        "type": "body",
                        "parameters": [
                            {"type": "text", "text": "Tomilola Oluwafemi"},
                            {"type": "text", "text": "client@example.com"}
                        ]
                    }]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_plain_text_acknowledgment_counts_as_sent() {
        let graph = MockProvider::start_text("/1098/messages", StatusCode::OK, "accepted").await;

        let follow_up = outreach(config(&graph.base_url, Some("EAAG"), Some("1098")))
            .send(&request())
            .await
            .unwrap();
        assert!(follow_up.simulated);
        assert_eq!(graph.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_access_token_fails_without_network_call() {
        let err = outreach(config(&unreachable_base_url(), None, Some("1098")))
            .send(&request())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Configuration(ref m) if m.contains("WHATSAPP_ACCESS_TOKEN"))
        );
    }

    #[tokio::test]
    async fn test_missing_phone_number_id_fails_without_network_call() {
        let err = outreach(config(&unreachable_base_url(), Some("EAAG"), None))
            .send(&request())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Configuration(ref m) if m.contains("WHATSAPP_PHONE_NUMBER_ID"))
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_checked_before_configuration() {
        let mut req = request();
        req.seeker_name = "   ".to_string();
        let err = outreach(config(&unreachable_base_url(), None, None))
            .send(&req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejected_send_is_provider_error() {
        let graph = MockProvider::start(
            "/1098/messages",
            StatusCode::BAD_REQUEST,
            json!({
                "error": {
                    "message": "Template name does not exist in the translation",
                    "code": 132001
                }
            }),
        )
        .await;

        let err = outreach(config(&graph.base_url, Some("EAAG"), Some("1098")))
            .send(&request())
            .await
            .unwrap_err();
        match err {
            AppError::Provider { provider, message } => {
                assert_eq!(provider, "messaging");
                assert!(message.starts_with("Failed to send message: 400"));
                assert!(message.contains("Template name does not exist"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
