//! Phone outreach: places an assistant-driven voice call asking for a demo slot.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::VapiConfig;
use crate::errors::AppError;
use crate::http::error_for_status;
use crate::outreach::{local_now, FollowUpEstimator, OutreachRequest, OutreachResult};

const ASSISTANT_MODEL_PROVIDER: &str = "openai";
const ASSISTANT_MODEL: &str = "gpt-4";
const VOICE_PROVIDER: &str = "11labs";
const VOICE_ID: &str = "default";

#[derive(Clone)]
pub struct PhoneOutreach {
    client: Client,
    config: VapiConfig,
    follow_up: Arc<dyn FollowUpEstimator>,
}

impl PhoneOutreach {
    pub fn new(client: Client, config: VapiConfig, follow_up: Arc<dyn FollowUpEstimator>) -> Self {
        Self {
            client,
            config,
            follow_up,
        }
    }

    /// Calls the prospect and returns the follow-up demo time.
    ///
    /// Input and credential checks happen before any request is sent.
    pub async fn call(&self, request: &OutreachRequest) -> OutreachResult {
        request.validate()?;
        let (Some(api_key), Some(phone_number_id)) =
            (&self.config.api_key, &self.config.phone_number_id)
        else {
            return Err(AppError::Configuration(
                "VAPI_API_KEY and VAPI_PHONE_NUMBER_ID must be set".to_string(),
            ));
        };

        let script = call_script(request);
        let payload = json!({
            "assistant": {
                "model": {
                    "provider": ASSISTANT_MODEL_PROVIDER,
                    "model": ASSISTANT_MODEL,
                    "messages": [{"role": "system", "content": script}]
                },
                "voice": {
                    "provider": VOICE_PROVIDER,
                    "voiceId": VOICE_ID
                },
                "firstMessage": script
            },
            "phoneNumberId": phone_number_id,
            "customer": {
                "number": request.target_phone.trim()
            }
        });

        info!("Placing outreach call to {}", request.target_phone.trim());
        let call = self
            .start_call(api_key, &payload)
            .await
            .map_err(|e| AppError::provider("voice", format!("Failed to initiate call: {e}")))?;
        let call_id = call.get("id").and_then(Value::as_str).unwrap_or("unknown");
        info!("Call created: id={call_id}");

        let follow_up = self.follow_up.follow_up(local_now());
        warn!(
            "Follow-up {} is simulated; the call outcome is not inspected",
            follow_up.datetime
        );
        Ok(follow_up)
    }

    async fn start_call(&self, api_key: &str, payload: &Value) -> Result<Value, String> {
        let response = self
            .client
            .post(format!("{}/call", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let response = error_for_status(response).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| format!("unreadable call response: {e}"))
    }
}

fn call_script(request: &OutreachRequest) -> String {
    let seeker = request.seeker_name.trim();
    format!(
        "Hello! I'm calling on behalf of {seeker} from Job Pitch AI. \
         We've prepared a quotation showing how our service can boost your hiring success \
         by connecting you with top talent like {seeker}. \
         It's been sent to {email}, please check it out! \
         To explore this further, we'd love to schedule a quick demo. \
         When are you free in the next few days? \
         Please respond with a specific date and time.",
        email = request.target_email.trim()
    )
}
