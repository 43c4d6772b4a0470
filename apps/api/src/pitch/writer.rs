//! Pitch writer: validates the request, builds one system instruction with
//! every user-supplied field delimited, and delegates to the chat client.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{delimit_field, UNTRUSTED_FIELDS_INSTRUCTION};
use crate::llm_client::{ChatCompletion, Message};
use crate::pitch::prompts::{EXTRA_CONTEXT_RULE, PITCH_PROMPT_TEMPLATE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchRequest {
    pub seeker_name: String,
    pub job_description: String,
    pub company_name: String,
    #[serde(default)]
    pub extra_context: Option<String>,
}

impl PitchRequest {
    fn validate(&self) -> Result<(), AppError> {
        match AppError::missing_fields(&[
            ("seeker_name", self.seeker_name.as_str()),
            ("job_description", self.job_description.as_str()),
            ("company_name", self.company_name.as_str()),
        ]) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Extra context counts as supplied only when it has visible content.
    fn extra_context(&self) -> Option<&str> {
        self.extra_context
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Generates a pitch tailored to the job and company in `request`.
///
/// Blank required fields fail before any chat call is made.
pub async fn generate_pitch(
    llm: &dyn ChatCompletion,
    request: &PitchRequest,
) -> Result<String, AppError> {
    request.validate()?;

    let prompt = build_pitch_prompt(request);
    info!(
        "Generating pitch for {} at {}",
        request.seeker_name.trim(),
        request.company_name.trim()
    );

    let pitch = llm.chat(&[Message::system(prompt)]).await?;
    Ok(pitch)
}

fn build_pitch_prompt(request: &PitchRequest) -> String {
    let mut fields = vec![
        delimit_field("seeker_name", &request.seeker_name),
        delimit_field("company_name", &request.company_name),
        delimit_field("job_description", &request.job_description),
    ];
    let extra_context_rule = match request.extra_context() {
        Some(extra) => {
            fields.push(delimit_field("extra_context", extra));
            EXTRA_CONTEXT_RULE
        }
        None => "",
    };

    PITCH_PROMPT_TEMPLATE
        .replace("{untrusted_instruction}", UNTRUSTED_FIELDS_INSTRUCTION)
        .replace("{extra_context_rule}", extra_context_rule)
        .replace("{fields}", &fields.join("\n"))
}
