//! Local stand-ins for the external providers, used by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use crate::llm_client::{ChatCompletion, LlmError, Message};

/// One request as seen by the mock provider.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("recorded body is JSON")
    }
}

#[derive(Clone)]
enum Reply {
    Json(Value),
    Text(String),
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: Reply,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

/// A provider that answers every POST on `path` with a canned status and body.
pub struct MockProvider {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockProvider {
    pub async fn start(path: &str, status: StatusCode, response: Value) -> Self {
        Self::serve(path, status, Reply::Json(response)).await
    }

    /// Like `start`, but answers with a plain-text body.
    pub async fn start_text(path: &str, status: StatusCode, body: &str) -> Self {
        Self::serve(path, status, Reply::Text(body.to_string())).await
    }

    async fn serve(path: &str, status: StatusCode, reply: Reply) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            reply,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route(path, post(record_and_reply))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock provider");
        let addr = listener.local_addr().expect("mock provider address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            recorded,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().expect("recorded lock").clone()
    }
}

async fn record_and_reply(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.recorded.lock().expect("recorded lock").push(Recorded {
        authorization,
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    match state.reply {
        Reply::Json(value) => (state.status, Json(value)).into_response(),
        Reply::Text(text) => (state.status, text).into_response(),
    }
}

/// Base URL on which nothing is listening, for "no network call" assertions.
pub fn unreachable_base_url() -> String {
    "http://127.0.0.1:9".to_string()
}

pub fn test_client() -> reqwest::Client {
    crate::http::build_client(5).expect("test HTTP client")
}

/// Records every conversation and answers with a fixed result.
pub struct ScriptedChat {
    /// `Err((status, message))` answers with a provider API error.
    pub reply: Result<String, (u16, String)>,
    pub seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedChat {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
