//! Calendar provisioning: the operator-run, browser-based consent flow.
//!
//! Blocks until a human approves access in a browser, so it is only reachable
//! from `APP_MODE=provision-calendar` and never from the service path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use chrono::Utc;
use reqwest::{Client, Url};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use uuid::Uuid;

use crate::config::CalendarConfig;
use crate::errors::AppError;
use crate::scheduler::credentials::{
    load_client_secret, request_token, write_token_file, OAuthClient, StoredToken, CALENDAR_SCOPE,
};

/// Runs the consent flow and writes a fresh token file. Returns the token file path.
pub async fn provision_calendar(
    client: &Client,
    config: &CalendarConfig,
) -> Result<PathBuf, AppError> {
    let oauth = load_client_secret(&config.client_secret_file).await?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;

    run_consent_flow(client, &oauth, listener, &config.token_file, |url| {
        println!("Open this URL in your browser to authorize calendar access:\n\n{url}\n");
    })
    .await?;

    Ok(config.token_file.clone())
}

/// Drives one authorization-code exchange over a loopback redirect on `listener`.
/// `present` receives the consent URL the operator must open.
pub async fn run_consent_flow<F>(
    client: &Client,
    oauth: &OAuthClient,
    listener: TcpListener,
    token_file: &Path,
    present: F,
) -> Result<StoredToken, AppError>
where
    F: FnOnce(&Url),
{
    let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
    let state = Uuid::new_v4().to_string();
    let consent_url = consent_url(oauth, &redirect_uri, &state)?;

    let (params_tx, mut params_rx) = mpsc::channel::<HashMap<String, String>>(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = Router::new()
        .route("/", get(receive_redirect))
        .with_state(Arc::new(params_tx));
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    info!("Waiting for calendar authorization on {redirect_uri}");
    present(&consent_url);

    let params = params_rx.recv().await.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Redirect listener stopped before authorization"))
    })?;
    shutdown_tx.send(()).ok();

    let code = authorization_code(&params, &state)?;
    let response = request_token(
        client,
        &oauth.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
        ],
    )
    .await
    .map_err(|e| AppError::provider("calendar", format!("Token exchange failed: {e}")))?;

    let token = StoredToken {
        expiry: response.expiry_from(Utc::now()),
        scopes: response
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![CALENDAR_SCOPE.to_string()]),
        token: response.access_token,
        refresh_token: response.refresh_token,
        token_uri: oauth.token_uri.clone(),
        client_id: oauth.client_id.clone(),
        client_secret: oauth.client_secret.clone(),
    };
    write_token_file(token_file, &token).await?;
    Ok(token)
}

async fn receive_redirect(
    State(params_tx): State<Arc<mpsc::Sender<HashMap<String, String>>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    // Only the first redirect matters; later ones find the channel full or closed.
    params_tx.try_send(params).ok();
    Html("<html><body>Calendar access received. You can close this window.</body></html>")
}

fn consent_url(oauth: &OAuthClient, redirect_uri: &str, state: &str) -> Result<Url, AppError> {
    Url::parse_with_params(
        &oauth.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", oauth.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", CALENDAR_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::Configuration(format!("Invalid auth_uri '{}': {e}", oauth.auth_uri)))
}

fn authorization_code(params: &HashMap<String, String>, state: &str) -> Result<String, AppError> {
    if let Some(error) = params.get("error") {
        return Err(AppError::Configuration(format!(
            "Calendar authorization was denied: {error}"
        )));
    }
    if params.get("state").map(String::as_str) != Some(state) {
        return Err(AppError::Configuration(
            "Calendar authorization redirect carried an unexpected state".to_string(),
        ));
    }
    params
        .get("code")
        .filter(|c| !c.is_empty())
        .cloned()
        .ok_or_else(|| {
            AppError::Configuration("Calendar authorization redirect had no code".to_string())
        })
}
