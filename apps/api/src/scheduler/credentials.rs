//! Calendar OAuth credentials: the token file and the client-secret file.
//!
//! The runtime path only ever loads the token file and, when it has expired,
//! performs one non-interactive refresh-token grant. Obtaining a first token
//! needs a human and lives in `provision`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;

/// Full read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// A token is treated as expired this long before its stated expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Contents of the token file. Field names follow Google's "authorized user" JSON
/// so files written by other Google client libraries load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// A token without an expiry is assumed valid until the provider says otherwise.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) > now,
            None => true,
        }
    }
}

/// OAuth client registration as downloaded from the provider console.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClient>,
    web: Option<OAuthClient>,
}

/// Loads the OAuth client registration; a missing file is a configuration error naming the path.
pub async fn load_client_secret(path: &Path) -> Result<OAuthClient, AppError> {
    if !tokio::fs::try_exists(path).await? {
        return Err(AppError::Configuration(format!(
            "Client secret file not found at {}",
            path.display()
        )));
    }

    let raw = tokio::fs::read_to_string(path).await?;
    let file: ClientSecretFile = serde_json::from_str(&raw).map_err(|e| {
        AppError::Configuration(format!(
            "Client secret file {} is not valid: {e}",
            path.display()
        ))
    })?;

    file.installed.or(file.web).ok_or_else(|| {
        AppError::Configuration(format!(
            "Client secret file {} has neither an 'installed' nor a 'web' client",
            path.display()
        ))
    })
}

/// Successful response of the provider's token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

/// POSTs a form-encoded grant to `token_uri`.
pub async fn request_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let response = crate::http::error_for_status(response).await?;
    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| format!("unreadable token response: {e}"))
}

/// Owns the on-disk token file. Nothing else reads or writes it.
#[derive(Clone)]
pub struct TokenStore {
    client: Client,
    token_file: PathBuf,
    client_secret_file: PathBuf,
}

impl TokenStore {
    pub fn new(client: Client, token_file: PathBuf, client_secret_file: PathBuf) -> Self {
        Self {
            client,
            token_file,
            client_secret_file,
        }
    }

    /// Returns a usable access token, refreshing (and rewriting the file) once if expired.
    pub async fn access_token(&self) -> Result<String, AppError> {
        let Some(stored) = self.load().await? else {
            return Err(self.missing_token_error().await);
        };

        if stored.is_fresh(Utc::now()) {
            debug!("Using stored calendar token from {}", self.token_file.display());
            return Ok(stored.token);
        }

        let refreshed = self.refresh(stored).await?;
        Ok(refreshed.token)
    }

    pub async fn load(&self) -> Result<Option<StoredToken>, AppError> {
        if !tokio::fs::try_exists(&self.token_file).await? {
            return Ok(None);
        }
        let raw = tokio::fs::read_to_string(&self.token_file).await?;
        match serde_json::from_str::<StoredToken>(&raw) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable calendar token file {}: {e}",
                    self.token_file.display()
                );
                Ok(None)
            }
        }
    }

    /// Writes the token file, replacing any previous content.
    pub async fn save(&self, token: &StoredToken) -> Result<(), AppError> {
        write_token_file(&self.token_file, token).await
    }

    async fn refresh(&self, stored: StoredToken) -> Result<StoredToken, AppError> {
        let Some(refresh_token) = stored.refresh_token.clone() else {
            return Err(AppError::Configuration(format!(
                "Calendar token in {} has expired and has no refresh token; \
                 run with APP_MODE=provision-calendar to authorize again",
                self.token_file.display()
            )));
        };

        info!("Refreshing expired calendar token");
        let response = request_token(
            &self.client,
            &stored.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", stored.client_id.as_str()),
                ("client_secret", stored.client_secret.as_str()),
            ],
        )
        .await
        .map_err(|e| {
            AppError::Configuration(format!(
                "Calendar token refresh was rejected ({e}); \
                 run with APP_MODE=provision-calendar to authorize again"
            ))
        })?;

        let refreshed = StoredToken {
            expiry: response.expiry_from(Utc::now()),
            token: response.access_token,
            // Providers usually omit the refresh token on refresh; keep the old one.
            refresh_token: response.refresh_token.or(Some(refresh_token)),
            ..stored
        };
        self.save(&refreshed).await?;
        Ok(refreshed)
    }

    async fn missing_token_error(&self) -> AppError {
        match tokio::fs::try_exists(&self.client_secret_file).await {
            Ok(true) => AppError::Configuration(format!(
                "No calendar token found at {}; run with APP_MODE=provision-calendar to authorize",
                self.token_file.display()
            )),
            _ => AppError::Configuration(format!(
                "Client secret file not found at {}",
                self.client_secret_file.display()
            )),
        }
    }
}

pub async fn write_token_file(path: &Path, token: &StoredToken) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(token)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize token: {e}")))?;
    tokio::fs::write(path, json).await?;
    info!("Calendar token written to {}", path.display());
    Ok(())
}
