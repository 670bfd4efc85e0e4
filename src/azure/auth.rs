//! Azure AD authentication
//!
//! Acquires a bearer token for the management plane using the OAuth2
//! client-credentials flow against the Microsoft identity platform.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// Default authority for token acquisition
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";

/// Bearer credential for the run.
/// Acquired once at startup; the core does not track expiry.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Token acquisition failure as reported by the identity platform
#[derive(Debug, Deserialize)]
pub struct AuthFailure {
    pub error: String,
    pub error_description: String,
    #[serde(default)]
    pub correlation_id: String,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Authentication failure: {} ({})",
            self.error, self.error_description
        )
    }
}

impl std::error::Error for AuthFailure {}

/// Obtain an access token via the client-credentials flow.
///
/// `authority` is the identity platform base URL; tests point it at a mock
/// server, production callers pass [`DEFAULT_AUTHORITY`].
pub async fn obtain_access_token(
    authority: &Url,
    tenant_name: &str,
    client_id: &str,
    client_secret: &str,
    scope: &str,
) -> Result<AccessToken> {
    tracing::info!("Attempting to obtain an access token...");

    let token_endpoint = authority
        .join(&format!("{}/oauth2/v2.0/token", tenant_name))
        .context("Invalid tenant name for token endpoint")?;

    let response = reqwest::Client::new()
        .post(token_endpoint)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", scope),
        ])
        .send()
        .await
        .context("Failed to reach the token endpoint")?;

    let body = response
        .text()
        .await
        .context("Failed to read token response body")?;

    if let Ok(token) = serde_json::from_str::<AccessToken>(&body) {
        tracing::info!("Access token successfully acquired");
        return Ok(token);
    }

    let failure: AuthFailure =
        serde_json::from_str(&body).context("Failed to parse token error response")?;
    tracing::error!("Authentication failure");
    tracing::error!("Error was: {}", failure.error);
    tracing::error!("Error description was: {}", failure.error_description);
    tracing::error!("Error correlation_id was: {}", failure.correlation_id);

    Err(failure.into())
}
