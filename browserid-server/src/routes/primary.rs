//! Primary IdP authentication endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use browserid_core::{domain_from_email, WellKnownFetcher};
use serde::{Deserialize, Serialize};

use crate::directory::EmailDirectory;
use crate::error::ServerError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AuthWithAssertionRequest {
    pub assertion: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthWithAssertionResponse {
    pub success: bool,
    pub email: String,
}

/// POST /wsapi/auth_with_assertion
/// Authenticate a user via a primary IdP assertion addressed to this
/// service
pub async fn auth_with_assertion<D, F>(
    State(state): State<Arc<AppState<D, F>>>,
    Json(req): Json<AuthWithAssertionRequest>,
) -> Result<Json<AuthWithAssertionResponse>, ServerError>
where
    D: EmailDirectory,
    F: WellKnownFetcher,
{
    let identity = state
        .verifier
        .verify_assertion(&req.assertion, &state.audience())
        .await
        .map_err(|e| ServerError::AssertionRejected(e.to_string()))?;

    let email_domain = domain_from_email(&identity.email).ok_or_else(|| {
        ServerError::AssertionRejected(format!("invalid email '{}'", identity.email))
    })?;

    // A third party may only vouch for a domain that sends its users there
    if identity.issuer != email_domain
        && !state
            .primary
            .delegates_authority(email_domain, &identity.issuer)
            .await
    {
        return Err(ServerError::AssertionRejected(format!(
            "issuer '{}' may not speak for '{}'",
            identity.issuer, email_domain
        )));
    }

    state.directory.add_email(&identity.email)?;
    tracing::info!(
        email = %identity.email,
        issuer = %identity.issuer,
        "authenticated with assertion"
    );

    Ok(Json(AuthWithAssertionResponse {
        success: true,
        email: identity.email,
    }))
}
