//! Assertion verification endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use browserid_core::WellKnownFetcher;
use serde::Deserialize;

use crate::directory::EmailDirectory;
use crate::state::AppState;
use crate::verifier::VerificationResult;

/// Request body for verification
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    /// The backed assertion to verify (certificate~assertion format)
    pub assertion: Option<String>,

    /// The expected audience (relying party origin)
    pub audience: Option<String>,
}

/// POST /verify
///
/// Verify a backed identity assertion on behalf of a relying party.
pub async fn verify<D, F>(
    State(state): State<Arc<AppState<D, F>>>,
    Json(req): Json<VerifyRequest>,
) -> (StatusCode, Json<VerificationResult>)
where
    D: EmailDirectory,
    F: WellKnownFetcher,
{
    let (Some(assertion), Some(audience)) = (req.assertion, req.audience) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerificationResult::failure(
                "need assertion and audience".to_string(),
            )),
        );
    };

    let result = match state.verifier.verify_assertion(&assertion, &audience).await {
        Ok(identity) => VerificationResult::success(identity, audience),
        Err(e) => {
            if e.is_assertion_policy() {
                tracing::info!("assertion verification failed: {}", e);
            } else {
                tracing::warn!("assertion verification failed: {}", e);
            }
            VerificationResult::failure(e.to_string())
        }
    };

    (StatusCode::OK, Json(result))
}
