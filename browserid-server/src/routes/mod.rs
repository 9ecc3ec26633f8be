//! HTTP routes

mod email;
mod primary;
mod verify;

use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use browserid_core::WellKnownFetcher;
use tower_http::trace::TraceLayer;

use crate::directory::EmailDirectory;
use crate::state::AppState;

pub use email::{AddressInfoQuery, AddressInfoResponse};
pub use primary::{AuthWithAssertionRequest, AuthWithAssertionResponse};
pub use verify::VerifyRequest;

/// Create the router with all routes
pub fn create_router<D, F>(state: Arc<AppState<D, F>>) -> Router
where
    D: EmailDirectory + 'static,
    F: WellKnownFetcher + 'static,
{
    Router::new()
        .route("/ping.txt", get(ping))
        .route("/wsapi/address_info", get(email::address_info))
        .route("/wsapi/auth_with_assertion", post(primary::auth_with_assertion))
        .route("/verify", post(verify::verify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /ping.txt
async fn ping() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "k.")
}
