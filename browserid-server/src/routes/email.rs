//! Email address information

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use browserid_core::{domain_from_email, PrimaryAuthorityInfo, WellKnownFetcher};
use serde::{Deserialize, Serialize};

use crate::directory::EmailDirectory;
use crate::error::ServerError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddressInfoQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AddressInfoResponse {
    /// The domain vouches for its own addresses
    Primary { auth: String, prov: String },
    /// The domain is bridged through BigTent
    ProxyIdp { auth: String, prov: String },
    Secondary { known: bool },
}

impl AddressInfoResponse {
    fn primary(info: PrimaryAuthorityInfo) -> Self {
        Self::Primary {
            auth: info.authentication_url.into(),
            prov: info.provisioning_url.into(),
        }
    }

    fn proxy_idp(info: PrimaryAuthorityInfo) -> Self {
        Self::ProxyIdp {
            auth: info.authentication_url.into(),
            prov: info.provisioning_url.into(),
        }
    }
}

/// GET /wsapi/address_info
/// Is this a primary, proxied or secondary address, and where does the
/// user go to authenticate
pub async fn address_info<D, F>(
    State(state): State<Arc<AppState<D, F>>>,
    Query(query): Query<AddressInfoQuery>,
) -> Result<Json<AddressInfoResponse>, ServerError>
where
    D: EmailDirectory,
    F: WellKnownFetcher,
{
    let domain = domain_from_email(&query.email)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ServerError::ValidationError("invalid email address".to_string()))?;

    let support = state.primary.check_support(domain).await.map_err(|e| {
        tracing::warn!("error checking \"{}\" for primary support: {}", domain, e);
        ServerError::Unavailable("can't check email address".to_string())
    })?;
    if let Some(info) = support {
        return Ok(Json(AddressInfoResponse::primary(info)));
    }

    if let Some(bigtent) = state.proxy_idps.bigtent_host(&query.email) {
        return match state.primary.check_support(&bigtent).await {
            Ok(Some(info)) => Ok(Json(AddressInfoResponse::proxy_idp(info))),
            Ok(None) => {
                tracing::warn!("BigTent {} is not a primary", bigtent);
                Err(ServerError::Unavailable("BigTent unavailable".to_string()))
            }
            Err(e) => {
                tracing::warn!("error checking BigTent for IdP details: {}", e);
                Err(ServerError::Unavailable("BigTent unavailable".to_string()))
            }
        };
    }

    let known = state.directory.is_known(&query.email)?;
    Ok(Json(AddressInfoResponse::Secondary { known }))
}
