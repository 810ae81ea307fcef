use axum::{
    RequestPartsExt,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use epic_server_app::ports::authentication::Identity;

use crate::{AppState, app::ServiceError};

/// The caller, resolved from an `Authorization: Bearer` header.
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ServiceError::Unauthorized("Missing bearer token".to_string()))?;

        match state.app.authentication.verify_token(bearer.token()).await {
            Some(identity) => Ok(Auth(identity)),
            None => {
                log::debug!("Rejected bearer token");
                Err(ServiceError::Unauthorized(
                    "Authentication failed".to_string(),
                ))
            }
        }
    }
}
