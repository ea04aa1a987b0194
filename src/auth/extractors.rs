use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::gate::{authenticate, Identity};
use crate::{error::AppError, state::AppState};

/// Resolves the caller from the `Authorization` header.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        authenticate(state, header).await.map(AuthUser)
    }
}
