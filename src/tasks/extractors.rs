use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use super::repo::Task;
use crate::{
    auth::{extractors::AuthUser, gate::authorize_owner},
    error::{AppError, TASK_NOT_FOUND},
    state::AppState,
};

/// The `:id` task, loaded only if the authenticated caller authored it.
pub struct OwnedTask(pub Task);

#[async_trait]
impl FromRequestParts<AppState> for OwnedTask {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;

        // an id that is not a UUID cannot name any task
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound(TASK_NOT_FOUND))?;
        let id = Uuid::parse_str(&raw).map_err(|_| AppError::NotFound(TASK_NOT_FOUND))?;

        authorize_owner(state, &identity, id).await.map(OwnedTask)
    }
}
