use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{AppError, INVALID_TOKEN, NOT_OWNER, TASK_NOT_FOUND},
    state::AppState,
    tasks::repo::Task,
};

/// Caller identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Extracts `<token>` from `Bearer <token>`.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme == "Bearer" && !token.is_empty() && !token.contains(' ')).then_some(token)
}

/// Every failure mode yields the same `Unauthorized("Invalid token")`.
pub async fn authenticate(state: &AppState, header: Option<&str>) -> Result<Identity, AppError> {
    let token = header
        .and_then(parse_bearer)
        .ok_or(AppError::Unauthorized(INVALID_TOKEN))?;

    let claims = state.keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid token");
        AppError::from(e)
    })?;

    // Tokens must not outlive the account they were issued for.
    let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = %claims.sub, "token subject no longer exists");
        AppError::Unauthorized(INVALID_TOKEN)
    })?;

    Ok(Identity {
        id: user.id,
        email: user.email,
    })
}

/// Existence is checked before ownership, so a non-owner asking for a
/// missing task gets `NotFound` rather than `Forbidden`.
pub async fn authorize_owner(
    state: &AppState,
    identity: &Identity,
    task_id: Uuid,
) -> Result<Task, AppError> {
    let task = state
        .tasks
        .find_by_id(task_id)
        .await?
        .ok_or(AppError::NotFound(TASK_NOT_FOUND))?;

    if task.author_id != identity.id {
        warn!(user_id = %identity.id, task_id = %task_id, "task owner mismatch");
        return Err(AppError::Forbidden(NOT_OWNER));
    }

    Ok(task)
}
