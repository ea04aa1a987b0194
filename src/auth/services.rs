use anyhow::Context;
use tracing::{info, warn};

use super::{dto::Credentials, repo::User};
use crate::{
    error::{AppError, StoreError, EMAIL_EXISTS, INVALID_CREDENTIALS},
    state::AppState,
};

/// Creates a user; the pre-check and the store's unique constraint both map to `Conflict`.
pub async fn register(state: &AppState, creds: Credentials) -> Result<User, AppError> {
    if state.users.find_by_email(&creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Err(AppError::Conflict(EMAIL_EXISTS));
    }

    let passwords = state.passwords.clone();
    let password = creds.password;
    let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .context("password hashing task")??;

    let user = match state.users.insert(&creds.email, &hash).await {
        Ok(u) => u,
        Err(StoreError::UniqueViolation) => {
            warn!(email = %creds.email, "email registered concurrently");
            return Err(AppError::Conflict(EMAIL_EXISTS));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Unknown email and wrong password fail with the same `Unauthorized` message.
pub async fn login(state: &AppState, creds: Credentials) -> Result<(String, User), AppError> {
    let Some(user) = state.users.find_by_email(&creds.email).await? else {
        warn!(email = %creds.email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    };

    let passwords = state.passwords.clone();
    let password = creds.password;
    let stored = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || passwords.verify(&password, &stored))
        .await
        .context("password verify task")??;

    if !ok {
        warn!(email = %creds.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.keys.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}
