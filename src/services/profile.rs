use crate::{
    error::{AppError, Result},
    gateway::ApiRequest,
    models::{
        session::Session,
        user::{ProfileResponse, User},
    },
    state::AppState,
};

/// Replaces the cached user with the authoritative record from
/// `GET /users/me`.
///
/// On failure the cached record, possibly still provisional, is left as is
/// and the error is returned.
pub async fn refresh(state: &AppState) -> Result<User> {
    let cached = state
        .session
        .restore()?
        .ok_or_else(|| AppError::State("no active session".to_string()))?;

    let profile: ProfileResponse = state.gateway.send(ApiRequest::get("/users/me")).await?;
    let user = profile.into_user(Some(&cached.user), &state.config.email_domain);

    state.session.save(&Session {
        token: cached.token,
        user: user.clone(),
    })?;

    tracing::info!("✅ Profile refreshed for {}", user.username);
    Ok(user)
}
