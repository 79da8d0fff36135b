use http::Method;
use serde::Serialize;

use crate::{
    error::{ApiError, AppError, Result},
    gateway::RequestBody,
    models::{
        session::{AccessToken, Session, TokenResponse},
        user::User,
    },
    state::AppState,
    validation::auth::{Credentials, RegistrationForm, validate_credentials, validate_registration},
};

/// Where the client stands in the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No usable session is persisted.
    Anonymous,
    /// A login or registration is in flight.
    Authenticating,
    /// A session is persisted.
    Authenticated,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Derives the current auth state from the in-flight flag and the session
/// store. Nothing else tracks it.
pub fn auth_state(state: &AppState) -> Result<AuthState> {
    if state.auth_flow.is_in_flight() {
        return Ok(AuthState::Authenticating);
    }

    if state.session.is_authenticated()? {
        Ok(AuthState::Authenticated)
    } else {
        Ok(AuthState::Anonymous)
    }
}

/// Logs a user in.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `credentials` - The submitted username and password.
///
/// # Returns
///
/// A `Result` containing the new `Session`. The session's user is
/// provisional until the profile is fetched.
pub async fn login(state: &AppState, credentials: &Credentials) -> Result<Session> {
    validate_credentials(credentials)?;
    let _in_flight = state.auth_flow.begin()?;

    establish_session(state, credentials).await
}

/// Registers a new account and logs it in with the same credentials.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `form` - The registration form.
///
/// # Returns
///
/// A `Result` containing the new `Session`. If the account was created but
/// the chained login failed, the error is `AppError::RegisteredButNotLoggedIn`
/// and the account may exist on the server.
pub async fn register(state: &AppState, form: &RegistrationForm) -> Result<Session> {
    validate_registration(form)?;
    let credentials = form.credentials();
    let _in_flight = state.auth_flow.begin()?;

    tracing::info!("📝 Register attempt: {}", credentials.username);

    let body = RequestBody::json(&RegisterRequest {
        username: credentials.username.as_str(),
        password: credentials.password.as_str(),
    })?;
    let _: sonic_rs::Value = state
        .gateway
        .request("/auth/register", Method::POST, body)
        .await?;

    tracing::info!("✅ User registered: {}", credentials.username);

    match establish_session(state, &credentials).await {
        Ok(session) => Ok(session),
        Err(AppError::Api(e)) => Err(AppError::RegisteredButNotLoggedIn(e)),
        Err(e) => Err(e),
    }
}

/// Logs the user out by clearing the persisted session.
///
/// Only a storage failure can make this fail.
pub fn logout(state: &AppState) -> Result<()> {
    state.session.clear()?;
    tracing::info!("👋 Logged out");
    Ok(())
}

async fn establish_session(state: &AppState, credentials: &Credentials) -> Result<Session> {
    tracing::info!("🔐 Login attempt: {}", credentials.username);

    let form = [
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
        ("grant_type", "password"),
    ];
    let token: TokenResponse = state
        .gateway
        .request("/auth/token", Method::POST, RequestBody::Form(&form))
        .await?;

    if token.access_token.trim().is_empty() {
        return Err(ApiError::http(200, "Token endpoint returned an empty access token").into());
    }

    let session = Session {
        token: AccessToken::new(token.access_token),
        user: User::provisional(&credentials.username, &state.config.email_domain),
    };
    state.session.save(&session)?;

    tracing::info!("✅ User logged in: {}", credentials.username);
    Ok(session)
}
