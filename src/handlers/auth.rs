use crate::{
    error::{AppError, Result},
    handlers::profile::print_profile,
    services::{auth as auth_service, profile as profile_service},
    state::AppState,
    validation::auth::{Credentials, RegistrationForm},
};

/// Handles `geoportal register`.
pub async fn register(state: &AppState, form: RegistrationForm) -> Result<()> {
    let session = match auth_service::register(state, &form).await {
        Ok(session) => session,
        Err(e) => {
            if matches!(e, AppError::RegisteredButNotLoggedIn(_)) {
                eprintln!(
                    "ℹ️ The account may have been created. Try `geoportal login` before registering again."
                );
            }
            return Err(e);
        }
    };

    println!("Registration successful. Welcome, {}!", session.user.name);
    load_profile(state).await;
    Ok(())
}

/// Handles `geoportal login`.
pub async fn login(state: &AppState, credentials: Credentials) -> Result<()> {
    let session = auth_service::login(state, &credentials).await?;

    println!("Login successful. Welcome back, {}!", session.user.name);
    load_profile(state).await;
    Ok(())
}

/// Handles `geoportal logout`.
pub fn logout(state: &AppState) -> Result<()> {
    let was_authenticated = state.session.is_authenticated()?;
    auth_service::logout(state)?;

    if was_authenticated {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

/// Fetches the authoritative profile right after login. A failure is not
/// fatal: the provisional record stays and is flagged as such.
async fn load_profile(state: &AppState) {
    match profile_service::refresh(state).await {
        Ok(user) => print_profile(&user),
        Err(e) => {
            e.log();
            eprintln!("⚠️ Could not load your profile ({}); showing provisional data.", e);
            if let Ok(Some(session)) = state.session.restore() {
                print_profile(&session.user);
            }
        }
    }
}
