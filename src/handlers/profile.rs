use crate::{
    error::Result,
    models::user::User,
    services::profile as profile_service,
    state::AppState,
};

/// Handles `geoportal whoami`.
pub async fn whoami(state: &AppState) -> Result<()> {
    if state.session.restore()?.is_none() {
        println!("Not logged in.");
        return Ok(());
    }

    match profile_service::refresh(state).await {
        Ok(user) => {
            print_profile(&user);
            Ok(())
        }
        Err(e) => {
            eprintln!("⚠️ Could not refresh your profile; showing cached data.");
            if let Some(session) = state.session.restore()? {
                print_profile(&session.user);
            }
            Err(e)
        }
    }
}

pub fn print_profile(user: &User) {
    println!();
    println!("  [{}] {}", user.initials(), user.name);
    println!("  Username:     {}", user.username);
    println!("  Email:        {}", user.email);
    println!("  Member since: {}", user.created_at.format("%-d %B %Y"));
    println!("  Analyses:     {}", user.analysis_count);
    if user.provisional {
        println!("  (provisional: not yet confirmed by the server)");
    }
}
