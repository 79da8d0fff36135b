use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the signed-in user as cached on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's username.
    pub username: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address. Synthesized at login, not server-verified.
    pub email: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The number of analyses the user has run.
    #[serde(default)]
    pub analysis_count: u32,
    /// Whether this record was built on the client and still awaits a
    /// profile fetch.
    #[serde(default)]
    pub provisional: bool,
}

impl User {
    /// Builds the provisional record used right after login.
    ///
    /// # Arguments
    ///
    /// * `username` - The submitted username.
    /// * `email_domain` - The domain of the placeholder email.
    pub fn provisional(username: &str, email_domain: &str) -> Self {
        Self {
            username: username.to_string(),
            name: username.to_string(),
            email: placeholder_email(username, email_domain),
            created_at: Utc::now(),
            analysis_count: 0,
            provisional: true,
        }
    }

    /// Applies a patch in place.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = created_at;
        }
        if let Some(analysis_count) = patch.analysis_count {
            self.analysis_count = analysis_count;
        }
        if let Some(provisional) = patch.provisional {
            self.provisional = provisional;
        }
    }

    /// Two-letter initials shown next to the profile.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

/// Fields to merge into the cached user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub analysis_count: Option<u32>,
    pub provisional: Option<bool>,
}

/// The profile as returned by `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub analysis_count: Option<u32>,
}

impl ProfileResponse {
    /// Builds the authoritative user record, keeping cached values for
    /// fields the server does not report.
    pub fn into_user(self, cached: Option<&User>, email_domain: &str) -> User {
        let name = self
            .name
            .or_else(|| cached.map(|u| u.name.clone()))
            .unwrap_or_else(|| self.username.clone());
        let email = self
            .email
            .or_else(|| cached.map(|u| u.email.clone()))
            .unwrap_or_else(|| placeholder_email(&self.username, email_domain));
        let analysis_count = self
            .analysis_count
            .or_else(|| cached.map(|u| u.analysis_count))
            .unwrap_or(0);

        User {
            username: self.username,
            name,
            email,
            created_at: self.created_at,
            analysis_count,
            provisional: false,
        }
    }
}

fn placeholder_email(username: &str, email_domain: &str) -> String {
    format!("{}@{}", username, email_domain)
}
