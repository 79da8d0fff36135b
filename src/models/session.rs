use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::user::User;

/// The bearer token issued by `POST /auth/token`.
///
/// Wiped from memory on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Represents the authenticated identity held by the client.
///
/// The token and the user are always written and cleared together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The bearer token.
    pub token: AccessToken,
    /// The cached user record.
    pub user: User,
}

/// The body of a successful `POST /auth/token` (and `POST /auth/register`).
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
