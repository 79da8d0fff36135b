use garde::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{AppError, Result};

/// A username and password as submitted by the user.
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: Zeroizing::new(password.into()),
        }
    }
}

/// The registration form. Checked locally before any request is sent.
#[derive(Validate, Zeroize, ZeroizeOnDrop)]
pub struct RegistrationForm {
    #[garde(custom(not_blank))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(matches(password))]
    pub confirm_password: String,
    #[garde(custom(accepted))]
    pub accept_terms: bool,
}

impl RegistrationForm {
    /// The credentials used for both the registration and the chained login.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.as_str(), self.password.as_str())
    }
}

fn not_blank(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

fn accepted(value: &bool, _: &()) -> garde::Result {
    if !*value {
        return Err(garde::Error::new("terms of use must be accepted"));
    }
    Ok(())
}

/// Validates a registration form.
///
/// # Arguments
///
/// * `form` - The submitted form.
///
/// # Returns
///
/// A `Result<()>`; `AppError::Validation` names every failing field.
pub fn validate_registration(form: &RegistrationForm) -> Result<()> {
    form.validate()?;
    Ok(())
}

/// Validates login credentials.
///
/// # Arguments
///
/// * `credentials` - The submitted credentials.
///
/// # Returns
///
/// A `Result<()>` indicating whether the credentials are usable.
pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    if credentials.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    Ok(())
}
