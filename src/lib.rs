//! Client for the photo upload and geo-search portal API.
//!
//! Flow controllers in [`services`] sequence calls through the [`gateway`],
//! persist the session through [`repositories::session`], and return typed
//! outcomes. [`handlers`] render those outcomes for the command line.

pub mod config;
pub mod error;
pub mod gateway;
pub mod state;

pub mod models {
    pub mod analysis;
    pub mod file;
    pub mod search;
    pub mod session;
    pub mod timestamp;
    pub mod user;
}

pub mod repositories {
    pub mod session;
}

pub mod services {
    pub mod auth;
    pub mod profile;
    pub mod search;
    pub mod upload;
}

pub mod handlers {
    pub mod auth;
    pub mod profile;
    pub mod search;
    pub mod upload;
}

pub mod validation {
    pub mod auth;
    pub mod search;
    pub mod upload;
}

pub use config::Config;
pub use error::{ApiError, AppError, Result};
pub use state::AppState;
