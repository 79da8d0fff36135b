use thiserror::Error;

/// A failure reported by the remote API or by the transport underneath it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, taken from the error body when possible.
    pub message: String,
    /// The HTTP status, absent for transport-level failures.
    pub status: Option<u16>,
}

impl ApiError {
    /// Creates an error for a non-success HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates an error for a request that never produced a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A local validation error. No request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An API error.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The account was created but the chained login failed.
    #[error("Account registered but login failed: {0}")]
    RegisteredButNotLoggedIn(ApiError),

    /// Persisted session state could not be used.
    #[error("Session state error: {0}")]
    State(String),

    /// A submission is already outstanding for the same flow.
    #[error("Request already in progress: {0}")]
    Busy(&'static str),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<sonic_rs::Error> for AppError {
    fn from(e: sonic_rs::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string().trim().to_string())
    }
}

impl AppError {
    /// Returns the API error carried by this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(e) | AppError::RegisteredButNotLoggedIn(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the failure happened before any network call.
    pub fn is_local(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::Busy(_))
    }

    /// Logs the error at a level matching its severity.
    pub fn log(&self) {
        match self {
            AppError::Validation(msg) => {
                tracing::debug!("Validation error: {}", msg);
            }

            AppError::Api(e) => {
                tracing::warn!(status = ?e.status, "API error: {}", e.message);
            }

            AppError::RegisteredButNotLoggedIn(e) => {
                tracing::warn!(
                    status = ?e.status,
                    "Registration succeeded but login failed: {}",
                    e.message
                );
            }

            AppError::State(msg) => {
                tracing::warn!("Session state error: {}", msg);
            }

            AppError::Busy(flow) => {
                tracing::debug!("Flow already in progress: {}", flow);
            }

            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
            }

            AppError::Serialization(msg) => {
                tracing::error!("Serialization error: {}", msg);
            }
        }
    }
}
