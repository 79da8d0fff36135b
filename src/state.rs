use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::gateway::Gateway;
use crate::repositories::session::SessionStore;

/// An advisory in-flight flag for one flow.
///
/// A single permit: while it is held, further submissions of the same flow
/// fail fast instead of issuing a duplicate request.
#[derive(Clone)]
pub struct FlowGuard {
    name: &'static str,
    semaphore: Arc<Semaphore>,
}

impl FlowGuard {
    /// Creates a new `FlowGuard`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Marks the flow as in flight until the returned permit is dropped.
    pub fn begin(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore.try_acquire().map_err(|_| {
            tracing::debug!("⏳ {} flow already in progress", self.name);
            AppError::Busy(self.name)
        })
    }

    /// Whether a submission is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The persisted session.
    pub session: SessionStore,
    /// The only component allowed to talk to the API.
    pub gateway: Gateway,
    /// In-flight flag of login/registration.
    pub auth_flow: FlowGuard,
    /// In-flight flag of the analyze flow.
    pub upload_flow: FlowGuard,
    /// In-flight flag of the search flows.
    pub search_flow: FlowGuard,
}

impl AppState {
    /// Creates a new `AppState` whose session lives in `config.session_dir`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let session = SessionStore::on_disk(config.session_dir.clone());
        tracing::debug!("✅ Session store at {}", config.session_dir.display());
        Self::with_session_store(config, session)
    }

    /// Creates a new `AppState` around an existing session store.
    pub fn with_session_store(config: &Config, session: SessionStore) -> Result<Self> {
        let gateway = Gateway::new(config, session.clone())?;
        tracing::debug!("✅ Gateway initialized for {}", config.api_url);

        Ok(AppState {
            config: config.clone(),
            session,
            gateway,
            auth_flow: FlowGuard::new("auth"),
            upload_flow: FlowGuard::new("upload"),
            search_flow: FlowGuard::new("search"),
        })
    }
}
