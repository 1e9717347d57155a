// Login service - Credential submission for the admin session
use crate::application::analyzer_api::AnalyzerApi;
use crate::application::navigation::Route;
use crate::application::session::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

const GENERIC_FAILURE: &str = "An error occurred during login";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("A login request is already in progress")]
    InProgress,
    #[error("Invalid response from server")]
    MissingToken,
    #[error("{0}")]
    Rejected(String),
}

pub struct LoginService {
    api: Arc<dyn AnalyzerApi>,
    session: Arc<Session>,
    loading: AtomicBool,
}

impl LoginService {
    pub fn new(api: Arc<dyn AnalyzerApi>, session: Arc<Session>) -> Self {
        Self {
            api,
            session,
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Submit credentials once. On success the API client has stored the
    /// token and the user is sent to the dashboard.
    pub async fn submit(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LoginError::InProgress);
        }

        let result = self.api.login(username, password).await;
        self.loading.store(false, Ordering::Release);

        match result {
            Ok(response) if response.admin_token.is_some() => {
                tracing::info!("Logged in as {}", username);
                self.session.navigate(Route::Dashboard);
                Ok(())
            }
            Ok(_) => Err(LoginError::MissingToken),
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                Err(LoginError::Rejected(
                    e.server_message().unwrap_or(GENERIC_FAILURE).to_string(),
                ))
            }
        }
    }
}
