// Admin session - bearer token state shared by the API client and pages
use crate::application::navigation::{Navigator, Route};
use std::sync::Arc;
use tokio::sync::watch;

/// Persistence for the single `admin_token`.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<String>>;
    fn save(&self, token: Option<&str>) -> anyhow::Result<()>;
}

pub struct Session {
    token: watch::Sender<Option<String>>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let initial = store.load().unwrap_or_else(|e| {
            tracing::warn!("Could not load stored admin token: {}", e);
            None
        });
        let (token, _) = watch::channel(initial);

        Self {
            token,
            store,
            navigator,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn sign_in(&self, token: String) {
        self.persist(Some(&token));
        self.token.send_replace(Some(token));
        tracing::info!("Admin session started");
    }

    /// User-initiated logout; always lands on the login page.
    pub fn logout(&self) {
        self.token.send_replace(None);
        self.persist(None);
        self.navigator.navigate(Route::Login);
    }

    /// Clear the token after the server rejected it.
    ///
    /// The clear is a single atomic take: of any number of concurrent
    /// callers, only the one that removed a token redirects. Returns whether
    /// this call did.
    pub fn expire(&self) -> bool {
        if self.token.send_replace(None).is_none() {
            return false;
        }

        tracing::warn!("Admin token rejected, redirecting to login");
        self.persist(None);
        self.navigator.navigate(Route::Login);
        true
    }

    /// Send the user to the login page without touching the token.
    pub fn require_login(&self) {
        self.navigator.navigate(Route::Login);
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    fn persist(&self, token: Option<&str>) {
        if let Err(e) = self.store.save(token) {
            tracing::error!("Failed to persist admin token: {}", e);
        }
    }
}
