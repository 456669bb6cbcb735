//! Wave Glider Buddy System frontend.
//!
//! Page controllers for the operator and admin pages, written against a typed
//! REST client and a host-neutral document model.

pub mod actions;
pub mod api;
pub mod auth;
pub mod browser;
pub mod cache;
pub mod config;
pub mod dom;
pub mod errors;
pub mod export;
pub mod generation;
pub mod models;
pub mod pages;
pub mod search;
pub mod telemetry;
pub mod toast;
pub mod widgets;

use std::sync::Arc;

use api::ApiClient;
use auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use browser::Browser;
use config::Config;
use dom::SharedDocument;
use errors::{ApiError, ConfigError};
use pages::{Page, Route};
use toast::Toaster;

/// Everything a page controller needs, built fresh for every navigation.
#[derive(Clone)]
pub struct PageContext {
    pub config: Arc<Config>,
    pub api: ApiClient,
    pub document: SharedDocument,
    pub toasts: Toaster,
    pub browser: Arc<dyn Browser>,
}

impl PageContext {
    pub fn new(
        config: Arc<Config>,
        tokens: Arc<dyn TokenStore>,
        browser: Arc<dyn Browser>,
        document: SharedDocument,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(Arc::clone(&config), tokens, Arc::clone(&browser))?;
        let toasts = Toaster::new(document.clone(), config.toast_ttl);

        Ok(Self {
            config,
            api,
            document,
            toasts,
            browser,
        })
    }

    /// Surface a failed user action.
    ///
    /// A rejected session is not shown: the client has already redirected to
    /// the login page.
    pub fn report(&self, what: &str, err: &ApiError) {
        if matches!(err, ApiError::Unauthorized) {
            return;
        }
        tracing::error!(error = %err, "{}", what);
        self.toasts
            .danger(&format!("{}: {}", what, err.user_message()));
    }

    pub fn set_html(&self, id: &str, html: impl Into<String>) {
        self.document.lock().set_html(id, html);
    }

    /// Trimmed input value.
    pub fn value(&self, id: &str) -> String {
        self.document.lock().trimmed_value(id)
    }
}

/// Token store selected by configuration: file-backed when a path is set.
pub fn token_store(config: &Config) -> Arc<dyn TokenStore> {
    match &config.token_path {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(MemoryTokenStore::new()),
    }
}

/// Long-lived state of one browser session.
///
/// Pages come and go with every navigation; the configuration, token store
/// and host outlive them.
pub struct Session {
    config: Arc<Config>,
    tokens: Arc<dyn TokenStore>,
    browser: Arc<dyn Browser>,
}

impl Session {
    pub fn new(config: Arc<Config>, tokens: Arc<dyn TokenStore>, browser: Arc<dyn Browser>) -> Self {
        Self {
            config,
            tokens,
            browser,
        }
    }

    /// Load configuration, install logging and pick the token store.
    pub fn from_env(browser: Arc<dyn Browser>) -> Result<Self, ConfigError> {
        let config = Config::from_env()?;
        telemetry::init(&config);

        let tokens = token_store(&config);
        if config.token_path.is_none() {
            tracing::warn!("No WGB_TOKEN_PATH configured; the session token is kept in memory only");
        }

        Ok(Self::new(Arc::new(config), tokens, browser))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Build the controller for `route`, rendering into `document`.
    ///
    /// Returns `Ok(None)` without touching the backend when no token is stored;
    /// the browser has then been sent to the login page.
    pub fn open(
        &self,
        route: &Route,
        document: SharedDocument,
    ) -> Result<Option<Box<dyn Page>>, ApiError> {
        let ctx = PageContext::new(
            Arc::clone(&self.config),
            Arc::clone(&self.tokens),
            Arc::clone(&self.browser),
            document,
        )?;
        if !ctx.api.check_session() {
            return Ok(None);
        }
        Ok(Some(pages::open(route, ctx)))
    }
}

#[cfg(test)]
mod tests;
