//! Transient notifications.
//!
//! Toasts are stacked inside the page's `toastContainer` element and expire on
//! their own after the configured lifetime.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::dom::{escape_html, SharedDocument};

/// Id of the element toasts are rendered into.
pub const CONTAINER_ID: &str = "toastContainer";

/// Colour of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
    Warning,
    Info,
}

impl Severity {
    fn class(&self) -> &'static str {
        match self {
            Severity::Success => "bg-success",
            Severity::Danger => "bg-danger",
            Severity::Warning => "bg-warning",
            Severity::Info => "bg-info",
        }
    }
}

/// A toast currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

#[derive(Clone)]
pub struct Toaster {
    document: SharedDocument,
    ttl: Duration,
    live: Arc<Mutex<Vec<Toast>>>,
}

impl Toaster {
    pub fn new(document: SharedDocument, ttl: Duration) -> Self {
        Self {
            document,
            ttl,
            live: Arc::default(),
        }
    }

    /// Show a toast. Returns its id, or `None` when the page has no container.
    pub fn show(&self, message: &str, severity: Severity) -> Option<Uuid> {
        if !self.document.lock().contains(CONTAINER_ID) {
            tracing::warn!(message, "Toast container not found; dropping notification");
            return None;
        }

        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.to_string(),
            severity,
        };
        let id = toast.id;
        self.live.lock().push(toast);
        self.render();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let toaster = self.clone();
                let ttl = self.ttl;
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    toaster.dismiss(id);
                });
            }
            Err(_) => tracing::debug!(%id, "No runtime; toast will not expire on its own"),
        }

        Some(id)
    }

    pub fn success(&self, message: &str) -> Option<Uuid> {
        self.show(message, Severity::Success)
    }

    pub fn danger(&self, message: &str) -> Option<Uuid> {
        self.show(message, Severity::Danger)
    }

    /// Remove a toast before it expires. Unknown ids are ignored.
    pub fn dismiss(&self, id: Uuid) {
        let removed = {
            let mut live = self.live.lock();
            let before = live.len();
            live.retain(|t| t.id != id);
            live.len() != before
        };
        if removed {
            self.render();
        }
    }

    /// Toasts currently on screen, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        self.live.lock().clone()
    }

    fn render(&self) {
        let html: String = self.live.lock().iter().map(render_toast).collect();
        self.document.lock().set_html(CONTAINER_ID, html);
    }
}

fn render_toast(toast: &Toast) -> String {
    format!(
        r#"<div id="toast-{id}" class="toast show align-items-center text-white {class} border-0" role="alert" aria-live="assertive"><div class="d-flex"><div class="toast-body">{message}</div><button type="button" class="btn-close btn-close-white me-2 m-auto" data-action="dismiss-toast" data-id="{id}" aria-label="Close"></button></div></div>"#,
        id = toast.id,
        class = toast.severity.class(),
        message = escape_html(&toast.message),
    )
}
