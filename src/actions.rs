//! Typed routing of user interactions.
//!
//! Rendered controls carry `data-action` and `data-id` attributes. The host
//! turns an interaction into an [`ActionEvent`], and each page parses it into
//! its own closed action enum before dispatching.

use std::fmt::Display;
use std::str::FromStr;

/// A click, submit or input on a page element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionEvent {
    /// The element's `data-action`
    pub action: String,
    /// The element's `data-id`, when it targets a record
    pub id: Option<String>,
    /// The element's current value, for inputs
    pub value: Option<String>,
}

impl ActionEvent {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(action: &str, id: impl Display) -> Self {
        Self {
            action: action.to_string(),
            id: Some(id.to_string()),
            value: None,
        }
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// The target id parsed as `T`.
    pub fn id_as<T: FromStr>(&self) -> Option<T> {
        self.id.as_deref().and_then(|id| id.trim().parse().ok())
    }
}

/// Closed set of actions a page understands.
pub trait PageAction: Sized {
    /// `None` when the event is not meant for this page or lacks its id.
    fn parse(event: &ActionEvent) -> Option<Self>;
}
