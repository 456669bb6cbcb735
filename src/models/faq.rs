//! FAQ model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// A question/answer pair maintained by admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Faq {
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("General")
    }
}

impl Record for Faq {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for creating or fully updating an FAQ.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FaqRequest {
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
}

/// Partial update used by the active toggle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FaqStatusUpdate {
    pub is_active: bool,
}
