//! Shift schedule records.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// A pilot shift occupying one or more schedule slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftEvent {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ShiftEvent {
    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Whether the shift overlaps the half-open interval `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

impl Record for ShiftEvent {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for signing up for a slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShiftRequest {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A handoff form submitted for a shift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandoffSummary {
    pub id: i64,
    pub mission_id: String,
    pub submitted_by: String,
    pub submission_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub form_title: Option<String>,
}
