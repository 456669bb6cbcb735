//! Timesheet records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Review state of a timesheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    #[default]
    Submitted,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Approved => "approved",
            TimesheetStatus::Rejected => "rejected",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            TimesheetStatus::Submitted => "bg-secondary",
            TimesheetStatus::Approved => "bg-success",
            TimesheetStatus::Rejected => "bg-danger",
        }
    }
}

/// Hours a pilot claims for a pay period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timesheet {
    pub id: i64,
    pub username: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_hours: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: TimesheetStatus,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Record for Timesheet {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for submitting a timesheet.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimesheetRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for an admin decision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimesheetReview {
    pub status: TimesheetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
}
