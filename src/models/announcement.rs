//! Announcement model matching the backend announcement records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Category of an announcement; drives the badge colour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementType {
    #[default]
    General,
    Maintenance,
    Urgent,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::General => "general",
            AnnouncementType::Maintenance => "maintenance",
            AnnouncementType::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "general" => Some(AnnouncementType::General),
            "maintenance" => Some(AnnouncementType::Maintenance),
            "urgent" => Some(AnnouncementType::Urgent),
            _ => None,
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            AnnouncementType::General => "bg-info",
            AnnouncementType::Maintenance => "bg-warning",
            AnnouncementType::Urgent => "bg-danger",
        }
    }
}

/// A broadcast message shown to every operator until acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub announcement_type: AnnouncementType,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub acknowledgement_count: u32,
}

fn default_active() -> bool {
    true
}

impl Record for Announcement {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for creating or editing an announcement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnnouncementRequest {
    pub content: String,
    pub announcement_type: AnnouncementType,
}

/// Who acknowledged an announcement, and when.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Acknowledgement {
    pub username: String,
    pub acknowledged_at: DateTime<Utc>,
}

/// Response to acknowledging an announcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcknowledgementReceipt {
    pub announcement_id: i64,
    pub username: String,
    pub acknowledged_at: DateTime<Utc>,
}
