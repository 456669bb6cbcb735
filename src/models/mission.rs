//! Mission overview, goals, notes and media.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Planning documents and comments attached to a mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MissionOverview {
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub weekly_report_url: Option<String>,
    #[serde(default)]
    pub end_of_mission_report_url: Option<String>,
}

/// A checklist goal for a mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionGoal {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Record for MissionGoal {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// A free-form note left by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionNote {
    pub id: i64,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Record for MissionNote {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Everything the mission overview page shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionInfo {
    pub mission_id: String,
    #[serde(default)]
    pub overview: Option<MissionOverview>,
    #[serde(default)]
    pub goals: Vec<MissionGoal>,
    #[serde(default)]
    pub notes: Vec<MissionNote>,
}

/// Request body for saving the overview.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverviewUpdate {
    pub document_url: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalRequest {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalToggle {
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteRequest {
    pub content: String,
}

/// Reference returned by an upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub file_url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Photo or video attached to a mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: i64,
    pub file_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub operation_type: Option<String>,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

fn default_media_type() -> String {
    "photo".to_string()
}

impl MediaItem {
    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }
}

impl Record for MediaItem {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MediaUpdate {
    pub caption: Option<String>,
    pub operation_type: Option<String>,
}
