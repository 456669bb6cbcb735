//! Generated mission report records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Kind of report the backend can generate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    Weekly,
    EndOfMission,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Weekly => "weekly",
            ReportType::EndOfMission => "end_of_mission",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportType::Weekly => "Weekly report",
            ReportType::EndOfMission => "End of mission report",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "weekly" => Some(ReportType::Weekly),
            "end_of_mission" => Some(ReportType::EndOfMission),
            _ => None,
        }
    }
}

/// A report the backend generated and stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRecord {
    pub id: i64,
    pub mission_id: String,
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub generated_by: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Record for ReportRecord {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request body for generating a report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateReportRequest {
    pub report_type: ReportType,
    pub save_to_overview: bool,
}
