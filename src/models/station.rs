//! Station metadata and offload status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// One moored station as shown on the station status table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationStatus {
    pub station_id: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub modem_address: Option<i64>,
    #[serde(default)]
    pub bottom_depth_m: Option<f64>,
    #[serde(default)]
    pub waypoint_number: Option<i64>,
    #[serde(default)]
    pub last_offload_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_offload_by: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub field_season_year: Option<i32>,
}

impl StationStatus {
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }
}

impl Record for StationStatus {
    type Id = String;

    fn id(&self) -> String {
        self.station_id.clone()
    }
}

/// Entry in the station search suggestion list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationSummary {
    pub station_id: String,
    #[serde(default)]
    pub serial_number: Option<String>,
}

/// Request body for editing station metadata.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct StationUpdate {
    pub serial_number: Option<String>,
    pub modem_address: Option<i64>,
    pub bottom_depth_m: Option<f64>,
    pub waypoint_number: Option<i64>,
    pub notes: Option<String>,
}
