//! Station metadata endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{StationStatus, StationSummary, StationUpdate};

impl ApiClient {
    /// GET /api/station_metadata/
    pub async fn list_stations(&self) -> Result<Vec<StationStatus>, ApiError> {
        self.get("/api/station_metadata/").await
    }

    /// GET /api/station_metadata/search?q=
    pub async fn search_stations(&self, query: &str) -> Result<Vec<StationSummary>, ApiError> {
        self.get_with_query("/api/station_metadata/search", &[("q", query)])
            .await
    }

    /// GET /api/station_metadata/:id
    pub async fn station(&self, station_id: &str) -> Result<StationStatus, ApiError> {
        self.get(&format!(
            "/api/station_metadata/{}",
            urlencoding::encode(station_id)
        ))
        .await
    }

    /// PUT /api/station_metadata/:id
    pub async fn update_station(
        &self,
        station_id: &str,
        update: &StationUpdate,
    ) -> Result<StationStatus, ApiError> {
        self.put(
            &format!("/api/station_metadata/{}", urlencoding::encode(station_id)),
            update,
        )
        .await
    }
}
