//! Report generation and data export endpoints.

use super::ApiClient;
use crate::browser::Download;
use crate::errors::ApiError;
use crate::models::{GenerateReportRequest, ReportRecord};

impl ApiClient {
    /// GET /api/reporting/missions/:id/reports
    pub async fn list_reports(&self, mission_id: &str) -> Result<Vec<ReportRecord>, ApiError> {
        self.get(&format!(
            "/api/reporting/missions/{}/reports",
            urlencoding::encode(mission_id)
        ))
        .await
    }

    /// POST /api/reporting/missions/:id/generate
    pub async fn generate_report(
        &self,
        mission_id: &str,
        request: &GenerateReportRequest,
    ) -> Result<ReportRecord, ApiError> {
        self.post(
            &format!(
                "/api/reporting/missions/{}/generate",
                urlencoding::encode(mission_id)
            ),
            request,
        )
        .await
    }

    /// GET /api/reporting/reports/:id/download
    pub async fn download_report(&self, report_id: i64) -> Result<Download, ApiError> {
        self.download(&format!("/api/reporting/reports/{}/download", report_id))
            .await
    }

    /// DELETE /api/reporting/reports/:id
    pub async fn delete_report(&self, report_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/reporting/reports/{}", report_id))
            .await
    }

    /// GET /api/missions/:id/data/:source/csv
    pub async fn export_sensor_csv(&self, mission_id: &str, source: &str) -> Result<Download, ApiError> {
        self.download(&format!(
            "/api/missions/{}/data/{}/csv",
            urlencoding::encode(mission_id),
            urlencoding::encode(source)
        ))
        .await
    }

    /// GET /api/missions/:id/track.kml?hours_back=
    pub async fn export_track_kml(&self, mission_id: &str, hours_back: u32) -> Result<Download, ApiError> {
        self.download_with_query(
            &format!("/api/missions/{}/track.kml", urlencoding::encode(mission_id)),
            &[("hours_back", hours_back)],
        )
        .await
    }
}
