//! Timesheet endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::browser::Download;
use crate::errors::ApiError;
use crate::models::{Timesheet, TimesheetRequest, TimesheetReview};

impl ApiClient {
    /// GET /api/timesheets/mine
    pub async fn my_timesheets(&self) -> Result<Vec<Timesheet>, ApiError> {
        self.get("/api/timesheets/mine").await
    }

    /// POST /api/timesheets
    pub async fn submit_timesheet(&self, request: &TimesheetRequest) -> Result<Timesheet, ApiError> {
        self.post("/api/timesheets", request).await
    }

    /// GET /api/admin/timesheets?status= - `all` lists every status.
    pub async fn review_queue(&self, status: &str) -> Result<Vec<Timesheet>, ApiError> {
        self.get_with_query("/api/admin/timesheets", &[("status", status)])
            .await
    }

    /// PUT /api/admin/timesheets/:id/status
    pub async fn review_timesheet(
        &self,
        id: i64,
        review: &TimesheetReview,
    ) -> Result<(), ApiError> {
        self.command(Method::PUT, &format!("/api/admin/timesheets/{}/status", id), review)
            .await
    }

    /// GET /api/admin/timesheets/export?status=
    pub async fn export_timesheets(&self, status: &str) -> Result<Download, ApiError> {
        self.download_with_query("/api/admin/timesheets/export", &[("status", status)])
            .await
    }
}
