//! Shift schedule endpoints.

use chrono::NaiveDate;

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{HandoffSummary, ShiftEvent, ShiftRequest};

impl ApiClient {
    /// GET /api/schedule/events?start=&end= - `end` is exclusive.
    pub async fn list_shifts(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ShiftEvent>, ApiError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        self.get_with_query(
            "/api/schedule/events",
            &[("start", start.as_str()), ("end", end.as_str())],
        )
        .await
    }

    /// POST /api/schedule/shifts
    pub async fn sign_up_shift(&self, request: &ShiftRequest) -> Result<ShiftEvent, ApiError> {
        self.post("/api/schedule/shifts", request).await
    }

    /// DELETE /api/schedule/shifts/:id
    pub async fn unassign_shift(&self, shift_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/schedule/shifts/{}", shift_id))
            .await
    }

    /// GET /api/schedule/shifts/:id/handoffs
    pub async fn shift_handoffs(&self, shift_id: i64) -> Result<Vec<HandoffSummary>, ApiError> {
        self.get(&format!("/api/schedule/shifts/{}/handoffs", shift_id))
            .await
    }
}
