//! Announcement endpoints.

use reqwest::Method;

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{Acknowledgement, AcknowledgementReceipt, Announcement, AnnouncementRequest};

impl ApiClient {
    /// GET /api/announcements/all - Every announcement, archived ones included.
    pub async fn list_all_announcements(&self) -> Result<Vec<Announcement>, ApiError> {
        self.get("/api/announcements/all").await
    }

    /// GET /api/announcements/active - Announcements the current user has not acknowledged.
    pub async fn list_active_announcements(&self) -> Result<Vec<Announcement>, ApiError> {
        self.get("/api/announcements/active").await
    }

    /// POST /api/announcements - Publish an announcement.
    pub async fn create_announcement(
        &self,
        request: &AnnouncementRequest,
    ) -> Result<Announcement, ApiError> {
        self.post("/api/announcements", request).await
    }

    /// PUT /api/announcements/:id - Edit an announcement.
    pub async fn update_announcement(
        &self,
        id: i64,
        request: &AnnouncementRequest,
    ) -> Result<(), ApiError> {
        self.command(Method::PUT, &format!("/api/announcements/{}", id), request)
            .await
    }

    /// DELETE /api/announcements/:id - Archive an announcement.
    pub async fn archive_announcement(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/announcements/{}", id)).await
    }

    /// POST /api/announcements/:id/acknowledge
    pub async fn acknowledge_announcement(
        &self,
        id: i64,
    ) -> Result<AcknowledgementReceipt, ApiError> {
        self.post(
            &format!("/api/announcements/{}/acknowledge", id),
            &serde_json::json!({}),
        )
        .await
    }

    /// GET /api/announcements/:id/acknowledgements
    pub async fn list_acknowledgements(&self, id: i64) -> Result<Vec<Acknowledgement>, ApiError> {
        self.get(&format!("/api/announcements/{}/acknowledgements", id))
            .await
    }
}
