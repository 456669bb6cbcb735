//! Mission overview, goal, note and media endpoints.

use reqwest::multipart::Form;
use reqwest::Method;

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{
    GoalRequest, GoalToggle, MediaItem, MediaUpdate, MissionGoal, MissionInfo, MissionNote,
    NoteRequest, OverviewUpdate, UploadedFile,
};

fn mission_path(mission_id: &str, rest: &str) -> String {
    format!("/api/missions/{}{}", urlencoding::encode(mission_id), rest)
}

impl ApiClient {
    /// GET /api/missions/:id/info
    pub async fn mission_info(&self, mission_id: &str) -> Result<MissionInfo, ApiError> {
        self.get(&mission_path(mission_id, "/info")).await
    }

    /// PUT /api/missions/:id/overview
    pub async fn update_overview(
        &self,
        mission_id: &str,
        update: &OverviewUpdate,
    ) -> Result<(), ApiError> {
        self.command(Method::PUT, &mission_path(mission_id, "/overview"), update)
            .await
    }

    /// POST /api/missions/:id/overview/upload_plan - Multipart upload.
    pub async fn upload_plan(&self, mission_id: &str, form: Form) -> Result<UploadedFile, ApiError> {
        self.upload(&mission_path(mission_id, "/overview/upload_plan"), form)
            .await
    }

    /// POST /api/missions/:id/goals
    pub async fn create_goal(
        &self,
        mission_id: &str,
        request: &GoalRequest,
    ) -> Result<(), ApiError> {
        self.command(Method::POST, &mission_path(mission_id, "/goals"), request)
            .await
    }

    /// PATCH /api/missions/:id/goals/:goal_id/toggle
    pub async fn toggle_goal(
        &self,
        mission_id: &str,
        goal_id: i64,
        is_completed: bool,
    ) -> Result<MissionGoal, ApiError> {
        self.patch(
            &mission_path(mission_id, &format!("/goals/{}/toggle", goal_id)),
            &GoalToggle { is_completed },
        )
        .await
    }

    /// DELETE /api/missions/:id/goals/:goal_id
    pub async fn delete_goal(&self, mission_id: &str, goal_id: i64) -> Result<(), ApiError> {
        self.delete(&mission_path(mission_id, &format!("/goals/{}", goal_id)))
            .await
    }

    /// POST /api/missions/:id/notes
    pub async fn create_note(
        &self,
        mission_id: &str,
        request: &NoteRequest,
    ) -> Result<MissionNote, ApiError> {
        self.post(&mission_path(mission_id, "/notes"), request)
            .await
    }

    /// DELETE /api/missions/:id/notes/:note_id
    pub async fn delete_note(&self, mission_id: &str, note_id: i64) -> Result<(), ApiError> {
        self.delete(&mission_path(mission_id, &format!("/notes/{}", note_id)))
            .await
    }

    /// GET /api/missions/:id/media
    pub async fn list_media(&self, mission_id: &str) -> Result<Vec<MediaItem>, ApiError> {
        self.get(&mission_path(mission_id, "/media")).await
    }

    /// POST /api/missions/:id/media/upload - Multipart upload.
    pub async fn upload_media(&self, mission_id: &str, form: Form) -> Result<MediaItem, ApiError> {
        self.upload(&mission_path(mission_id, "/media/upload"), form)
            .await
    }

    /// PUT /api/missions/:id/media/:media_id
    pub async fn update_media(
        &self,
        mission_id: &str,
        media_id: i64,
        update: &MediaUpdate,
    ) -> Result<MediaItem, ApiError> {
        self.put(
            &mission_path(mission_id, &format!("/media/{}", media_id)),
            update,
        )
        .await
    }

    /// DELETE /api/missions/:id/media/:media_id
    pub async fn delete_media(&self, mission_id: &str, media_id: i64) -> Result<(), ApiError> {
        self.delete(&mission_path(mission_id, &format!("/media/{}", media_id)))
            .await
    }
}
