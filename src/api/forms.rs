//! Operational form endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{FormSubmission, FormTemplate, SubmittedForm};

impl ApiClient {
    /// GET /api/forms/templates/:form_type
    pub async fn form_template(&self, form_type: &str) -> Result<FormTemplate, ApiError> {
        self.get(&format!("/api/forms/templates/{}", urlencoding::encode(form_type)))
            .await
    }

    /// POST /api/forms/:mission_id/submit
    pub async fn submit_form(
        &self,
        mission_id: &str,
        submission: &FormSubmission,
    ) -> Result<SubmittedForm, ApiError> {
        self.post(
            &format!("/api/forms/{}/submit", urlencoding::encode(mission_id)),
            submission,
        )
        .await
    }

    /// GET /api/forms/:mission_id/mine
    pub async fn my_submissions(&self, mission_id: &str) -> Result<Vec<SubmittedForm>, ApiError> {
        self.get(&format!("/api/forms/{}/mine", urlencoding::encode(mission_id)))
            .await
    }

    /// GET /api/forms/submissions/:id
    pub async fn submission(&self, id: i64) -> Result<SubmittedForm, ApiError> {
        self.get(&format!("/api/forms/submissions/{}", id)).await
    }
}
