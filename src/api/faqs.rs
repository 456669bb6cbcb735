//! FAQ endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{Faq, FaqRequest, FaqStatusUpdate};

impl ApiClient {
    /// GET /api/faqs
    pub async fn list_faqs(&self) -> Result<Vec<Faq>, ApiError> {
        self.get("/api/faqs").await
    }

    /// POST /api/faqs
    pub async fn create_faq(&self, request: &FaqRequest) -> Result<Faq, ApiError> {
        self.post("/api/faqs", request).await
    }

    /// PUT /api/faqs/:id
    pub async fn update_faq(&self, id: i64, request: &FaqRequest) -> Result<Faq, ApiError> {
        self.put(&format!("/api/faqs/{}", id), request).await
    }

    /// PUT /api/faqs/:id - Only flip the active flag.
    pub async fn set_faq_active(&self, id: i64, is_active: bool) -> Result<Faq, ApiError> {
        self.put(&format!("/api/faqs/{}", id), &FaqStatusUpdate { is_active })
            .await
    }

    /// DELETE /api/faqs/:id
    pub async fn delete_faq(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/faqs/{}", id)).await
    }
}
