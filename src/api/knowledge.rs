//! Knowledge base endpoints.

use reqwest::multipart::Form;

use super::ApiClient;
use crate::browser::Download;
use crate::errors::ApiError;
use crate::models::{KnowledgeDocument, KnowledgeSearchHit};

impl ApiClient {
    /// GET /api/knowledge/documents - Optionally limited to one category.
    pub async fn list_documents(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<KnowledgeDocument>, ApiError> {
        match category {
            Some(category) => {
                self.get_with_query("/api/knowledge/documents", &[("category", category)])
                    .await
            }
            None => self.get("/api/knowledge/documents").await,
        }
    }

    /// POST /api/knowledge/documents - Multipart upload.
    pub async fn upload_document(&self, form: Form) -> Result<KnowledgeDocument, ApiError> {
        self.upload("/api/knowledge/documents", form).await
    }

    /// DELETE /api/knowledge/documents/:id
    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/knowledge/documents/{}", id))
            .await
    }

    /// GET /api/knowledge/documents/:id/download
    pub async fn download_document(&self, id: i64) -> Result<Download, ApiError> {
        self.download(&format!("/api/knowledge/documents/{}/download", id))
            .await
    }

    /// GET /api/knowledge/search?q=
    pub async fn search_documents(&self, query: &str) -> Result<Vec<KnowledgeSearchHit>, ApiError> {
        self.get_with_query("/api/knowledge/search", &[("q", query)])
            .await
    }
}
