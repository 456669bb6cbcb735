//! User administration endpoints.

use super::ApiClient;
use crate::errors::ApiError;
use crate::models::{CreateUserRequest, PasswordReset, User, UserUpdate};

impl ApiClient {
    /// GET /api/admin/users
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/api/admin/users").await
    }

    /// POST /api/admin/users
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, ApiError> {
        self.post("/api/admin/users", request).await
    }

    /// PUT /api/admin/users/:username
    pub async fn update_user(&self, username: &str, update: &UserUpdate) -> Result<User, ApiError> {
        self.put(
            &format!("/api/admin/users/{}", urlencoding::encode(username)),
            update,
        )
        .await
    }

    /// PUT /api/admin/users/:username/password
    pub async fn reset_password(&self, username: &str, new_password: &str) -> Result<(), ApiError> {
        self.command(
            reqwest::Method::PUT,
            &format!("/api/admin/users/{}/password", urlencoding::encode(username)),
            &PasswordReset {
                new_password: new_password.to_string(),
            },
        )
        .await
    }

    /// DELETE /api/admin/users/:username
    pub async fn delete_user(&self, username: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/admin/users/{}", urlencoding::encode(username)))
            .await
    }
}
