//! Typed client for the Buddy System REST API.
//!
//! [`ApiClient`] owns the cross-cutting request contract: bearer token on every
//! call, redirect to the login page on 401, and one readable message for every
//! other failure. The resource modules add typed endpoint methods on top.

mod announcements;
mod faqs;
mod forms;
mod knowledge;
mod missions;
mod reports;
mod schedule;
mod stations;
mod timesheets;
mod users;

use std::sync::Arc;

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::TokenStore;
use crate::browser::{Browser, Download};
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::CurrentUser;

/// HTTP client shared by every page of a session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<Config>,
    tokens: Arc<dyn TokenStore>,
    browser: Arc<dyn Browser>,
}

impl ApiClient {
    pub fn new(
        config: Arc<Config>,
        tokens: Arc<dyn TokenStore>,
        browser: Arc<dyn Browser>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            tokens,
            browser,
        })
    }

    /// Send the browser to the login page unless a token is stored.
    pub fn check_session(&self) -> bool {
        if self.tokens.get().is_some() {
            return true;
        }
        tracing::info!("No session token; redirecting to login");
        self.browser.navigate(&self.config.login_path);
        false
    }

    /// Send a JSON request. Returns `None` for an empty (e.g. 204) response.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .request(method.clone(), self.config.api_url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "API request");
        self.dispatch(request, path).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        require(self.send::<(), T>(Method::GET, path, None).await?)
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .get(self.config.api_url(path))
            .header(CONTENT_TYPE, "application/json")
            .query(query);

        tracing::debug!(method = "GET", path, "API request");
        require(self.dispatch(request, path).await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        require(self.send(Method::POST, path, Some(body)).await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        require(self.send(Method::PUT, path, Some(body)).await?)
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        require(self.send(Method::PATCH, path, Some(body)).await?)
    }

    /// Send a JSON body for its effect; any response body is ignored.
    pub async fn command<B>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send::<_, serde_json::Value>(method, path, Some(body))
            .await
            .map(|_| ())
    }

    /// DELETE a resource; any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<(), serde_json::Value>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// POST a multipart body.
    ///
    /// Goes through the same auth and error handling as JSON calls but leaves
    /// the content type to the multipart encoder so the boundary is set.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let request = self.http.post(self.config.api_url(path)).multipart(form);

        tracing::debug!(method = "POST", path, "API upload");
        require(self.dispatch(request, path).await?)
    }

    /// Fetch a binary resource for saving.
    pub async fn download(&self, path: &str) -> Result<Download, ApiError> {
        self.download_with_query(path, &[] as &[(&str, &str)]).await
    }

    pub async fn download_with_query<Q>(&self, path: &str, query: &Q) -> Result<Download, ApiError>
    where
        Q: Serialize + ?Sized,
    {
        let request = self.authorized(self.http.get(self.config.api_url(path)).query(query));

        tracing::debug!(method = "GET", path, "API download");
        let response = self.checked(request.send().await?, path).await?;
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        Ok(Download {
            filename: download_filename(&headers, path),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string(),
            bytes: bytes.to_vec(),
        })
    }

    /// GET /api/users/me - The account behind the current session.
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get("/api/users/me").await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        let response = self.authorized(request).send().await?;
        let response = self.checked(response, path).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn checked(&self, response: Response, path: &str) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Session rejected; clearing token and redirecting to login");
            self.tokens.clear();
            self.browser.navigate(&self.config.login_path);
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_response(status.as_u16(), &body);
        tracing::error!(path, status = status.as_u16(), error = %err, "API request failed");
        Err(err)
    }
}

fn require<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Decode("Empty response body".to_string()))
}

/// File name from `Content-Disposition`, else the last path segment.
fn download_filename(headers: &HeaderMap, path: &str) -> String {
    let from_header = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.split(';').map(str::trim).find_map(|part| {
                part.strip_prefix("filename=")
                    .map(|name| name.trim_matches('"').to_string())
            })
        })
        .filter(|name| !name.is_empty());

    from_header.unwrap_or_else(|| {
        path.split('?')
            .next()
            .and_then(|p| p.rsplit('/').find(|segment| !segment.is_empty()))
            .unwrap_or("download")
            .to_string()
    })
}
