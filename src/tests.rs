//! Integration tests for the page controllers against a mock backend.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::actions::ActionEvent;
use crate::auth::{bearer_value, FileTokenStore, MemoryTokenStore, TokenStore};
use crate::browser::{Dialog, HeadlessBrowser};
use crate::config::Config;
use crate::dom::{Document, SelectedFile};
use crate::errors::ApiError;
use crate::models::Role;
use crate::pages::{self, Page, Route};
use crate::toast::CONTAINER_ID;
use crate::widgets::GridCalendar;
use crate::{PageContext, Session};

/// A request the mock backend received.
#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl RecordedRequest {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Request body is not JSON")
    }
}

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    content_type: &'static str,
    disposition: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(status: StatusCode, body: &Value) -> Self {
        Reply {
            status,
            content_type: "application/json",
            disposition: None,
            body: body.to_string().into_bytes(),
        }
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// Scripted backend. Replies registered for a route are served in order and
/// the last one repeats. Unknown routes answer 404.
#[derive(Clone, Default)]
struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    async fn serve(&self) -> String {
        let app = Router::new()
            .fallback(respond)
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        let reply = Reply::json(StatusCode::from_u16(status).unwrap(), &body);
        self.push(method, path, reply);
    }

    fn json(&self, method: Method, path: &str, body: Value) {
        self.on(method, path, 200, body);
    }

    fn no_content(&self, method: Method, path: &str) {
        let reply = Reply {
            status: StatusCode::NO_CONTENT,
            content_type: "application/json",
            disposition: None,
            body: Vec::new(),
        };
        self.push(method, path, reply);
    }

    /// Serve a file attachment for GET `path`.
    fn file(&self, path: &str, content_type: &'static str, filename: Option<&str>, body: &[u8]) {
        let reply = Reply {
            status: StatusCode::OK,
            content_type,
            disposition: filename.map(|name| format!(r#"attachment; filename="{}""#, name)),
            body: body.to_vec(),
        };
        self.push(Method::GET, path, reply);
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

async fn respond(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = backend.state.lock();
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });

    let reply = match state.routes.get_mut(&(method, uri.path().to_string())) {
        Some(replies) if replies.len() > 1 => replies.pop_front(),
        Some(replies) => replies.front().cloned(),
        None => None,
    };

    match reply {
        Some(reply) => {
            let mut response =
                (reply.status, [(header::CONTENT_TYPE, reply.content_type)], reply.body)
                    .into_response();
            if let Some(disposition) = reply.disposition {
                response.headers_mut().insert(
                    header::CONTENT_DISPOSITION,
                    disposition.parse().expect("Invalid header value"),
                );
            }
            response
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({"detail": "Not Found"}).to_string(),
        )
            .into_response(),
    }
}

/// Test fixture: a page context wired to a fresh mock backend.
struct TestFixture {
    backend: MockBackend,
    browser: Arc<HeadlessBrowser>,
    tokens: Arc<MemoryTokenStore>,
    ctx: PageContext,
}

impl TestFixture {
    async fn new(elements: &[&str]) -> Self {
        let backend = MockBackend::default();
        let base_url = backend.serve().await;

        let mut ids = vec![CONTAINER_ID];
        ids.extend_from_slice(elements);
        let document = Document::with_elements(&ids).into_shared();

        let browser = Arc::new(HeadlessBrowser::new());
        let tokens = Arc::new(MemoryTokenStore::with_token("test-token"));
        let ctx = PageContext::new(
            Arc::new(test_config(base_url)),
            tokens.clone(),
            browser.clone(),
            document,
        )
        .expect("Failed to build page context");

        TestFixture {
            backend,
            browser,
            tokens,
            ctx,
        }
    }

    fn html(&self, id: &str) -> String {
        self.ctx
            .document
            .lock()
            .html(id)
            .unwrap_or_default()
            .to_string()
    }

    fn value(&self, id: &str) -> String {
        self.ctx.document.lock().value(id)
    }

    fn set_value(&self, id: &str, value: &str) {
        self.ctx.document.lock().set_value(id, value);
    }

    fn toasts(&self) -> Vec<String> {
        self.ctx
            .toasts
            .visible()
            .into_iter()
            .map(|t| t.message)
            .collect()
    }
}

fn test_config(api_base_url: String) -> Config {
    Config {
        api_base_url,
        toast_ttl: Duration::from_secs(60),
        search_debounce: Duration::from_millis(50),
        request_timeout: Duration::from_secs(5),
        log_level: "warn".to_string(),
        ..Config::default()
    }
}

fn faq(id: i64, question: &str, is_active: bool) -> Value {
    json!({
        "id": id,
        "question": question,
        "answer": "Check the **float** first.",
        "category": "Operations",
        "tags": ["float"],
        "is_active": is_active,
    })
}

fn announcement(id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "announcement_type": "general",
        "created_by": "admin",
        "created_at": "2026-10-19T08:00:00Z",
        "is_active": true,
        "acknowledgement_count": 0,
    })
}

fn shift(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "start": "2026-10-21T03:00:00",
        "end": "2026-10-21T06:00:00",
        "username": username,
    })
}

fn mission_info(goals: Value, notes: Value) -> Value {
    json!({
        "mission_id": "m203",
        "overview": {"document_url": null, "comments": "Transit to station"},
        "goals": goals,
        "notes": notes,
    })
}

fn goal(id: i64, description: &str, is_completed: bool) -> Value {
    json!({"id": id, "description": description, "is_completed": is_completed})
}

fn note(id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "created_by": "pilot1",
        "created_at": "2026-10-19T08:00:00Z",
    })
}

fn media_item(id: i64, caption: &str) -> Value {
    json!({
        "id": id,
        "file_url": "/static/media/launch.jpg",
        "caption": caption,
        "media_type": "photo",
        "uploaded_by": "pilot1",
        "uploaded_at": "2026-10-19T08:00:00Z",
    })
}

fn timesheet(id: i64) -> Value {
    json!({
        "id": id,
        "username": "pilot1",
        "period_start": "2026-10-12",
        "period_end": "2026-10-18",
        "total_hours": 12.5,
        "status": "submitted",
        "submitted_at": "2026-10-19T08:00:00Z",
    })
}

/// Assert a request went out as an authorized multipart upload.
fn assert_multipart(request: &RecordedRequest) {
    let content_type = request
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "got content type {:?}",
        content_type
    );
    assert_eq!(
        request.headers.get(header::AUTHORIZATION).unwrap(),
        bearer_value("test-token").as_str()
    );
}

fn body_text(request: &RecordedRequest) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

// ============================================================================
// API client
// ============================================================================

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let fixture = TestFixture::new(&[]).await;
    fixture.backend.json(Method::GET, "/api/faqs", json!([]));

    let faqs = fixture.ctx.api.list_faqs().await.unwrap();
    assert!(faqs.is_empty());

    let requests = fixture.backend.requests_to(Method::GET, "/api/faqs");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get(header::AUTHORIZATION).unwrap(),
        bearer_value("test-token").as_str()
    );
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_redirects() {
    let fixture = TestFixture::new(&[]).await;
    for path in ["/api/faqs", "/api/admin/users", "/api/announcements/all"] {
        fixture
            .backend
            .on(Method::GET, path, 401, json!({"detail": "Not authenticated"}));
    }

    fixture.tokens.set("test-token");
    assert_eq!(fixture.ctx.api.list_faqs().await, Err(ApiError::Unauthorized));
    assert_eq!(fixture.tokens.get(), None);

    fixture.tokens.set("test-token");
    assert_eq!(
        fixture.ctx.api.list_users().await.unwrap_err(),
        ApiError::Unauthorized
    );
    assert_eq!(fixture.tokens.get(), None);

    fixture.tokens.set("test-token");
    assert_eq!(
        fixture.ctx.api.list_all_announcements().await.unwrap_err(),
        ApiError::Unauthorized
    );
    assert_eq!(fixture.tokens.get(), None);

    assert_eq!(
        fixture.browser.navigations(),
        vec!["/login.html", "/login.html", "/login.html"]
    );
}

#[tokio::test]
async fn test_unauthorized_clears_file_token() {
    let temp_dir = TempDir::new().unwrap();
    let token_path = temp_dir.path().join("session");

    let backend = MockBackend::default();
    let base_url = backend.serve().await;
    backend.on(Method::GET, "/api/users/me", 401, json!({"detail": "Expired"}));

    let tokens = Arc::new(FileTokenStore::new(&token_path));
    tokens.set("stale-token");
    let browser = Arc::new(HeadlessBrowser::new());
    let ctx = PageContext::new(
        Arc::new(test_config(base_url)),
        tokens.clone(),
        browser.clone(),
        Document::new().into_shared(),
    )
    .unwrap();

    assert_eq!(ctx.api.current_user().await.unwrap_err(), ApiError::Unauthorized);
    assert_eq!(tokens.get(), None);
    assert_eq!(browser.current_url().as_deref(), Some("/login.html"));
}

#[tokio::test]
async fn test_missing_token_redirects_before_any_request() {
    let fixture = TestFixture::new(&[]).await;
    fixture.tokens.clear();

    assert!(!fixture.ctx.api.check_session());
    assert_eq!(fixture.browser.current_url().as_deref(), Some("/login.html"));
    assert!(fixture.backend.requests().is_empty());
}

#[tokio::test]
async fn test_error_bodies_are_normalized() {
    let fixture = TestFixture::new(&[]).await;
    fixture.backend.on(
        Method::POST,
        "/api/faqs",
        422,
        json!({"detail": [
            {"loc": ["body", "question"], "msg": "field required"},
            {"loc": ["body", "answer"], "msg": "field required"}
        ]}),
    );
    fixture
        .backend
        .on(Method::GET, "/api/faqs", 500, json!({"detail": "Database unavailable"}));

    let request = crate::models::FaqRequest {
        question: String::new(),
        answer: String::new(),
        category: None,
        tags: vec![],
        is_active: true,
    };
    assert_eq!(
        fixture.ctx.api.create_faq(&request).await.unwrap_err(),
        ApiError::Validation("question: field required; answer: field required".to_string())
    );

    assert_eq!(
        fixture.ctx.api.list_faqs().await.unwrap_err(),
        ApiError::Http {
            status: 500,
            message: "Database unavailable".to_string()
        }
    );

    let missing = fixture.ctx.api.list_users().await.unwrap_err();
    assert_eq!(missing.status(), Some(404));
    assert_eq!(missing.user_message(), "Not Found");
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ctx = PageContext::new(
        Arc::new(test_config(format!("http://{}", addr))),
        Arc::new(MemoryTokenStore::with_token("test-token")),
        Arc::new(HeadlessBrowser::new()),
        Document::new().into_shared(),
    )
    .unwrap();

    let err = ctx.api.list_faqs().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    assert!(err.user_message().starts_with("Network error"));
}

#[tokio::test]
async fn test_empty_delete_response_is_success() {
    let fixture = TestFixture::new(&[]).await;
    fixture.backend.no_content(Method::DELETE, "/api/faqs/4");

    fixture.ctx.api.delete_faq(4).await.unwrap();
    assert_eq!(fixture.backend.count(Method::DELETE, "/api/faqs/4"), 1);
}

#[tokio::test]
async fn test_updates_accept_no_content() {
    let fixture = TestFixture::new(&[]).await;
    fixture.backend.no_content(Method::PUT, "/api/announcements/11");
    fixture
        .backend
        .no_content(Method::PUT, "/api/missions/m203/overview");
    fixture
        .backend
        .no_content(Method::POST, "/api/missions/m203/goals");
    fixture
        .backend
        .no_content(Method::PUT, "/api/admin/timesheets/4/status");

    let api = &fixture.ctx.api;
    api.update_announcement(
        11,
        &crate::models::AnnouncementRequest {
            content: "New".to_string(),
            announcement_type: Default::default(),
        },
    )
    .await
    .unwrap();
    api.update_overview(
        "m203",
        &crate::models::OverviewUpdate {
            document_url: None,
            comments: Some("On station".to_string()),
        },
    )
    .await
    .unwrap();
    api.create_goal(
        "m203",
        &crate::models::GoalRequest {
            description: "Recover glider".to_string(),
        },
    )
    .await
    .unwrap();
    api.review_timesheet(
        4,
        &crate::models::TimesheetReview {
            status: crate::models::TimesheetStatus::Approved,
            reviewer_notes: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(fixture.backend.requests().len(), 4);
}

#[tokio::test]
async fn test_path_segments_are_percent_encoded() {
    let fixture = TestFixture::new(&[]).await;
    fixture.backend.json(
        Method::GET,
        "/api/station_metadata/A%2FB",
        json!({"station_id": "A/B"}),
    );

    let station = fixture.ctx.api.station("A/B").await.unwrap();

    assert_eq!(station.station_id, "A/B");
    assert_eq!(
        fixture
            .backend
            .count(Method::GET, "/api/station_metadata/A%2FB"),
        1
    );
}

// ============================================================================
// FAQs
// ============================================================================

const FAQ_ELEMENTS: &[&str] = &[
    pages::faqs::LIST,
    pages::faqs::SEARCH,
    pages::faqs::CATEGORY_FILTER,
    pages::faqs::STATUS_FILTER,
    pages::faqs::MODAL,
    pages::faqs::MODAL_TITLE,
    pages::faqs::FORM_ERROR,
];

#[tokio::test]
async fn test_faq_empty_list() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture.backend.json(Method::GET, "/api/faqs", json!([]));

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;

    assert!(page.faqs().is_empty());
    assert!(fixture
        .html(pages::faqs::LIST)
        .contains("No FAQs found. Create your first FAQ!"));
}

#[tokio::test]
async fn test_faq_status_filter_hides_inactive() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/faqs",
        json!([faq(1, "How do I reset the float?", false)]),
    );

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;
    assert!(fixture.html(pages::faqs::LIST).contains("How do I reset the float?"));

    fixture.set_value(pages::faqs::STATUS_FILTER, "active");
    page.handle(&ActionEvent::new("filter")).await;

    assert_eq!(page.faqs().len(), 1);
    assert!(page.visible().is_empty());
    assert!(fixture
        .html(pages::faqs::LIST)
        .contains("No FAQs match the current filters."));
    assert_eq!(fixture.backend.count(Method::GET, "/api/faqs"), 1);
}

#[tokio::test]
async fn test_faq_delete_requires_confirmation() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/faqs", json!([faq(3, "Where is the manual?", true)]));

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.browser.answer_confirm(false);
    page.handle(&ActionEvent::with_id("delete", 3)).await;

    assert_eq!(
        fixture.browser.dialogs(),
        vec![Dialog::Confirm(
            "Are you sure you want to delete this FAQ?".to_string()
        )]
    );
    assert_eq!(fixture.backend.count(Method::DELETE, "/api/faqs/3"), 0);
    assert_eq!(page.faqs().len(), 1);
}

#[tokio::test]
async fn test_faq_failed_delete_keeps_item() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/faqs", json!([faq(3, "Where is the manual?", true)]));
    fixture
        .backend
        .on(Method::DELETE, "/api/faqs/3", 500, json!({"detail": "Database unavailable"}));

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.browser.answer_confirm(true);
    page.handle(&ActionEvent::with_id("delete", 3)).await;

    assert_eq!(fixture.backend.count(Method::DELETE, "/api/faqs/3"), 1);
    assert_eq!(page.faqs().len(), 1);
    assert!(fixture.html(pages::faqs::LIST).contains("Where is the manual?"));
    assert!(fixture
        .toasts()
        .contains(&"Failed to delete FAQ: Database unavailable".to_string()));
}

#[tokio::test]
async fn test_faq_delete_reloads_list() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/faqs", json!([faq(3, "Where is the manual?", true)]));
    fixture.backend.json(Method::GET, "/api/faqs", json!([]));
    fixture.backend.no_content(Method::DELETE, "/api/faqs/3");

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.browser.answer_confirm(true);
    page.handle(&ActionEvent::with_id("delete", 3)).await;

    assert!(page.faqs().is_empty());
    assert_eq!(fixture.backend.count(Method::GET, "/api/faqs"), 2);
    assert!(fixture.toasts().contains(&"FAQ deleted.".to_string()));
}

#[tokio::test]
async fn test_faq_load_after_expired_session_shows_nothing() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture
        .backend
        .on(Method::GET, "/api/faqs", 401, json!({"detail": "Not authenticated"}));

    let mut page = pages::faqs::FaqPage::new(fixture.ctx.clone());
    page.load().await;

    assert!(fixture.toasts().is_empty());
    assert!(!fixture.html(pages::faqs::LIST).contains("Error loading"));
    assert_eq!(fixture.browser.current_url().as_deref(), Some("/login.html"));
}

// ============================================================================
// Announcements
// ============================================================================

const ANNOUNCEMENT_ELEMENTS: &[&str] = &[
    pages::announcements::LIST,
    pages::announcements::CONTENT_INPUT,
    pages::announcements::TYPE_INPUT,
    pages::announcements::FORM_ERROR,
    pages::announcements::EDIT_MODAL,
    pages::announcements::EDIT_CONTENT,
    pages::announcements::EDIT_TYPE,
    pages::announcements::EDIT_ERROR,
    pages::announcements::ACKS_LIST,
];

#[tokio::test]
async fn test_announcement_create_posts_and_reloads() {
    let fixture = TestFixture::new(ANNOUNCEMENT_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/announcements/all", json!([]));
    fixture.backend.json(
        Method::GET,
        "/api/announcements/all",
        json!([announcement(11, "Status update")]),
    );
    fixture.backend.json(
        Method::POST,
        "/api/announcements",
        announcement(11, "Status update"),
    );

    let mut page = pages::announcements::AnnouncementsPage::new(fixture.ctx.clone());
    page.load().await;
    assert!(fixture.html(pages::announcements::LIST).contains("No announcements yet."));

    fixture.set_value(pages::announcements::CONTENT_INPUT, "  Status update ");
    fixture.set_value(pages::announcements::TYPE_INPUT, "general");
    page.handle(&ActionEvent::new("create")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/announcements");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json(),
        json!({"content": "Status update", "announcement_type": "general"})
    );

    assert_eq!(fixture.value(pages::announcements::CONTENT_INPUT), "");
    assert_eq!(page.announcements().len(), 1);
    assert_eq!(fixture.backend.count(Method::GET, "/api/announcements/all"), 2);
    assert!(fixture.html(pages::announcements::LIST).contains("Status update"));
}

#[tokio::test]
async fn test_blank_announcement_is_rejected_locally() {
    let fixture = TestFixture::new(ANNOUNCEMENT_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/announcements/all", json!([]));

    let mut page = pages::announcements::AnnouncementsPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.set_value(pages::announcements::CONTENT_INPUT, "   ");
    page.handle(&ActionEvent::new("create")).await;

    assert!(fixture
        .html(pages::announcements::FORM_ERROR)
        .contains("Announcement content cannot be empty."));
    assert_eq!(fixture.backend.count(Method::POST, "/api/announcements"), 0);
}

#[tokio::test]
async fn test_announcement_edit_with_no_content_reply_reloads() {
    let fixture = TestFixture::new(ANNOUNCEMENT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/announcements/all",
        json!([announcement(11, "Old")]),
    );
    fixture.backend.json(
        Method::GET,
        "/api/announcements/all",
        json!([announcement(11, "New")]),
    );
    fixture.backend.no_content(Method::PUT, "/api/announcements/11");

    let mut page = pages::announcements::AnnouncementsPage::new(fixture.ctx.clone());
    page.load().await;

    page.handle(&ActionEvent::with_id("edit", 11)).await;
    assert_eq!(fixture.value(pages::announcements::EDIT_CONTENT), "Old");
    assert!(fixture
        .ctx
        .document
        .lock()
        .is_visible(pages::announcements::EDIT_MODAL));

    fixture.set_value(pages::announcements::EDIT_CONTENT, "New");
    page.handle(&ActionEvent::new("save-edit")).await;

    let puts = fixture
        .backend
        .requests_to(Method::PUT, "/api/announcements/11");
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts[0].json(),
        json!({"content": "New", "announcement_type": "general"})
    );
    assert_eq!(fixture.backend.count(Method::GET, "/api/announcements/all"), 2);
    assert_eq!(fixture.toasts(), vec!["Announcement updated.".to_string()]);
    assert_eq!(page.announcements()[0].content, "New");
    assert!(!fixture
        .ctx
        .document
        .lock()
        .is_visible(pages::announcements::EDIT_MODAL));
}

#[tokio::test]
async fn test_announcement_archive_requires_confirmation() {
    let fixture = TestFixture::new(ANNOUNCEMENT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/announcements/all",
        json!([announcement(11, "Status update")]),
    );
    fixture.backend.no_content(Method::DELETE, "/api/announcements/11");

    let mut page = pages::announcements::AnnouncementsPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.browser.answer_confirm(false);
    page.handle(&ActionEvent::with_id("archive", 11)).await;
    assert_eq!(
        fixture.backend.count(Method::DELETE, "/api/announcements/11"),
        0
    );

    fixture.browser.answer_confirm(true);
    page.handle(&ActionEvent::with_id("archive", 11)).await;

    assert_eq!(
        fixture.browser.dialogs(),
        vec![
            Dialog::Confirm("Are you sure you want to archive this announcement?".to_string()),
            Dialog::Confirm("Are you sure you want to archive this announcement?".to_string()),
        ]
    );
    assert_eq!(
        fixture.backend.count(Method::DELETE, "/api/announcements/11"),
        1
    );
    assert_eq!(fixture.backend.count(Method::GET, "/api/announcements/all"), 2);
    assert!(fixture
        .toasts()
        .contains(&"Announcement archived.".to_string()));
}

#[tokio::test]
async fn test_banner_acknowledge_removes_item() {
    let fixture = TestFixture::new(&[pages::announcements::BANNER]).await;
    fixture.backend.json(
        Method::GET,
        "/api/announcements/active",
        json!([announcement(5, "Glider recovery at noon"), announcement(6, "New SOP")]),
    );
    fixture.backend.json(
        Method::POST,
        "/api/announcements/5/acknowledge",
        json!({
            "announcement_id": 5,
            "username": "pilot1",
            "acknowledged_at": "2026-10-19T09:00:00Z"
        }),
    );

    let mut banner = pages::announcements::AnnouncementBanner::new(fixture.ctx.clone());
    banner.load().await;
    banner.handle(&ActionEvent::with_id("acknowledge", 5)).await;

    assert_eq!(banner.active().len(), 1);
    assert_eq!(banner.active()[0].id, 6);
    assert!(!fixture
        .html(pages::announcements::BANNER)
        .contains("Glider recovery at noon"));
    assert_eq!(
        fixture.backend.count(Method::GET, "/api/announcements/active"),
        1
    );
}

// ============================================================================
// Stations
// ============================================================================

const STATION_ELEMENTS: &[&str] = &[
    pages::stations::TABLE_BODY,
    pages::stations::SEARCH,
    pages::stations::COUNT,
    pages::stations::LOOKUP,
    pages::stations::SUGGESTIONS,
    pages::stations::METADATA,
    pages::stations::EDIT_MODAL,
    pages::stations::EDIT_ERROR,
];

fn stations() -> Value {
    json!([
        {"station_id": "M2-A", "serial_number": "300434", "status": "deployed"},
        {"station_id": "M3-B", "serial_number": "300512", "status": "recovered"}
    ])
}

#[tokio::test]
async fn test_station_pick_fetches_metadata_once() {
    let fixture = TestFixture::new(STATION_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/station_metadata/", stations());
    fixture.backend.json(
        Method::GET,
        "/api/station_metadata/M2-A",
        json!({"station_id": "M2-A", "serial_number": "300434", "bottom_depth_m": 88.5}),
    );

    let mut page = pages::stations::StationStatusPage::new(fixture.ctx.clone());
    page.load().await;
    assert_eq!(fixture.html(pages::stations::COUNT), "2 of 2 stations");

    page.handle(&ActionEvent::new("lookup").value("M2")).await;
    page.handle(&ActionEvent::with_id("pick-station", "M2-A")).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        fixture
            .backend
            .count(Method::GET, "/api/station_metadata/M2-A"),
        1
    );
    assert_eq!(
        fixture
            .backend
            .count(Method::GET, "/api/station_metadata/search"),
        0
    );
    assert_eq!(fixture.value(pages::stations::LOOKUP), "M2-A");
    assert_eq!(fixture.html(pages::stations::SUGGESTIONS), "");
    assert!(fixture.html(pages::stations::METADATA).contains("M2-A"));
}

#[tokio::test]
async fn test_station_lookup_suggests_then_pick() {
    let fixture = TestFixture::new(STATION_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/station_metadata/", stations());
    fixture.backend.json(
        Method::GET,
        "/api/station_metadata/search",
        json!([
            {"station_id": "M2-A", "serial_number": "300434"},
            {"station_id": "M2-B", "serial_number": "300435"}
        ]),
    );
    fixture.backend.json(
        Method::GET,
        "/api/station_metadata/M2-B",
        json!({"station_id": "M2-B", "serial_number": "300435"}),
    );

    let mut page = pages::stations::StationStatusPage::new(fixture.ctx.clone());
    page.load().await;

    page.handle(&ActionEvent::new("lookup").value("M2")).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let searches = fixture
        .backend
        .requests_to(Method::GET, "/api/station_metadata/search");
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query.as_deref(), Some("q=M2"));
    let suggestions = fixture.html(pages::stations::SUGGESTIONS);
    assert!(suggestions.contains("M2-A"));
    assert!(suggestions.contains("M2-B"));

    page.handle(&ActionEvent::with_id("pick-station", "M2-B")).await;

    assert_eq!(
        fixture
            .backend
            .count(Method::GET, "/api/station_metadata/M2-B"),
        1
    );
    assert_eq!(fixture.value(pages::stations::LOOKUP), "M2-B");
    assert_eq!(fixture.html(pages::stations::SUGGESTIONS), "");
    assert!(fixture.html(pages::stations::METADATA).contains("300435"));
}

#[tokio::test]
async fn test_station_filter_updates_count() {
    let fixture = TestFixture::new(STATION_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/station_metadata/", stations());

    let mut page = pages::stations::StationStatusPage::new(fixture.ctx.clone());
    page.load().await;

    page.handle(&ActionEvent::new("filter").value("m3")).await;
    assert_eq!(fixture.html(pages::stations::COUNT), "1 of 2 stations");
    assert!(!fixture.html(pages::stations::TABLE_BODY).contains("M2-A"));

    page.handle(&ActionEvent::new("filter").value("zzz")).await;
    assert!(fixture
        .html(pages::stations::TABLE_BODY)
        .contains("No stations match your search."));
}

// ============================================================================
// Knowledge base
// ============================================================================

const KNOWLEDGE_ELEMENTS: &[&str] = &[
    pages::knowledge_base::LIST,
    pages::knowledge_base::SEARCH,
    pages::knowledge_base::SEARCH_RESULTS,
    pages::knowledge_base::UPLOAD_MODAL,
    pages::knowledge_base::UPLOAD_STATUS,
];

#[tokio::test]
async fn test_search_input_is_debounced() {
    let fixture = TestFixture::new(KNOWLEDGE_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/knowledge/documents", json!([]));
    fixture.backend.json(
        Method::GET,
        "/api/knowledge/search",
        json!([{"document_id": 3, "title": "Rover battery swap", "snippet": "Swap the pack"}]),
    );

    let mut page = pages::knowledge_base::KnowledgeBasePage::new(fixture.ctx.clone());
    page.load().await;

    for query in ["ro", "rov", "rover"] {
        page.handle(&ActionEvent::new("search").value(query)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let searches = fixture
        .backend
        .requests_to(Method::GET, "/api/knowledge/search");
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].query.as_deref(), Some("q=rover"));
    assert!(fixture
        .html(pages::knowledge_base::SEARCH_RESULTS)
        .contains("Rover battery swap"));
}

#[tokio::test]
async fn test_short_search_clears_results() {
    let fixture = TestFixture::new(KNOWLEDGE_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/knowledge/documents", json!([]));

    let mut page = pages::knowledge_base::KnowledgeBasePage::new(fixture.ctx.clone());
    page.load().await;
    assert!(fixture
        .html(pages::knowledge_base::LIST)
        .contains("No documents found."));

    page.handle(&ActionEvent::new("search").value("ro")).await;
    page.handle(&ActionEvent::new("search").value("r")).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(fixture.backend.count(Method::GET, "/api/knowledge/search"), 0);
    assert_eq!(fixture.html(pages::knowledge_base::SEARCH_RESULTS), "");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected_locally() {
    let fixture = TestFixture::new(KNOWLEDGE_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/knowledge/documents", json!([]));

    let mut page = pages::knowledge_base::KnowledgeBasePage::new(fixture.ctx.clone());
    page.load().await;

    fixture.set_value(pages::knowledge_base::DOC_TITLE, "Pilot handbook");
    page.handle(&ActionEvent::new("upload")).await;

    assert!(fixture
        .html(pages::knowledge_base::UPLOAD_STATUS)
        .contains("Please enter a title and select one file."));
    assert_eq!(
        fixture.backend.count(Method::POST, "/api/knowledge/documents"),
        0
    );
}

#[tokio::test]
async fn test_document_upload_is_multipart() {
    let fixture = TestFixture::new(KNOWLEDGE_ELEMENTS).await;
    let uploaded = json!({
        "id": 9,
        "title": "Pilot handbook",
        "category": "general",
        "file_name": "handbook.pdf",
        "file_size": 4,
        "uploaded_by": "admin",
        "uploaded_at": "2026-10-19T08:00:00Z",
    });
    fixture
        .backend
        .json(Method::GET, "/api/knowledge/documents", json!([]));
    fixture.backend.json(
        Method::GET,
        "/api/knowledge/documents",
        json!([uploaded.clone()]),
    );
    fixture
        .backend
        .json(Method::POST, "/api/knowledge/documents", uploaded);

    let mut page = pages::knowledge_base::KnowledgeBasePage::new(fixture.ctx.clone());
    page.load().await;

    {
        let mut document = fixture.ctx.document.lock();
        document.set_value(pages::knowledge_base::DOC_TITLE, "Pilot handbook");
        document.set_files(
            pages::knowledge_base::DOC_FILE,
            vec![SelectedFile::new("handbook.pdf", "application/pdf", b"%PDF".to_vec())],
        );
    }
    page.handle(&ActionEvent::new("upload")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/knowledge/documents");
    assert_eq!(posts.len(), 1);
    assert_multipart(&posts[0]);
    let body = body_text(&posts[0]);
    assert!(body.contains(r#"name="title""#));
    assert!(body.contains("Pilot handbook"));
    assert!(body.contains(r#"filename="handbook.pdf""#));
    assert!(body.contains("%PDF"));

    assert!(fixture
        .ctx
        .document
        .lock()
        .files(pages::knowledge_base::DOC_FILE)
        .is_empty());
    assert!(fixture.toasts().contains(&"Document uploaded.".to_string()));
    assert!(fixture
        .html(pages::knowledge_base::LIST)
        .contains("Pilot handbook"));
}

// ============================================================================
// Schedule
// ============================================================================

fn schedule_fixture_page(fixture: &TestFixture) -> pages::schedule::SchedulePage {
    let calendar = GridCalendar::new(
        fixture.ctx.document.clone(),
        pages::schedule::CALENDAR_ELEMENT,
    );
    pages::schedule::SchedulePage::starting_on(
        fixture.ctx.clone(),
        Box::new(calendar),
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(),
    )
}

const SCHEDULE_ELEMENTS: &[&str] = &[
    pages::schedule::CALENDAR_ELEMENT,
    pages::schedule::DETAILS,
    pages::schedule::RANGE_LABEL,
];

#[tokio::test]
async fn test_schedule_loads_current_week() {
    let fixture = TestFixture::new(SCHEDULE_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/users/me",
        json!({"username": "pilot1", "role": "pilot"}),
    );
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([shift(7, "pilot1")]));

    let mut page = schedule_fixture_page(&fixture);
    page.load().await;

    let loads = fixture
        .backend
        .requests_to(Method::GET, "/api/schedule/events");
    assert_eq!(loads.len(), 1);
    assert_eq!(
        loads[0].query.as_deref(),
        Some("start=2026-10-19&end=2026-10-26")
    );
    assert_eq!(page.events().len(), 1);
    assert_eq!(page.current_user().unwrap().username, "pilot1");

    page.handle(&ActionEvent::new("next")).await;
    assert_eq!(
        page.window_start(),
        NaiveDate::from_ymd_opt(2026, 10, 26).unwrap()
    );
    assert_eq!(fixture.backend.count(Method::GET, "/api/users/me"), 1);
}

#[tokio::test]
async fn test_schedule_sign_up_for_empty_slot() {
    let fixture = TestFixture::new(SCHEDULE_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/users/me",
        json!({"username": "pilot1", "role": "pilot"}),
    );
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([]));
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([shift(7, "pilot1")]));
    fixture
        .backend
        .json(Method::POST, "/api/schedule/shifts", shift(7, "pilot1"));

    let mut page = schedule_fixture_page(&fixture);
    page.load().await;

    fixture.browser.answer_confirm(true);
    page.handle(&ActionEvent::with_id("select-cell", "2026-10-21|1"))
        .await;

    assert_eq!(
        fixture.browser.dialogs(),
        vec![Dialog::Confirm(
            "Sign up for 03:00-06:00 on 2026-10-21?".to_string()
        )]
    );
    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/schedule/shifts");
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].json(),
        json!({"start": "2026-10-21T03:00:00", "end": "2026-10-21T06:00:00"})
    );
    assert_eq!(page.events().len(), 1);
    assert!(fixture.toasts().contains(&"Signed up for shift.".to_string()));
}

#[tokio::test]
async fn test_schedule_unassign_own_shift() {
    let fixture = TestFixture::new(SCHEDULE_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/users/me",
        json!({"username": "pilot1", "role": "pilot"}),
    );
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([shift(7, "pilot1")]));
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([]));
    fixture
        .backend
        .no_content(Method::DELETE, "/api/schedule/shifts/7");

    let mut page = schedule_fixture_page(&fixture);
    page.load().await;

    fixture.browser.answer_confirm(true);
    page.handle(&ActionEvent::with_id("select-event", 7)).await;

    assert_eq!(
        fixture.browser.dialogs(),
        vec![Dialog::Confirm("Unassign this shift?".to_string())]
    );
    assert_eq!(
        fixture.backend.count(Method::DELETE, "/api/schedule/shifts/7"),
        1
    );
    assert!(page.events().is_empty());
}

#[tokio::test]
async fn test_schedule_other_pilots_shift_shows_details() {
    let fixture = TestFixture::new(SCHEDULE_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/users/me",
        json!({"username": "pilot1", "role": "pilot"}),
    );
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([shift(8, "pilot2")]));
    fixture
        .backend
        .json(Method::GET, "/api/schedule/shifts/8/handoffs", json!([]));

    let mut page = schedule_fixture_page(&fixture);
    page.load().await;
    page.handle(&ActionEvent::with_id("select-event", 8)).await;

    assert!(fixture.browser.dialogs().is_empty());
    assert_eq!(
        fixture.backend.count(Method::DELETE, "/api/schedule/shifts/8"),
        0
    );
    assert!(fixture
        .html(pages::schedule::DETAILS)
        .contains("No handoff forms submitted for this shift."));
}

#[tokio::test]
async fn test_schedule_expired_session_skips_events() {
    let fixture = TestFixture::new(SCHEDULE_ELEMENTS).await;
    fixture.backend.on(
        Method::GET,
        "/api/users/me",
        401,
        json!({"detail": "Not authenticated"}),
    );
    fixture
        .backend
        .json(Method::GET, "/api/schedule/events", json!([]));

    let mut page = schedule_fixture_page(&fixture);
    page.load().await;

    assert_eq!(fixture.backend.count(Method::GET, "/api/schedule/events"), 0);
    assert_eq!(fixture.browser.navigations(), vec!["/login.html"]);
    assert!(fixture.toasts().is_empty());
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_role_change_patches_row() {
    let fixture = TestFixture::new(&[
        pages::users::TABLE_BODY,
        pages::users::SEARCH,
        pages::users::CREATE_MODAL,
        pages::users::FORM_ERROR,
    ])
    .await;
    fixture.backend.json(
        Method::GET,
        "/api/admin/users",
        json!([
            {"username": "pilot1", "email": "p1@example.org", "role": "pilot"},
            {"username": "pilot2", "email": "p2@example.org", "role": "pilot"}
        ]),
    );
    fixture.backend.json(
        Method::PUT,
        "/api/admin/users/pilot1",
        json!({"username": "pilot1", "email": "p1@example.org", "role": "admin"}),
    );

    let mut page = pages::users::UsersPage::new(fixture.ctx.clone());
    page.load().await;
    assert_eq!(fixture.value(&pages::users::role_select_id("pilot1")), "pilot");

    fixture.set_value(&pages::users::role_select_id("pilot1"), "admin");
    page.handle(&ActionEvent::with_id("save-role", "pilot1")).await;

    let puts = fixture
        .backend
        .requests_to(Method::PUT, "/api/admin/users/pilot1");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].json(), json!({"role": "admin"}));

    assert_eq!(page.users()[0].role, Role::Admin);
    assert_eq!(page.users()[1].role, Role::Pilot);
    assert_eq!(fixture.backend.count(Method::GET, "/api/admin/users"), 1);
    assert!(fixture
        .toasts()
        .contains(&"Role updated for pilot1.".to_string()));
}

#[tokio::test]
async fn test_short_password_reset_is_rejected() {
    let fixture = TestFixture::new(&[pages::users::TABLE_BODY]).await;
    fixture.backend.json(
        Method::GET,
        "/api/admin/users",
        json!([{"username": "pilot1", "role": "pilot"}]),
    );

    let mut page = pages::users::UsersPage::new(fixture.ctx.clone());
    page.load().await;

    fixture.browser.answer_prompt(Some("short"));
    page.handle(&ActionEvent::with_id("reset-password", "pilot1"))
        .await;

    assert_eq!(
        fixture
            .backend
            .count(Method::PUT, "/api/admin/users/pilot1/password"),
        0
    );
    assert!(fixture
        .toasts()
        .contains(&"Password must be at least 8 characters.".to_string()));
}

// ============================================================================
// Forms and timesheets
// ============================================================================

#[tokio::test]
async fn test_form_submit_checks_required_items() {
    let fixture = TestFixture::new(&[
        pages::forms::CONTAINER,
        pages::forms::SUBMISSIONS,
        pages::forms::FORM_ERROR,
        pages::forms::DETAILS,
    ])
    .await;
    fixture.backend.json(
        Method::GET,
        "/api/forms/templates/pic_handoff",
        json!({
            "form_type": "pic_handoff",
            "title": "PIC Handoff",
            "sections": [{
                "id": "status",
                "title": "Vehicle status",
                "items": [
                    {"id": "battery_ok", "label": "Battery checked", "item_type": "checkbox", "required": true},
                    {"id": "comments", "label": "Comments", "item_type": "text_area"}
                ]
            }]
        }),
    );
    let stored = json!({
        "id": 21,
        "mission_id": "m203",
        "form_type": "pic_handoff",
        "form_title": "PIC Handoff",
        "submitted_by": "pilot1",
        "submission_timestamp": "2026-10-19T10:00:00Z"
    });
    fixture
        .backend
        .json(Method::GET, "/api/forms/m203/mine", json!([]));
    fixture
        .backend
        .json(Method::GET, "/api/forms/m203/mine", json!([stored.clone()]));
    fixture
        .backend
        .json(Method::POST, "/api/forms/m203/submit", stored);

    let mut page = pages::forms::FormsPage::new(fixture.ctx.clone(), "m203", "pic_handoff");
    page.load().await;
    assert!(fixture
        .html(pages::forms::CONTAINER)
        .contains(r#"id="form-item-battery_ok""#));

    page.handle(&ActionEvent::new("submit")).await;
    assert!(fixture
        .html(pages::forms::FORM_ERROR)
        .contains("Battery checked"));
    assert_eq!(fixture.backend.count(Method::POST, "/api/forms/m203/submit"), 0);

    fixture
        .ctx
        .document
        .lock()
        .set_checked(&pages::forms::item_input_id("battery_ok"), true);
    page.handle(&ActionEvent::new("submit")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/forms/m203/submit");
    assert_eq!(posts.len(), 1);
    let body = posts[0].json();
    assert_eq!(body["form_type"], "pic_handoff");
    assert_eq!(body["sections_data"][0]["items"][0]["is_checked"], true);

    assert_eq!(page.submissions().len(), 1);
    assert!(!fixture
        .ctx
        .document
        .lock()
        .is_checked(&pages::forms::item_input_id("battery_ok")));
}

#[tokio::test]
async fn test_invalid_timesheet_is_rejected_locally() {
    let fixture = TestFixture::new(&[
        pages::timesheets::LIST,
        pages::timesheets::FORM_ERROR,
    ])
    .await;
    fixture
        .backend
        .json(Method::GET, "/api/timesheets/mine", json!([]));

    let mut page = pages::timesheets::TimesheetPage::new(fixture.ctx.clone());
    page.load().await;
    assert!(fixture
        .html(pages::timesheets::LIST)
        .contains("No timesheets submitted yet."));

    fixture.set_value(pages::timesheets::PERIOD_START, "2026-10-19");
    fixture.set_value(pages::timesheets::PERIOD_END, "2026-10-12");
    fixture.set_value(pages::timesheets::HOURS, "12");
    page.handle(&ActionEvent::new("submit")).await;

    assert!(fixture
        .html(pages::timesheets::FORM_ERROR)
        .contains("Period end must not be before period start."));
    assert_eq!(fixture.backend.count(Method::POST, "/api/timesheets"), 0);
}

#[tokio::test]
async fn test_timesheet_approve_with_no_content_reply_reloads() {
    let fixture = TestFixture::new(&[
        pages::timesheets::REVIEW_LIST,
        pages::timesheets::STATUS_FILTER,
    ])
    .await;
    fixture
        .backend
        .json(Method::GET, "/api/admin/timesheets", json!([timesheet(4)]));
    fixture
        .backend
        .json(Method::GET, "/api/admin/timesheets", json!([]));
    fixture
        .backend
        .no_content(Method::PUT, "/api/admin/timesheets/4/status");

    let mut page = pages::timesheets::TimesheetReviewPage::new(fixture.ctx.clone());
    page.load().await;
    assert_eq!(page.timesheets().len(), 1);

    page.handle(&ActionEvent::with_id("approve", 4)).await;

    let puts = fixture
        .backend
        .requests_to(Method::PUT, "/api/admin/timesheets/4/status");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].json(), json!({"status": "approved"}));
    assert!(page.timesheets().is_empty());
    assert_eq!(fixture.toasts(), vec!["Timesheet approved.".to_string()]);
}

// ============================================================================
// Mission overview
// ============================================================================

const MISSION_ELEMENTS: &[&str] = &[
    pages::missions::OVERVIEW,
    pages::missions::DOC_URL,
    pages::missions::COMMENTS,
    pages::missions::PLAN_FILE,
    pages::missions::PLAN_STATUS,
    pages::missions::GOALS_LIST,
    pages::missions::NEW_GOAL,
    pages::missions::GOAL_ERROR,
    pages::missions::NOTES_LIST,
    pages::missions::NEW_NOTE,
    pages::missions::NOTE_ERROR,
];

#[tokio::test]
async fn test_mission_goal_toggle_patches_in_place() {
    let fixture = TestFixture::new(MISSION_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/info",
        mission_info(
            json!([goal(1, "Recover glider", false), goal(2, "Swap battery", false)]),
            json!([]),
        ),
    );
    fixture.backend.json(
        Method::PATCH,
        "/api/missions/m203/goals/1/toggle",
        json!({
            "id": 1,
            "description": "Recover glider",
            "is_completed": true,
            "completed_by": "pilot1",
            "completed_at": "2026-10-19T09:00:00Z"
        }),
    );

    let mut page = pages::missions::MissionOverviewPage::new(fixture.ctx.clone(), "m203");
    page.load().await;
    assert_eq!(fixture.value(pages::missions::COMMENTS), "Transit to station");

    page.handle(&ActionEvent::with_id("toggle-goal", 1)).await;

    let patches = fixture
        .backend
        .requests_to(Method::PATCH, "/api/missions/m203/goals/1/toggle");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].json(), json!({"is_completed": true}));

    assert!(page.goals()[0].is_completed);
    assert!(!page.goals()[1].is_completed);
    assert_eq!(fixture.backend.count(Method::GET, "/api/missions/m203/info"), 1);
    assert!(fixture
        .html(pages::missions::GOALS_LIST)
        .contains("done by pilot1 on 2026-10-19"));
}

#[tokio::test]
async fn test_mission_note_is_prepended() {
    let fixture = TestFixture::new(MISSION_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/info",
        mission_info(json!([]), json!([note(1, "Launched at dawn")])),
    );
    fixture.backend.json(
        Method::POST,
        "/api/missions/m203/notes",
        note(2, "Swapped battery"),
    );

    let mut page = pages::missions::MissionOverviewPage::new(fixture.ctx.clone(), "m203");
    page.load().await;

    fixture.set_value(pages::missions::NEW_NOTE, " Swapped battery ");
    page.handle(&ActionEvent::new("add-note")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/missions/m203/notes");
    assert_eq!(posts[0].json(), json!({"content": "Swapped battery"}));

    let ids: Vec<i64> = page.notes().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(fixture.value(pages::missions::NEW_NOTE), "");
    assert_eq!(fixture.backend.count(Method::GET, "/api/missions/m203/info"), 1);

    let notes = fixture.html(pages::missions::NOTES_LIST);
    let newest = notes.find("Swapped battery").unwrap();
    let oldest = notes.find("Launched at dawn").unwrap();
    assert!(newest < oldest);
}

#[tokio::test]
async fn test_mission_goal_and_overview_accept_no_content() {
    let fixture = TestFixture::new(MISSION_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/info",
        mission_info(json!([]), json!([])),
    );
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/info",
        mission_info(json!([goal(3, "Recover glider", false)]), json!([])),
    );
    fixture
        .backend
        .no_content(Method::POST, "/api/missions/m203/goals");
    fixture
        .backend
        .no_content(Method::PUT, "/api/missions/m203/overview");

    let mut page = pages::missions::MissionOverviewPage::new(fixture.ctx.clone(), "m203");
    page.load().await;

    fixture.set_value(pages::missions::NEW_GOAL, "Recover glider");
    page.handle(&ActionEvent::new("add-goal")).await;

    assert_eq!(page.goals().len(), 1);
    assert_eq!(fixture.value(pages::missions::NEW_GOAL), "");
    assert!(fixture.toasts().is_empty());

    fixture.set_value(pages::missions::DOC_URL, "https://docs.example.org/m203");
    page.handle(&ActionEvent::new("save-overview")).await;

    let puts = fixture
        .backend
        .requests_to(Method::PUT, "/api/missions/m203/overview");
    assert_eq!(
        puts[0].json(),
        json!({"document_url": "https://docs.example.org/m203", "comments": "Transit to station"})
    );
    assert_eq!(fixture.backend.count(Method::GET, "/api/missions/m203/info"), 3);
    assert_eq!(fixture.toasts(), vec!["Mission overview saved.".to_string()]);
}

#[tokio::test]
async fn test_plan_upload_fills_document_url() {
    let fixture = TestFixture::new(MISSION_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/info",
        mission_info(json!([]), json!([])),
    );
    fixture.backend.json(
        Method::POST,
        "/api/missions/m203/overview/upload_plan",
        json!({"file_url": "/static/plans/m203_plan.pdf", "filename": "m203_plan.pdf"}),
    );

    let mut page = pages::missions::MissionOverviewPage::new(fixture.ctx.clone(), "m203");
    page.load().await;

    page.handle(&ActionEvent::new("upload-plan")).await;
    assert!(fixture
        .html(pages::missions::PLAN_STATUS)
        .contains("Please select a file to upload."));

    fixture.ctx.document.lock().set_files(
        pages::missions::PLAN_FILE,
        vec![SelectedFile::new("plan.pdf", "application/pdf", b"%PDF".to_vec())],
    );
    page.handle(&ActionEvent::new("upload-plan")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/missions/m203/overview/upload_plan");
    assert_eq!(posts.len(), 1);
    assert_multipart(&posts[0]);
    assert!(body_text(&posts[0]).contains(r#"filename="plan.pdf""#));

    assert_eq!(
        fixture.value(pages::missions::DOC_URL),
        "/static/plans/m203_plan.pdf"
    );
    assert!(fixture
        .html(pages::missions::PLAN_STATUS)
        .contains("Uploaded m203_plan.pdf."));
    assert_eq!(
        fixture.backend.count(Method::PUT, "/api/missions/m203/overview"),
        0
    );
}

// ============================================================================
// Media
// ============================================================================

const MEDIA_ELEMENTS: &[&str] = &[
    pages::media::GALLERY,
    pages::media::FILE,
    pages::media::CAPTION,
    pages::media::OPERATION,
    pages::media::UPLOAD_STATUS,
];

#[tokio::test]
async fn test_media_upload_is_multipart() {
    let fixture = TestFixture::new(MEDIA_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/missions/m203/media", json!([]));
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/media",
        json!([media_item(5, "Launch")]),
    );
    fixture.backend.json(
        Method::POST,
        "/api/missions/m203/media/upload",
        media_item(5, "Launch"),
    );

    let mut page = pages::media::MissionMediaPage::new(fixture.ctx.clone(), "m203");
    page.load().await;
    assert!(fixture
        .html(pages::media::GALLERY)
        .contains("No media uploaded for this mission."));

    {
        let mut document = fixture.ctx.document.lock();
        document.set_files(
            pages::media::FILE,
            vec![SelectedFile::new("launch.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff])],
        );
        document.set_value(pages::media::CAPTION, "Launch");
        document.set_value(pages::media::OPERATION, "launch");
    }
    page.handle(&ActionEvent::new("upload-media")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/missions/m203/media/upload");
    assert_eq!(posts.len(), 1);
    assert_multipart(&posts[0]);
    let body = body_text(&posts[0]);
    assert!(body.contains(r#"name="caption""#));
    assert!(body.contains(r#"name="operation_type""#));
    assert!(body.contains(r#"filename="launch.jpg""#));

    assert_eq!(page.media().len(), 1);
    assert_eq!(fixture.value(pages::media::CAPTION), "");
    assert!(fixture.toasts().contains(&"Media uploaded.".to_string()));
}

#[tokio::test]
async fn test_media_caption_save_patches_item() {
    let fixture = TestFixture::new(MEDIA_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/missions/m203/media",
        json!([media_item(5, "Launch"), media_item(6, "Recovery")]),
    );
    fixture.backend.json(
        Method::PUT,
        "/api/missions/m203/media/5",
        media_item(5, "Launch at dawn"),
    );

    let mut page = pages::media::MissionMediaPage::new(fixture.ctx.clone(), "m203");
    page.load().await;
    assert_eq!(fixture.value(&pages::media::caption_input_id(5)), "Launch");

    fixture.set_value(&pages::media::caption_input_id(5), "Launch at dawn");
    page.handle(&ActionEvent::with_id("save-caption", 5)).await;

    let puts = fixture
        .backend
        .requests_to(Method::PUT, "/api/missions/m203/media/5");
    assert_eq!(puts[0].json()["caption"], "Launch at dawn");
    assert_eq!(page.media()[0].caption.as_deref(), Some("Launch at dawn"));
    assert_eq!(page.media()[1].caption.as_deref(), Some("Recovery"));
    assert_eq!(fixture.backend.count(Method::GET, "/api/missions/m203/media"), 1);
    assert!(fixture.toasts().contains(&"Caption updated.".to_string()));
}

// ============================================================================
// Reports
// ============================================================================

const REPORT_ELEMENTS: &[&str] = &[
    pages::reports::LIST,
    pages::reports::REPORT_TYPE,
    pages::reports::STATUS,
    pages::reports::CSV_SOURCE,
    pages::reports::KML_HOURS,
];

fn report(id: i64) -> Value {
    json!({
        "id": id,
        "mission_id": "m203",
        "report_type": "weekly",
        "generated_at": "2026-10-19T08:00:00Z",
        "generated_by": "admin",
        "file_name": "weekly_m203.docx",
    })
}

#[tokio::test]
async fn test_report_generate_posts_and_reloads() {
    let fixture = TestFixture::new(REPORT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/reporting/missions/m203/reports",
        json!([]),
    );
    fixture.backend.json(
        Method::GET,
        "/api/reporting/missions/m203/reports",
        json!([report(4)]),
    );
    fixture.backend.json(
        Method::POST,
        "/api/reporting/missions/m203/generate",
        report(4),
    );

    let mut page = pages::reports::ReportsPage::new(fixture.ctx.clone(), "m203");
    page.load().await;
    assert!(fixture
        .html(pages::reports::LIST)
        .contains("No reports generated yet."));

    fixture.set_value(pages::reports::REPORT_TYPE, "weekly");
    page.handle(&ActionEvent::new("generate")).await;

    let posts = fixture
        .backend
        .requests_to(Method::POST, "/api/reporting/missions/m203/generate");
    assert_eq!(
        posts[0].json(),
        json!({"report_type": "weekly", "save_to_overview": true})
    );
    assert_eq!(page.reports().len(), 1);
    assert_eq!(fixture.html(pages::reports::STATUS), "");
    assert!(fixture.toasts().contains(&"Weekly report generated.".to_string()));
}

#[tokio::test]
async fn test_report_download_saves_file() {
    let fixture = TestFixture::new(REPORT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/reporting/missions/m203/reports",
        json!([report(4)]),
    );
    fixture.backend.file(
        "/api/reporting/reports/4/download",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("weekly_m203.docx"),
        b"PK\x03\x04",
    );

    let mut page = pages::reports::ReportsPage::new(fixture.ctx.clone(), "m203");
    page.load().await;
    page.handle(&ActionEvent::with_id("download", 4)).await;

    let downloads = fixture.browser.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].filename, "weekly_m203.docx");
    assert_eq!(
        downloads[0].content_type,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(downloads[0].bytes, b"PK\x03\x04".to_vec());

    let requests = fixture
        .backend
        .requests_to(Method::GET, "/api/reporting/reports/4/download");
    assert_eq!(
        requests[0].headers.get(header::AUTHORIZATION).unwrap(),
        bearer_value("test-token").as_str()
    );
}

#[tokio::test]
async fn test_kml_export_sends_hours() {
    let fixture = TestFixture::new(REPORT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/reporting/missions/m203/reports",
        json!([]),
    );
    fixture.backend.file(
        "/api/missions/m203/track.kml",
        "application/vnd.google-earth.kml+xml",
        None,
        b"<kml></kml>",
    );

    let mut page = pages::reports::ReportsPage::new(fixture.ctx.clone(), "m203");
    page.load().await;

    fixture.set_value(pages::reports::KML_HOURS, "24");
    page.handle(&ActionEvent::new("export-kml")).await;

    let requests = fixture
        .backend
        .requests_to(Method::GET, "/api/missions/m203/track.kml");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("hours_back=24"));

    let downloads = fixture.browser.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].filename, "track.kml");
    assert_eq!(downloads[0].text(), "<kml></kml>");
}

#[tokio::test]
async fn test_kml_export_rejects_invalid_hours() {
    let fixture = TestFixture::new(REPORT_ELEMENTS).await;
    fixture.backend.json(
        Method::GET,
        "/api/reporting/missions/m203/reports",
        json!([]),
    );

    let mut page = pages::reports::ReportsPage::new(fixture.ctx.clone(), "m203");
    page.load().await;

    for hours in ["0", "abc"] {
        fixture.set_value(pages::reports::KML_HOURS, hours);
        page.handle(&ActionEvent::new("export-kml")).await;
    }

    assert_eq!(
        fixture
            .backend
            .count(Method::GET, "/api/missions/m203/track.kml"),
        0
    );
    assert!(fixture.browser.downloads().is_empty());
    assert_eq!(
        fixture.toasts(),
        vec![
            "Hours must be a positive whole number.".to_string(),
            "Hours must be a positive whole number.".to_string(),
        ]
    );
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test]
async fn test_each_navigation_starts_fresh() {
    let fixture = TestFixture::new(FAQ_ELEMENTS).await;
    fixture
        .backend
        .json(Method::GET, "/api/faqs", json!([faq(1, "First", true)]));

    let route: Route = "admin/faqs".parse().unwrap();
    let mut first = pages::open(&route, fixture.ctx.clone());
    first.load().await;
    assert_eq!(first.route(), "admin/faqs");

    let mut second = pages::open(&route, fixture.ctx.clone());
    second.load().await;

    assert_eq!(fixture.backend.count(Method::GET, "/api/faqs"), 2);
    assert!(fixture.html(pages::faqs::LIST).contains("First"));
}

#[tokio::test]
async fn test_session_without_token_opens_nothing() {
    let backend = MockBackend::default();
    let base_url = backend.serve().await;
    let browser = Arc::new(HeadlessBrowser::new());
    let session = Session::new(
        Arc::new(test_config(base_url)),
        Arc::new(MemoryTokenStore::new()),
        browser.clone(),
    );

    let page = session
        .open(&Route::Faqs, Document::new().into_shared())
        .unwrap();

    assert!(page.is_none());
    assert_eq!(browser.current_url().as_deref(), Some("/login.html"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_session_opens_page_for_route() {
    let backend = MockBackend::default();
    let base_url = backend.serve().await;
    backend.json(
        Method::GET,
        "/api/timesheets/mine",
        json!([]),
    );
    let session = Session::new(
        Arc::new(test_config(base_url)),
        Arc::new(MemoryTokenStore::with_token("test-token")),
        Arc::new(HeadlessBrowser::new()),
    );

    let document = Document::with_elements(&[pages::timesheets::LIST]).into_shared();
    let mut page = session
        .open(&"/timesheets".parse().unwrap(), document.clone())
        .unwrap()
        .expect("Session has a token");
    page.load().await;

    assert_eq!(page.route(), "timesheets");
    assert!(document
        .lock()
        .html(pages::timesheets::LIST)
        .unwrap()
        .contains("No timesheets submitted yet."));
}
