//! Page controllers.
//!
//! One controller per page. A controller owns its collection cache and
//! filter state, renders into the shared document and talks to the backend
//! only through [`crate::api::ApiClient`].
//!
//! Every mutation handler either reloads the page's collection from the
//! server or patches the cache with the record the mutation returned, keyed
//! by that record's id. No handler does both.

pub mod announcements;
pub mod faqs;
pub mod forms;
pub mod knowledge_base;
pub mod media;
pub mod missions;
pub mod reports;
pub mod schedule;
pub mod stations;
pub mod timesheets;
pub mod users;

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::multipart::Part;

use crate::actions::ActionEvent;
use crate::dom::{error_state, SelectedFile};
use crate::errors::ApiError;
use crate::widgets::GridCalendar;
use crate::PageContext;

/// A page controller as seen by the host.
#[async_trait]
pub trait Page: Send {
    fn route(&self) -> &'static str;

    /// Fetch the page's initial data and render it.
    async fn load(&mut self);

    /// React to a user interaction.
    async fn handle(&mut self, event: &ActionEvent);
}

/// Where the browser is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Announcements,
    Faqs,
    KnowledgeBase,
    Users,
    Stations,
    Schedule,
    Timesheets,
    TimesheetReview,
    Mission(String),
    MissionMedia(String),
    MissionReports(String),
    MissionForm { mission_id: String, form_type: String },
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_matches('/');
        let segments: Vec<&str> = path.split('/').collect();
        let route = match segments.as_slice() {
            [""] | ["home"] => Route::Home,
            ["admin", "announcements"] => Route::Announcements,
            ["admin", "faqs"] => Route::Faqs,
            ["knowledge-base"] => Route::KnowledgeBase,
            ["admin", "users"] => Route::Users,
            ["stations"] => Route::Stations,
            ["schedule"] => Route::Schedule,
            ["timesheets"] => Route::Timesheets,
            ["admin", "timesheets"] => Route::TimesheetReview,
            ["mission", id] if !id.is_empty() => Route::Mission(id.to_string()),
            ["mission", id, "media"] => Route::MissionMedia(id.to_string()),
            ["mission", id, "reports"] => Route::MissionReports(id.to_string()),
            ["mission", id, "forms", form_type] => Route::MissionForm {
                mission_id: id.to_string(),
                form_type: form_type.to_string(),
            },
            _ => return Err(format!("Unknown route: {}", s)),
        };
        Ok(route)
    }
}

/// Build the controller for a route. State never carries over between
/// navigations: every call starts from an empty cache.
pub fn open(route: &Route, ctx: PageContext) -> Box<dyn Page> {
    tracing::info!(?route, "Opening page");
    match route {
        Route::Home => Box::new(announcements::AnnouncementBanner::new(ctx)),
        Route::Announcements => Box::new(announcements::AnnouncementsPage::new(ctx)),
        Route::Faqs => Box::new(faqs::FaqPage::new(ctx)),
        Route::KnowledgeBase => Box::new(knowledge_base::KnowledgeBasePage::new(ctx)),
        Route::Users => Box::new(users::UsersPage::new(ctx)),
        Route::Stations => Box::new(stations::StationStatusPage::new(ctx)),
        Route::Schedule => {
            let calendar = GridCalendar::new(ctx.document.clone(), schedule::CALENDAR_ELEMENT);
            Box::new(schedule::SchedulePage::new(ctx, Box::new(calendar)))
        }
        Route::Timesheets => Box::new(timesheets::TimesheetPage::new(ctx)),
        Route::TimesheetReview => Box::new(timesheets::TimesheetReviewPage::new(ctx)),
        Route::Mission(id) => Box::new(missions::MissionOverviewPage::new(ctx, id)),
        Route::MissionMedia(id) => Box::new(media::MissionMediaPage::new(ctx, id)),
        Route::MissionReports(id) => Box::new(reports::ReportsPage::new(ctx, id)),
        Route::MissionForm {
            mission_id,
            form_type,
        } => Box::new(forms::FormsPage::new(ctx, mission_id, form_type)),
    }
}

/// Render a failed load into the list element and raise a toast.
pub(crate) fn show_load_error(ctx: &PageContext, element_id: &str, what: &str, err: &ApiError) {
    if matches!(err, ApiError::Unauthorized) {
        return;
    }
    ctx.set_html(
        element_id,
        error_state(&format!("Error loading {}: {}", what, err.user_message())),
    );
    ctx.report(&format!("Failed to load {}", what), err);
}

/// Multipart part for a picked file.
pub(crate) fn file_part(file: &SelectedFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(&file.content_type)?)
}

/// Log an event no page action matched.
pub(crate) fn unknown_action(route: &str, event: &ActionEvent) {
    tracing::warn!(page = route, action = %event.action, "Ignoring unknown action");
}
