//! Pilot timesheet submission and admin review.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{Timesheet, TimesheetRequest, TimesheetReview, TimesheetStatus};
use crate::PageContext;

pub const ROUTE: &str = "timesheets";
pub const REVIEW_ROUTE: &str = "admin/timesheets";

pub const LIST: &str = "timesheetList";
pub const PERIOD_START: &str = "tsPeriodStart";
pub const PERIOD_END: &str = "tsPeriodEnd";
pub const HOURS: &str = "tsHours";
pub const NOTES: &str = "tsNotes";
pub const FORM_ERROR: &str = "timesheetFormError";

pub const REVIEW_LIST: &str = "timesheetReviewList";
pub const STATUS_FILTER: &str = "timesheetStatusFilter";

/// Most hours one period may claim.
pub const MAX_HOURS: f64 = 168.0;

const DEFAULT_REVIEW_STATUS: &str = "submitted";

/// Check the submission form and build the request.
pub fn validate_timesheet(
    period_start: &str,
    period_end: &str,
    hours: &str,
    notes: &str,
) -> Result<TimesheetRequest, &'static str> {
    let parse = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    let (Some(start), Some(end)) = (parse(period_start), parse(period_end)) else {
        return Err("Please enter valid period start and end dates.");
    };
    if end < start {
        return Err("Period end must not be before period start.");
    }

    let total_hours = hours
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0 && *h <= MAX_HOURS)
        .ok_or("Total hours must be greater than 0 and at most 168.")?;

    let notes = notes.trim();
    Ok(TimesheetRequest {
        period_start: start,
        period_end: end,
        total_hours,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimesheetAction {
    Submit,
}

impl PageAction for TimesheetAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "submit" => Some(TimesheetAction::Submit),
            _ => None,
        }
    }
}

/// A pilot's own timesheets.
pub struct TimesheetPage {
    ctx: PageContext,
    timesheets: CollectionCache<Timesheet>,
    generation: Generation,
}

impl TimesheetPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            timesheets: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn timesheets(&self) -> &[Timesheet] {
        self.timesheets.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.my_timesheets().await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(timesheets) => {
                tracing::info!(page = ROUTE, count = timesheets.len(), "Timesheets loaded");
                self.timesheets.replace(timesheets);
                let html = if self.timesheets.is_empty() {
                    empty_state("No timesheets submitted yet.")
                } else {
                    self.timesheets
                        .items()
                        .iter()
                        .map(|t| render_row(t, None))
                        .collect()
                };
                self.ctx.set_html(LIST, html);
            }
            Err(e) => show_load_error(&self.ctx, LIST, "timesheets", &e),
        }
    }

    pub async fn dispatch(&mut self, action: TimesheetAction) {
        match action {
            TimesheetAction::Submit => {
                if let Err(e) = self.submit().await {
                    self.ctx.report("Failed to submit timesheet", &e);
                }
            }
        }
    }

    async fn submit(&mut self) -> Result<(), ApiError> {
        let validated = {
            let document = self.ctx.document.lock();
            validate_timesheet(
                &document.value(PERIOD_START),
                &document.value(PERIOD_END),
                &document.value(HOURS),
                &document.value(NOTES),
            )
        };
        let request = match validated {
            Ok(request) => request,
            Err(message) => {
                self.ctx.set_html(FORM_ERROR, inline_error(message));
                return Ok(());
            }
        };
        self.ctx.set_html(FORM_ERROR, "");

        let created = self.ctx.api.submit_timesheet(&request).await?;
        tracing::info!(page = ROUTE, id = created.id, hours = created.total_hours, "Timesheet submitted");

        self.ctx
            .document
            .lock()
            .clear_inputs(&[PERIOD_START, PERIOD_END, HOURS, NOTES]);
        self.ctx.toasts.success("Timesheet submitted.");
        self.reload().await;
        Ok(())
    }
}

#[async_trait]
impl Page for TimesheetPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match TimesheetAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Filter,
    Approve(i64),
    Reject(i64),
    ExportCsv,
}

impl PageAction for ReviewAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "filter" => Some(ReviewAction::Filter),
            "approve" => event.id_as().map(ReviewAction::Approve),
            "reject" => event.id_as().map(ReviewAction::Reject),
            "export-csv" => Some(ReviewAction::ExportCsv),
            _ => None,
        }
    }
}

/// Admin queue of timesheets awaiting a decision.
pub struct TimesheetReviewPage {
    ctx: PageContext,
    timesheets: CollectionCache<Timesheet>,
    status: String,
    generation: Generation,
}

impl TimesheetReviewPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            timesheets: CollectionCache::new(),
            status: DEFAULT_REVIEW_STATUS.to_string(),
            generation: Generation::new(),
        }
    }

    pub fn timesheets(&self) -> &[Timesheet] {
        self.timesheets.items()
    }

    pub fn status_filter(&self) -> &str {
        &self.status
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.review_queue(&self.status).await;
        if !ticket.is_current() {
            tracing::debug!(page = REVIEW_ROUTE, status = %self.status, "Discarding superseded review queue");
            return;
        }

        match result {
            Ok(timesheets) => {
                tracing::info!(page = REVIEW_ROUTE, status = %self.status, count = timesheets.len(), "Review queue loaded");
                self.timesheets.replace(timesheets);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, REVIEW_LIST, "timesheets", &e),
        }
    }

    pub async fn dispatch(&mut self, action: ReviewAction) {
        let result = match action {
            ReviewAction::Filter => {
                let status = self.ctx.value(STATUS_FILTER);
                self.status = if status.is_empty() {
                    DEFAULT_REVIEW_STATUS.to_string()
                } else {
                    status
                };
                self.reload().await;
                Ok(())
            }
            ReviewAction::Approve(id) => self.review(id, TimesheetStatus::Approved, None).await,
            ReviewAction::Reject(id) => self.reject(id).await,
            ReviewAction::ExportCsv => self.export().await,
        };

        if let Err(e) = result {
            let what = match action {
                ReviewAction::ExportCsv => "Failed to export timesheets",
                ReviewAction::Filter => "Failed to load timesheets",
                _ => "Failed to update timesheet",
            };
            self.ctx.report(what, &e);
        }
    }

    fn render(&self) {
        let html = if self.timesheets.is_empty() {
            empty_state(&format!("No {} timesheets.", self.status))
        } else {
            self.timesheets
                .items()
                .iter()
                .map(|t| render_row(t, Some(review_buttons(t))))
                .collect()
        };
        self.ctx.set_html(REVIEW_LIST, html);
    }

    async fn reject(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(reason) = self
            .ctx
            .browser
            .prompt("Reason for rejecting this timesheet:")
        else {
            return Ok(());
        };
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            self.ctx
                .toasts
                .danger("A reason is required to reject a timesheet.");
            return Ok(());
        }

        self.review(id, TimesheetStatus::Rejected, Some(reason))
            .await
    }

    async fn review(
        &mut self,
        id: i64,
        status: TimesheetStatus,
        reviewer_notes: Option<String>,
    ) -> Result<(), ApiError> {
        let review = TimesheetReview {
            status,
            reviewer_notes,
        };
        self.ctx.api.review_timesheet(id, &review).await?;
        tracing::info!(page = REVIEW_ROUTE, id, status = status.as_str(), "Timesheet reviewed");

        self.ctx
            .toasts
            .success(&format!("Timesheet {}.", status.as_str()));
        self.reload().await;
        Ok(())
    }

    async fn export(&self) -> Result<(), ApiError> {
        let download = self.ctx.api.export_timesheets(&self.status).await?;
        self.ctx.browser.save_file(download);
        Ok(())
    }
}

#[async_trait]
impl Page for TimesheetReviewPage {
    fn route(&self) -> &'static str {
        REVIEW_ROUTE
    }

    async fn load(&mut self) {
        self.ctx
            .document
            .lock()
            .set_value(STATUS_FILTER, self.status.as_str());
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match ReviewAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(REVIEW_ROUTE, event),
        }
    }
}

fn review_buttons(timesheet: &Timesheet) -> String {
    if timesheet.status != TimesheetStatus::Submitted {
        return String::new();
    }
    format!(
        "{} {}",
        action_button("Approve", "btn-sm btn-success", "approve", &timesheet.id),
        action_button("Reject", "btn-sm btn-outline-danger", "reject", &timesheet.id)
    )
}

fn render_row(timesheet: &Timesheet, actions: Option<String>) -> String {
    let actions = actions
        .map(|a| format!("<td>{}</td>", a))
        .unwrap_or_default();
    format!(
        r#"<tr class="timesheet-item" data-id="{id}"><td>{user}</td><td>{start} to {end}</td><td>{hours:.2}</td><td>{status}</td><td>{notes}</td><td>{reviewer_notes}</td><td>{submitted}</td>{actions}</tr>"#,
        id = timesheet.id,
        user = escape_html(&timesheet.username),
        start = timesheet.period_start.format("%Y-%m-%d"),
        end = timesheet.period_end.format("%Y-%m-%d"),
        hours = timesheet.total_hours,
        status = badge(timesheet.status.as_str(), timesheet.status.badge_class()),
        notes = escape_html(timesheet.notes.as_deref().unwrap_or("")),
        reviewer_notes = escape_html(timesheet.reviewer_notes.as_deref().unwrap_or("")),
        submitted = timesheet.submitted_at.format("%Y-%m-%d %H:%M"),
        actions = actions,
    )
}
