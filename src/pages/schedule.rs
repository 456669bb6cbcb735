//! Pilot shift scheduling.
//!
//! The page shows one week at a time, Monday first, as eight three-hour
//! slots per day. Clicking an empty slot signs the user up; clicking a shift
//! either unassigns it (own shift, or any shift for an admin) or shows its
//! details and handoff forms.
//!
//! Calendar clicks reach the page through the widget's select handler, which
//! only queues the selection. [`SchedulePage::process_selections`] drains the
//! queue, so the network calls run on the page's own task.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, Local, NaiveDate};
use parking_lot::Mutex;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{empty_state, error_state, escape_html};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{CurrentUser, HandoffSummary, ShiftEvent, ShiftRequest};
use crate::widgets::{CalendarSelection, CalendarView, CalendarWidget, Slot};
use crate::PageContext;

pub const ROUTE: &str = "schedule";

pub const CALENDAR_ELEMENT: &str = "scheduleCalendar";
pub const DETAILS: &str = "shiftDetails";
pub const RANGE_LABEL: &str = "scheduleRange";

/// Days shown at once.
pub const DAY_COUNT: u32 = 7;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    Prev,
    Next,
    Today,
}

impl PageAction for ScheduleAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "prev" => Some(ScheduleAction::Prev),
            "next" => Some(ScheduleAction::Next),
            "today" => Some(ScheduleAction::Today),
            _ => None,
        }
    }
}

type SelectionQueue = Arc<Mutex<VecDeque<CalendarSelection>>>;

pub struct SchedulePage {
    ctx: PageContext,
    calendar: Box<dyn CalendarWidget>,
    selections: SelectionQueue,
    today: NaiveDate,
    start: NaiveDate,
    current_user: Option<CurrentUser>,
    events: CollectionCache<ShiftEvent>,
    generation: Generation,
}

impl SchedulePage {
    pub fn new(ctx: PageContext, calendar: Box<dyn CalendarWidget>) -> Self {
        Self::starting_on(ctx, calendar, Local::now().date_naive())
    }

    /// Page whose notion of "today" is fixed to `today`.
    pub fn starting_on(
        ctx: PageContext,
        mut calendar: Box<dyn CalendarWidget>,
        today: NaiveDate,
    ) -> Self {
        let selections: SelectionQueue = Arc::default();
        let sink = Arc::clone(&selections);
        calendar.on_select(Box::new(move |selection| sink.lock().push_back(selection)));

        Self {
            ctx,
            calendar,
            selections,
            today,
            start: week_start(today),
            current_user: None,
            events: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    /// First day of the visible window.
    pub fn window_start(&self) -> NaiveDate {
        self.start
    }

    /// Day after the last visible day.
    pub fn window_end(&self) -> NaiveDate {
        self.start + Duration::days(DAY_COUNT as i64)
    }

    pub fn events(&self) -> &[ShiftEvent] {
        self.events.items()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let (start, end) = (self.window_start(), self.window_end());
        let result = self.ctx.api.list_shifts(start, end).await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, %start, "Discarding superseded schedule window");
            return;
        }

        match result {
            Ok(events) => {
                tracing::info!(page = ROUTE, %start, %end, count = events.len(), "Shifts loaded");
                self.events.replace(events);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, CALENDAR_ELEMENT, "schedule", &e),
        }
    }

    pub async fn dispatch(&mut self, action: ScheduleAction) {
        self.start = match action {
            ScheduleAction::Prev => self.start - Duration::days(DAY_COUNT as i64),
            ScheduleAction::Next => self.start + Duration::days(DAY_COUNT as i64),
            ScheduleAction::Today => week_start(self.today),
        };
        self.ctx.set_html(DETAILS, "");
        self.reload().await;
    }

    /// Handle every calendar selection queued since the last call.
    pub async fn process_selections(&mut self) {
        loop {
            let next = self.selections.lock().pop_front();
            let Some(selection) = next else {
                break;
            };

            let result = match selection {
                CalendarSelection::Cell { date, slot } => self.sign_up(date, slot).await,
                CalendarSelection::Event { id } => self.select_shift(id).await,
            };
            if let Err(e) = result {
                let what = match selection {
                    CalendarSelection::Cell { .. } => "Failed to sign up for shift",
                    CalendarSelection::Event { .. } => "Failed to update shift",
                };
                self.ctx.report(what, &e);
            }
        }
    }

    /// Returns false once the session has been rejected.
    async fn load_current_user(&mut self) -> bool {
        if self.current_user.is_some() {
            return true;
        }
        match self.ctx.api.current_user().await {
            Ok(user) => {
                tracing::info!(page = ROUTE, username = %user.username, "Current user loaded");
                self.current_user = Some(user);
                true
            }
            Err(e) => {
                self.ctx.report("Failed to load current user", &e);
                !matches!(e, ApiError::Unauthorized)
            }
        }
    }

    fn render(&mut self) {
        let view = CalendarView {
            start: self.start,
            day_count: DAY_COUNT,
            events: self.events.items().to_vec(),
            current_user: self.current_user.as_ref().map(|u| u.username.clone()),
        };
        self.calendar.render(&view);

        // The first layout pass measures before the container is sized.
        let width = self.ctx.document.lock().client_width(CALENDAR_ELEMENT);
        self.calendar.update_size(width);

        let last = self.window_end() - Duration::days(1);
        self.ctx.set_html(
            RANGE_LABEL,
            format!("{} - {}", self.start.format("%b %d"), last.format("%b %d, %Y")),
        );
    }

    fn can_unassign(&self, shift: &ShiftEvent) -> bool {
        match &self.current_user {
            Some(user) => user.is_admin() || user.username == shift.username,
            None => false,
        }
    }

    async fn sign_up(&mut self, date: NaiveDate, slot: Slot) -> Result<(), ApiError> {
        let question = format!(
            "Sign up for {} on {}?",
            slot.label(),
            date.format("%Y-%m-%d")
        );
        if !self.ctx.browser.confirm(&question) {
            return Ok(());
        }

        let request = ShiftRequest {
            start: slot.start_on(date),
            end: slot.end_on(date),
        };
        let shift = self.ctx.api.sign_up_shift(&request).await?;
        tracing::info!(page = ROUTE, id = shift.id, start = %shift.start, "Signed up for shift");

        self.ctx.toasts.success("Signed up for shift.");
        self.reload().await;
        Ok(())
    }

    async fn select_shift(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(shift) = self.events.get(&id).cloned() else {
            tracing::warn!(page = ROUTE, id, "Selected shift is not in the current window");
            return Ok(());
        };

        if self.can_unassign(&shift) {
            if !self.ctx.browser.confirm("Unassign this shift?") {
                return Ok(());
            }
            self.ctx.api.unassign_shift(id).await?;
            tracing::info!(page = ROUTE, id, "Shift unassigned");

            self.ctx.set_html(DETAILS, "");
            self.ctx.toasts.success("Shift unassigned.");
            self.reload().await;
            return Ok(());
        }

        self.ctx
            .set_html(DETAILS, render_details(&shift, &empty_state("Loading handoff forms...")));
        match self.ctx.api.shift_handoffs(id).await {
            Ok(handoffs) => {
                self.ctx
                    .set_html(DETAILS, render_details(&shift, &render_handoffs(&handoffs)));
                Ok(())
            }
            Err(e) => {
                self.ctx.set_html(
                    DETAILS,
                    render_details(
                        &shift,
                        &error_state(&format!("Error loading handoffs: {}", e.user_message())),
                    ),
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Page for SchedulePage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        if !self.load_current_user().await {
            return;
        }
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        if self.calendar.handle_event(event) {
            self.process_selections().await;
            return;
        }
        match ScheduleAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

impl Drop for SchedulePage {
    fn drop(&mut self) {
        self.calendar.destroy();
    }
}

fn render_details(shift: &ShiftEvent, handoffs: &str) -> String {
    format!(
        r#"<div class="shift-details" data-id="{id}"><h6>{title}</h6><p>{start} to {end}</p><h6>Handoff forms</h6>{handoffs}</div>"#,
        id = shift.id,
        title = escape_html(shift.title()),
        start = shift.start.format("%Y-%m-%d %H:%M"),
        end = shift.end.format("%Y-%m-%d %H:%M"),
        handoffs = handoffs,
    )
}

fn render_handoffs(handoffs: &[HandoffSummary]) -> String {
    if handoffs.is_empty() {
        return empty_state("No handoff forms submitted for this shift.");
    }
    let items: String = handoffs
        .iter()
        .map(|h| {
            format!(
                r#"<li class="list-group-item handoff-item" data-id="{}">{} by {} at {}</li>"#,
                h.id,
                escape_html(h.form_title.as_deref().unwrap_or("Handoff form")),
                escape_html(&h.submitted_by),
                h.submission_timestamp.format("%Y-%m-%d %H:%M UTC")
            )
        })
        .collect();
    format!(r#"<ul class="list-group">{}</ul>"#, items)
}
