//! Weekly shift calendar.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::actions::ActionEvent;
use crate::dom::{escape_html, SharedDocument};
use crate::models::ShiftEvent;

/// Number of schedule rows per day.
pub const SLOTS_PER_DAY: usize = 8;
/// Length of one schedule row.
pub const SLOT_HOURS: u32 = 3;
/// Width of the leading time-label column, in px.
pub const TIME_COLUMN_WIDTH: u32 = 90;
/// Narrowest a day column may get, in px.
pub const MIN_CELL_WIDTH: u32 = 80;

/// Row index within a day, `0..SLOTS_PER_DAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn new(index: usize) -> Option<Self> {
        (index < SLOTS_PER_DAY).then_some(Slot(index))
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOTS_PER_DAY).map(Slot)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::default()) + Duration::hours((self.0 as u32 * SLOT_HOURS) as i64)
    }

    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.start_on(date) + Duration::hours(SLOT_HOURS as i64)
    }

    /// e.g. `03:00-06:00`
    pub fn label(&self) -> String {
        let start = self.0 as u32 * SLOT_HOURS;
        format!("{:02}:00-{:02}:00", start, start + SLOT_HOURS)
    }
}

/// What the user picked on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarSelection {
    /// An empty slot
    Cell { date: NaiveDate, slot: Slot },
    /// An existing shift
    Event { id: i64 },
}

impl CalendarSelection {
    /// `data-id` encoding of a cell: `YYYY-MM-DD|slot`.
    pub fn cell_id(date: NaiveDate, slot: Slot) -> String {
        format!("{}|{}", date.format("%Y-%m-%d"), slot.index())
    }

    pub fn parse_cell_id(id: &str) -> Option<Self> {
        let (date, slot) = id.split_once('|')?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let slot = Slot::new(slot.parse().ok()?)?;
        Some(CalendarSelection::Cell { date, slot })
    }
}

/// Everything needed to draw one window of the calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub start: NaiveDate,
    pub day_count: u32,
    pub events: Vec<ShiftEvent>,
    /// Shifts of this user are highlighted
    pub current_user: Option<String>,
}

impl CalendarView {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.day_count).map(move |offset| self.start + Duration::days(offset as i64))
    }

    /// First shift overlapping the given slot.
    pub fn event_at(&self, date: NaiveDate, slot: Slot) -> Option<&ShiftEvent> {
        let start = slot.start_on(date);
        let end = slot.end_on(date);
        self.events.iter().find(|e| e.overlaps(start, end))
    }
}

pub type SelectHandler = Box<dyn Fn(CalendarSelection) + Send + Sync>;

/// Narrow interface over a calendar widget.
pub trait CalendarWidget: Send + Sync {
    fn render(&mut self, view: &CalendarView);

    /// Register the callback for cell and event selection.
    fn on_select(&mut self, handler: SelectHandler);

    /// Recompute column widths for the given container width.
    fn update_size(&mut self, container_width: u32);

    /// Offer a raw page event to the widget. Returns `true` if it was a
    /// calendar interaction and has been forwarded to the select handler.
    fn handle_event(&mut self, event: &ActionEvent) -> bool;

    fn destroy(&mut self);
}

/// Day-column width for a container.
pub fn cell_width(container_width: u32, day_count: u32) -> u32 {
    if day_count == 0 {
        return MIN_CELL_WIDTH;
    }
    (container_width.saturating_sub(TIME_COLUMN_WIDTH) / day_count).max(MIN_CELL_WIDTH)
}

/// Calendar drawn as an HTML table into a document element.
pub struct GridCalendar {
    document: SharedDocument,
    element_id: String,
    handler: Option<SelectHandler>,
    view: Option<CalendarView>,
    cell_width: u32,
}

impl GridCalendar {
    pub fn new(document: SharedDocument, element_id: &str) -> Self {
        Self {
            document,
            element_id: element_id.to_string(),
            handler: None,
            view: None,
            cell_width: MIN_CELL_WIDTH,
        }
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    fn select(&self, selection: CalendarSelection) {
        match &self.handler {
            Some(handler) => handler(selection),
            None => tracing::debug!(?selection, "Calendar selection without a handler"),
        }
    }

    fn draw(&self) {
        let Some(view) = &self.view else {
            return;
        };
        let width = self.cell_width;

        let mut html = format!(
            r#"<table class="schedule-grid" data-cell-width="{}"><thead><tr><th class="time-col" style="width:{}px">Time</th>"#,
            width, TIME_COLUMN_WIDTH
        );
        for day in view.days() {
            html.push_str(&format!(
                r#"<th style="width:{}px">{}</th>"#,
                width,
                day.format("%a %m/%d")
            ));
        }
        html.push_str("</tr></thead><tbody>");

        for slot in Slot::all() {
            html.push_str(&format!(r#"<tr><th class="time-col">{}</th>"#, slot.label()));
            for day in view.days() {
                match view.event_at(day, slot) {
                    Some(event) => {
                        let own = view.current_user.as_deref() == Some(event.username.as_str());
                        let color = event
                            .color
                            .as_deref()
                            .map(|c| format!("background:{};", escape_html(c)))
                            .unwrap_or_default();
                        html.push_str(&format!(
                            r#"<td class="shift-cell occupied{}" data-action="select-event" data-id="{}" style="width:{}px;{}">{}</td>"#,
                            if own { " own" } else { "" },
                            event.id,
                            width,
                            color,
                            escape_html(event.title())
                        ));
                    }
                    None => html.push_str(&format!(
                        r#"<td class="shift-cell empty" data-action="select-cell" data-id="{}" style="width:{}px"></td>"#,
                        CalendarSelection::cell_id(day, slot),
                        width
                    )),
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");

        self.document.lock().set_html(&self.element_id, html);
    }
}

impl CalendarWidget for GridCalendar {
    fn render(&mut self, view: &CalendarView) {
        self.view = Some(view.clone());
        self.draw();
    }

    fn on_select(&mut self, handler: SelectHandler) {
        self.handler = Some(handler);
    }

    fn update_size(&mut self, container_width: u32) {
        let day_count = self.view.as_ref().map(|v| v.day_count).unwrap_or(7);
        self.cell_width = cell_width(container_width, day_count);
        tracing::debug!(container_width, cell_width = self.cell_width, "Calendar resized");
        self.draw();
    }

    fn handle_event(&mut self, event: &ActionEvent) -> bool {
        let selection = match event.action.as_str() {
            "select-cell" => event
                .id
                .as_deref()
                .and_then(CalendarSelection::parse_cell_id),
            "select-event" => event
                .id_as::<i64>()
                .map(|id| CalendarSelection::Event { id }),
            _ => return false,
        };

        match selection {
            Some(selection) => self.select(selection),
            None => tracing::warn!(?event, "Malformed calendar event"),
        }
        true
    }

    fn destroy(&mut self) {
        self.handler = None;
        self.view = None;
        self.document.lock().set_html(&self.element_id, "");
    }
}
