//! Station status table with client-side filter, sort and CSV export, plus
//! the station lookup box and metadata editor.

use std::cmp::Ordering;
use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::browser::Download;
use crate::cache::CollectionCache;
use crate::dom::{action_attrs, action_button, badge, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::export::to_csv;
use crate::generation::{Generation, Ticket};
use crate::models::{StationStatus, StationSummary, StationUpdate};
use crate::search::{matches_query, Debouncer};
use crate::PageContext;

pub const ROUTE: &str = "stations";

pub const TABLE_BODY: &str = "stationTableBody";
pub const SEARCH: &str = "stationSearch";
pub const COUNT: &str = "stationCount";
pub const LOOKUP: &str = "stationLookup";
pub const SUGGESTIONS: &str = "stationSuggestions";
pub const METADATA: &str = "stationMetadata";
pub const EDIT_MODAL: &str = "stationEditModal";
pub const EDIT_SERIAL: &str = "editSerialNumber";
pub const EDIT_MODEM: &str = "editModemAddress";
pub const EDIT_DEPTH: &str = "editBottomDepth";
pub const EDIT_WAYPOINT: &str = "editWaypoint";
pub const EDIT_NOTES: &str = "editNotes";
pub const EDIT_ERROR: &str = "stationEditError";

const COLUMNS: usize = 10;

pub const CSV_HEADERS: [&str; 9] = [
    "Station ID",
    "Serial Number",
    "Modem Address",
    "Bottom Depth (m)",
    "Waypoint",
    "Last Offload",
    "Last Offload By",
    "Status",
    "Notes",
];

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    StationId,
    SerialNumber,
    ModemAddress,
    BottomDepth,
    Waypoint,
    LastOffload,
    LastOffloadBy,
    Status,
    Notes,
}

impl SortColumn {
    pub fn parse(s: &str) -> Option<Self> {
        let column = match s.trim() {
            "station_id" => SortColumn::StationId,
            "serial_number" => SortColumn::SerialNumber,
            "modem_address" => SortColumn::ModemAddress,
            "bottom_depth_m" => SortColumn::BottomDepth,
            "waypoint_number" => SortColumn::Waypoint,
            "last_offload_at" => SortColumn::LastOffload,
            "last_offload_by" => SortColumn::LastOffloadBy,
            "status" => SortColumn::Status,
            "notes" => SortColumn::Notes,
            _ => return None,
        };
        Some(column)
    }

    fn key(&self, station: &StationStatus) -> Option<SortKey> {
        let text = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| SortKey::Text(v.to_lowercase()))
        };
        match self {
            SortColumn::StationId => text(Some(station.station_id.as_str())),
            SortColumn::SerialNumber => text(station.serial_number.as_deref()),
            SortColumn::ModemAddress => station.modem_address.map(|v| SortKey::Number(v as f64)),
            SortColumn::BottomDepth => station.bottom_depth_m.map(SortKey::Number),
            SortColumn::Waypoint => station.waypoint_number.map(|v| SortKey::Number(v as f64)),
            SortColumn::LastOffload => station.last_offload_at.map(SortKey::Date),
            SortColumn::LastOffloadBy => text(station.last_offload_by.as_deref()),
            SortColumn::Status => text(station.status.as_deref()),
            SortColumn::Notes => text(station.notes.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            // A column always yields one kind of key.
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::StationId,
            ascending: true,
        }
    }
}

impl SortState {
    /// Clicking the sorted column flips direction; any other column starts
    /// ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.ascending = !self.ascending;
        } else {
            self.column = column;
            self.ascending = true;
        }
    }

    /// Missing values go last in either direction. Ties fall back to the
    /// station id.
    pub fn compare(&self, a: &StationStatus, b: &StationStatus) -> Ordering {
        let primary = match (self.column.key(a), self.column.key(b)) {
            (Some(x), Some(y)) => {
                let ordering = x.compare(&y);
                if self.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        primary.then_with(|| {
            a.station_id
                .to_lowercase()
                .cmp(&b.station_id.to_lowercase())
        })
    }
}

pub fn station_matches(query: &str, station: &StationStatus) -> bool {
    let modem = station
        .modem_address
        .map(|m| m.to_string())
        .unwrap_or_default();
    matches_query(
        query,
        [
            station.station_id.as_str(),
            station.serial_number.as_deref().unwrap_or(""),
            modem.as_str(),
            station.status.as_deref().unwrap_or(""),
            station.last_offload_by.as_deref().unwrap_or(""),
            station.notes.as_deref().unwrap_or(""),
        ],
    )
}

/// Apply the filter and sort to a collection.
pub fn station_view<'a>(
    stations: &'a [StationStatus],
    query: &str,
    sort: &SortState,
) -> Vec<&'a StationStatus> {
    let mut view: Vec<&StationStatus> = stations
        .iter()
        .filter(|s| station_matches(query, s))
        .collect();
    view.sort_by(|a, b| sort.compare(a, b));
    view
}

/// CSV of exactly the rows shown.
pub fn stations_csv(view: &[&StationStatus]) -> String {
    let rows = view.iter().map(|s| {
        vec![
            s.station_id.clone(),
            s.serial_number.clone().unwrap_or_default(),
            s.modem_address.map(|v| v.to_string()).unwrap_or_default(),
            s.bottom_depth_m.map(|v| v.to_string()).unwrap_or_default(),
            s.waypoint_number.map(|v| v.to_string()).unwrap_or_default(),
            s.last_offload_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            s.last_offload_by.clone().unwrap_or_default(),
            s.status.clone().unwrap_or_default(),
            s.notes.clone().unwrap_or_default(),
        ]
    });
    to_csv(&CSV_HEADERS, rows)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationAction {
    Filter(Option<String>),
    Sort(SortColumn),
    ExportCsv,
    Lookup(Option<String>),
    PickStation(String),
    Edit(String),
    SaveEdit,
    CancelEdit,
}

impl PageAction for StationAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        let station = || event.id.clone().filter(|id| !id.is_empty());
        match event.action.as_str() {
            "filter" => Some(StationAction::Filter(event.value.clone())),
            "sort" => event
                .id
                .as_deref()
                .and_then(SortColumn::parse)
                .map(StationAction::Sort),
            "export-csv" => Some(StationAction::ExportCsv),
            "lookup" => Some(StationAction::Lookup(event.value.clone())),
            "pick-station" => station().map(StationAction::PickStation),
            "edit" => station().map(StationAction::Edit),
            "save-edit" => Some(StationAction::SaveEdit),
            "cancel-edit" => Some(StationAction::CancelEdit),
            _ => None,
        }
    }
}

pub struct StationStatusPage {
    ctx: PageContext,
    stations: CollectionCache<StationStatus>,
    query: String,
    sort: SortState,
    editing: Option<String>,
    generation: Generation,
    lookup_generation: Generation,
    debouncer: Debouncer,
}

impl StationStatusPage {
    pub fn new(ctx: PageContext) -> Self {
        let debouncer = Debouncer::new(ctx.config.search_debounce);
        Self {
            ctx,
            stations: CollectionCache::new(),
            query: String::new(),
            sort: SortState::default(),
            editing: None,
            generation: Generation::new(),
            lookup_generation: Generation::new(),
            debouncer,
        }
    }

    pub fn stations(&self) -> &[StationStatus] {
        self.stations.items()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Rows as currently displayed.
    pub fn view(&self) -> Vec<&StationStatus> {
        station_view(self.stations.items(), &self.query, &self.sort)
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_stations().await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, "Discarding superseded station list");
            return;
        }

        match result {
            Ok(stations) => {
                tracing::info!(page = ROUTE, count = stations.len(), "Stations loaded");
                self.stations.replace(stations);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, TABLE_BODY, "stations", &e),
        }
    }

    pub async fn dispatch(&mut self, action: StationAction) {
        let result = match action {
            StationAction::Filter(query) => {
                self.query = query
                    .unwrap_or_else(|| self.ctx.value(SEARCH))
                    .trim()
                    .to_string();
                self.render();
                Ok(())
            }
            StationAction::Sort(column) => {
                self.sort.toggle(column);
                tracing::debug!(page = ROUTE, ?column, ascending = self.sort.ascending, "Sorting stations");
                self.render();
                Ok(())
            }
            StationAction::ExportCsv => {
                self.export_csv();
                Ok(())
            }
            StationAction::Lookup(query) => {
                let query = query.unwrap_or_else(|| self.ctx.value(LOOKUP));
                self.schedule_lookup(query.trim().to_string());
                Ok(())
            }
            StationAction::PickStation(id) => self.pick_station(&id).await,
            StationAction::Edit(id) => {
                self.open_edit(&id);
                Ok(())
            }
            StationAction::SaveEdit => self.save_edit().await,
            StationAction::CancelEdit => {
                self.close_edit();
                Ok(())
            }
        };

        if let Err(e) = result {
            self.ctx.report("Station action failed", &e);
        }
    }

    fn render(&self) {
        let view = self.view();
        let html = if self.stations.is_empty() {
            table_placeholder("No stations found.")
        } else if view.is_empty() {
            table_placeholder("No stations match your search.")
        } else {
            view.iter().map(|s| render_row(s)).collect()
        };

        let mut document = self.ctx.document.lock();
        document.set_html(TABLE_BODY, html);
        document.set_html(
            COUNT,
            format!("{} of {} stations", view.len(), self.stations.len()),
        );
    }

    fn export_csv(&self) {
        let view = self.view();
        let csv = stations_csv(&view);
        let filename = format!(
            "station_status_{}.csv",
            Local::now().date_naive().format("%Y-%m-%d")
        );
        tracing::info!(page = ROUTE, rows = view.len(), filename = %filename, "Exporting stations");

        self.ctx.browser.save_file(Download {
            filename,
            content_type: "text/csv".to_string(),
            bytes: csv.into_bytes(),
        });
    }

    fn schedule_lookup(&mut self, query: String) {
        let ticket = self.lookup_generation.advance();
        if query.is_empty() {
            self.debouncer.cancel();
            self.ctx.set_html(SUGGESTIONS, "");
            return;
        }

        let ctx = self.ctx.clone();
        self.debouncer.schedule(run_lookup(ctx, ticket, query));
    }

    async fn pick_station(&mut self, station_id: &str) -> Result<(), ApiError> {
        self.debouncer.cancel();
        let ticket = self.lookup_generation.advance();
        {
            let mut document = self.ctx.document.lock();
            document.set_value(LOOKUP, station_id);
            document.set_html(SUGGESTIONS, "");
        }

        let station = self.ctx.api.station(station_id).await;
        if !ticket.is_current() {
            return Ok(());
        }
        match station {
            Ok(station) => {
                tracing::info!(page = ROUTE, station = %station.station_id, "Station metadata loaded");
                self.ctx.set_html(METADATA, render_metadata(&station));
                Ok(())
            }
            Err(e) => {
                self.ctx.set_html(METADATA, "");
                Err(e)
            }
        }
    }

    fn open_edit(&mut self, station_id: &str) {
        let Some(station) = self.stations.get(&station_id.to_string()) else {
            self.ctx.toasts.danger("Station not found.");
            return;
        };

        let or_blank = |v: Option<String>| v.unwrap_or_default();
        {
            let mut document = self.ctx.document.lock();
            document.set_value(EDIT_SERIAL, or_blank(station.serial_number.clone()));
            document.set_value(EDIT_MODEM, or_blank(station.modem_address.map(|v| v.to_string())));
            document.set_value(EDIT_DEPTH, or_blank(station.bottom_depth_m.map(|v| v.to_string())));
            document.set_value(EDIT_WAYPOINT, or_blank(station.waypoint_number.map(|v| v.to_string())));
            document.set_value(EDIT_NOTES, or_blank(station.notes.clone()));
            document.set_html(EDIT_ERROR, "");
            document.show(EDIT_MODAL);
        }
        self.editing = Some(station_id.to_string());
    }

    fn close_edit(&mut self) {
        self.editing = None;
        let mut document = self.ctx.document.lock();
        document.hide(EDIT_MODAL);
        document.set_html(EDIT_ERROR, "");
    }

    fn read_edit_form(&self) -> Result<StationUpdate, String> {
        let document = self.ctx.document.lock();
        let text = |id: &str| {
            let value = document.trimmed_value(id);
            (!value.is_empty()).then_some(value)
        };

        let modem_address = parse_optional::<i64>(&document.trimmed_value(EDIT_MODEM))
            .map_err(|_| "Modem address must be a whole number.".to_string())?;
        let bottom_depth_m = parse_optional::<f64>(&document.trimmed_value(EDIT_DEPTH))
            .map_err(|_| "Bottom depth must be a number.".to_string())?;
        let waypoint_number = parse_optional::<i64>(&document.trimmed_value(EDIT_WAYPOINT))
            .map_err(|_| "Waypoint must be a whole number.".to_string())?;

        Ok(StationUpdate {
            serial_number: text(EDIT_SERIAL),
            modem_address,
            bottom_depth_m,
            waypoint_number,
            notes: text(EDIT_NOTES),
        })
    }

    async fn save_edit(&mut self) -> Result<(), ApiError> {
        let Some(station_id) = self.editing.clone() else {
            tracing::warn!(page = ROUTE, "Save without a station being edited");
            return Ok(());
        };
        let update = match self.read_edit_form() {
            Ok(update) => update,
            Err(message) => {
                self.ctx.set_html(EDIT_ERROR, inline_error(&message));
                return Ok(());
            }
        };

        let updated = self.ctx.api.update_station(&station_id, &update).await?;
        tracing::info!(page = ROUTE, station = %updated.station_id, "Station metadata updated");

        if !self.stations.patch(updated) {
            tracing::warn!(page = ROUTE, station = %station_id, "Updated station is no longer cached");
        }
        self.close_edit();
        self.render();
        self.ctx.toasts.success("Station updated.");
        Ok(())
    }
}

async fn run_lookup(ctx: PageContext, ticket: Ticket, query: String) {
    tracing::debug!(page = ROUTE, query = %query, "Looking up stations");
    let result = ctx.api.search_stations(&query).await;
    if !ticket.is_current() {
        tracing::debug!(page = ROUTE, query = %query, "Discarding superseded station suggestions");
        return;
    }

    match result {
        Ok(stations) => ctx.set_html(SUGGESTIONS, render_suggestions(&stations)),
        Err(e) => {
            ctx.set_html(SUGGESTIONS, "");
            ctx.report("Station search failed", &e);
        }
    }
}

#[async_trait]
impl Page for StationStatusPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match StationAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn parse_optional<T: std::str::FromStr>(raw: &str) -> Result<Option<T>, T::Err> {
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

fn table_placeholder(message: &str) -> String {
    format!(
        r#"<tr><td colspan="{}">{}</td></tr>"#,
        COLUMNS,
        empty_state(message)
    )
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| escape_html(&v.to_string())).unwrap_or_default()
}

fn render_row(station: &StationStatus) -> String {
    let status_class = match station.status_label() {
        "active" | "ok" => "bg-success",
        "offloaded" => "bg-info",
        "overdue" | "error" => "bg-danger",
        _ => "bg-secondary",
    };

    format!(
        r#"<tr class="station-row" data-id="{id}"><td>{id}</td><td>{serial}</td><td>{modem}</td><td>{depth}</td><td>{waypoint}</td><td>{offload}</td><td>{by}</td><td>{status}</td><td>{notes}</td><td>{edit}</td></tr>"#,
        id = escape_html(&station.station_id),
        serial = optional(station.serial_number.as_deref()),
        modem = optional(station.modem_address),
        depth = optional(station.bottom_depth_m),
        waypoint = optional(station.waypoint_number),
        offload = optional(station.last_offload_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        by = optional(station.last_offload_by.as_deref()),
        status = badge(station.status_label(), status_class),
        notes = optional(station.notes.as_deref()),
        edit = action_button("Edit", "btn-sm btn-outline-primary", "edit", &station.station_id),
    )
}

fn render_suggestions(stations: &[StationSummary]) -> String {
    if stations.is_empty() {
        return empty_state("No matching stations.");
    }
    let items: String = stations
        .iter()
        .map(|s| {
            format!(
                r#"<li class="list-group-item station-suggestion" {attrs}>{id} <small class="text-muted">{serial}</small></li>"#,
                attrs = action_attrs("pick-station", Some(&s.station_id as &dyn Display)),
                id = escape_html(&s.station_id),
                serial = optional(s.serial_number.as_deref()),
            )
        })
        .collect();
    format!(r#"<ul class="list-group">{}</ul>"#, items)
}

fn render_metadata(station: &StationStatus) -> String {
    let row = |label: &str, value: String| {
        format!(
            "<dt class=\"col-sm-4\">{}</dt><dd class=\"col-sm-8\">{}</dd>",
            label,
            if value.is_empty() { "-".to_string() } else { value }
        )
    };
    format!(
        r#"<dl class="row station-metadata" data-id="{id}">{rows}</dl>"#,
        id = escape_html(&station.station_id),
        rows = [
            row("Station", escape_html(&station.station_id)),
            row("Serial number", optional(station.serial_number.as_deref())),
            row("Modem address", optional(station.modem_address)),
            row("Bottom depth (m)", optional(station.bottom_depth_m)),
            row("Waypoint", optional(station.waypoint_number)),
            row("Field season", optional(station.field_season_year)),
            row(
                "Last offload",
                optional(station.last_offload_at.map(|t| t.format("%Y-%m-%d %H:%M UTC")))
            ),
            row("Offloaded by", optional(station.last_offload_by.as_deref())),
            row("Status", escape_html(station.status_label())),
            row("Notes", optional(station.notes.as_deref())),
        ]
        .concat(),
    )
}
