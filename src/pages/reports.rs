//! Mission reports and raw data exports.

use async_trait::async_trait;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, empty_state, error_state, escape_html};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{GenerateReportRequest, ReportRecord, ReportType};
use crate::PageContext;

pub const LIST: &str = "reportsList";
pub const REPORT_TYPE: &str = "reportType";
pub const STATUS: &str = "reportStatus";
pub const CSV_SOURCE: &str = "csvSource";
pub const KML_HOURS: &str = "kmlHours";

/// Track window used when the hours field is left blank.
pub const DEFAULT_KML_HOURS: u32 = 72;

const ROUTE: &str = "mission/reports";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Generate,
    Download(i64),
    Delete(i64),
    ExportCsv,
    ExportKml,
}

impl PageAction for ReportAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "generate" => Some(ReportAction::Generate),
            "download" => event.id_as().map(ReportAction::Download),
            "delete" => event.id_as().map(ReportAction::Delete),
            "export-csv" => Some(ReportAction::ExportCsv),
            "export-kml" => Some(ReportAction::ExportKml),
            _ => None,
        }
    }
}

/// Parse the KML window field. Blank means the default.
pub fn parse_hours(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(DEFAULT_KML_HOURS);
    }
    raw.parse().ok().filter(|h| *h > 0)
}

pub struct ReportsPage {
    ctx: PageContext,
    mission_id: String,
    reports: CollectionCache<ReportRecord>,
    generation: Generation,
}

impl ReportsPage {
    pub fn new(ctx: PageContext, mission_id: &str) -> Self {
        Self {
            ctx,
            mission_id: mission_id.to_string(),
            reports: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn reports(&self) -> &[ReportRecord] {
        self.reports.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_reports(&self.mission_id).await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(reports) => {
                tracing::info!(page = ROUTE, mission = %self.mission_id, count = reports.len(), "Reports loaded");
                self.reports.replace(reports);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, LIST, "reports", &e),
        }
    }

    pub async fn dispatch(&mut self, action: ReportAction) {
        let result = match action {
            ReportAction::Generate => self.generate().await,
            ReportAction::Download(id) => self.download(id).await,
            ReportAction::Delete(id) => self.delete(id).await,
            ReportAction::ExportCsv => self.export_csv().await,
            ReportAction::ExportKml => self.export_kml().await,
        };

        if let Err(e) = result {
            let what = match action {
                ReportAction::Generate => "Failed to generate report",
                ReportAction::Download(_) => "Failed to download report",
                ReportAction::Delete(_) => "Failed to delete report",
                ReportAction::ExportCsv => "Failed to export CSV",
                ReportAction::ExportKml => "Failed to export KML",
            };
            self.ctx.report(what, &e);
        }
    }

    fn render(&self) {
        let html = if self.reports.is_empty() {
            empty_state("No reports generated yet.")
        } else {
            self.reports.items().iter().map(render_report).collect()
        };
        self.ctx.set_html(LIST, html);
    }

    async fn generate(&mut self) -> Result<(), ApiError> {
        let report_type = ReportType::parse(&self.ctx.value(REPORT_TYPE)).unwrap_or_default();
        let request = GenerateReportRequest {
            report_type,
            save_to_overview: true,
        };

        self.ctx.set_html(STATUS, "Generating report...");
        let report = match self.ctx.api.generate_report(&self.mission_id, &request).await {
            Ok(report) => report,
            Err(e) => {
                self.ctx.set_html(
                    STATUS,
                    error_state(&format!("Report generation failed: {}", e.user_message())),
                );
                return Err(e);
            }
        };
        tracing::info!(page = ROUTE, mission = %self.mission_id, id = report.id, kind = report_type.as_str(), "Report generated");

        self.ctx.set_html(STATUS, "");
        self.ctx
            .toasts
            .success(&format!("{} generated.", report_type.label()));
        self.reload().await;
        Ok(())
    }

    async fn download(&self, id: i64) -> Result<(), ApiError> {
        let download = self.ctx.api.download_report(id).await?;
        self.ctx.browser.save_file(download);
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        if !self
            .ctx
            .browser
            .confirm("Are you sure you want to delete this report?")
        {
            return Ok(());
        }

        self.ctx.api.delete_report(id).await?;
        tracing::info!(page = ROUTE, id, "Report deleted");

        self.ctx.toasts.success("Report deleted.");
        self.reload().await;
        Ok(())
    }

    async fn export_csv(&self) -> Result<(), ApiError> {
        let source = self.ctx.value(CSV_SOURCE);
        if source.is_empty() {
            self.ctx.toasts.danger("Please choose a data source to export.");
            return Ok(());
        }

        let download = self
            .ctx
            .api
            .export_sensor_csv(&self.mission_id, &source)
            .await?;
        self.ctx.browser.save_file(download);
        Ok(())
    }

    async fn export_kml(&self) -> Result<(), ApiError> {
        let Some(hours) = parse_hours(&self.ctx.value(KML_HOURS)) else {
            self.ctx
                .toasts
                .danger("Hours must be a positive whole number.");
            return Ok(());
        };

        let download = self
            .ctx
            .api
            .export_track_kml(&self.mission_id, hours)
            .await?;
        self.ctx.browser.save_file(download);
        Ok(())
    }
}

#[async_trait]
impl Page for ReportsPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match ReportAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_report(report: &ReportRecord) -> String {
    format!(
        r#"<tr class="report-item" data-id="{id}"><td>{kind}</td><td>{at}</td><td>{by}</td><td>{file}</td><td>{download} {delete}</td></tr>"#,
        id = report.id,
        kind = report.report_type.label(),
        at = report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        by = escape_html(report.generated_by.as_deref().unwrap_or("")),
        file = escape_html(report.file_name.as_deref().unwrap_or("")),
        download = action_button("Download", "btn-sm btn-outline-primary", "download", &report.id),
        delete = action_button("Delete", "btn-sm btn-outline-danger", "delete", &report.id),
    )
}
