//! Mission overview page: planning document, goals and notes.

use async_trait::async_trait;
use reqwest::multipart::Form;

use super::{file_part, show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{
    GoalRequest, MissionGoal, MissionInfo, MissionNote, MissionOverview, NoteRequest,
    OverviewUpdate,
};
use crate::PageContext;

pub const OVERVIEW: &str = "missionOverview";
pub const DOC_URL: &str = "overviewDocUrl";
pub const COMMENTS: &str = "overviewComments";
pub const PLAN_FILE: &str = "planDocFile";
pub const PLAN_STATUS: &str = "planUploadStatus";
pub const GOALS_LIST: &str = "missionGoalsList";
pub const NEW_GOAL: &str = "newGoalDescription";
pub const GOAL_ERROR: &str = "goalFormError";
pub const NOTES_LIST: &str = "missionNotesList";
pub const NEW_NOTE: &str = "newNoteContent";
pub const NOTE_ERROR: &str = "noteFormError";

const ROUTE: &str = "mission";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionAction {
    SaveOverview,
    UploadPlan,
    AddGoal,
    ToggleGoal(i64),
    DeleteGoal(i64),
    AddNote,
    DeleteNote(i64),
}

impl PageAction for MissionAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "save-overview" => Some(MissionAction::SaveOverview),
            "upload-plan" => Some(MissionAction::UploadPlan),
            "add-goal" => Some(MissionAction::AddGoal),
            "toggle-goal" => event.id_as().map(MissionAction::ToggleGoal),
            "delete-goal" => event.id_as().map(MissionAction::DeleteGoal),
            "add-note" => Some(MissionAction::AddNote),
            "delete-note" => event.id_as().map(MissionAction::DeleteNote),
            _ => None,
        }
    }
}

impl MissionAction {
    fn failure(&self) -> &'static str {
        match self {
            MissionAction::SaveOverview => "Failed to save overview",
            MissionAction::UploadPlan => "Failed to upload plan document",
            MissionAction::AddGoal => "Failed to add goal",
            MissionAction::ToggleGoal(_) => "Failed to update goal",
            MissionAction::DeleteGoal(_) => "Failed to delete goal",
            MissionAction::AddNote => "Failed to add note",
            MissionAction::DeleteNote(_) => "Failed to delete note",
        }
    }
}

pub struct MissionOverviewPage {
    ctx: PageContext,
    mission_id: String,
    overview: MissionOverview,
    goals: CollectionCache<MissionGoal>,
    notes: CollectionCache<MissionNote>,
    generation: Generation,
}

impl MissionOverviewPage {
    pub fn new(ctx: PageContext, mission_id: &str) -> Self {
        Self {
            ctx,
            mission_id: mission_id.to_string(),
            overview: MissionOverview::default(),
            goals: CollectionCache::new(),
            notes: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn mission_id(&self) -> &str {
        &self.mission_id
    }

    pub fn goals(&self) -> &[MissionGoal] {
        self.goals.items()
    }

    pub fn notes(&self) -> &[MissionNote] {
        self.notes.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.mission_info(&self.mission_id).await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, mission = %self.mission_id, "Discarding superseded mission info");
            return;
        }

        match result {
            Ok(info) => {
                tracing::info!(
                    page = ROUTE,
                    mission = %self.mission_id,
                    goals = info.goals.len(),
                    notes = info.notes.len(),
                    "Mission info loaded"
                );
                self.apply(info);
            }
            Err(e) => show_load_error(&self.ctx, OVERVIEW, "mission info", &e),
        }
    }

    fn apply(&mut self, info: MissionInfo) {
        self.overview = info.overview.unwrap_or_default();
        self.goals.replace(info.goals);
        self.notes.replace(info.notes);

        {
            let mut document = self.ctx.document.lock();
            document.set_value(DOC_URL, self.overview.document_url.clone().unwrap_or_default());
            document.set_value(COMMENTS, self.overview.comments.clone().unwrap_or_default());
        }
        self.render_overview();
        self.render_goals();
        self.render_notes();
    }

    pub async fn dispatch(&mut self, action: MissionAction) {
        let result = match action {
            MissionAction::SaveOverview => self.save_overview().await,
            MissionAction::UploadPlan => self.upload_plan().await,
            MissionAction::AddGoal => self.add_goal().await,
            MissionAction::ToggleGoal(id) => self.toggle_goal(id).await,
            MissionAction::DeleteGoal(id) => self.delete_goal(id).await,
            MissionAction::AddNote => self.add_note().await,
            MissionAction::DeleteNote(id) => self.delete_note(id).await,
        };

        if let Err(e) = result {
            self.ctx.report(action.failure(), &e);
        }
    }

    fn render_overview(&self) {
        let link = |label: &str, url: &Option<String>| match url {
            Some(url) if !url.is_empty() => format!(
                r#"<li><a href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                escape_html(url),
                escape_html(label)
            ),
            _ => format!(
                r#"<li class="text-muted">{}: not available</li>"#,
                escape_html(label)
            ),
        };
        let comments = match self.overview.comments.as_deref() {
            Some(c) if !c.trim().is_empty() => {
                format!(r#"<p class="overview-comments">{}</p>"#, escape_html(c))
            }
            _ => String::new(),
        };

        let html = format!(
            r#"<ul class="list-unstyled">{}{}{}</ul>{}"#,
            link("Mission plan", &self.overview.document_url),
            link("Weekly report", &self.overview.weekly_report_url),
            link("End of mission report", &self.overview.end_of_mission_report_url),
            comments
        );
        self.ctx.set_html(OVERVIEW, html);
    }

    fn render_goals(&self) {
        let html = if self.goals.is_empty() {
            empty_state("No goals defined for this mission.")
        } else {
            self.goals.items().iter().map(render_goal).collect()
        };
        self.ctx.set_html(GOALS_LIST, html);
    }

    fn render_notes(&self) {
        let html = if self.notes.is_empty() {
            empty_state("No notes yet.")
        } else {
            self.notes.items().iter().map(render_note).collect()
        };
        self.ctx.set_html(NOTES_LIST, html);
    }

    async fn save_overview(&mut self) -> Result<(), ApiError> {
        let update = {
            let document = self.ctx.document.lock();
            let url = document.trimmed_value(DOC_URL);
            let comments = document.trimmed_value(COMMENTS);
            OverviewUpdate {
                document_url: (!url.is_empty()).then_some(url),
                comments: (!comments.is_empty()).then_some(comments),
            }
        };

        self.ctx
            .api
            .update_overview(&self.mission_id, &update)
            .await?;
        tracing::info!(page = ROUTE, mission = %self.mission_id, "Overview saved");

        self.ctx.toasts.success("Mission overview saved.");
        self.reload().await;
        Ok(())
    }

    async fn upload_plan(&mut self) -> Result<(), ApiError> {
        let files = self.ctx.document.lock().files(PLAN_FILE);
        let Some(file) = files.first() else {
            self.ctx
                .set_html(PLAN_STATUS, inline_error("Please select a file to upload."));
            return Ok(());
        };

        let form = Form::new().part("file", file_part(file)?);
        self.ctx.set_html(PLAN_STATUS, "Uploading...");
        let uploaded = match self.ctx.api.upload_plan(&self.mission_id, form).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.ctx.set_html(PLAN_STATUS, inline_error(&e.user_message()));
                return Err(e);
            }
        };
        tracing::info!(page = ROUTE, mission = %self.mission_id, url = %uploaded.file_url, "Plan document uploaded");

        let name = uploaded.filename.as_deref().unwrap_or(&file.name);
        {
            let mut document = self.ctx.document.lock();
            document.set_value(DOC_URL, uploaded.file_url.as_str());
            document.clear_inputs(&[PLAN_FILE]);
            document.set_html(
                PLAN_STATUS,
                format!(
                    "Uploaded {}. Save the overview to keep it.",
                    escape_html(name)
                ),
            );
        }
        self.ctx.toasts.success("Plan document uploaded.");
        Ok(())
    }

    async fn add_goal(&mut self) -> Result<(), ApiError> {
        let description = self.ctx.value(NEW_GOAL);
        if description.is_empty() {
            self.ctx
                .set_html(GOAL_ERROR, inline_error("Goal description cannot be empty."));
            return Ok(());
        }
        self.ctx.set_html(GOAL_ERROR, "");

        self.ctx
            .api
            .create_goal(&self.mission_id, &GoalRequest { description })
            .await?;
        tracing::info!(page = ROUTE, mission = %self.mission_id, "Goal added");

        self.ctx.document.lock().clear_inputs(&[NEW_GOAL]);
        self.reload().await;
        Ok(())
    }

    async fn toggle_goal(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(completed) = self.goals.get(&id).map(|g| g.is_completed) else {
            self.ctx.toasts.danger("Goal not found.");
            return Ok(());
        };

        let updated = self
            .ctx
            .api
            .toggle_goal(&self.mission_id, id, !completed)
            .await?;
        tracing::info!(page = ROUTE, id = updated.id, completed = updated.is_completed, "Goal toggled");

        if !self.goals.patch(updated) {
            tracing::warn!(page = ROUTE, id, "Toggled goal is no longer cached");
        }
        self.render_goals();
        Ok(())
    }

    async fn delete_goal(&mut self, id: i64) -> Result<(), ApiError> {
        if !self
            .ctx
            .browser
            .confirm("Are you sure you want to delete this goal?")
        {
            return Ok(());
        }

        self.ctx.api.delete_goal(&self.mission_id, id).await?;
        tracing::info!(page = ROUTE, id, "Goal deleted");
        self.reload().await;
        Ok(())
    }

    async fn add_note(&mut self) -> Result<(), ApiError> {
        let content = self.ctx.value(NEW_NOTE);
        if content.is_empty() {
            self.ctx
                .set_html(NOTE_ERROR, inline_error("Note content cannot be empty."));
            return Ok(());
        }
        self.ctx.set_html(NOTE_ERROR, "");

        let note = self
            .ctx
            .api
            .create_note(&self.mission_id, &NoteRequest { content })
            .await?;
        tracing::info!(page = ROUTE, mission = %self.mission_id, id = note.id, "Note added");

        self.ctx.document.lock().clear_inputs(&[NEW_NOTE]);
        self.notes.prepend(note);
        self.render_notes();
        Ok(())
    }

    async fn delete_note(&mut self, id: i64) -> Result<(), ApiError> {
        if !self
            .ctx
            .browser
            .confirm("Are you sure you want to delete this note?")
        {
            return Ok(());
        }

        self.ctx.api.delete_note(&self.mission_id, id).await?;
        tracing::info!(page = ROUTE, id, "Note deleted");
        self.reload().await;
        Ok(())
    }
}

#[async_trait]
impl Page for MissionOverviewPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match MissionAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_goal(goal: &MissionGoal) -> String {
    let checked = if goal.is_completed { " checked" } else { "" };
    let completed = match (&goal.completed_by, goal.completed_at) {
        (Some(by), Some(at)) => format!(
            r#" <small class="text-muted">done by {} on {}</small>"#,
            escape_html(by),
            at.format("%Y-%m-%d")
        ),
        _ => String::new(),
    };

    format!(
        r#"<li class="list-group-item goal-item{done}" data-id="{id}"><input type="checkbox" class="form-check-input me-2" data-action="toggle-goal" data-id="{id}"{checked}>{description}{completed} {delete}</li>"#,
        done = if goal.is_completed { " completed" } else { "" },
        id = goal.id,
        checked = checked,
        description = escape_html(&goal.description),
        completed = completed,
        delete = action_button("Delete", "btn-sm btn-link text-danger", "delete-goal", &goal.id),
    )
}

fn render_note(note: &MissionNote) -> String {
    format!(
        r#"<div class="card note-item mb-2" data-id="{id}"><div class="card-body"><p class="card-text">{content}</p><small class="text-muted">{by}, {at}</small> {delete}</div></div>"#,
        id = note.id,
        content = escape_html(&note.content),
        by = escape_html(&note.created_by),
        at = note.created_at.format("%Y-%m-%d %H:%M UTC"),
        delete = action_button("Delete", "btn-sm btn-link text-danger", "delete-note", &note.id),
    )
}
