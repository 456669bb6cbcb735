//! Announcement administration and the home-page announcement banner.

use async_trait::async_trait;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{Acknowledgement, Announcement, AnnouncementRequest, AnnouncementType};
use crate::PageContext;

pub const ROUTE: &str = "admin/announcements";
pub const BANNER_ROUTE: &str = "home";

pub const LIST: &str = "announcementsList";
pub const CONTENT_INPUT: &str = "announcementContent";
pub const TYPE_INPUT: &str = "announcementType";
pub const FORM_ERROR: &str = "announcementFormError";
pub const EDIT_MODAL: &str = "editAnnouncementModal";
pub const EDIT_CONTENT: &str = "editAnnouncementContent";
pub const EDIT_TYPE: &str = "editAnnouncementType";
pub const EDIT_ERROR: &str = "editAnnouncementError";
pub const ACKS_LIST: &str = "acknowledgementsList";
pub const BANNER: &str = "announcementBanner";

const EMPTY_CONTENT: &str = "Announcement content cannot be empty.";
const ARCHIVE_CONFIRM: &str = "Are you sure you want to archive this announcement?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementAction {
    Create,
    Edit(i64),
    SaveEdit,
    CancelEdit,
    Archive(i64),
    ViewAcknowledgements(i64),
}

impl PageAction for AnnouncementAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "create" => Some(AnnouncementAction::Create),
            "edit" => event.id_as().map(AnnouncementAction::Edit),
            "save-edit" => Some(AnnouncementAction::SaveEdit),
            "cancel-edit" => Some(AnnouncementAction::CancelEdit),
            "archive" => event.id_as().map(AnnouncementAction::Archive),
            "view-acks" => event.id_as().map(AnnouncementAction::ViewAcknowledgements),
            _ => None,
        }
    }
}

impl AnnouncementAction {
    fn failure(&self) -> &'static str {
        match self {
            AnnouncementAction::Create => "Failed to post announcement",
            AnnouncementAction::Edit(_) | AnnouncementAction::CancelEdit => {
                "Failed to open announcement"
            }
            AnnouncementAction::SaveEdit => "Failed to update announcement",
            AnnouncementAction::Archive(_) => "Failed to archive announcement",
            AnnouncementAction::ViewAcknowledgements(_) => "Failed to load acknowledgements",
        }
    }
}

/// Admin page listing every announcement.
pub struct AnnouncementsPage {
    ctx: PageContext,
    announcements: CollectionCache<Announcement>,
    editing: Option<i64>,
    generation: Generation,
}

impl AnnouncementsPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            announcements: CollectionCache::new(),
            editing: None,
            generation: Generation::new(),
        }
    }

    pub fn announcements(&self) -> &[Announcement] {
        self.announcements.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_all_announcements().await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, "Discarding superseded announcement list");
            return;
        }

        match result {
            Ok(items) => {
                tracing::info!(page = ROUTE, count = items.len(), "Announcements loaded");
                self.announcements.replace(items);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, LIST, "announcements", &e),
        }
    }

    pub async fn dispatch(&mut self, action: AnnouncementAction) {
        let result = match action {
            AnnouncementAction::Create => self.create().await,
            AnnouncementAction::Edit(id) => self.open_edit(id),
            AnnouncementAction::SaveEdit => self.save_edit().await,
            AnnouncementAction::CancelEdit => {
                self.close_edit();
                Ok(())
            }
            AnnouncementAction::Archive(id) => self.archive(id).await,
            AnnouncementAction::ViewAcknowledgements(id) => self.view_acknowledgements(id).await,
        };

        if let Err(e) = result {
            self.ctx.report(action.failure(), &e);
        }
    }

    fn render(&self) {
        let html = if self.announcements.is_empty() {
            empty_state("No announcements yet.")
        } else {
            self.announcements.items().iter().map(render_card).collect()
        };
        self.ctx.set_html(LIST, html);
    }

    async fn create(&mut self) -> Result<(), ApiError> {
        let content = self.ctx.value(CONTENT_INPUT);
        if content.is_empty() {
            self.ctx.set_html(FORM_ERROR, inline_error(EMPTY_CONTENT));
            return Ok(());
        }
        self.ctx.set_html(FORM_ERROR, "");

        let request = AnnouncementRequest {
            content,
            announcement_type: AnnouncementType::parse(&self.ctx.value(TYPE_INPUT))
                .unwrap_or_default(),
        };
        let created = self.ctx.api.create_announcement(&request).await?;
        tracing::info!(page = ROUTE, id = created.id, "Announcement posted");

        self.ctx.document.lock().clear_inputs(&[CONTENT_INPUT]);
        self.ctx.toasts.success("Announcement posted.");
        self.reload().await;
        Ok(())
    }

    fn open_edit(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(announcement) = self.announcements.get(&id) else {
            self.ctx.toasts.danger("Announcement not found.");
            return Ok(());
        };

        {
            let mut document = self.ctx.document.lock();
            document.set_value(EDIT_CONTENT, announcement.content.as_str());
            document.set_value(EDIT_TYPE, announcement.announcement_type.as_str());
            document.set_html(EDIT_ERROR, "");
            document.show(EDIT_MODAL);
        }
        self.editing = Some(id);
        Ok(())
    }

    async fn save_edit(&mut self) -> Result<(), ApiError> {
        let Some(id) = self.editing else {
            tracing::warn!(page = ROUTE, "Save without an announcement being edited");
            return Ok(());
        };

        let content = self.ctx.value(EDIT_CONTENT);
        if content.is_empty() {
            self.ctx.set_html(EDIT_ERROR, inline_error(EMPTY_CONTENT));
            return Ok(());
        }

        let request = AnnouncementRequest {
            content,
            announcement_type: AnnouncementType::parse(&self.ctx.value(EDIT_TYPE))
                .unwrap_or_default(),
        };
        self.ctx.api.update_announcement(id, &request).await?;
        tracing::info!(page = ROUTE, id, "Announcement updated");

        self.close_edit();
        self.ctx.toasts.success("Announcement updated.");
        self.reload().await;
        Ok(())
    }

    fn close_edit(&mut self) {
        self.editing = None;
        let mut document = self.ctx.document.lock();
        document.hide(EDIT_MODAL);
        document.clear_inputs(&[EDIT_CONTENT, EDIT_TYPE]);
        document.set_html(EDIT_ERROR, "");
    }

    async fn archive(&mut self, id: i64) -> Result<(), ApiError> {
        if !self.ctx.browser.confirm(ARCHIVE_CONFIRM) {
            return Ok(());
        }

        self.ctx.api.archive_announcement(id).await?;
        tracing::info!(page = ROUTE, id, "Announcement archived");

        self.ctx.toasts.success("Announcement archived.");
        self.reload().await;
        Ok(())
    }

    async fn view_acknowledgements(&mut self, id: i64) -> Result<(), ApiError> {
        let acks = self.ctx.api.list_acknowledgements(id).await?;
        self.ctx.set_html(ACKS_LIST, render_acknowledgements(&acks));
        Ok(())
    }
}

#[async_trait]
impl Page for AnnouncementsPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match AnnouncementAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_card(announcement: &Announcement) -> String {
    let mut buttons = vec![
        action_button("Edit", "btn-sm btn-outline-primary", "edit", &announcement.id),
        action_button(
            "Acknowledgements",
            "btn-sm btn-outline-secondary",
            "view-acks",
            &announcement.id,
        ),
    ];
    if announcement.is_active {
        buttons.push(action_button(
            "Archive",
            "btn-sm btn-outline-danger",
            "archive",
            &announcement.id,
        ));
    }

    let archived = if announcement.is_active {
        String::new()
    } else {
        format!(" {}", badge("Archived", "bg-secondary"))
    };

    format!(
        r#"<div class="card announcement-item mb-2" data-id="{id}"><div class="card-body"><div class="d-flex justify-content-between">{kind}{archived}<small class="text-muted">By {author} on {date}</small></div><p class="card-text">{content}</p><small class="text-muted">{acks} acknowledgement(s)</small><div class="mt-2">{buttons}</div></div></div>"#,
        id = announcement.id,
        kind = badge(
            announcement.announcement_type.as_str(),
            announcement.announcement_type.badge_class()
        ),
        archived = archived,
        author = escape_html(&announcement.created_by),
        date = announcement.created_at.format("%Y-%m-%d %H:%M UTC"),
        content = escape_html(&announcement.content),
        acks = announcement.acknowledgement_count,
        buttons = buttons.join(" "),
    )
}

fn render_acknowledgements(acks: &[Acknowledgement]) -> String {
    if acks.is_empty() {
        return empty_state("No acknowledgements yet.");
    }
    let items: String = acks
        .iter()
        .map(|ack| {
            format!(
                r#"<li class="list-group-item">{} <small class="text-muted">{}</small></li>"#,
                escape_html(&ack.username),
                ack.acknowledged_at.format("%Y-%m-%d %H:%M UTC")
            )
        })
        .collect();
    format!(r#"<ul class="list-group">{}</ul>"#, items)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerAction {
    Acknowledge(i64),
}

impl PageAction for BannerAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "acknowledge" => event.id_as().map(BannerAction::Acknowledge),
            _ => None,
        }
    }
}

/// Banner of unacknowledged announcements on the home page.
pub struct AnnouncementBanner {
    ctx: PageContext,
    active: CollectionCache<Announcement>,
    generation: Generation,
}

impl AnnouncementBanner {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            active: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn active(&self) -> &[Announcement] {
        self.active.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_active_announcements().await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(items) => {
                self.active.replace(items);
                self.render();
            }
            Err(e) => {
                // Banner failures only hide the banner.
                tracing::warn!(page = BANNER_ROUTE, error = %e, "Could not load announcements");
                self.ctx.set_html(BANNER, "");
            }
        }
    }

    pub async fn dispatch(&mut self, action: BannerAction) {
        match action {
            BannerAction::Acknowledge(id) => {
                if let Err(e) = self.acknowledge(id).await {
                    self.ctx.report("Failed to acknowledge announcement", &e);
                }
            }
        }
    }

    async fn acknowledge(&mut self, id: i64) -> Result<(), ApiError> {
        let receipt = self.ctx.api.acknowledge_announcement(id).await?;
        tracing::info!(
            page = BANNER_ROUTE,
            id = receipt.announcement_id,
            "Announcement acknowledged"
        );

        self.active.remove(&receipt.announcement_id);
        self.render();
        Ok(())
    }

    fn render(&self) {
        let html: String = self
            .active
            .items()
            .iter()
            .map(|a| {
                let level = match a.announcement_type {
                    AnnouncementType::General => "info",
                    AnnouncementType::Maintenance => "warning",
                    AnnouncementType::Urgent => "danger",
                };
                format!(
                    r#"<div class="alert alert-{level} announcement-banner-item d-flex justify-content-between" data-id="{id}"><span>{content}</span>{button}</div>"#,
                    level = level,
                    id = a.id,
                    content = escape_html(&a.content),
                    button = action_button("Acknowledge", "btn-sm btn-light", "acknowledge", &a.id),
                )
            })
            .collect();
        self.ctx.set_html(BANNER, html);
    }
}

#[async_trait]
impl Page for AnnouncementBanner {
    fn route(&self) -> &'static str {
        BANNER_ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match BannerAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(BANNER_ROUTE, event),
        }
    }
}
