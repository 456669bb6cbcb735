//! Mission photo and video gallery.

use async_trait::async_trait;
use reqwest::multipart::Form;

use super::{file_part, show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{MediaItem, MediaUpdate};
use crate::PageContext;

pub const GALLERY: &str = "mediaGallery";
pub const FILE: &str = "mediaFile";
pub const CAPTION: &str = "mediaCaption";
pub const OPERATION: &str = "mediaOperation";
pub const UPLOAD_STATUS: &str = "mediaUploadStatus";

const ROUTE: &str = "mission/media";

/// Id of the inline caption editor for a media item.
pub fn caption_input_id(media_id: i64) -> String {
    format!("editCaption-{}", media_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Upload,
    SaveCaption(i64),
    Delete(i64),
}

impl PageAction for MediaAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "upload-media" => Some(MediaAction::Upload),
            "save-caption" => event.id_as().map(MediaAction::SaveCaption),
            "delete-media" => event.id_as().map(MediaAction::Delete),
            _ => None,
        }
    }
}

pub struct MissionMediaPage {
    ctx: PageContext,
    mission_id: String,
    media: CollectionCache<MediaItem>,
    generation: Generation,
}

impl MissionMediaPage {
    pub fn new(ctx: PageContext, mission_id: &str) -> Self {
        Self {
            ctx,
            mission_id: mission_id.to_string(),
            media: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn media(&self) -> &[MediaItem] {
        self.media.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_media(&self.mission_id).await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(items) => {
                tracing::info!(page = ROUTE, mission = %self.mission_id, count = items.len(), "Media loaded");
                self.media.replace(items);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, GALLERY, "media", &e),
        }
    }

    pub async fn dispatch(&mut self, action: MediaAction) {
        let result = match action {
            MediaAction::Upload => self.upload().await,
            MediaAction::SaveCaption(id) => self.save_caption(id).await,
            MediaAction::Delete(id) => self.delete(id).await,
        };

        if let Err(e) = result {
            let what = match action {
                MediaAction::Upload => "Failed to upload media",
                MediaAction::SaveCaption(_) => "Failed to update caption",
                MediaAction::Delete(_) => "Failed to delete media",
            };
            self.ctx.report(what, &e);
        }
    }

    fn render(&self) {
        let html = if self.media.is_empty() {
            empty_state("No media uploaded for this mission.")
        } else {
            self.media.items().iter().map(render_item).collect()
        };

        let mut document = self.ctx.document.lock();
        document.set_html(GALLERY, html);
        for item in self.media.items() {
            document.set_value(
                &caption_input_id(item.id),
                item.caption.clone().unwrap_or_default(),
            );
        }
    }

    async fn upload(&mut self) -> Result<(), ApiError> {
        let (files, caption, operation) = {
            let document = self.ctx.document.lock();
            (
                document.files(FILE),
                document.trimmed_value(CAPTION),
                document.trimmed_value(OPERATION),
            )
        };
        let Some(file) = files.first() else {
            self.ctx
                .set_html(UPLOAD_STATUS, inline_error("Please select a file to upload."));
            return Ok(());
        };

        let form = Form::new()
            .part("file", file_part(file)?)
            .text("caption", caption)
            .text("operation_type", operation);

        self.ctx.set_html(UPLOAD_STATUS, "Uploading...");
        let uploaded = match self.ctx.api.upload_media(&self.mission_id, form).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.ctx
                    .set_html(UPLOAD_STATUS, inline_error(&e.user_message()));
                return Err(e);
            }
        };
        tracing::info!(page = ROUTE, mission = %self.mission_id, id = uploaded.id, "Media uploaded");

        {
            let mut document = self.ctx.document.lock();
            document.clear_inputs(&[FILE, CAPTION, OPERATION]);
            document.set_html(UPLOAD_STATUS, "");
        }
        self.ctx.toasts.success("Media uploaded.");
        self.reload().await;
        Ok(())
    }

    async fn save_caption(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(operation_type) = self.media.get(&id).map(|m| m.operation_type.clone()) else {
            self.ctx.toasts.danger("Media item not found.");
            return Ok(());
        };

        let caption = self.ctx.value(&caption_input_id(id));
        let update = MediaUpdate {
            caption: (!caption.is_empty()).then_some(caption),
            operation_type,
        };
        let updated = self
            .ctx
            .api
            .update_media(&self.mission_id, id, &update)
            .await?;
        tracing::info!(page = ROUTE, id = updated.id, "Caption updated");

        if !self.media.patch(updated) {
            tracing::warn!(page = ROUTE, id, "Updated media item is no longer cached");
        }
        self.render();
        self.ctx.toasts.success("Caption updated.");
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        if !self
            .ctx
            .browser
            .confirm("Are you sure you want to delete this media item?")
        {
            return Ok(());
        }

        self.ctx.api.delete_media(&self.mission_id, id).await?;
        tracing::info!(page = ROUTE, id, "Media deleted");

        self.ctx.toasts.success("Media deleted.");
        self.reload().await;
        Ok(())
    }
}

#[async_trait]
impl Page for MissionMediaPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match MediaAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_item(item: &MediaItem) -> String {
    let url = escape_html(&item.file_url);
    let preview = if item.is_video() {
        format!(r#"<video src="{}" controls class="card-img-top"></video>"#, url)
    } else {
        format!(
            r#"<img src="{}" alt="{}" class="card-img-top">"#,
            url,
            escape_html(item.caption.as_deref().unwrap_or(""))
        )
    };
    let operation = item
        .operation_type
        .as_deref()
        .map(|op| badge(op, "bg-info"))
        .unwrap_or_default();

    format!(
        r#"<div class="card media-item" data-id="{id}">{preview}<div class="card-body">{operation}<input type="text" class="form-control form-control-sm mt-1" id="{input_id}" value="{caption}"><small class="text-muted">{by}, {at}</small><div class="mt-2">{save} {delete}</div></div></div>"#,
        id = item.id,
        preview = preview,
        operation = operation,
        input_id = caption_input_id(item.id),
        caption = escape_html(item.caption.as_deref().unwrap_or("")),
        by = escape_html(&item.uploaded_by),
        at = item.uploaded_at.format("%Y-%m-%d %H:%M UTC"),
        save = action_button("Save caption", "btn-sm btn-outline-primary", "save-caption", &item.id),
        delete = action_button("Delete", "btn-sm btn-outline-danger", "delete-media", &item.id),
    )
}
