//! Knowledge base: document library, uploads and full-text search.

use async_trait::async_trait;
use reqwest::multipart::Form;

use super::{file_part, show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error};
use crate::errors::ApiError;
use crate::generation::{Generation, Ticket};
use crate::models::{KnowledgeDocument, KnowledgeSearchHit};
use crate::search::Debouncer;
use crate::PageContext;

pub const ROUTE: &str = "knowledge-base";

pub const LIST: &str = "documentsList";
pub const CATEGORY_FILTER: &str = "kbCategoryFilter";
pub const SEARCH: &str = "kbSearch";
pub const SEARCH_RESULTS: &str = "kbSearchResults";
pub const UPLOAD_MODAL: &str = "uploadModal";
pub const DOC_TITLE: &str = "docTitle";
pub const DOC_CATEGORY: &str = "docCategory";
pub const DOC_DESCRIPTION: &str = "docDescription";
pub const DOC_TAGS: &str = "docTags";
pub const DOC_FILE: &str = "docFile";
pub const UPLOAD_STATUS: &str = "uploadStatus";

/// Shorter queries clear the results instead of searching.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeAction {
    FilterCategory,
    Upload,
    Delete(i64),
    Download(i64),
    /// Query text, or `None` to read it from the search box
    Search(Option<String>),
}

impl PageAction for KnowledgeAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "filter-category" => Some(KnowledgeAction::FilterCategory),
            "upload" => Some(KnowledgeAction::Upload),
            "delete" => event.id_as().map(KnowledgeAction::Delete),
            "download" => event.id_as().map(KnowledgeAction::Download),
            "search" => Some(KnowledgeAction::Search(event.value.clone())),
            _ => None,
        }
    }
}

pub struct KnowledgeBasePage {
    ctx: PageContext,
    documents: CollectionCache<KnowledgeDocument>,
    category: Option<String>,
    generation: Generation,
    search_generation: Generation,
    debouncer: Debouncer,
}

impl KnowledgeBasePage {
    pub fn new(ctx: PageContext) -> Self {
        let debouncer = Debouncer::new(ctx.config.search_debounce);
        Self {
            ctx,
            documents: CollectionCache::new(),
            category: None,
            generation: Generation::new(),
            search_generation: Generation::new(),
            debouncer,
        }
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        self.documents.items()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_documents(self.category.as_deref()).await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, "Discarding superseded document list");
            return;
        }

        match result {
            Ok(documents) => {
                tracing::info!(page = ROUTE, count = documents.len(), "Documents loaded");
                self.documents.replace(documents);
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, LIST, "documents", &e),
        }
    }

    pub async fn dispatch(&mut self, action: KnowledgeAction) {
        let result = match action {
            KnowledgeAction::FilterCategory => {
                let category = self.ctx.value(CATEGORY_FILTER);
                self.category = (!category.is_empty() && category != "all").then_some(category);
                self.reload().await;
                Ok(())
            }
            KnowledgeAction::Upload => self.upload().await,
            KnowledgeAction::Delete(id) => self.delete(id).await,
            KnowledgeAction::Download(id) => self.download(id).await,
            KnowledgeAction::Search(query) => {
                let query = query.unwrap_or_else(|| self.ctx.value(SEARCH));
                self.schedule_search(query.trim().to_string());
                Ok(())
            }
        };

        if let Err(e) = result {
            self.ctx.report("Knowledge base action failed", &e);
        }
    }

    fn render(&self) {
        let html = if self.documents.is_empty() {
            empty_state("No documents found.")
        } else {
            self.documents.items().iter().map(render_document).collect()
        };
        self.ctx.set_html(LIST, html);
    }

    async fn upload(&mut self) -> Result<(), ApiError> {
        let (title, category, description, tags, files) = {
            let document = self.ctx.document.lock();
            (
                document.trimmed_value(DOC_TITLE),
                document.trimmed_value(DOC_CATEGORY),
                document.trimmed_value(DOC_DESCRIPTION),
                document.trimmed_value(DOC_TAGS),
                document.files(DOC_FILE),
            )
        };

        let file = match files.as_slice() {
            [file] if !title.is_empty() => file.clone(),
            _ => {
                self.ctx.set_html(
                    UPLOAD_STATUS,
                    inline_error("Please enter a title and select one file."),
                );
                return Ok(());
            }
        };

        let part = file_part(&file)?;
        let category = if category.is_empty() {
            "general".to_string()
        } else {
            category
        };
        let form = Form::new()
            .text("title", title)
            .text("category", category)
            .text("description", description)
            .text("tags", tags)
            .part("file", part);

        self.ctx.set_html(UPLOAD_STATUS, "Uploading...");
        let uploaded = match self.ctx.api.upload_document(form).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.ctx
                    .set_html(UPLOAD_STATUS, inline_error(&e.user_message()));
                return Err(e);
            }
        };
        tracing::info!(page = ROUTE, id = uploaded.id, file = %file.name, "Document uploaded");

        {
            let mut document = self.ctx.document.lock();
            document.clear_inputs(&[DOC_TITLE, DOC_CATEGORY, DOC_DESCRIPTION, DOC_TAGS, DOC_FILE]);
            document.set_html(UPLOAD_STATUS, "");
            document.hide(UPLOAD_MODAL);
        }
        self.ctx.toasts.success("Document uploaded.");
        self.reload().await;
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        if !self
            .ctx
            .browser
            .confirm("Are you sure you want to delete this document?")
        {
            return Ok(());
        }

        self.ctx.api.delete_document(id).await?;
        tracing::info!(page = ROUTE, id, "Document deleted");

        self.ctx.toasts.success("Document deleted.");
        self.reload().await;
        Ok(())
    }

    async fn download(&self, id: i64) -> Result<(), ApiError> {
        let download = self.ctx.api.download_document(id).await?;
        self.ctx.browser.save_file(download);
        Ok(())
    }

    fn schedule_search(&mut self, query: String) {
        let ticket = self.search_generation.advance();
        if query.chars().count() < MIN_QUERY_LEN {
            self.debouncer.cancel();
            self.ctx.set_html(SEARCH_RESULTS, "");
            return;
        }

        let ctx = self.ctx.clone();
        self.debouncer.schedule(run_search(ctx, ticket, query));
    }
}

async fn run_search(ctx: PageContext, ticket: Ticket, query: String) {
    tracing::debug!(page = ROUTE, query = %query, "Searching documents");
    let result = ctx.api.search_documents(&query).await;
    if !ticket.is_current() {
        tracing::debug!(page = ROUTE, query = %query, "Discarding superseded search results");
        return;
    }

    match result {
        Ok(hits) => ctx.set_html(SEARCH_RESULTS, render_hits(&hits)),
        Err(e) => {
            ctx.set_html(SEARCH_RESULTS, "");
            ctx.report("Search failed", &e);
        }
    }
}

#[async_trait]
impl Page for KnowledgeBasePage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match KnowledgeAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_document(doc: &KnowledgeDocument) -> String {
    let tags = doc
        .tags
        .iter()
        .map(|t| badge(t, "bg-light text-dark"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"<div class="card document-item mb-2" data-id="{id}"><div class="card-body"><h5 class="card-title">{title} {category}</h5><p class="card-text">{description}</p><div>{tags}</div><small class="text-muted">{file} ({size}), uploaded by {by} on {at}</small><div class="mt-2">{download} {delete}</div></div></div>"#,
        id = doc.id,
        title = escape_html(&doc.title),
        category = badge(&doc.category, "bg-info"),
        description = escape_html(doc.description.as_deref().unwrap_or("")),
        tags = tags,
        file = escape_html(&doc.file_name),
        size = doc.size_label(),
        by = escape_html(&doc.uploaded_by),
        at = doc.uploaded_at.format("%Y-%m-%d"),
        download = action_button("Download", "btn-sm btn-outline-primary", "download", &doc.id),
        delete = action_button("Delete", "btn-sm btn-outline-danger", "delete", &doc.id),
    )
}

fn render_hits(hits: &[KnowledgeSearchHit]) -> String {
    if hits.is_empty() {
        return empty_state("No matching documents.");
    }
    hits.iter()
        .map(|hit| {
            format!(
                r#"<div class="search-hit" data-id="{id}"><strong>{title}</strong><p class="small text-muted">{snippet}</p>{download}</div>"#,
                id = hit.document_id,
                title = escape_html(&hit.title),
                snippet = escape_html(hit.snippet.as_deref().unwrap_or("")),
                download = action_button(
                    "Download",
                    "btn-sm btn-link",
                    "download",
                    &hit.document_id
                ),
            )
        })
        .collect()
}
