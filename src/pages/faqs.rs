//! FAQ administration.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, badge, empty_state, escape_html, inline_error, select_options};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{Faq, FaqRequest};
use crate::search::matches_query;
use crate::widgets::{BasicMarkdown, MarkdownRenderer};
use crate::PageContext;

pub const ROUTE: &str = "admin/faqs";

pub const LIST: &str = "faqList";
pub const SEARCH: &str = "faqSearch";
pub const CATEGORY_FILTER: &str = "faqCategoryFilter";
pub const STATUS_FILTER: &str = "faqStatusFilter";
pub const MODAL: &str = "faqModal";
pub const MODAL_TITLE: &str = "faqModalTitle";
pub const QUESTION: &str = "faqQuestion";
pub const ANSWER: &str = "faqAnswer";
pub const CATEGORY: &str = "faqCategory";
pub const TAGS: &str = "faqTags";
pub const IS_ACTIVE: &str = "faqIsActive";
pub const FORM_ERROR: &str = "faqFormError";

const NO_FAQS: &str = "No FAQs found. Create your first FAQ!";
const NO_MATCHES: &str = "No FAQs match the current filters.";
const MISSING_FIELDS: &str = "Question and answer are required.";

/// Status filter of the FAQ list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "active" => StatusFilter::Active,
            "inactive" => StatusFilter::Inactive,
            _ => StatusFilter::All,
        }
    }

    fn accepts(&self, faq: &Faq) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => faq.is_active,
            StatusFilter::Inactive => !faq.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqFilter {
    pub search: String,
    /// `None` for all categories
    pub category: Option<String>,
    pub status: StatusFilter,
}

impl FaqFilter {
    pub fn accepts(&self, faq: &Faq) -> bool {
        if !self.status.accepts(faq) {
            return false;
        }
        if let Some(category) = &self.category {
            if faq.category_label() != category {
                return false;
            }
        }
        let fields = [faq.question.as_str(), faq.answer.as_str(), faq.category_label()]
            .into_iter()
            .chain(faq.tags.iter().map(String::as_str));
        matches_query(&self.search, fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqAction {
    Filter,
    Create,
    Edit(i64),
    Save,
    CancelEdit,
    Delete(i64),
    ToggleActive(i64),
}

impl PageAction for FaqAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "filter" => Some(FaqAction::Filter),
            "create" => Some(FaqAction::Create),
            "edit" => event.id_as().map(FaqAction::Edit),
            "save" => Some(FaqAction::Save),
            "cancel-edit" => Some(FaqAction::CancelEdit),
            "delete" => event.id_as().map(FaqAction::Delete),
            "toggle-active" => event.id_as().map(FaqAction::ToggleActive),
            _ => None,
        }
    }
}

/// Modal state: which record the form is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Draft {
    New,
    Existing(i64),
}

pub struct FaqPage {
    ctx: PageContext,
    faqs: CollectionCache<Faq>,
    filter: FaqFilter,
    draft: Option<Draft>,
    markdown: Box<dyn MarkdownRenderer>,
    generation: Generation,
}

impl FaqPage {
    pub fn new(ctx: PageContext) -> Self {
        Self::with_renderer(ctx, Box::new(BasicMarkdown))
    }

    pub fn with_renderer(ctx: PageContext, markdown: Box<dyn MarkdownRenderer>) -> Self {
        Self {
            ctx,
            faqs: CollectionCache::new(),
            filter: FaqFilter::default(),
            draft: None,
            markdown,
            generation: Generation::new(),
        }
    }

    pub fn faqs(&self) -> &[Faq] {
        self.faqs.items()
    }

    pub fn filter(&self) -> &FaqFilter {
        &self.filter
    }

    /// FAQs passing the current filter, in collection order.
    pub fn visible(&self) -> Vec<&Faq> {
        self.faqs
            .items()
            .iter()
            .filter(|faq| self.filter.accepts(faq))
            .collect()
    }

    pub async fn reload(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.list_faqs().await;
        if !ticket.is_current() {
            tracing::debug!(page = ROUTE, "Discarding superseded FAQ list");
            return;
        }

        match result {
            Ok(faqs) => {
                tracing::info!(page = ROUTE, count = faqs.len(), "FAQs loaded");
                self.faqs.replace(faqs);
                self.render_category_options();
                self.render();
            }
            Err(e) => show_load_error(&self.ctx, LIST, "FAQs", &e),
        }
    }

    pub async fn dispatch(&mut self, action: FaqAction) {
        let result = match action {
            FaqAction::Filter => {
                self.apply_filter();
                Ok(())
            }
            FaqAction::Create => {
                self.open_modal(Draft::New);
                Ok(())
            }
            FaqAction::Edit(id) => {
                self.open_modal(Draft::Existing(id));
                Ok(())
            }
            FaqAction::Save => self.save().await,
            FaqAction::CancelEdit => {
                self.close_modal();
                Ok(())
            }
            FaqAction::Delete(id) => self.delete(id).await,
            FaqAction::ToggleActive(id) => self.toggle_active(id).await,
        };

        if let Err(e) = result {
            let what = match action {
                FaqAction::Save => "Failed to save FAQ",
                FaqAction::Delete(_) => "Failed to delete FAQ",
                _ => "Failed to update FAQ",
            };
            self.ctx.report(what, &e);
        }
    }

    fn apply_filter(&mut self) {
        let document = self.ctx.document.lock();
        let category = document.trimmed_value(CATEGORY_FILTER);
        self.filter = FaqFilter {
            search: document.trimmed_value(SEARCH),
            category: (!category.is_empty() && category != "all").then_some(category),
            status: StatusFilter::parse(&document.value(STATUS_FILTER)),
        };
        drop(document);
        self.render();
    }

    fn render_category_options(&self) {
        let categories: BTreeSet<&str> =
            self.faqs.items().iter().map(Faq::category_label).collect();
        let selected = self.filter.category.as_deref().unwrap_or("all");
        let options = select_options(
            std::iter::once(("all", "All categories"))
                .chain(categories.iter().map(|c| (*c, *c))),
            selected,
        );
        self.ctx.set_html(CATEGORY_FILTER, options);
    }

    fn render(&self) {
        let html = if self.faqs.is_empty() {
            empty_state(NO_FAQS)
        } else {
            let visible = self.visible();
            if visible.is_empty() {
                empty_state(NO_MATCHES)
            } else {
                visible.into_iter().map(|faq| self.render_item(faq)).collect()
            }
        };
        self.ctx.set_html(LIST, html);
    }

    fn render_item(&self, faq: &Faq) -> String {
        let status = if faq.is_active {
            badge("Active", "bg-success")
        } else {
            badge("Inactive", "bg-secondary")
        };
        let tags: String = faq
            .tags
            .iter()
            .map(|t| badge(t, "bg-light text-dark"))
            .collect::<Vec<_>>()
            .join(" ");
        let toggle_label = if faq.is_active { "Deactivate" } else { "Activate" };

        format!(
            r#"<div class="card faq-item mb-2" data-id="{id}"><div class="card-body"><h5 class="card-title">{question}</h5><div class="mb-2">{category} {status}</div><div class="faq-answer">{answer}</div><div class="faq-tags">{tags}</div><div class="mt-2">{edit} {toggle} {delete}</div></div></div>"#,
            id = faq.id,
            question = escape_html(&faq.question),
            category = badge(faq.category_label(), "bg-info"),
            status = status,
            answer = self.markdown.render(&faq.answer),
            tags = tags,
            edit = action_button("Edit", "btn-sm btn-outline-primary", "edit", &faq.id),
            toggle = action_button(
                toggle_label,
                "btn-sm btn-outline-secondary",
                "toggle-active",
                &faq.id
            ),
            delete = action_button("Delete", "btn-sm btn-outline-danger", "delete", &faq.id),
        )
    }

    fn open_modal(&mut self, draft: Draft) {
        let existing = match draft {
            Draft::New => None,
            Draft::Existing(id) => match self.faqs.get(&id) {
                Some(faq) => Some(faq.clone()),
                None => {
                    self.ctx.toasts.danger("FAQ not found.");
                    return;
                }
            },
        };

        {
            let mut document = self.ctx.document.lock();
            document.clear_inputs(&[QUESTION, ANSWER, CATEGORY, TAGS]);
            document.set_html(FORM_ERROR, "");
            match &existing {
                Some(faq) => {
                    document.set_html(MODAL_TITLE, "Edit FAQ");
                    document.set_value(QUESTION, faq.question.as_str());
                    document.set_value(ANSWER, faq.answer.as_str());
                    document.set_value(CATEGORY, faq.category.clone().unwrap_or_default());
                    document.set_value(TAGS, faq.tags.join(", "));
                    document.set_checked(IS_ACTIVE, faq.is_active);
                }
                None => {
                    document.set_html(MODAL_TITLE, "Add FAQ");
                    document.set_checked(IS_ACTIVE, true);
                }
            }
            document.show(MODAL);
        }
        self.draft = Some(draft);
    }

    fn close_modal(&mut self) {
        self.draft = None;
        let mut document = self.ctx.document.lock();
        document.hide(MODAL);
        document.set_html(FORM_ERROR, "");
    }

    fn read_form(&self) -> Option<FaqRequest> {
        let document = self.ctx.document.lock();
        let question = document.trimmed_value(QUESTION);
        let answer = document.trimmed_value(ANSWER);
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        let category = document.trimmed_value(CATEGORY);

        Some(FaqRequest {
            question,
            answer,
            category: (!category.is_empty()).then_some(category),
            tags: split_tags(&document.value(TAGS)),
            is_active: document.is_checked(IS_ACTIVE),
        })
    }

    async fn save(&mut self) -> Result<(), ApiError> {
        let Some(draft) = self.draft else {
            tracing::warn!(page = ROUTE, "Save without an open FAQ form");
            return Ok(());
        };
        let Some(request) = self.read_form() else {
            self.ctx.set_html(FORM_ERROR, inline_error(MISSING_FIELDS));
            return Ok(());
        };

        let saved = match draft {
            Draft::New => self.ctx.api.create_faq(&request).await?,
            Draft::Existing(id) => self.ctx.api.update_faq(id, &request).await?,
        };
        tracing::info!(page = ROUTE, id = saved.id, "FAQ saved");

        self.close_modal();
        self.ctx.toasts.success(match draft {
            Draft::New => "FAQ created.",
            Draft::Existing(_) => "FAQ updated.",
        });
        self.reload().await;
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> Result<(), ApiError> {
        if !self.ctx.browser.confirm("Are you sure you want to delete this FAQ?") {
            return Ok(());
        }

        self.ctx.api.delete_faq(id).await?;
        tracing::info!(page = ROUTE, id, "FAQ deleted");

        self.ctx.toasts.success("FAQ deleted.");
        self.reload().await;
        Ok(())
    }

    async fn toggle_active(&mut self, id: i64) -> Result<(), ApiError> {
        let Some(current) = self.faqs.get(&id).map(|faq| faq.is_active) else {
            self.ctx.toasts.danger("FAQ not found.");
            return Ok(());
        };

        let updated = self.ctx.api.set_faq_active(id, !current).await?;
        tracing::info!(page = ROUTE, id = updated.id, is_active = updated.is_active, "FAQ status changed");

        if !self.faqs.patch(updated) {
            tracing::warn!(page = ROUTE, id, "Updated FAQ is no longer cached");
        }
        self.render();
        Ok(())
    }
}

#[async_trait]
impl Page for FaqPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.reload().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match FaqAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

/// Comma-separated tag input to a tag list.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
