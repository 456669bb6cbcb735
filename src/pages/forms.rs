//! Operational forms (pre-deployment checklists, PIC handoffs and similar).

use async_trait::async_trait;

use super::{show_load_error, unknown_action, Page};
use crate::actions::{ActionEvent, PageAction};
use crate::cache::CollectionCache;
use crate::dom::{action_button, empty_state, escape_html, inline_error, Document};
use crate::errors::ApiError;
use crate::generation::Generation;
use crate::models::{
    FormItem, FormItemType, FormSubmission, FormTemplate, SubmittedForm, SubmittedItem,
    SubmittedSection,
};
use crate::PageContext;

pub const CONTAINER: &str = "formContainer";
pub const SUBMISSIONS: &str = "formSubmissionsList";
pub const FORM_ERROR: &str = "formError";
pub const DETAILS: &str = "formDetails";

const ROUTE: &str = "mission/forms";

/// Input id of a template item.
pub fn item_input_id(item_id: &str) -> String {
    format!("form-item-{}", item_id)
}

/// Read the answers for a template out of the document.
///
/// Returns the filled-in sections and the labels of required items left
/// blank. A checkbox counts as answered only when checked.
pub fn collect_answers(
    template: &FormTemplate,
    document: &Document,
) -> (Vec<SubmittedSection>, Vec<String>) {
    let mut missing = Vec::new();
    let sections = template
        .sections
        .iter()
        .map(|section| SubmittedSection {
            id: section.id.clone(),
            title: section.title.clone(),
            items: section
                .items
                .iter()
                .map(|item| {
                    let answer = read_item(item, document);
                    let answered = match item.item_type {
                        FormItemType::Checkbox => answer.is_checked == Some(true),
                        _ => answer.value.as_deref().is_some_and(|v| !v.is_empty()),
                    };
                    if item.required && !answered {
                        missing.push(item.label.clone());
                    }
                    answer
                })
                .collect(),
        })
        .collect();
    (sections, missing)
}

fn read_item(item: &FormItem, document: &Document) -> SubmittedItem {
    let input = item_input_id(&item.id);
    let (value, is_checked) = match item.item_type {
        FormItemType::Checkbox => (None, Some(document.is_checked(&input))),
        _ => (Some(document.trimmed_value(&input)), None),
    };
    SubmittedItem {
        id: item.id.clone(),
        label: item.label.clone(),
        item_type: item.item_type,
        value,
        is_checked,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    View(i64),
}

impl PageAction for FormAction {
    fn parse(event: &ActionEvent) -> Option<Self> {
        match event.action.as_str() {
            "submit" => Some(FormAction::Submit),
            "view" => event.id_as().map(FormAction::View),
            _ => None,
        }
    }
}

pub struct FormsPage {
    ctx: PageContext,
    mission_id: String,
    form_type: String,
    template: Option<FormTemplate>,
    submissions: CollectionCache<SubmittedForm>,
    generation: Generation,
}

impl FormsPage {
    pub fn new(ctx: PageContext, mission_id: &str, form_type: &str) -> Self {
        Self {
            ctx,
            mission_id: mission_id.to_string(),
            form_type: form_type.to_string(),
            template: None,
            submissions: CollectionCache::new(),
            generation: Generation::new(),
        }
    }

    pub fn template(&self) -> Option<&FormTemplate> {
        self.template.as_ref()
    }

    pub fn submissions(&self) -> &[SubmittedForm] {
        self.submissions.items()
    }

    async fn load_template(&mut self) {
        match self.ctx.api.form_template(&self.form_type).await {
            Ok(template) => {
                tracing::info!(page = ROUTE, form_type = %template.form_type, sections = template.sections.len(), "Form template loaded");
                self.ctx.set_html(CONTAINER, render_template(&template));
                self.template = Some(template);
            }
            Err(e) => show_load_error(&self.ctx, CONTAINER, "form", &e),
        }
    }

    pub async fn reload_submissions(&mut self) {
        let ticket = self.generation.advance();
        let result = self.ctx.api.my_submissions(&self.mission_id).await;
        if !ticket.is_current() {
            return;
        }

        match result {
            Ok(submissions) => {
                self.submissions.replace(submissions);
                let html = if self.submissions.is_empty() {
                    empty_state("No submissions yet for this mission.")
                } else {
                    let items: String = self
                        .submissions
                        .items()
                        .iter()
                        .map(render_submission)
                        .collect();
                    format!(r#"<ul class="list-group">{}</ul>"#, items)
                };
                self.ctx.set_html(SUBMISSIONS, html);
            }
            Err(e) => show_load_error(&self.ctx, SUBMISSIONS, "submissions", &e),
        }
    }

    pub async fn dispatch(&mut self, action: FormAction) {
        let result = match action {
            FormAction::Submit => self.submit().await,
            FormAction::View(id) => self.view(id).await,
        };

        if let Err(e) = result {
            let what = match action {
                FormAction::Submit => "Failed to submit form",
                FormAction::View(_) => "Failed to load submission",
            };
            self.ctx.report(what, &e);
        }
    }

    async fn submit(&mut self) -> Result<(), ApiError> {
        let Some(template) = self.template.as_ref() else {
            self.ctx
                .set_html(FORM_ERROR, inline_error("The form has not loaded yet."));
            return Ok(());
        };

        let (sections, missing) = collect_answers(template, &self.ctx.document.lock());
        if !missing.is_empty() {
            self.ctx.set_html(
                FORM_ERROR,
                inline_error(&format!(
                    "Please complete the required fields: {}",
                    missing.join(", ")
                )),
            );
            return Ok(());
        }
        self.ctx.set_html(FORM_ERROR, "");

        let submission = FormSubmission {
            mission_id: self.mission_id.clone(),
            form_type: template.form_type.clone(),
            form_title: template.title.clone(),
            sections_data: sections,
        };
        let inputs: Vec<String> = template
            .sections
            .iter()
            .flat_map(|s| s.items.iter().map(|i| item_input_id(&i.id)))
            .collect();

        let stored = self
            .ctx
            .api
            .submit_form(&self.mission_id, &submission)
            .await?;
        tracing::info!(page = ROUTE, mission = %self.mission_id, id = stored.id, "Form submitted");

        {
            let ids: Vec<&str> = inputs.iter().map(String::as_str).collect();
            self.ctx.document.lock().clear_inputs(&ids);
        }
        self.ctx.toasts.success("Form submitted.");
        self.reload_submissions().await;
        Ok(())
    }

    async fn view(&self, id: i64) -> Result<(), ApiError> {
        let submission = self.ctx.api.submission(id).await?;
        self.ctx.set_html(DETAILS, render_details(&submission));
        Ok(())
    }
}

#[async_trait]
impl Page for FormsPage {
    fn route(&self) -> &'static str {
        ROUTE
    }

    async fn load(&mut self) {
        self.load_template().await;
        self.reload_submissions().await;
    }

    async fn handle(&mut self, event: &ActionEvent) {
        match FormAction::parse(event) {
            Some(action) => self.dispatch(action).await,
            None => unknown_action(ROUTE, event),
        }
    }
}

fn render_template(template: &FormTemplate) -> String {
    let sections: String = template
        .sections
        .iter()
        .map(|section| {
            let items: String = section.items.iter().map(render_item).collect();
            format!(
                r#"<fieldset class="form-section mb-3" data-id="{}"><legend>{}</legend>{}</fieldset>"#,
                escape_html(&section.id),
                escape_html(&section.title),
                items
            )
        })
        .collect();
    format!(
        r#"<h4 class="form-title">{}</h4>{}"#,
        escape_html(&template.title),
        sections
    )
}

fn render_item(item: &FormItem) -> String {
    let id = escape_html(&item_input_id(&item.id));
    let label = format!(
        "{}{}",
        escape_html(&item.label),
        if item.required { " *" } else { "" }
    );
    let placeholder = escape_html(item.placeholder.as_deref().unwrap_or(""));
    let required = if item.required { " required" } else { "" };

    match item.item_type {
        FormItemType::Checkbox => format!(
            r#"<div class="form-check"><input type="checkbox" class="form-check-input" id="{id}"{required}><label class="form-check-label" for="{id}">{label}</label></div>"#
        ),
        FormItemType::TextInput | FormItemType::Number => {
            let kind = if item.item_type == FormItemType::Number {
                "number"
            } else {
                "text"
            };
            format!(
                r#"<div class="mb-2"><label class="form-label" for="{id}">{label}</label><input type="{kind}" class="form-control" id="{id}" placeholder="{placeholder}"{required}></div>"#
            )
        }
        FormItemType::TextArea => format!(
            r#"<div class="mb-2"><label class="form-label" for="{id}">{label}</label><textarea class="form-control" id="{id}" rows="3" placeholder="{placeholder}"{required}></textarea></div>"#
        ),
        FormItemType::Dropdown => {
            let options: String = std::iter::once(String::from(r#"<option value="">Select...</option>"#))
                .chain(item.options.iter().map(|o| {
                    let o = escape_html(o);
                    format!(r#"<option value="{o}">{o}</option>"#)
                }))
                .collect();
            format!(
                r#"<div class="mb-2"><label class="form-label" for="{id}">{label}</label><select class="form-select" id="{id}"{required}>{options}</select></div>"#
            )
        }
    }
}

fn render_submission(form: &SubmittedForm) -> String {
    format!(
        r#"<li class="list-group-item submission-item" data-id="{id}">{title} <small class="text-muted">by {by} at {at}</small> {view}</li>"#,
        id = form.id,
        title = escape_html(&form.form_title),
        by = escape_html(&form.submitted_by),
        at = form.submission_timestamp.format("%Y-%m-%d %H:%M UTC"),
        view = action_button("View", "btn-sm btn-link", "view", &form.id),
    )
}

fn render_details(form: &SubmittedForm) -> String {
    let sections: String = form
        .sections_data
        .iter()
        .map(|section| {
            let items: String = section
                .items
                .iter()
                .map(|item| {
                    let answer = match (item.item_type, item.is_checked, item.value.as_deref()) {
                        (FormItemType::Checkbox, Some(true), _) => "Yes".to_string(),
                        (FormItemType::Checkbox, _, _) => "No".to_string(),
                        (_, _, Some(v)) if !v.is_empty() => escape_html(v),
                        _ => "-".to_string(),
                    };
                    format!(
                        "<dt class=\"col-sm-5\">{}</dt><dd class=\"col-sm-7\">{}</dd>",
                        escape_html(&item.label),
                        answer
                    )
                })
                .collect();
            format!(
                r#"<h6>{}</h6><dl class="row">{}</dl>"#,
                escape_html(&section.title),
                items
            )
        })
        .collect();

    format!(
        r#"<div class="submission-details" data-id="{id}"><h5>{title}</h5><p class="text-muted">Submitted by {by} at {at}</p>{sections}</div>"#,
        id = form.id,
        title = escape_html(&form.form_title),
        by = escape_html(&form.submitted_by),
        at = form.submission_timestamp.format("%Y-%m-%d %H:%M UTC"),
        sections = sections,
    )
}
