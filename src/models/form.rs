//! Operational form templates and submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Record;

/// Input kind of a form item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormItemType {
    Checkbox,
    TextInput,
    TextArea,
    Number,
    Dropdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormItem {
    pub id: String,
    pub label: String,
    pub item_type: FormItemType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<FormItem>,
}

/// Blank form as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormTemplate {
    pub form_type: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

/// An answered item inside a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedItem {
    pub id: String,
    pub label: String,
    pub item_type: FormItemType,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub is_checked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<SubmittedItem>,
}

/// Request body for submitting a form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormSubmission {
    pub mission_id: String,
    pub form_type: String,
    pub form_title: String,
    pub sections_data: Vec<SubmittedSection>,
}

/// A stored submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedForm {
    pub id: i64,
    pub mission_id: String,
    pub form_type: String,
    pub form_title: String,
    pub submitted_by: String,
    pub submission_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sections_data: Vec<SubmittedSection>,
}

impl Record for SubmittedForm {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}
