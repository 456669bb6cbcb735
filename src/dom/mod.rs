//! In-memory document model the page controllers render into.
//!
//! Elements are addressed by id, like `document.getElementById` on a real page.
//! A host mirrors element state onto whatever actually draws the page; tests
//! inspect it directly.

mod html;

pub use html::*;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A file picked through a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: &str, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.into(),
        }
    }
}

/// State of a single element.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub inner_html: String,
    pub value: String,
    pub hidden: bool,
    pub checked: bool,
    pub client_width: u32,
    pub files: Vec<SelectedFile>,
}

/// The element tree of one page view.
#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
}

/// Document handle shared between a controller, its toasts and its timers.
pub type SharedDocument = Arc<Mutex<Document>>;

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document containing empty elements with the given ids.
    pub fn with_elements(ids: &[&str]) -> Self {
        let mut document = Self::new();
        for id in ids {
            document.insert(id);
        }
        document
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Add an empty element, replacing any existing one with the same id.
    pub fn insert(&mut self, id: &str) -> &mut Element {
        let element = self.elements.entry(id.to_string()).or_default();
        *element = Element::default();
        element
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.elements.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Replace an element's content. Returns `false` when the element is absent.
    pub fn set_html(&mut self, id: &str, html: impl Into<String>) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.inner_html = html.into();
                true
            }
            None => {
                tracing::debug!(id, "set_html on missing element");
                false
            }
        }
    }

    pub fn html(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.inner_html.as_str())
    }

    /// Input value of an element, or an empty string when it is absent.
    pub fn value(&self, id: &str) -> String {
        self.elements
            .get(id)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    /// Input value with surrounding whitespace removed.
    pub fn trimmed_value(&self, id: &str) -> String {
        self.value(id).trim().to_string()
    }

    /// Set an input value, creating the element if needed.
    ///
    /// Form fields are often rendered by the controller itself, so writing a
    /// value must not depend on the element having been declared up front.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        self.elements.entry(id.to_string()).or_default().value = value.into();
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.elements.get(id).map(|e| e.checked).unwrap_or(false)
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) {
        self.elements.entry(id.to_string()).or_default().checked = checked;
    }

    pub fn show(&mut self, id: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.hidden = false;
        }
    }

    pub fn hide(&mut self, id: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            element.hidden = true;
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.elements.get(id).map(|e| !e.hidden).unwrap_or(false)
    }

    pub fn client_width(&self, id: &str) -> u32 {
        self.elements.get(id).map(|e| e.client_width).unwrap_or(0)
    }

    pub fn set_client_width(&mut self, id: &str, width: u32) {
        self.elements.entry(id.to_string()).or_default().client_width = width;
    }

    pub fn files(&self, id: &str) -> Vec<SelectedFile> {
        self.elements
            .get(id)
            .map(|e| e.files.clone())
            .unwrap_or_default()
    }

    pub fn set_files(&mut self, id: &str, files: Vec<SelectedFile>) {
        self.elements.entry(id.to_string()).or_default().files = files;
    }

    /// Reset the value, checked state and file selection of the given inputs.
    pub fn clear_inputs(&mut self, ids: &[&str]) {
        for id in ids {
            if let Some(element) = self.elements.get_mut(*id) {
                element.value.clear();
                element.checked = false;
                element.files.clear();
            }
        }
    }
}
