//! Side effects a page needs from the environment it runs in.
//!
//! Blocking dialogs, navigation and file downloads go through [`Browser`] so
//! controllers never talk to a concrete window object.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// A file handed to the browser for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Host capabilities used by page controllers.
pub trait Browser: Send + Sync {
    /// Blocking yes/no dialog.
    fn confirm(&self, message: &str) -> bool;

    /// Blocking text prompt; `None` when cancelled.
    fn prompt(&self, message: &str) -> Option<String>;

    /// Leave the current page.
    fn navigate(&self, url: &str);

    /// Trigger a local download.
    fn save_file(&self, download: Download);
}

/// Dialog shown through a [`HeadlessBrowser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Confirm(String),
    Prompt(String),
}

#[derive(Debug, Default)]
struct HeadlessState {
    confirm_answers: VecDeque<bool>,
    prompt_answers: VecDeque<Option<String>>,
    dialogs: Vec<Dialog>,
    navigations: Vec<String>,
    downloads: Vec<Download>,
}

/// Browser without a window: dialog answers are scripted and every effect is
/// recorded. Unscripted confirms answer `false` and unscripted prompts cancel.
#[derive(Debug, Default)]
pub struct HeadlessBrowser {
    state: Mutex<HeadlessState>,
}

impl HeadlessBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next confirm dialog.
    pub fn answer_confirm(&self, answer: bool) {
        self.state.lock().confirm_answers.push_back(answer);
    }

    /// Queue the answer for the next prompt dialog.
    pub fn answer_prompt(&self, answer: Option<&str>) {
        self.state
            .lock()
            .prompt_answers
            .push_back(answer.map(str::to_string));
    }

    pub fn dialogs(&self) -> Vec<Dialog> {
        self.state.lock().dialogs.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().navigations.last().cloned()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.state.lock().downloads.clone()
    }
}

impl Browser for HeadlessBrowser {
    fn confirm(&self, message: &str) -> bool {
        let mut state = self.state.lock();
        state.dialogs.push(Dialog::Confirm(message.to_string()));
        state.confirm_answers.pop_front().unwrap_or(false)
    }

    fn prompt(&self, message: &str) -> Option<String> {
        let mut state = self.state.lock();
        state.dialogs.push(Dialog::Prompt(message.to_string()));
        state.prompt_answers.pop_front().flatten()
    }

    fn navigate(&self, url: &str) {
        tracing::info!(url, "Navigating");
        self.state.lock().navigations.push(url.to_string());
    }

    fn save_file(&self, download: Download) {
        tracing::info!(
            filename = %download.filename,
            bytes = download.bytes.len(),
            "Saving download"
        );
        self.state.lock().downloads.push(download);
    }
}
