//! HTML fragment helpers shared by the page renderers.

use std::fmt::Display;

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `data-action`/`data-id` attributes that route a click back to a page.
pub fn action_attrs(action: &str, id: Option<&dyn Display>) -> String {
    match id {
        Some(id) => format!(
            r#"data-action="{}" data-id="{}""#,
            escape_html(action),
            escape_html(&id.to_string())
        ),
        None => format!(r#"data-action="{}""#, escape_html(action)),
    }
}

/// A button that dispatches `action` for the record `id`.
pub fn action_button(label: &str, class: &str, action: &str, id: &dyn Display) -> String {
    format!(
        r#"<button type="button" class="btn {}" {}>{}</button>"#,
        class,
        action_attrs(action, Some(id)),
        escape_html(label)
    )
}

/// Placeholder shown instead of an empty list.
pub fn empty_state(message: &str) -> String {
    format!(r#"<p class="empty-state">{}</p>"#, escape_html(message))
}

/// Inline error block shown when a list could not be loaded.
pub fn error_state(message: &str) -> String {
    format!(
        r#"<div class="error-state" role="alert">{}</div>"#,
        escape_html(message)
    )
}

/// Inline validation message for a form.
pub fn inline_error(message: &str) -> String {
    format!(
        r#"<div class="form-error text-danger">{}</div>"#,
        escape_html(message)
    )
}

/// `<option>` list for a select element.
pub fn select_options<'a>(
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
    selected: &str,
) -> String {
    options
        .into_iter()
        .map(|(value, label)| {
            let marker = if value == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(value),
                marker,
                escape_html(label)
            )
        })
        .collect()
}

/// Badge with a colour class.
pub fn badge(text: &str, class: &str) -> String {
    format!(
        r#"<span class="badge {}">{}</span>"#,
        class,
        escape_html(text)
    )
}
