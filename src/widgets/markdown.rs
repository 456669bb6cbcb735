//! Markdown rendering for user-authored text such as FAQ answers.

use crate::dom::escape_html;

pub trait MarkdownRenderer: Send + Sync {
    /// Render markdown source to an HTML fragment. Raw HTML in the source is
    /// escaped, never passed through.
    fn render(&self, source: &str) -> String;
}

/// Paragraphs, line breaks, `**bold**` and `` `code` `` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMarkdown;

impl MarkdownRenderer for BasicMarkdown {
    fn render(&self, source: &str) -> String {
        let normalized = source.replace("\r\n", "\n");
        normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                let lines: Vec<String> = block.lines().map(render_inline).collect();
                format!("<p>{}</p>", lines.join("<br>"))
            })
            .collect()
    }
}

fn render_inline(line: &str) -> String {
    let escaped = escape_html(line);
    let with_code = wrap_pairs(&escaped, "`", "code");
    wrap_pairs(&with_code, "**", "strong")
}

/// Wrap text between pairs of `marker` in `<tag>`. An unpaired trailing
/// marker is left as literal text.
fn wrap_pairs(text: &str, marker: &str, tag: &str) -> String {
    let parts: Vec<&str> = text.split(marker).collect();
    if parts.len() < 3 {
        return text.to_string();
    }

    let paired = if parts.len() % 2 == 1 {
        parts.len()
    } else {
        parts.len() - 1
    };

    let mut out = String::new();
    for (i, part) in parts[..paired].iter().enumerate() {
        if i % 2 == 1 {
            out.push_str(&format!("<{tag}>{part}</{tag}>"));
        } else {
            out.push_str(part);
        }
    }
    if paired < parts.len() {
        out.push_str(marker);
        out.push_str(parts[paired]);
    }
    out
}
