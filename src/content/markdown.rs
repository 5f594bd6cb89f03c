//! Markdown rendering

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

/// Markdown renderer for post bodies
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        // Front-matter is handled separately in PostMetadata::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION;
        Self { options }
    }

    /// Render markdown to HTML. Inline HTML in the body is passed through and
    /// external links open in a new tab.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_external_link = false;

        for event in parser {
            match event {
                Event::Start(Tag::Link {
                    ref dest_url,
                    ref title,
                    ..
                }) if is_external(dest_url) => {
                    let mut open = format!(
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer""#,
                        escape_attr(dest_url)
                    );
                    if !title.is_empty() {
                        open.push_str(&format!(r#" title="{}""#, escape_attr(title)));
                    }
                    open.push('>');
                    events.push(Event::InlineHtml(open.into()));
                    in_external_link = true;
                }
                Event::End(TagEnd::Link) if in_external_link => {
                    events.push(Event::InlineHtml("</a>".into()));
                    in_external_link = false;
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

/// Simple HTML escaping
pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
