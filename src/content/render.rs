//! Article rendering: a post's metadata and body as an HTML article

use super::markdown::{escape_attr, MarkdownRenderer};
use super::{ImageField, Post};

/// Script that turns Instagram blockquotes into embeds
pub const INSTAGRAM_EMBED_SCRIPT: &str = "https://www.instagram.com/embed.js";

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";
const INSTAGRAM_POST_BASE: &str = "https://www.instagram.com/p/";

/// Renders posts into HTML articles
#[derive(Debug, Clone, Default)]
pub struct ArticleRenderer {
    markdown: MarkdownRenderer,
}

impl ArticleRenderer {
    /// Render a single post as an `<article>`
    pub fn render(&self, post: &Post) -> String {
        let meta = &post.metadata;
        let title = escape_attr(&meta.title);
        let mut html = String::from(r#"<article class="post">"#);

        html.push_str(&format!("<h1>{}</h1>", title));

        let images = meta.images();
        match meta.image {
            Some(ImageField::Multiple(_)) => {
                html.push_str(&format!(
                    r#"<div class="grid {}">"#,
                    grid_class(images.len())
                ));
                for (i, src) in images.iter().enumerate() {
                    html.push_str(&format!(
                        r#"<img src="{}" alt="{} {}" width="800" height="600" loading="lazy">"#,
                        escape_attr(src),
                        title,
                        i + 1
                    ));
                }
                html.push_str("</div>");
            }
            Some(ImageField::Single(ref src)) => {
                html.push_str(&format!(
                    r#"<img src="{}" alt="{}" width="800" height="600" loading="lazy">"#,
                    escape_attr(src),
                    title
                ));
            }
            None => {}
        }

        if let Some(video) = meta.youtube.as_deref().filter(|v| !v.is_empty()) {
            html.push_str(&format!(
                r#"<div class="video"><iframe src="{}{}" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>"#,
                YOUTUBE_EMBED_BASE,
                escape_attr(video)
            ));
        }

        html.push_str(&self.markdown.render(&post.body));

        if let Some(id) = meta.instagram.as_deref().filter(|id| !id.is_empty()) {
            html.push_str(&format!(
                r#"<div class="instagram"><blockquote class="instagram-media" data-instgrm-captioned data-instgrm-permalink="{}{}/" data-instgrm-version="14"></blockquote></div>"#,
                INSTAGRAM_POST_BASE,
                escape_attr(id)
            ));
        }

        html.push_str("</article>");
        html
    }

    /// Render posts one after another, separated by rules
    pub fn render_all(&self, posts: &[Post]) -> String {
        posts
            .iter()
            .map(|post| self.render(post))
            .collect::<Vec<_>>()
            .join("\n<hr>\n")
    }
}

/// Grid column class for an image gallery
fn grid_class(count: usize) -> &'static str {
    match count {
        0 | 1 => "grid-cols-1",
        2 => "grid-cols-2",
        _ => "grid-cols-3",
    }
}
