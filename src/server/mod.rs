//! HTTP server: listing endpoint, rendered home page, and static files

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::render::INSTAGRAM_EMBED_SCRIPT;
use crate::content::{
    escape_attr, ArticleRenderer, Language, ListingError, ListingRequest, ListingResponse, Post,
    PostLoader,
};
use crate::Site;

/// Server state
struct ServerState {
    loader: PostLoader,
    config: SiteConfig,
    renderer: ArticleRenderer,
}

/// Raw query parameters of a listing request
#[derive(Debug, Default, Deserialize)]
struct PostsQuery {
    page: Option<String>,
    limit: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("listing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Listing(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Listing failed: {}", self);
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Build the application router for a site
pub fn router(site: &Site) -> Router {
    let state = Arc::new(ServerState {
        loader: site.loader(),
        config: site.config.clone(),
        renderer: ArticleRenderer::default(),
    });

    Router::new()
        .route("/", get(home_handler))
        .route("/api/posts", get(posts_handler))
        .fallback_service(ServeDir::new(&site.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(site);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Serving posts from {}", site.posts_dir.display());
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// List a page of posts off the async runtime
async fn list_page(
    loader: &PostLoader,
    request: ListingRequest,
) -> Result<ListingResponse, ServerError> {
    let loader = loader.clone();
    let page = tokio::task::spawn_blocking(move || loader.list(&request)).await??;
    Ok(page)
}

/// `GET /api/posts?page=&limit=&lang=`
async fn posts_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<ListingResponse>, ServerError> {
    let request = ListingRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        query.lang.as_deref(),
    )?;
    let page = list_page(&state.loader, request).await?;
    Ok(Json(page))
}

/// `GET /?page=&lang=` - one page of posts rendered on the server
async fn home_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostsQuery>,
) -> Result<Html<String>, ServerError> {
    let lang = query.lang.as_deref().unwrap_or(&state.config.language);
    let mut request = ListingRequest::from_query(query.page.as_deref(), None, Some(lang))?;
    request.limit = state.config.per_page;
    let page = list_page(&state.loader, request).await?;
    Ok(Html(render_home(&state, &request, page)))
}

fn render_home(state: &ServerState, request: &ListingRequest, page: ListingResponse) -> String {
    let config = &state.config;
    let default_language = config.default_language();
    let posts: Vec<Post> = page.posts.into_iter().map(Post::parse).collect();

    let links: String = config
        .links
        .iter()
        .map(|link| {
            let name = escape_attr(&link.name);
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" aria-label="{}">{}</a>"#,
                escape_attr(&link.url),
                name,
                name
            )
        })
        .collect();

    let articles = if posts.is_empty() {
        r#"<p class="empty">No posts yet.</p>"#.to_string()
    } else {
        state.renderer.render_all(&posts)
    };

    let mut pager = String::new();
    if request.page > 1 {
        pager.push_str(&format!(
            r#"<a class="newer" href="{}">Newer posts</a>"#,
            home_url(request.page - 1, request.language, default_language)
        ));
    }
    if page.has_more {
        pager.push_str(&format!(
            r#"<a class="older" href="{}">Older posts</a>"#,
            home_url(request.page + 1, request.language, default_language)
        ));
    }

    let embed_script = if posts.iter().any(Post::has_instagram) {
        format!(r#"<script async defer src="{}"></script>"#, INSTAGRAM_EMBED_SCRIPT)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="author" content="{author}">
<title>{title}</title>
</head>
<body>
<header><a class="brand" href="/">{title}</a><nav>{links}</nav></header>
<main>
{articles}
</main>
<nav class="pager">{pager}</nav>
<footer>&copy; {author}</footer>
{embed_script}
</body>
</html>
"#,
        lang = request.language.code(),
        title = escape_attr(&config.title),
        author = escape_attr(&config.author),
    )
}

/// Home page link; the site's default language needs no `lang` parameter
fn home_url(page: u64, language: Language, default_language: Language) -> String {
    if language == default_language {
        format!("/?page={}", page)
    } else {
        format!("/?page={}&lang={}", page, language.code())
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HttpPostSource, LoadOutcome, PostFeed};
    use crate::config::{FeedConfig, LinkConfig};
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn write_post(dir: &Path, id: u32, extra: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(format!("post-{}.md", id)),
            format!("---\ntitle: Post {}\n{}---\nBody {}\n", id, extra, id),
        )
        .unwrap();
    }

    fn site() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        for id in 1..=5 {
            write_post(&posts, id, "");
        }
        write_post(&posts.join("es"), 1, "");
        fs::create_dir_all(tmp.path().join("public")).unwrap();
        fs::write(tmp.path().join("public/robots.txt"), "User-agent: *\n").unwrap();

        let mut config = SiteConfig::default();
        config.links.push(LinkConfig {
            name: "YouTube".to_string(),
            url: "https://www.youtube.com/channel/x".to_string(),
        });
        let site = Site::with_config(tmp.path(), config);
        (tmp, site)
    }

    async fn get(site: &Site, uri: &str) -> (StatusCode, String) {
        let response = router(site)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn get_json(site: &Site, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(site, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn test_posts_default_page() {
        let (_tmp, site) = site();
        let (status, json) = get_json(&site, "/api/posts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 5);
        assert_eq!(json["hasMore"], true);
        let posts = json["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts[0].as_str().unwrap().contains("title: Post 5"));
        assert!(posts[2].as_str().unwrap().contains("title: Post 3"));
    }

    #[tokio::test]
    async fn test_posts_pages() {
        let (_tmp, site) = site();

        let (_, json) = get_json(&site, "/api/posts?page=2&limit=3").await;
        assert_eq!(json["posts"].as_array().unwrap().len(), 2);
        assert_eq!(json["hasMore"], false);

        let (status, json) = get_json(&site, "/api/posts?page=3&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["posts"].as_array().unwrap().is_empty());
        assert_eq!(json["total"], 5);
        assert_eq!(json["hasMore"], false);
    }

    #[tokio::test]
    async fn test_posts_non_numeric_uses_defaults() {
        let (_tmp, site) = site();
        let (status, json) = get_json(&site, "/api/posts?page=first&limit=lots").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["posts"].as_array().unwrap().len(), 3);
        assert_eq!(json["hasMore"], true);
    }

    #[tokio::test]
    async fn test_posts_leading_integer() {
        let (_tmp, site) = site();
        let (status, json) = get_json(&site, "/api/posts?page=2abc&limit=2.5").await;
        assert_eq!(status, StatusCode::OK);
        let posts = json["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts[0].as_str().unwrap().contains("title: Post 3"));
        assert_eq!(json["hasMore"], true);
    }

    #[tokio::test]
    async fn test_posts_huge_values_saturate() {
        let (_tmp, site) = site();
        let (status, json) = get_json(&site, "/api/posts?page=99999999999999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["posts"].as_array().unwrap().is_empty());
        assert_eq!(json["total"], 5);
        assert_eq!(json["hasMore"], false);

        let (status, json) = get_json(&site, "/api/posts?limit=99999999999999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["posts"].as_array().unwrap().len(), 5);
        assert_eq!(json["hasMore"], false);

        let (status, _) = get_json(&site, "/api/posts?page=-99999999999999999999").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_posts_rejects_zero() {
        let (_tmp, site) = site();
        let (status, json) = get_json(&site, "/api/posts?page=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("page"));

        let (status, _) = get_json(&site, "/api/posts?limit=-3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_posts_language() {
        let (_tmp, site) = site();
        let (_, json) = get_json(&site, "/api/posts?lang=es").await;
        assert_eq!(json["total"], 1);

        let (_, json) = get_json(&site, "/api/posts?lang=fr").await;
        assert_eq!(json["total"], 5);
    }

    #[tokio::test]
    async fn test_posts_missing_directory_is_server_error() {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        let (status, json) = get_json(&site, "/api/posts").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_home_page() {
        let (_tmp, site) = site();
        let (status, html) = get(&site, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h1>Post 5</h1>"));
        assert!(html.contains("<h1>Post 3</h1>"));
        assert!(!html.contains("<h1>Post 2</h1>"));
        assert!(html.contains(r#"href="/?page=2">Older posts"#));
        assert!(!html.contains("Newer posts"));
        assert!(html.contains("https://www.youtube.com/channel/x"));
        assert!(!html.contains(INSTAGRAM_EMBED_SCRIPT));

        let (_, html) = get(&site, "/?page=2").await;
        assert!(html.contains("<h1>Post 1</h1>"));
        assert!(html.contains(r#"href="/?page=1">Newer posts"#));
        assert!(!html.contains("Older posts"));
    }

    #[tokio::test]
    async fn test_home_page_escapes_config_text() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp.path().join("posts"), 1, "");
        let mut config = SiteConfig::default();
        config.title = "Rock & <Roll>".to_string();
        config.author = "A \"B\" C".to_string();
        config.links.push(LinkConfig {
            name: "<b>Shop</b>".to_string(),
            url: "https://shop.example/?a=1&b=\"2\"".to_string(),
        });
        let site = Site::with_config(tmp.path(), config);

        let (_, html) = get(&site, "/").await;
        assert!(html.contains("<title>Rock &amp; &lt;Roll&gt;</title>"));
        assert!(html.contains(r#"content="A &quot;B&quot; C""#));
        assert!(html.contains(r#"href="https://shop.example/?a=1&amp;b=&quot;2&quot;""#));
        assert!(html.contains("&lt;b&gt;Shop&lt;/b&gt;</a>"));
        assert!(!html.contains("<b>Shop</b>"));
    }

    #[tokio::test]
    async fn test_home_page_uses_configured_language() {
        let (_tmp, mut site) = site();
        site.config.language = "es".to_string();
        site.config.per_page = 1;
        write_post(&site.posts_dir.join("es"), 2, "");

        let (_, html) = get(&site, "/").await;
        assert!(html.contains(r#"<html lang="es">"#));
        assert!(html.contains("<h1>Post 2</h1>"));
        assert!(html.contains(r#"href="/?page=2">Older posts"#));

        let (_, html) = get(&site, "/?lang=en").await;
        assert!(html.contains("<h1>Post 5</h1>"));
        assert!(html.contains(r#"href="/?page=2&lang=en">Older posts"#));
    }

    #[tokio::test]
    async fn test_home_page_includes_embed_script_once() {
        let (tmp, site) = site();
        let posts = tmp.path().join("posts");
        write_post(&posts, 6, "instagram: Cabc\n");
        write_post(&posts, 7, "instagram: Cdef\n");

        let (_, html) = get(&site, "/").await;
        assert_eq!(html.matches(INSTAGRAM_EMBED_SCRIPT).count(), 1);
        assert_eq!(html.matches("instagram-media").count(), 2);
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let (_tmp, site) = site();
        let (status, body) = get(&site, "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *\n");

        let (status, _) = get(&site, "/nope.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_feed_over_http() {
        let (_tmp, site) = site();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(&site);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = HttpPostSource::new(format!("http://{}", addr));
        let feed = PostFeed::new(source, Language::En, 2, &FeedConfig::default());

        assert_eq!(feed.mount().await, LoadOutcome::Loaded { count: 2 });
        while feed.has_more() {
            assert!(matches!(feed.load_more().await, LoadOutcome::Loaded { .. }));
        }

        let titles: Vec<String> = feed
            .posts()
            .into_iter()
            .map(|raw| Post::parse(raw).title().to_string())
            .collect();
        assert_eq!(
            titles,
            vec!["Post 5", "Post 4", "Post 3", "Post 2", "Post 1"]
        );
    }

    #[tokio::test]
    async fn test_http_source_error_status() {
        let tmp = TempDir::new().unwrap();
        let site = Site::with_config(tmp.path(), SiteConfig::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(&site);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = HttpPostSource::new(format!("http://{}", addr));
        let feed = PostFeed::new(source, Language::En, 3, &FeedConfig::default());
        assert_eq!(feed.mount().await, LoadOutcome::Failed);
        assert!(!feed.is_fetching());
        assert!(feed.has_more());
    }
}
