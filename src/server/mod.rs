//! HTTP server: post pages and the JSON post API

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{Post, PostLoader, PostMeta};
use crate::error::Error;
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Server state shared by all handlers
struct AppState {
    blog: Blog,
    loader: PostLoader,
    templates: TemplateRenderer,
}

/// Build the application router for a site
pub fn router(blog: &Blog) -> crate::Result<Router> {
    let state = Arc::new(AppState {
        blog: blog.clone(),
        loader: blog.loader(),
        templates: TemplateRenderer::new()?,
    });

    Ok(Router::new()
        .route("/", get(index_page))
        .route("/posts/:slug", get(post_page))
        .route("/posts/:slug/", get(post_page))
        .route("/api/posts", get(api_index))
        .route("/api/posts/:slug", get(api_post))
        .nest_service("/static", ServeDir::new(&blog.static_dir))
        .fallback(not_found_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    tracing::info!("Serving posts from {:?}", blog.posts_dir);
    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}

/// Run synchronous loader work on the blocking pool
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> crate::Result<T>
where
    F: FnOnce(&AppState) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error body for the API routes
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let kind = match &self.0 {
            Error::NotFound(_) => "not_found",
            Error::MalformedMetadata { .. } => "malformed_metadata",
            _ => "internal",
        };
        if status.is_server_error() {
            tracing::error!("API request failed: {}", self.0);
        }
        let body = json!({ "error": kind, "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// GET /api/posts
async fn api_index(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PostMeta>>, ApiError> {
    let posts = blocking(&state, |s| s.loader.load_index()).await?;
    Ok(Json(posts))
}

/// GET /api/posts/:slug
async fn api_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = blocking(&state, move |s| s.loader.load_post(&slug)).await?;
    Ok(Json(post))
}

/// GET /
async fn index_page(State(state): State<Arc<AppState>>) -> Response {
    let page = blocking(&state, |s| {
        let posts = s.loader.load_index()?;
        s.templates.render_index(&s.blog.config, &posts)
    })
    .await;

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, e),
    }
}

/// GET /posts/:slug
async fn post_page(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    let page = blocking(&state, move |s| {
        let post = s.loader.load_post(&slug)?;

        // Navigation is best effort; a broken neighbour must not hide this post
        let index = s.loader.load_index().unwrap_or_else(|e| {
            tracing::warn!("Rendering {} without navigation: {}", slug, e);
            Vec::new()
        });

        s.templates
            .render_post(&s.blog.config, &post, post.prev(&index), post.next(&index))
    })
    .await;

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&state, e),
    }
}

async fn not_found_page(State(state): State<Arc<AppState>>) -> Response {
    error_page(&state, Error::NotFound("page".to_string()))
}

/// Render an error as an HTML page with the matching status
fn error_page(state: &AppState, err: Error) -> Response {
    let status = status_for(&err);
    let (heading, message) = match &err {
        Error::NotFound(_) => ("Not Found", "The page you requested does not exist.".to_string()),
        _ => {
            tracing::error!("Page request failed: {}", err);
            ("Something went wrong", err.to_string())
        }
    };

    match state
        .templates
        .render_error(&state.blog.config, heading, &message)
    {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, message).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn source(title: &str, created: &str) -> String {
        format!(
            "---\ntitle: {}\ncreatedDate: {}\nlastUpdatedDate: {}\ncategories: [web, rust]\nauthor: Jane Doe\nestimatedReadingTimeInMins: 2\n---\n\nHello from **{}**.\n",
            title, created, created, title
        )
    }

    fn site(posts: &[(&str, String)]) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let posts_dir = dir.path().join("posts");
        fs::create_dir_all(&posts_dir).unwrap();
        for (name, content) in posts {
            fs::write(posts_dir.join(name), content).unwrap();
        }
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("site.css"), "body {}").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let app = router(&blog).unwrap();
        (dir, app)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn sample_site() -> (TempDir, Router) {
        site(&[
            ("first-post.md", source("First Post", "2023-05-01")),
            ("latest.md", source("Latest", "2024-02-10T09:00:00Z")),
            ("middle.md", source("Middle", "2023-11-20")),
        ])
    }

    #[tokio::test]
    async fn test_api_index_sorted_without_content() {
        let (_dir, app) = sample_site();
        let (status, body) = get(app, "/api/posts").await;
        assert_eq!(status, StatusCode::OK);

        let posts: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, vec!["latest", "middle", "first-post"]);
        assert!(posts.iter().all(|p| p.get("content").is_none()));
        assert_eq!(posts[0]["createdDate"], "2024-02-10T09:00:00Z");
        assert_eq!(posts[0]["categories"], json!(["web", "rust"]));
        assert_eq!(posts[0]["estimatedReadingTimeInMins"], 2);
    }

    #[tokio::test]
    async fn test_api_post() {
        let (_dir, app) = sample_site();
        let (status, body) = get(app, "/api/posts/middle").await;
        assert_eq!(status, StatusCode::OK);

        let post: Post = serde_json::from_str(&body).unwrap();
        assert_eq!(post.slug(), "middle");
        assert_eq!(post.meta.title, "Middle");
        assert_eq!(post.meta.created_date.as_str(), "2023-11-20");
        assert!(post.content.contains("<strong>Middle</strong>"));
    }

    #[tokio::test]
    async fn test_api_post_not_found() {
        let (_dir, app) = sample_site();
        for uri in ["/api/posts/nope", "/api/posts/..%2Fsecret"] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            let error: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(error["error"], "not_found");
        }
    }

    #[tokio::test]
    async fn test_malformed_post_is_server_error() {
        let (_dir, app) = site(&[
            ("good.md", source("Good", "2024-01-01")),
            ("bad.md", source("Bad", "someday")),
        ]);

        let (status, body) = get(app.clone(), "/api/posts/bad").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["error"], "malformed_metadata");

        let (status, _) = get(app.clone(), "/api/posts").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // A healthy post still renders even though the index cannot be built
        let (status, body) = get(app, "/posts/good").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<strong>Good</strong>"));
    }

    #[tokio::test]
    async fn test_index_page() {
        let (_dir, app) = sample_site();
        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let latest = body.find("Latest").unwrap();
        let middle = body.find("Middle").unwrap();
        let first = body.find("First Post").unwrap();
        assert!(latest < middle && middle < first);
        assert!(!body.contains("Hello from"));
    }

    #[tokio::test]
    async fn test_post_page() {
        let (_dir, app) = sample_site();
        for uri in ["/posts/middle", "/posts/middle/"] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("<h1 class=\"post-title\">Middle</h1>"));
            assert!(body.contains("<strong>Middle</strong>"));
            assert!(body.contains("/posts/first-post/"));
            assert!(body.contains("/posts/latest/"));
        }
    }

    #[tokio::test]
    async fn test_post_page_not_found() {
        let (_dir, app) = sample_site();
        let (status, body) = get(app.clone(), "/posts/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Not Found"));

        let (status, _) = get(app, "/no/such/route").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_files() {
        let (_dir, app) = sample_site();
        let request = Request::builder()
            .uri("/static/site.css")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }
}
