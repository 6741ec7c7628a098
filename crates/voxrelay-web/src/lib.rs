//! Landing page: a push-to-talk recorder baked into the binary.
//!
//! The `ui/` directory is embedded at compile time with `rust-embed`, so the
//! page works without `gateway.static_dir` being present.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::Embed;
use tracing::debug;

#[derive(Embed)]
#[folder = "ui/"]
struct UiAssets;

/// Router serving `/` and `/assets/{*path}`.
pub fn ui_router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/assets/{*path}", get(asset_handler))
}

async fn index_handler() -> Response {
    serve_file("index.html")
}

async fn asset_handler(Path(path): Path<String>) -> Response {
    debug!(path = %path, "Serving embedded asset");
    serve_file(&path)
}

fn serve_file(path: &str) -> Response {
    match UiAssets::get(path) {
        Some(asset) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                asset.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, Html("<h1>404</h1>")).into_response(),
    }
}
