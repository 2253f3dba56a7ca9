use super::state::AppState;
use axum::{
    extract::{Path as RoutePath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// `GET /`
pub async fn landing_page(State(state): State<AppState>) -> Response {
    serve_file(&state.site_dir, Path::new("index.html")).await
}

/// `GET /*path`: static files from the site directory. The path arrives
/// percent-decoded.
pub async fn static_asset(
    State(state): State<AppState>,
    RoutePath(path): RoutePath<String>,
) -> Response {
    match sanitize_path(&path) {
        Some(relative) => serve_file(&state.site_dir, &relative).await,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = if state.contacts.store_healthy().await {
        "connected"
    } else {
        "disconnected"
    };

    let (authenticated, token_fresh) = match &state.tokens {
        Some(tokens) => (tokens.has_credentials().await, tokens.is_usable().await),
        None => (false, false),
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "mirror_enabled": state.tokens.is_some(),
        "authenticated": authenticated,
        "token_fresh": token_fresh,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Maps a request path onto a relative file path, refusing anything that
/// could climb out of the site directory.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains(':') => return None,
            s => clean.push(s),
        }
    }

    if clean.as_os_str().is_empty() {
        clean.push("index.html");
    }
    Some(clean)
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

async fn serve_file(site_dir: &Path, relative: &Path) -> Response {
    let full_path = site_dir.join(relative);
    match tokio::fs::read(&full_path).await {
        Ok(bytes) => {
            ([(header::CONTENT_TYPE, content_type(relative))], bytes).into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            // Directories land here too.
            tracing::debug!("Could not serve {}: {}", full_path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
