// Web layer.
// - `app_state.rs` holds the shared handler state.
// - `contact_routes.rs` accepts the landing page's contact form.
// - `auth_routes.rs` runs the one-time Google consent flow.
// - `site_routes.rs` serves the static site and the health check.

#[path = "app_state.rs"]
pub mod state;

#[path = "auth_routes.rs"]
pub mod auth_routes;

#[path = "contact_routes.rs"]
pub mod contact_routes;

#[path = "site_routes.rs"]
pub mod site_routes;

pub use state::AppState;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Instant;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(site_routes::landing_page))
        .route("/api/health", get(site_routes::health))
        .route("/api/contato", post(contact_routes::submit_contact))
        .route("/api/auth/google", get(auth_routes::start_google_auth))
        .route(
            "/api/auth/callback/google",
            get(auth_routes::google_callback),
        )
        .route("/*path", get(site_routes::static_asset))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}
