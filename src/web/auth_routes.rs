use super::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// `GET /api/auth/google`: sends the site owner to Google's consent screen.
pub async fn start_google_auth(State(state): State<AppState>) -> Response {
    let Some(tokens) = &state.tokens else {
        return not_configured().into_response();
    };
    let csrf_state = state.pending.issue();
    Redirect::to(&tokens.authorization_url(&csrf_state)).into_response()
}

fn not_configured() -> (StatusCode, &'static str) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Integração com o Google não configurada",
    )
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /api/auth/callback/google`: Google redirects here after consent.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, &'static str) {
    let Some(tokens) = &state.tokens else {
        return not_configured();
    };

    if let Some(error) = params.error {
        tracing::warn!("Google authorization was not granted: {}", error);
        return (StatusCode::BAD_REQUEST, "Autorização negada pelo Google");
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Código de autorização ausente");
    };

    let state_ok = params
        .state
        .as_deref()
        .is_some_and(|s| state.pending.consume(s));
    if !state_ok {
        tracing::warn!("OAuth callback with unknown or expired state");
        return (
            StatusCode::BAD_REQUEST,
            "Estado de autorização inválido ou expirado",
        );
    }

    match tokens.complete_authorization(&code).await {
        Ok(()) => (
            StatusCode::OK,
            "Autenticação realizada com sucesso! Você pode fechar esta janela.",
        ),
        Err(e) => {
            tracing::error!("OAuth code exchange failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Erro na autenticação")
        }
    }
}
