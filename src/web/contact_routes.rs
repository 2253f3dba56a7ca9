use super::state::AppState;
use crate::core::contact::{ContactError, ContactSubmission};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `POST /api/contato`
///
/// 200 once the contact is durably stored (the spreadsheet mirror has no say
/// in this), 400 for bad input, 500 when the store fails.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected contact body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "JSON inválido",
                    "details": rejection.body_text(),
                })),
            );
        }
    };

    match state.contacts.submit(submission).await {
        Ok(contact) => (
            StatusCode::OK,
            Json(json!({
                "message": "Dados salvos com sucesso!",
                "contato": contact,
            })),
        ),
        Err(ContactError::Validation { missing }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Todos os campos são obrigatórios",
                "missing": missing,
            })),
        ),
        Err(e @ ContactError::Persistence(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Erro ao salvar os dados",
                "details": e.to_string(),
            })),
        ),
    }
}
