use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use indicab_core::{ContactMessage, NewContactMessage};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    pub inquiry_type: Option<String>,
    pub contact_method: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contact-messages",
            post(create_contact_message).get(list_contact_messages),
        )
        .route("/api/contact-messages/{id}", get(get_contact_message))
        .route("/api/contact-messages/{id}/resolve", patch(mark_resolved))
}

/// POST /api/contact-messages
async fn create_contact_message(
    State(state): State<AppState>,
    payload: Result<Json<NewContactMessage>, JsonRejection>,
) -> Result<Json<ContactMessage>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.contact_messages.create_contact_message(req).await?))
}

/// GET /api/contact-messages
async fn list_contact_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    let messages = match (query.inquiry_type.as_deref(), query.contact_method.as_deref()) {
        (None, None) => state.contact_messages.list_contact_messages().await?,
        (inquiry_type, contact_method) => {
            state
                .contact_messages
                .list_contact_messages_by(inquiry_type, contact_method)
                .await?
        }
    };
    Ok(Json(messages))
}

/// GET /api/contact-messages/:id
async fn get_contact_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>, AppError> {
    Ok(Json(state.contact_messages.get_contact_message(&id).await?))
}

/// PATCH /api/contact-messages/:id/resolve
async fn mark_resolved(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>, AppError> {
    Ok(Json(state.contact_messages.mark_resolved(&id).await?))
}
