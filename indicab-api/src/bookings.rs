use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use indicab_core::{Booking, DailyCount, NewBooking, StatusCount};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<String>,
}

/// Accepted shapes for a status update body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusBody {
    Bare(String),
    Object { status: String },
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route("/api/bookings/status-counts", get(status_counts))
        .route("/api/bookings/per-day", get(bookings_per_day))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/status", patch(update_status))
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<Json<Booking>, AppError> {
    let Json(req) = payload?;
    let booking = state.bookings.create_booking(req).await?;
    Ok(Json(booking))
}

/// GET /api/bookings
async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = match query.status.as_deref() {
        Some(status) => state.bookings.list_bookings_with_status(status).await?,
        None => state.bookings.list_bookings().await?,
    };
    Ok(Json(bookings))
}

/// GET /api/bookings/status-counts
async fn status_counts(State(state): State<AppState>) -> Result<Json<Vec<StatusCount>>, AppError> {
    Ok(Json(state.bookings.status_counts().await?))
}

/// GET /api/bookings/per-day
async fn bookings_per_day(State(state): State<AppState>) -> Result<Json<Vec<DailyCount>>, AppError> {
    Ok(Json(state.bookings.bookings_per_day().await?))
}

/// GET /api/bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_booking(&id).await?))
}

/// PATCH /api/bookings/:id/status
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<Booking>, AppError> {
    let status = parse_status(&body);
    let booking = state.bookings.update_status(&id, status).await?;
    Ok(Json(booking))
}

/// The body is normally the raw status text. The admin dashboard sends
/// `{"status": "..."}` and some clients send a JSON string; both are unwrapped.
fn parse_status(body: &str) -> String {
    match serde_json::from_str::<StatusBody>(body) {
        Ok(StatusBody::Bare(status)) | Ok(StatusBody::Object { status }) => status,
        Err(_) => body.trim().to_string(),
    }
}
