use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::errors::ApiError;
use crate::forms::BookMuseumRequest;
use crate::middleware::AuthUser;
use crate::models::{Booking, BookingSummary, Museum, Ticket, Visitor};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/book_museum/{museum_id}/", post(book_museum_api))
        .route("/my_bookings/", get(user_bookings_api))
        .route("/cancel_booking/{booking_id}/", post(cancel_booking_api))
}

#[derive(Debug, Serialize)]
pub struct BookingEntry {
    pub booking_id: i64,
    pub museum_name: String,
    pub museum_location: String,
    pub visit_date: NaiveDate,
    pub ticket_type: String,
    pub created_at: NaiveDateTime,
}

impl From<&BookingSummary> for BookingEntry {
    fn from(summary: &BookingSummary) -> Self {
        BookingEntry {
            booking_id: summary.booking_id,
            museum_name: summary.museum_name.clone(),
            museum_location: summary.museum_location.clone(),
            visit_date: summary.visit_date,
            ticket_type: summary.ticket_type(),
            created_at: summary.booking_date,
        }
    }
}

fn duplicate_booking_response(existing_id: i64) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "You already have a booking for this museum",
            "existing_booking_id": existing_id,
        })),
    )
        .into_response()
}

// POST /lol/api/book_museum/{museum_id}/
async fn book_museum_api(
    State(state): State<Arc<AppState>>,
    Path(museum_id): Path<i64>,
    user: AuthUser,
    body: axum::body::Bytes,
) -> Result<Response, ApiError> {
    // The chatbot posts without a body when it wants the default ticket
    let request: BookMuseumRequest = if body.is_empty() {
        BookMuseumRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("invalid JSON body: {}", e)))?
    };

    let museum = Museum::find(museum_id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("museum"))?;

    if let Some(existing_id) =
        Booking::existing_for_museum(user.user_id, museum_id, &state.db).await?
    {
        return Ok(duplicate_booking_response(existing_id));
    }

    let ticket = match request.ticket_id {
        Some(ticket_id) => Ticket::find(ticket_id, &state.db)
            .await?
            .ok_or_else(|| ApiError::Validation("ticket not found".to_string()))?,
        None => Ticket::first_available(&state.db)
            .await?
            .ok_or_else(|| ApiError::Conflict("No tickets available for booking".to_string()))?,
    };

    // Contact details fall back to the account when no profile exists yet
    let visitor =
        Visitor::get_or_create(user.user_id, &user.username, &user.email, "", &state.db).await?;

    let visit_date = Utc::now().date_naive();
    let booking_id = Booking::create_unless_existing(
        user.user_id,
        visitor.id,
        ticket.id,
        museum_id,
        visit_date,
        &state.db,
    )
    .await?;

    let Some(booking_id) = booking_id else {
        // Lost the race against a concurrent booking for the same museum
        let existing_id = Booking::existing_for_museum(user.user_id, museum_id, &state.db)
            .await?
            .ok_or(ApiError::Internal)?;
        return Ok(duplicate_booking_response(existing_id));
    };

    tracing::info!(
        "User {} booked museum {} (booking {})",
        user.user_id,
        museum_id,
        booking_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking successful!",
            "booking_id": booking_id,
            "museum_name": museum.name,
            "visit_date": visit_date,
            "ticket_type": ticket.label(),
        })),
    )
        .into_response())
}

// GET /lol/api/my_bookings/
async fn user_bookings_api(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BookingEntry>>, ApiError> {
    let bookings = Booking::for_user(user.user_id, &state.db).await?;
    Ok(Json(bookings.iter().map(BookingEntry::from).collect()))
}

// POST /lol/api/cancel_booking/{booking_id}/
async fn cancel_booking_api(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
    user: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Ownership mismatch is a 404 so booking ids of other users do not leak
    let booking = Booking::find_owned(booking_id, user.user_id, &state.db)
        .await?
        .ok_or(ApiError::NotFound("booking"))?;

    Booking::delete(booking_id, &state.db).await?;

    tracing::info!("User {} cancelled booking {}", user.user_id, booking_id);

    Ok(Json(json!({
        "message": format!(
            "Booking for {} on {} has been cancelled successfully",
            booking.museum_name, booking.visit_date
        ),
        "cancelled_booking_id": booking_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> BookingSummary {
        BookingSummary {
            booking_id: 11,
            museum_name: "Uffizi".into(),
            museum_location: "Florence".into(),
            visit_date: NaiveDate::from_ymd_opt(2026, 9, 2).unwrap(),
            ticket_id: 2,
            ticket_price: 18.0,
            booking_date: NaiveDate::from_ymd_opt(2026, 8, 30)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn booking_entry_has_the_wire_shape() {
        let entry = BookingEntry::from(&summary());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["booking_id"], 11);
        assert_eq!(json["museum_name"], "Uffizi");
        assert_eq!(json["museum_location"], "Florence");
        assert_eq!(json["visit_date"], "2026-09-02");
        assert_eq!(json["ticket_type"], "Ticket 2 - 18.00");
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn duplicate_response_carries_existing_id() {
        let resp = duplicate_booking_response(7);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "You already have a booking for this museum");
        assert_eq!(body["existing_booking_id"], 7);
    }
}
