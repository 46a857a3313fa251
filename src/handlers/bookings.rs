use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::travel_option;
use crate::error::AppResult;
use crate::handlers::travel::TravelOptionResponse;
use crate::services::reservation::{self, CancelOutcome};
use crate::services::search::{search_user_bookings, BookingFilter};
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub number_of_seats: i32,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub travel_option: Option<TravelOptionResponse>,
    pub number_of_seats: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn new(b: booking::Model, option: Option<travel_option::Model>) -> Self {
        Self {
            id: b.id,
            travel_option: option.map(Into::into),
            number_of_seats: b.number_of_seats,
            total_price: b.total_price,
            status: b.status,
            booked_at: b.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelStatus {
    Cancelled,
    AlreadyCancelled,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub status: CancelStatus,
    pub message: String,
    pub booking: BookingResponse,
}

/// Reserve seats on a travel option
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(travel_option_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    let booking = reservation::reserve_seats(
        &state.db,
        claims.sub,
        travel_option_id,
        payload.number_of_seats,
    )
    .await?;

    let option = travel_option::Entity::find_by_id(travel_option_id)
        .one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::new(booking, option))))
}

/// List the current user's bookings
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let rows = search_user_bookings(claims.sub, &filter)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(b, option)| BookingResponse::new(b, option))
            .collect(),
    ))
}

/// Cancel one of the current user's bookings
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(booking_id): AppPath<Uuid>,
) -> AppResult<Json<CancelResponse>> {
    let outcome = reservation::cancel_booking(&state.db, claims.sub, booking_id).await?;

    let (status, message) = match &outcome {
        CancelOutcome::Cancelled(_) => (
            CancelStatus::Cancelled,
            "Booking cancelled successfully. Seats have been returned.",
        ),
        CancelOutcome::AlreadyCancelled(_) => (
            CancelStatus::AlreadyCancelled,
            "This booking is already cancelled.",
        ),
    };

    let booking = outcome.booking().clone();
    let option = travel_option::Entity::find_by_id(booking.travel_option_id)
        .one(&state.db)
        .await?;

    Ok(Json(CancelResponse {
        status,
        message: message.to_string(),
        booking: BookingResponse::new(booking, option),
    }))
}
