use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::travel_option::{self, TravelMode};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::handlers::bookings::BookingResponse;
use crate::handlers::travel::TravelOptionResponse;
use crate::services::search::{search_bookings, BookingFilter};
use crate::utils::extract::{AppJson, AppPath, AppQuery};
use crate::validation::{validate_available_seats, validate_price, validate_route};
use crate::AppState;

// ============ Travel Option Management ============

#[derive(Debug, Deserialize)]
pub struct CreateTravelOptionRequest {
    pub mode: TravelMode,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: Decimal,
    pub available_seats: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTravelOptionRequest {
    pub mode: Option<TravelMode>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    pub available_seats: Option<i32>,
}

/// Create a new travel option (admin)
pub async fn create_travel_option(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTravelOptionRequest>,
) -> AppResult<(StatusCode, Json<TravelOptionResponse>)> {
    validate_route(&payload.source, &payload.destination)?;
    let price = validate_price(payload.price)?;
    let seats = validate_available_seats(payload.available_seats)?;

    let option = travel_option::ActiveModel {
        id: Set(Uuid::new_v4()),
        mode: Set(payload.mode),
        source: Set(payload.source.trim().to_string()),
        destination: Set(payload.destination.trim().to_string()),
        departure_time: Set(payload.departure_time.into()),
        price: Set(price),
        available_seats: Set(seats),
    };

    let result = option.insert(&state.db).await?;
    tracing::info!(travel_option_id = %result.id, "Travel option created: {}", result);

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Update a travel option (admin)
///
/// Existing bookings keep the total price they were created with.
pub async fn update_travel_option(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateTravelOptionRequest>,
) -> AppResult<Json<TravelOptionResponse>> {
    let option = travel_option::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Travel option not found".to_string()))?;

    let source = payload.source.as_deref().unwrap_or(&option.source).trim().to_string();
    let destination = payload
        .destination
        .as_deref()
        .unwrap_or(&option.destination)
        .trim()
        .to_string();
    validate_route(&source, &destination)?;

    let mut active: travel_option::ActiveModel = option.into();
    active.source = Set(source);
    active.destination = Set(destination);

    if let Some(mode) = payload.mode {
        active.mode = Set(mode);
    }

    if let Some(time) = payload.departure_time {
        active.departure_time = Set(time.into());
    }

    if let Some(price) = payload.price {
        active.price = Set(validate_price(price)?);
    }

    if let Some(seats) = payload.available_seats {
        active.available_seats = Set(validate_available_seats(seats)?);
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result.into()))
}

/// Delete a travel option and, by cascade, its bookings (admin)
pub async fn delete_travel_option(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = travel_option::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Travel option not found".to_string()));
    }

    tracing::info!(travel_option_id = %id, "Travel option deleted");
    Ok(Json(serde_json::json!({ "message": "Travel option deleted" })))
}

// ============ Bookings Management (Admin) ============

#[derive(Debug, Serialize)]
pub struct AdminBookingResponse {
    pub user_id: Uuid,
    pub username: String,
    #[serde(flatten)]
    pub booking: BookingResponse,
}

/// List all bookings (admin)
pub async fn list_all_bookings(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> AppResult<Json<Vec<AdminBookingResponse>>> {
    let rows = search_bookings(&filter).all(&state.db).await?;
    let users = user::Entity::find().all(&state.db).await?;

    let responses = rows
        .into_iter()
        .map(|(b, option)| {
            let username = users
                .iter()
                .find(|u| u.id == b.user_id)
                .map(|u| u.username.clone())
                .unwrap_or_default();
            AdminBookingResponse {
                user_id: b.user_id,
                username,
                booking: BookingResponse::new(b, option),
            }
        })
        .collect();

    Ok(Json(responses))
}
