use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::travel_option::{self, TravelMode};
use crate::error::{AppError, AppResult};
use crate::services::search::{home_travel_options, search_travel_options, TravelOptionFilter};
use crate::utils::extract::{AppPath, AppQuery};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TravelOptionResponse {
    pub id: Uuid,
    pub mode: TravelMode,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price: Decimal,
    pub available_seats: i32,
    pub has_available_seats: bool,
}

impl From<travel_option::Model> for TravelOptionResponse {
    fn from(o: travel_option::Model) -> Self {
        Self {
            has_available_seats: o.has_available_seats(),
            id: o.id,
            mode: o.mode,
            source: o.source,
            destination: o.destination,
            departure_time: o.departure_time.with_timezone(&Utc),
            price: o.price,
            available_seats: o.available_seats,
        }
    }
}

/// Upcoming travel options shown on the landing page
pub async fn home(State(state): State<AppState>) -> AppResult<Json<Vec<TravelOptionResponse>>> {
    let options = home_travel_options(Utc::now()).all(&state.db).await?;
    Ok(Json(options.into_iter().map(Into::into).collect()))
}

/// List bookable travel options matching the query filters
pub async fn list_travel_options(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<TravelOptionFilter>,
) -> AppResult<Json<Vec<TravelOptionResponse>>> {
    let options = search_travel_options(&filter, Utc::now())
        .all(&state.db)
        .await?;

    Ok(Json(options.into_iter().map(Into::into).collect()))
}

/// Get travel option details
pub async fn get_travel_option(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<TravelOptionResponse>> {
    let option = travel_option::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Travel option not found".to_string()))?;

    Ok(Json(option.into()))
}
