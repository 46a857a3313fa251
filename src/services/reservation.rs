//! Seat reservation and release.
//!
//! Both operations run inside a single storage transaction whose first
//! statement is a guarded `UPDATE ... WHERE`. The update takes the write lock
//! on the row (and on SQLite, the database write lock) before anything is
//! read, so two concurrent requests can never both act on the same stale
//! value. Any error returned before `commit` drops the transaction and rolls
//! it back.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::travel_option;
use crate::error::{AppError, AppResult};
use crate::validation::{validate_seat_count, ValidationError, MAX_AMOUNT};

/// Result of a cancellation request. Cancelling twice is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled(booking::Model),
    AlreadyCancelled(booking::Model),
}

impl CancelOutcome {
    pub fn booking(&self) -> &booking::Model {
        match self {
            CancelOutcome::Cancelled(b) | CancelOutcome::AlreadyCancelled(b) => b,
        }
    }
}

/// Reserve `seats` seats on a travel option for `user_id`.
///
/// The booking's `total_price` is computed here, once, from the price of the
/// row locked by the seat update.
pub async fn reserve_seats<C>(
    db: &C,
    user_id: Uuid,
    travel_option_id: Uuid,
    seats: i32,
) -> AppResult<booking::Model>
where
    C: TransactionTrait,
{
    let seats = validate_seat_count(seats)?;

    let txn = db.begin().await?;

    take_seats(&txn, travel_option_id, seats).await?;

    let option = lock_travel_option(&txn, travel_option_id).await?;
    let total_price = Decimal::from(seats) * option.price;
    if total_price > MAX_AMOUNT {
        return Err(ValidationError::TotalTooLarge.into());
    }

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        travel_option_id: Set(travel_option_id),
        number_of_seats: Set(seats),
        total_price: Set(total_price),
        status: Set(BookingStatus::Confirmed),
        created_at: Set(Utc::now().into()),
    };
    let booking = new_booking.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        travel_option_id = %travel_option_id,
        user_id = %user_id,
        seats,
        total_price = %booking.total_price,
        "Booking confirmed"
    );

    Ok(booking)
}

/// Take `seats` seats from an upcoming travel option.
///
/// The decrement only matches while the option has not departed and still
/// has enough seats, whatever the caller last read. When nothing matches the
/// row is read back to report why.
pub async fn take_seats<C>(conn: &C, travel_option_id: Uuid, seats: i32) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let now: DateTime<FixedOffset> = Utc::now().into();

    let updated = travel_option::Entity::update_many()
        .col_expr(
            travel_option::Column::AvailableSeats,
            Expr::col(travel_option::Column::AvailableSeats).sub(seats),
        )
        .filter(travel_option::Column::Id.eq(travel_option_id))
        .filter(travel_option::Column::AvailableSeats.gte(seats))
        .filter(travel_option::Column::DepartureTime.gte(now))
        .exec(conn)
        .await?;

    if updated.rows_affected > 0 {
        return Ok(());
    }

    let option = travel_option::Entity::find_by_id(travel_option_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Travel option not found".to_string()))?;

    if option.departure_time < now {
        return Err(ValidationError::AlreadyDeparted.into());
    }

    Err(AppError::InsufficientSeats {
        requested: seats,
        available: option.available_seats,
    })
}

/// Cancel a booking owned by `user_id` and return its seats.
///
/// A booking that does not exist or belongs to someone else is reported as
/// not found.
pub async fn cancel_booking<C>(db: &C, user_id: Uuid, booking_id: Uuid) -> AppResult<CancelOutcome>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let flipped = booking::Entity::update_many()
        .col_expr(booking::Column::Status, Expr::value(BookingStatus::Cancelled))
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::UserId.eq(user_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .exec(&txn)
        .await?;

    let booking = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    // Already cancelled, possibly by a concurrent request
    if flipped.rows_affected == 0 {
        return Ok(CancelOutcome::AlreadyCancelled(booking));
    }

    travel_option::Entity::update_many()
        .col_expr(
            travel_option::Column::AvailableSeats,
            Expr::col(travel_option::Column::AvailableSeats).add(booking.number_of_seats),
        )
        .filter(travel_option::Column::Id.eq(booking.travel_option_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        travel_option_id = %booking.travel_option_id,
        seats = booking.number_of_seats,
        "Booking cancelled"
    );

    Ok(CancelOutcome::Cancelled(booking))
}

async fn lock_travel_option(
    txn: &DatabaseTransaction,
    travel_option_id: Uuid,
) -> AppResult<travel_option::Model> {
    travel_option::Entity::find_by_id(travel_option_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Travel option not found".to_string()))
}
