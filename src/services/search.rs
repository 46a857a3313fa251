//! Listing filters. Every field is optional; an absent field adds no
//! constraint, and all present fields are combined with AND.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, SelectTwo,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::travel_option::{self, TravelMode};
use crate::utils::query::empty_string_as_none;

pub const HOME_LISTING_LIMIT: u64 = 6;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TravelOptionFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mode: Option<TravelMode>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookingFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<BookingStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mode: Option<TravelMode>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_to: Option<NaiveDate>,
}

/// Bookable travel options: departing at or after `now`, with seats left.
pub fn bookable_travel_options(now: DateTime<Utc>) -> Select<travel_option::Entity> {
    travel_option::Entity::find()
        .filter(travel_option::Column::DepartureTime.gte(to_db_time(now)))
        .filter(travel_option::Column::AvailableSeats.gt(0))
        .order_by_asc(travel_option::Column::DepartureTime)
}

pub fn home_travel_options(now: DateTime<Utc>) -> Select<travel_option::Entity> {
    bookable_travel_options(now).limit(HOME_LISTING_LIMIT)
}

pub fn search_travel_options(
    filter: &TravelOptionFilter,
    now: DateTime<Utc>,
) -> Select<travel_option::Entity> {
    let mut query = bookable_travel_options(now);

    if let Some(mode) = filter.mode {
        query = query.filter(travel_option::Column::Mode.eq(mode));
    }
    if let Some(source) = &filter.source {
        query = query.filter(icontains(travel_option::Column::Source, source));
    }
    if let Some(destination) = &filter.destination {
        query = query.filter(icontains(travel_option::Column::Destination, destination));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(travel_option::Column::DepartureTime.gte(start_of_day(from)));
    }
    if let Some(to) = filter.date_to.and_then(|d| d.checked_add_days(Days::new(1))) {
        query = query.filter(travel_option::Column::DepartureTime.lt(start_of_day(to)));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(travel_option::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(travel_option::Column::Price.lte(max));
    }

    query
}

/// Bookings joined with their travel option, newest first.
pub fn search_bookings(
    filter: &BookingFilter,
) -> SelectTwo<booking::Entity, travel_option::Entity> {
    let mut query = booking::Entity::find()
        .find_also_related(travel_option::Entity)
        .order_by_desc(booking::Column::CreatedAt);

    if let Some(status) = filter.status {
        query = query.filter(booking::Column::Status.eq(status));
    }
    if let Some(mode) = filter.mode {
        query = query.filter(travel_option::Column::Mode.eq(mode));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(travel_option::Column::DepartureTime.gte(start_of_day(from)));
    }
    if let Some(to) = filter.date_to.and_then(|d| d.checked_add_days(Days::new(1))) {
        query = query.filter(travel_option::Column::DepartureTime.lt(start_of_day(to)));
    }

    query
}

pub fn search_user_bookings(
    user_id: Uuid,
    filter: &BookingFilter,
) -> SelectTwo<booking::Entity, travel_option::Entity> {
    search_bookings(filter).filter(booking::Column::UserId.eq(user_id))
}

fn icontains(column: travel_option::Column, needle: &str) -> SimpleExpr {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Expr::expr(Func::lower(Expr::col((travel_option::Entity, column))))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

fn start_of_day(date: NaiveDate) -> DateTime<FixedOffset> {
    to_db_time(date.and_time(NaiveTime::MIN).and_utc())
}

fn to_db_time(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    time.fixed_offset()
}
