//! Sample travel options for development databases.

use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use crate::entities::travel_option::{self, TravelMode};
use crate::error::AppResult;

pub const DEFAULT_SEED_COUNT: usize = 50;

const SEED_WINDOW_DAYS: i64 = 60;

pub const CITIES: [&str; 25] = [
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix",
    "Philadelphia", "San Antonio", "San Diego", "Dallas", "San Jose",
    "Austin", "Jacksonville", "Fort Worth", "Columbus", "Charlotte",
    "San Francisco", "Indianapolis", "Seattle", "Denver", "Boston",
    "Washington DC", "Nashville", "Oklahoma City", "Las Vegas", "Portland",
];

const MODES: [TravelMode; 3] = [TravelMode::Flight, TravelMode::Train, TravelMode::Bus];

/// Price range in whole currency units
pub fn price_range(mode: TravelMode) -> (i64, i64) {
    match mode {
        TravelMode::Flight => (150, 800),
        TravelMode::Train => (50, 300),
        TravelMode::Bus => (25, 150),
    }
}

pub fn seat_range(mode: TravelMode) -> (i32, i32) {
    match mode {
        TravelMode::Flight => (50, 200),
        TravelMode::Train => (100, 400),
        TravelMode::Bus => (30, 60),
    }
}

/// Build one random travel option departing within the seeding window.
pub fn random_travel_option<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
) -> travel_option::ActiveModel {
    let source = *CITIES.choose(rng).unwrap_or(&CITIES[0]);
    let destination = loop {
        let candidate = *CITIES.choose(rng).unwrap_or(&CITIES[1]);
        if candidate != source {
            break candidate;
        }
    };

    let mode = *MODES.choose(rng).unwrap_or(&TravelMode::Bus);

    let window = Duration::days(SEED_WINDOW_DAYS).num_seconds();
    let departure = now + Duration::seconds(rng.gen_range(0..=window));

    let (min_price, max_price) = price_range(mode);
    let cents = rng.gen_range(min_price * 100..=max_price * 100);

    let (min_seats, max_seats) = seat_range(mode);

    travel_option::ActiveModel {
        id: Set(Uuid::new_v4()),
        mode: Set(mode),
        source: Set(source.to_string()),
        destination: Set(destination.to_string()),
        departure_time: Set(departure.into()),
        price: Set(Decimal::new(cents, 2)),
        available_seats: Set(rng.gen_range(min_seats..=max_seats)),
    }
}

/// Replace all travel options (and, by cascade, their bookings) with
/// `count` random ones. Returns the number created.
pub async fn seed_travel_options(db: &DatabaseConnection, count: usize) -> AppResult<usize> {
    travel_option::Entity::delete_many().exec(db).await?;

    let now = Utc::now();
    let options: Vec<_> = {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| random_travel_option(&mut rng, now)).collect()
    };

    let mut created = 0;
    for chunk in options.chunks(10) {
        travel_option::Entity::insert_many(chunk.to_vec()).exec(db).await?;
        created += chunk.len();
        tracing::info!("Created {} travel options...", created);
    }

    for mode in MODES {
        let total = travel_option::Entity::find()
            .filter(travel_option::Column::Mode.eq(mode))
            .count(db)
            .await?;
        tracing::info!(mode = ?mode, total, "Seeded travel options");
    }

    Ok(created)
}
