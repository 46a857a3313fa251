use std::env;

use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use travel_booking_backend::{config::Config, db, seed};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_booking_backend=info,seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let count = env::var("SEED_COUNT")
        .ok()
        .map(|v| v.parse().expect("SEED_COUNT must be a number"))
        .unwrap_or(seed::DEFAULT_SEED_COUNT);

    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let created = seed::seed_travel_options(&db, count)
        .await
        .expect("Failed to seed travel options");

    tracing::info!("Successfully created {} travel options!", created);
}
