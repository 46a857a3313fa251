#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;
use uuid::Uuid;

use travel_booking_backend::entities::travel_option::{self, TravelMode};
use travel_booking_backend::entities::user::{self, UserRole};
use travel_booking_backend::utils::jwt::create_token;
use travel_booking_backend::{AppState, Config};

pub const JWT_SECRET: &str = "test-secret";

/// Fresh in-memory database with all migrations applied.
///
/// The in-memory database lives only as long as its one pooled connection.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    connect_and_migrate(options).await
}

/// File-backed database served by several pooled connections, so that
/// transactions really overlap. Keep the directory alive for the test.
pub async fn setup_shared_db() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("bookings.db").display());

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(8)
        .min_connections(8)
        .sqlx_logging(false);

    let db = connect_and_migrate(options).await;
    (dir, db)
}

async fn connect_and_migrate(options: ConnectOptions) -> DatabaseConnection {
    let db = Database::connect(options)
        .await
        .expect("Failed to open test database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        admin_username: "admin".to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "admin-password".to_string(),
    }
}

pub async fn setup_state() -> AppState {
    AppState {
        db: setup_db().await,
        config: test_config(),
    }
}

/// Insert a user without going through password hashing.
pub async fn create_user(db: &DatabaseConnection, username: &str, role: UserRole) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set("unused".to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        role: Set(role),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

pub fn token_for(user: &user::Model) -> String {
    create_token(user.id, &user.username, user.role.clone(), JWT_SECRET, 1)
        .expect("Failed to create token")
}

pub struct NewTravelOption {
    pub mode: TravelMode,
    pub source: &'static str,
    pub destination: &'static str,
    pub days_ahead: i64,
    pub price: Decimal,
    pub seats: i32,
}

impl Default for NewTravelOption {
    fn default() -> Self {
        Self {
            mode: TravelMode::Train,
            source: "Boston",
            destination: "Washington DC",
            days_ahead: 5,
            price: Decimal::new(8999, 2),
            seats: 200,
        }
    }
}

pub async fn create_travel_option(
    db: &DatabaseConnection,
    new: NewTravelOption,
) -> travel_option::Model {
    travel_option::ActiveModel {
        id: Set(Uuid::new_v4()),
        mode: Set(new.mode),
        source: Set(new.source.to_string()),
        destination: Set(new.destination.to_string()),
        departure_time: Set((Utc::now() + Duration::days(new.days_ahead)).into()),
        price: Set(new.price),
        available_seats: Set(new.seats),
    }
    .insert(db)
    .await
    .expect("Failed to create travel option")
}

pub async fn available_seats(db: &DatabaseConnection, travel_option_id: Uuid) -> i32 {
    travel_option::Entity::find_by_id(travel_option_id)
        .one(db)
        .await
        .expect("Failed to load travel option")
        .expect("Travel option missing")
        .available_seats
}

/// Round stored money values the way the two-decimal column does.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}
