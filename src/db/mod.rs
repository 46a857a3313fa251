use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::password::hash_password;

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Create the configured admin account unless a user with that name exists.
pub async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&config.admin_username))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let admin = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(config.admin_username.clone()),
        email: Set(config.admin_email.clone()),
        password_hash: Set(hash_password(&config.admin_password)?),
        first_name: Set("Admin".to_string()),
        last_name: Set(String::new()),
        role: Set(UserRole::Admin),
        created_at: Set(Utc::now().into()),
    };

    admin.insert(db).await?;
    tracing::info!(username = %config.admin_username, "Admin account created");
    Ok(())
}
