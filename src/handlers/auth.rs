use axum::{extract::State, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::extract::AppJson;
use crate::utils::jwt::{create_token, Claims};
use crate::utils::password::{hash_password, verify_password};
use crate::validation::{validate_email, validate_name, validate_password, validate_username};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
        }
    }
}

impl RegisterRequest {
    fn validate(&self) -> AppResult<()> {
        validate_username(&self.username)?;
        validate_name("First name", &self.first_name)?;
        validate_name("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_password(&self.password, &self.password_confirm)?;
        Ok(())
    }
}

impl UpdateProfileRequest {
    fn validate(&self) -> AppResult<()> {
        validate_name("First name", &self.first_name)?;
        validate_name("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

fn issue_token(state: &AppState, user: &user::Model) -> AppResult<String> {
    create_token(
        user.id,
        &user.username,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )
}

const DUPLICATE_USERNAME: &str = "A user with that username already exists";

/// Register a new traveller account
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    // Check if username already exists
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
    }

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username.clone()),
        email: Set(payload.email.trim().to_string()),
        password_hash: Set(hash_password(&payload.password)?),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        role: Set(UserRole::Traveller),
        created_at: Set(Utc::now().into()),
    };

    // A concurrent registration can still win the unique index
    let user = new_user
        .insert(&state.db)
        .await
        .map_err(|err| AppError::conflict_on_duplicate(err, DUPLICATE_USERNAME))?;
    tracing::info!(user_id = %user.id, username = %user.username, "Account created");

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Current user's profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UserInfo>> {
    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update name and email of the current user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserInfo>> {
    payload.validate()?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: user::ActiveModel = user.into();
    active.first_name = Set(payload.first_name.trim().to_string());
    active.last_name = Set(payload.last_name.trim().to_string());
    active.email = Set(payload.email.trim().to_string());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}
