use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, RegisterRequest, TokenResponse, validate_login_request,
    validate_register_request,
};
use crate::models::user::RegisterResponse;
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new account",
    description = "Creates a user account. Email and username must be unique.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Email or username taken (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let hash = hash::hash_password_blocking(payload.password)
        .await
        .map_err(AppError::Internal)?;

    let new_user = user::ActiveModel {
        email: Set(payload.email.trim().to_string()),
        username: Set(payload.username.trim().to_string()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        password: Set(hash),
        is_staff: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| {
        AppError::from_insert(e, || {
            AppError::Conflict("A user with this email or username already exists".into())
        })
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/token/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Obtain an auth token",
    description = "Exchanges email and password for a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong email or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password_blocking(payload.password, user.password.clone())
        .await
        .map_err(AppError::Internal)?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let auth_token = jwt::sign(
        user.id,
        &user.email,
        user.is_staff,
        state.config.auth.token_ttl_hours,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(TokenResponse { auth_token }))
}
