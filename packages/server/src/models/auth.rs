use serde::{Deserialize, Serialize};

use super::shared::validate_text_field;
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Login email, unique across accounts.
    #[schema(example = "vpupkin@yandex.ru")]
    pub email: String,
    /// Unique username (1-150 chars: letters, digits and `.@+-_`; `me` is reserved).
    #[schema(example = "vasya.pupkin")]
    pub username: String,
    #[schema(example = "Vasya")]
    pub first_name: String,
    #[schema(example = "Pupkin")]
    pub last_name: String,
    /// Password (8-128 characters).
    #[schema(example = "Qwerty123!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&payload.email)?;
    let username = payload.username.trim();
    validate_text_field(username, "Username", 150)?;
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        return Err(AppError::Validation(
            "Username may contain only letters, digits and . @ + - _".into(),
        ));
    }
    if username.eq_ignore_ascii_case("me") {
        return Err(AppError::Validation("Username 'me' is reserved".into()));
    }
    validate_text_field(&payload.first_name, "First name", 150)?;
    validate_text_field(&payload.last_name, "Last name", 150)?;
    validate_password(&payload.password)
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !valid {
        return Err(AppError::Validation("Enter a valid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for token login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "vpupkin@yandex.ru")]
    pub email: String,
    #[schema(example = "Qwerty123!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub auth_token: String,
}

/// Request body for changing the caller's password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub fn validate_set_password_request(payload: &SetPasswordRequest) -> Result<(), AppError> {
    if payload.current_password.is_empty() {
        return Err(AppError::Validation(
            "Current password must not be empty".into(),
        ));
    }
    validate_password(&payload.new_password)
}
