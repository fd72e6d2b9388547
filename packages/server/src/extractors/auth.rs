use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Use
/// `Option<AuthUser>` for endpoints anonymous callers may read; a header that
/// is present but invalid is still rejected there.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub is_staff: bool,
}

impl AuthUser {
    /// Returns `Ok(())` for staff accounts, `Err(PermissionDenied)` otherwise.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Returns `Ok(())` if the caller is `owner_id`.
    pub fn require_owner(&self, owner_id: i32) -> Result<(), AppError> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn decode_header(parts: &Parts, secret: &str) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::TokenInvalid)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    let claims = jwt::verify(token, secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(Some(AuthUser {
        user_id: claims.uid,
        email: claims.sub,
        is_staff: claims.staff,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        decode_header(parts, &state.config.auth.jwt_secret)?.ok_or(AppError::TokenMissing)
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        decode_header(parts, &state.config.auth.jwt_secret)
    }
}

/// Caller id for read-model annotations, `None` for anonymous callers.
pub fn viewer_id(auth_user: &Option<AuthUser>) -> Option<i32> {
    auth_user.as_ref().map(|u| u.user_id)
}
