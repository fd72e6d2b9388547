use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, viewer_id};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::auth::{SetPasswordRequest, validate_set_password_request};
use crate::models::shared::{Pagination, page_offset, parse_recipes_limit, resolve_page};
use crate::models::user::*;
use crate::services::{relation, subscription};
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    description = "Returns users ordered by id. `is_subscribed` is relative to the caller and false for anonymous requests.",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let (page, per_page) = resolve_page(query.page, query.limit, &state.config.recipes);

    let select = user::Entity::find();
    let total = select.clone().paginate(&state.db, per_page).num_items().await?;
    let users = select
        .order_by_asc(user::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscribed = relation::followed_among(&state.db, viewer_id(&auth_user), &ids).await?;
    let data = users
        .into_iter()
        .map(|u| {
            let is_subscribed = subscribed.contains(&u.id);
            UserResponse::new(u, is_subscribed)
        })
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, id).await?;
    let subscribed = relation::followed_among(&state.db, viewer_id(&auth_user), &[id]).await?;
    Ok(Json(UserResponse::new(user, subscribed.contains(&id))))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the current user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    // A token can outlive its account.
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    Ok(Json(UserResponse::new(user, false)))
}

#[utoipa::path(
    post,
    path = "/set_password",
    tag = "Users",
    operation_id = "setPassword",
    summary = "Change the current user's password",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error or wrong current password (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn set_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_set_password_request(&payload)?;

    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let matches = hash::verify_password_blocking(payload.current_password, user.password.clone())
        .await
        .map_err(AppError::Internal)?;
    if !matches {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    let new_hash = hash::hash_password_blocking(payload.new_password)
        .await
        .map_err(AppError::Internal)?;
    let mut active: user::ActiveModel = user.into();
    active.password = Set(new_hash);
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "Subscriptions",
    operation_id = "listSubscriptions",
    summary = "List followed authors",
    description = "Authors the caller follows, ordered by username, each with their newest recipes truncated to `recipes_limit` and the total recipe count.",
    params(SubscriptionListQuery),
    responses(
        (status = 200, description = "Followed authors", body = SubscriptionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_subscriptions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SubscriptionListQuery>,
) -> Result<Json<SubscriptionListResponse>, AppError> {
    let (page, per_page) = resolve_page(query.page, query.limit, &state.config.recipes);
    let recipes_limit = parse_recipes_limit(
        query.recipes_limit.as_deref(),
        state.config.recipes.subscription_recipes_limit,
    );

    let (authors, total) =
        subscription::list_followees(&state.db, auth_user.user_id, page, per_page).await?;
    let data = subscription::subscription_views(&state.db, authors, recipes_limit).await?;

    Ok(Json(SubscriptionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "subscribe",
    summary = "Follow an author",
    params(
        ("id" = i32, Path, description = "User ID"),
        RecipesLimitQuery,
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Already subscribed or self-subscription (ALREADY_EXISTS, SELF_REFERENCE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id, id))]
pub async fn subscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<RecipesLimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let recipes_limit = parse_recipes_limit(
        query.recipes_limit.as_deref(),
        state.config.recipes.subscription_recipes_limit,
    );

    let txn = state.db.begin().await?;
    let followee = relation::follow(&txn, auth_user.user_id, id).await?;
    txn.commit().await?;

    let view = subscription::subscription_views(&state.db, vec![followee], recipes_limit)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("Subscription view missing".into()))?;

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    delete,
    path = "/{id}/subscribe",
    tag = "Subscriptions",
    operation_id = "unsubscribe",
    summary = "Stop following an author",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found or not subscribed (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn unsubscribe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    relation::unfollow(&txn, auth_user.user_id, id).await?;
    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
