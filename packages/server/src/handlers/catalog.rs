use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LikeExpr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{ingredient, tag};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::catalog::*;
use crate::models::shared::escape_like;
use crate::state::AppState;
use crate::utils::color::random_tag_color;

/// Attempts at drawing an unused random tag color before giving up.
const COLOR_ATTEMPTS: usize = 32;

#[utoipa::path(
    get,
    path = "/",
    tag = "Tags",
    operation_id = "listTags",
    summary = "List all tags",
    responses((status = 200, description = "Tags ordered by name", body = Vec<TagResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tags",
    operation_id = "getTag",
    summary = "Get a tag by ID",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = tag::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;
    Ok(Json(tag.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tags",
    operation_id = "createTag",
    summary = "Create a tag",
    description = "Staff only. When `color` is omitted a random unused color is assigned.",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name, color or slug taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_tag(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;
    validate_create_tag(&payload)?;

    let color = match payload.color {
        Some(color) => color.trim().to_ascii_uppercase(),
        None => unused_color(&state.db).await?,
    };

    let model = tag::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        color: Set(color),
        slug: Set(payload.slug.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        AppError::from_insert(e, || {
            AppError::Conflict("A tag with this name, color or slug already exists".into())
        })
    })?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(model))))
}

async fn unused_color<C: ConnectionTrait>(db: &C) -> Result<String, AppError> {
    for _ in 0..COLOR_ATTEMPTS {
        let color = random_tag_color();
        let taken = tag::Entity::find()
            .filter(tag::Column::Color.eq(&color))
            .count(db)
            .await?
            > 0;
        if !taken {
            return Ok(color);
        }
    }
    Err(AppError::Conflict("Could not pick an unused tag color".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Ingredients",
    operation_id = "listIngredients",
    summary = "List or search ingredients",
    description = "Returns all ingredients ordered by name. `name` filters by case-insensitive prefix.",
    params(IngredientListQuery),
    responses((status = 200, description = "Ingredients", body = Vec<IngredientResponse>)),
)]
#[instrument(skip(state, query))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IngredientListQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let mut select = ingredient::Entity::find();

    if let Some(ref name) = query.name {
        let term = escape_like(name.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::col(ingredient::Column::Name)
                    .ilike(LikeExpr::new(format!("{term}%")).escape('\\')),
            );
        }
    }

    let rows = select
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(IngredientResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Ingredients",
    operation_id = "getIngredient",
    summary = "Get an ingredient by ID",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Ingredient not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = ingredient::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient not found".into()))?;
    Ok(Json(ingredient.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Ingredients",
    operation_id = "createIngredient",
    summary = "Create an ingredient",
    description = "Staff only. The (name, measurement unit) pair must be unique.",
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Ingredient already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_ingredient(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateIngredientRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;
    validate_create_ingredient(&payload)?;

    let model = ingredient::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        measurement_unit: Set(payload.measurement_unit.trim().to_string()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        AppError::from_insert(e, || {
            AppError::Conflict("This ingredient already exists".into())
        })
    })?;

    Ok((StatusCode::CREATED, Json(IngredientResponse::from(model))))
}
