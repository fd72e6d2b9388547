use serde::{Deserialize, Serialize};

use super::catalog::TagResponse;
use super::shared::{Pagination, first_duplicate, validate_text_field};
use super::user::UserResponse;
use crate::entity::recipe;
use crate::error::AppError;

/// Largest value accepted for amounts and cooking time (fits a SMALLINT).
pub const MAX_SMALL_VALUE: i32 = 32767;

#[derive(Deserialize, Clone, Debug, utoipa::ToSchema)]
pub struct IngredientAmount {
    /// Ingredient id.
    #[schema(example = 1123)]
    pub id: i32,
    #[schema(example = 10)]
    pub amount: i32,
}

/// Body of `POST /recipes` and `PATCH /recipes/{id}`.
///
/// Tags and ingredients are required on every write and replace the stored
/// sets wholesale. `image` may be omitted on update to keep the current one.
#[derive(Deserialize, Clone, Debug, utoipa::ToSchema)]
pub struct RecipeWriteRequest {
    pub ingredients: Vec<IngredientAmount>,
    #[schema(example = json!([1, 2]))]
    pub tags: Vec<i32>,
    /// Base64 data URI, e.g. `data:image/png;base64,...`.
    pub image: Option<String>,
    #[schema(example = "Borscht")]
    pub name: String,
    #[schema(example = "Boil the beets.")]
    pub text: String,
    /// Minutes.
    #[schema(example = 45)]
    pub cooking_time: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Shape checks on a recipe write. Referenced tags and ingredients are
/// checked against the database separately.
pub fn validate_recipe_write(req: &RecipeWriteRequest, mode: WriteMode) -> Result<(), AppError> {
    if mode == WriteMode::Create && req.image.as_deref().is_none_or(|s| s.trim().is_empty()) {
        return Err(AppError::Validation("Image is required".into()));
    }

    if req.tags.is_empty() {
        return Err(AppError::Validation("Select at least one tag".into()));
    }
    if let Some(id) = first_duplicate(req.tags.iter().copied()) {
        return Err(AppError::Validation(format!("Tag {id} is listed twice")));
    }

    if req.ingredients.is_empty() {
        return Err(AppError::Validation(
            "Add at least one ingredient".into(),
        ));
    }
    if let Some(line) = req
        .ingredients
        .iter()
        .find(|i| !(1..=MAX_SMALL_VALUE).contains(&i.amount))
    {
        return Err(AppError::Validation(format!(
            "Amount of ingredient {} must be between 1 and {MAX_SMALL_VALUE}",
            line.id
        )));
    }
    if let Some(id) = first_duplicate(req.ingredients.iter().map(|i| i.id)) {
        return Err(AppError::Validation(format!(
            "Ingredient {id} is listed twice"
        )));
    }

    validate_text_field(&req.name, "Name", 200)?;
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("Text must not be empty".into()));
    }
    if !(1..=MAX_SMALL_VALUE).contains(&req.cooking_time) {
        return Err(AppError::Validation(format!(
            "Cooking time must be between 1 and {MAX_SMALL_VALUE} minutes"
        )));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecipeListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 6)]
    pub limit: Option<u64>,
    /// Only recipes by this user id.
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches if it has any of them. Repeat the key for several.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `1` or `true` to show only the caller's favorites.
    pub is_favorited: Option<String>,
    /// `1` or `true` to show only recipes in the caller's shopping cart.
    pub is_in_shopping_cart: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, utoipa::ToSchema)]
pub struct RecipeIngredientResponse {
    /// Ingredient id.
    #[schema(example = 1123)]
    pub id: i32,
    #[schema(example = "Potato")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
    #[schema(example = 200)]
    pub amount: i32,
}

#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Public URL of the recipe image.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe view used by favorites, cart and subscriptions.
#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<recipe::Model> for ShortRecipeResponse {
    fn from(m: recipe::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            image: m.image,
            cooking_time: m.cooking_time,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeListResponse {
    pub data: Vec<RecipeResponse>,
    pub pagination: Pagination,
}
