use serde::{Deserialize, Serialize};

use super::shared::validate_text_field;
use crate::entity::{ingredient, tag};
use crate::error::AppError;
use crate::utils::color::is_hex_color;

#[derive(Serialize, Clone, Debug, PartialEq, utoipa::ToSchema)]
pub struct TagResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Breakfast")]
    pub name: String,
    #[schema(example = "#E26C2D")]
    pub color: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<tag::Model> for TagResponse {
    fn from(m: tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            color: m.color,
            slug: m.slug,
        }
    }
}

/// Request body for creating a tag. A color is generated when omitted.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "Breakfast")]
    pub name: String,
    #[schema(example = "#E26C2D")]
    pub color: Option<String>,
    #[schema(example = "breakfast")]
    pub slug: String,
}

pub fn validate_create_tag(req: &CreateTagRequest) -> Result<(), AppError> {
    validate_text_field(&req.name, "Name", 200)?;
    validate_text_field(&req.slug, "Slug", 200)?;
    if !req
        .slug
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "Slug may contain only latin letters, digits, hyphens and underscores".into(),
        ));
    }
    if let Some(ref color) = req.color
        && !is_hex_color(color.trim())
    {
        return Err(AppError::Validation(
            "Color must be a hex value like #49B64E".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, Clone, Debug, PartialEq, utoipa::ToSchema)]
pub struct IngredientResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Cabbage")]
    pub name: String,
    #[schema(example = "kg")]
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(m: ingredient::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            measurement_unit: m.measurement_unit,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateIngredientRequest {
    #[schema(example = "Cabbage")]
    pub name: String,
    #[schema(example = "kg")]
    pub measurement_unit: String,
}

pub fn validate_create_ingredient(req: &CreateIngredientRequest) -> Result<(), AppError> {
    validate_text_field(&req.name, "Name", 200)?;
    validate_text_field(&req.measurement_unit, "Measurement unit", 200)
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix.
    #[param(example = "cab")]
    pub name: Option<String>,
}
