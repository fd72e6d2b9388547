use serde::{Deserialize, Serialize};

use super::recipe::ShortRecipeResponse;
use super::shared::Pagination;
use crate::entity::user;

/// Public profile of a user as seen by the caller.
#[derive(Serialize, Clone, Debug, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = "vpupkin@yandex.ru")]
    pub email: String,
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "vasya.pupkin")]
    pub username: String,
    #[schema(example = "Vasya")]
    pub first_name: String,
    #[schema(example = "Pupkin")]
    pub last_name: String,
    /// Whether the caller follows this user. Always false for anonymous callers.
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: user::Model, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Registration response; carries no caller-relative fields.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page.
    #[param(example = 6)]
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}

/// A followed author with a preview of their recipes.
#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Newest recipes first, truncated to `recipes_limit`.
    pub recipes: Vec<ShortRecipeResponse>,
    /// Total number of recipes by this author.
    #[schema(example = 12)]
    pub recipes_count: u64,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubscriptionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 6)]
    pub limit: Option<u64>,
    /// Recipes shown per author; malformed values fall back to the server default.
    #[param(value_type = Option<u64>, example = 3)]
    pub recipes_limit: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct RecipesLimitQuery {
    #[param(value_type = Option<u64>, example = 3)]
    pub recipes_limit: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriptionListResponse {
    pub data: Vec<SubscriptionResponse>,
    pub pagination: Pagination,
}
