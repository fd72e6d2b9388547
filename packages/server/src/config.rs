use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl_hours: i64,
}

/// Optional staff account created on startup when all three fields are set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory recipe images are written to.
    pub root: PathBuf,
    /// URL prefix the directory is served under.
    pub url_prefix: String,
    /// Maximum decoded image size in bytes.
    pub max_image_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./media"),
            url_prefix: "/media".into(),
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecipesConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Recipes shown per followed author when `recipes_limit` is absent or malformed.
    pub subscription_recipes_limit: u64,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            default_page_size: 6,
            max_page_size: 100,
            subscription_recipes_limit: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// JSON file with `[{"name": ..., "measurement_unit": ...}]` loaded on startup.
    pub ingredients_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub recipes: RecipesConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("media.root", "./media")?
            .set_default("media.url_prefix", "/media")?
            .set_default("media.max_image_bytes", 5 * 1024 * 1024)?
            .set_default("recipes.default_page_size", 6)?
            .set_default("recipes.max_page_size", 100)?
            .set_default("recipes.subscription_recipes_limit", 3)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RECIPEBOOK__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("RECIPEBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
