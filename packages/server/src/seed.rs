use std::path::Path;

use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::AdminConfig;
use crate::entity::{ingredient, recipe, user};
use crate::utils::hash;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("password hash error: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    measurement_unit: String,
}

/// Load `[{"name": ..., "measurement_unit": ...}]` into the ingredient table.
/// Existing (name, unit) pairs are left alone.
pub async fn seed_ingredients<C: ConnectionTrait>(db: &C, path: &Path) -> Result<u32, SeedError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let entries: Vec<IngredientSeed> = serde_json::from_str(&raw)?;

    let mut inserted = 0u32;
    for entry in entries {
        let name = entry.name.trim();
        let unit = entry.measurement_unit.trim();
        if name.is_empty() || unit.is_empty() {
            continue;
        }
        let model = ingredient::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit: Set(unit.to_string()),
            ..Default::default()
        };

        let result = ingredient::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredient::Column::Name,
                    ingredient::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) if n > 0 => inserted += 1,
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeded {} new ingredients from {}", inserted, path.display());
    Ok(inserted)
}

/// Create the configured staff account, or promote it if the email already exists.
/// Does nothing unless email, username and password are all configured.
pub async fn bootstrap_admin<C: ConnectionTrait>(
    db: &C,
    cfg: &AdminConfig,
) -> Result<(), SeedError> {
    let (Some(email), Some(username), Some(password)) = (
        cfg.email.as_deref(),
        cfg.username.as_deref(),
        cfg.password.as_deref(),
    ) else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    match existing {
        Some(u) if u.is_staff => {}
        Some(u) => {
            let mut active: user::ActiveModel = u.into();
            active.is_staff = Set(true);
            active.update(db).await?;
            info!("Promoted {} to staff", email);
        }
        None => {
            let hashed = hash::hash_password_blocking(password.to_string())
                .await
                .map_err(SeedError::Hash)?;
            user::ActiveModel {
                email: Set(email.to_string()),
                username: Set(username.to_string()),
                first_name: Set("Admin".into()),
                last_name: Set("Admin".into()),
                password: Set(hashed),
                is_staff: Set(true),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!("Created staff account {}", email);
        }
    }
    Ok(())
}

/// Ensure required database indexes exist.
///
/// Schema sync doesn't create composite non-unique indexes, so they are
/// created here on startup.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    // Author pages and subscription previews:
    // SELECT ... FROM recipe WHERE author_id IN (...) ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_recipe_author_created")
        .table(recipe::Entity)
        .col(recipe::Column::AuthorId)
        .col(recipe::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_recipe_author_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_recipe_author_created: {}", e),
    }

    // Postgres has no ADD CONSTRAINT IF NOT EXISTS.
    let check = r#"
        DO $$
        BEGIN
            IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'ck_follow_not_self') THEN
                ALTER TABLE "follow" ADD CONSTRAINT ck_follow_not_self CHECK (user_id <> follower_id);
            END IF;
        END
        $$"#;
    match db.execute_unprepared(check).await {
        Ok(_) => info!("Ensured constraint ck_follow_not_self exists"),
        Err(e) => tracing::warn!("Failed to create constraint ck_follow_not_self: {}", e),
    }

    Ok(())
}
