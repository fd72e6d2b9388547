use std::collections::HashSet;

use serde::Serialize;

use crate::config::RecipesConfig;
use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 6)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 8)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Largest row offset Postgres accepts (`OFFSET` is a bigint).
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Resolve `page`/`limit` query values against the configured defaults.
/// Returns `(page, per_page)`; page is 1-based and capped so its offset fits.
pub fn resolve_page(page: Option<u64>, limit: Option<u64>, cfg: &RecipesConfig) -> (u64, u64) {
    let per_page = limit
        .unwrap_or(cfg.default_page_size)
        .clamp(1, cfg.max_page_size.max(1));
    let page = page.unwrap_or(1).clamp(1, MAX_OFFSET / per_page + 1);
    (page, per_page)
}

/// Row offset of a 1-based page, saturating at the largest offset Postgres accepts.
pub fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(MAX_OFFSET)
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Interpret a boolean query flag. `1` and `true` (any case) are on; anything else is off.
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(), Some("1" | "true"))
}

/// Parse `recipes_limit`. Absent, non-numeric or negative values fall back to `default`.
pub fn parse_recipes_limit(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Validate a trimmed string field of `1..=max` characters.
pub fn validate_text_field(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Return the first id that appears more than once.
pub fn first_duplicate(ids: impl IntoIterator<Item = i32>) -> Option<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}
