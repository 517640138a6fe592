use sqlx::PgPool;

use crate::api::pagination::{self, PageParams};
use crate::error::ApiError;
use crate::models::tag::{Category, Language};

pub async fn list_languages(
    pool: &PgPool,
    params: &PageParams,
) -> Result<(Vec<Language>, i64), ApiError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM language")
        .fetch_one(pool)
        .await?;
    let window = pagination::window(params, total).ok_or(ApiError::NotFound)?;

    let languages = sqlx::query_as::<_, Language>(
        "SELECT id, name FROM language ORDER BY id LIMIT $1 OFFSET $2",
    )
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(pool)
    .await?;
    Ok((languages, total))
}

pub async fn get_language(pool: &PgPool, id: i32) -> Result<Language, ApiError> {
    sqlx::query_as::<_, Language>("SELECT id, name FROM language WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn list_categories(
    pool: &PgPool,
    params: &PageParams,
) -> Result<(Vec<Category>, i64), ApiError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
        .fetch_one(pool)
        .await?;
    let window = pagination::window(params, total).ok_or(ApiError::NotFound)?;

    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name FROM category ORDER BY id LIMIT $1 OFFSET $2",
    )
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(pool)
    .await?;
    Ok((categories, total))
}

pub async fn get_category(pool: &PgPool, id: i32) -> Result<Category, ApiError> {
    sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound)
}
