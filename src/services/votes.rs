use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::key::Key;
use crate::models::resource::ResourceView;
use crate::models::vote::{apply_vote, VoteDirection};

use super::resources::get_resource;

/// Unconditional counter bump. Anyone can vote any number of times.
async fn bump_counter(pool: &PgPool, id: i32, column: &str) -> Result<(), ApiError> {
    // `column` is a fixed identifier chosen by the caller, never client input.
    let affected = sqlx::query(&format!(
        "UPDATE resource SET {column} = {column} + 1 WHERE id = $1"
    ))
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(())
}

/// Records a vote. In tracked mode an identified caller's repeat vote
/// retracts and an opposite vote flips; anonymous callers and untracked
/// deployments get the plain counter bump.
pub async fn vote(
    pool: &PgPool,
    id: i32,
    direction: VoteDirection,
    caller: Option<&Key>,
    tracked: bool,
) -> Result<ResourceView, ApiError> {
    match caller {
        Some(key) if tracked => tracked_vote(pool, id, direction, key).await?,
        _ => bump_counter(pool, id, direction.column()).await?,
    }
    get_resource(pool, id).await
}

async fn tracked_vote(
    pool: &PgPool,
    id: i32,
    direction: VoteDirection,
    key: &Key,
) -> Result<(), ApiError> {
    // Existence check up front so a vote on a missing resource is a 404, not
    // a foreign key violation.
    let exists: Option<i32> = sqlx::query_scalar("SELECT id FROM resource WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound);
    }

    let previous: Option<String> = sqlx::query_scalar(
        "SELECT current_direction FROM vote_information \
         WHERE voter_apikey = $1 AND resource_id = $2",
    )
    .bind(&key.apikey)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let previous = previous.as_deref().and_then(|raw| VoteDirection::parse(raw).ok());

    let outcome = apply_vote(previous, direction);

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE resource SET \
         upvotes = GREATEST(upvotes + $1, 0), \
         downvotes = GREATEST(downvotes + $2, 0) \
         WHERE id = $3",
    )
    .bind(outcome.upvote_delta)
    .bind(outcome.downvote_delta)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    match outcome.new_direction {
        Some(new_direction) => {
            sqlx::query(
                "INSERT INTO vote_information (voter_apikey, resource_id, current_direction) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (voter_apikey, resource_id) \
                 DO UPDATE SET current_direction = EXCLUDED.current_direction",
            )
            .bind(&key.apikey)
            .bind(id)
            .bind(new_direction.as_str())
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                "DELETE FROM vote_information WHERE voter_apikey = $1 AND resource_id = $2",
            )
            .bind(&key.apikey)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
    }
    tx.commit().await?;
    Ok(())
}

/// Click-through counter; always unconditional.
pub async fn click(pool: &PgPool, id: i32) -> Result<ResourceView, ApiError> {
    bump_counter(pool, id, "times_clicked").await?;
    get_resource(pool, id).await
}
