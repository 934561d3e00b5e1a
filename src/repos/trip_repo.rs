/*
 * Responsibility
 * - trips CRUD and listings
 * - stops_count is computed per row, not stored
 * - deleting a trip cascades to stops and activities (FK ON DELETE CASCADE)
 */
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewTrip, Pagination, Trip, TripPatch};
use crate::repos::error::RepoError;

// Expects the trips row aliased as `t`.
const TRIP_COLUMNS: &str = r#"
    t.id, t.user_id, t.name, t.description, t.start_date, t.end_date,
    t.is_public, t.cover_image, t.total_budget, t.currency, t.share_token,
    t.view_count,
    (SELECT COUNT(*) FROM stops s WHERE s.trip_id = t.id) AS stops_count,
    t.created_at, t.updated_at
"#;

pub async fn create(db: &PgPool, new: &NewTrip) -> Result<Trip, RepoError> {
    let sql = format!(
        r#"
        WITH t AS (
            INSERT INTO trips (
                user_id, name, description, start_date, end_date,
                is_public, cover_image, total_budget, currency, share_token
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
        )
        SELECT {TRIP_COLUMNS} FROM t
        "#
    );
    let row = sqlx::query_as::<_, Trip>(&sql)
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.is_public)
        .bind(new.cover_image.as_deref())
        .bind(new.total_budget)
        .bind(&new.currency)
        .bind(new.share_token.as_deref())
        .fetch_one(db)
        .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, trip_id: Uuid) -> Result<Option<Trip>, RepoError> {
    let sql = format!("SELECT {TRIP_COLUMNS} FROM trips t WHERE t.id = $1");
    let row = sqlx::query_as::<_, Trip>(&sql)
        .bind(trip_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Only public trips are reachable by share token.
pub async fn get_by_share_token(db: &PgPool, token: &str) -> Result<Option<Trip>, RepoError> {
    let sql = format!(
        "SELECT {TRIP_COLUMNS} FROM trips t WHERE t.share_token = $1 AND t.is_public"
    );
    let row = sqlx::query_as::<_, Trip>(&sql)
        .bind(token)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    trip_id: Uuid,
    patch: &TripPatch,
) -> Result<Option<Trip>, RepoError> {
    // Tri-state columns:
    // - flag false  -> keep
    // - flag true   -> set value (possibly NULL)
    let sql = format!(
        r#"
        WITH t AS (
            UPDATE trips
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                is_public = COALESCE($6, is_public),
                cover_image = CASE WHEN $7 = false THEN cover_image ELSE $8 END,
                total_budget = COALESCE($9, total_budget),
                currency = COALESCE($10, currency),
                share_token = CASE WHEN $11 = false THEN share_token ELSE $12 END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
        )
        SELECT {TRIP_COLUMNS} FROM t
        "#
    );
    let row = sqlx::query_as::<_, Trip>(&sql)
        .bind(trip_id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.is_public)
        .bind(patch.cover_image.is_some())
        .bind(patch.cover_image.clone().flatten())
        .bind(patch.total_budget)
        .bind(patch.currency.as_deref())
        .bind(patch.share_token.is_some())
        .bind(patch.share_token.clone().flatten())
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, trip_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM trips
        WHERE id = $1
        "#,
    )
    .bind(trip_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    page: Pagination,
) -> Result<(Vec<Trip>, i64), RepoError> {
    let sql = format!(
        r#"
        SELECT {TRIP_COLUMNS}
        FROM trips t
        WHERE t.user_id = $1
        ORDER BY t.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, Trip>(&sql)
        .bind(user_id)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}

pub async fn list_public(db: &PgPool, page: Pagination) -> Result<(Vec<Trip>, i64), RepoError> {
    let sql = format!(
        r#"
        SELECT {TRIP_COLUMNS}
        FROM trips t
        WHERE t.is_public
        ORDER BY t.created_at DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Trip>(&sql)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE is_public")
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}

pub async fn increment_view_count(db: &PgPool, trip_id: Uuid) -> Result<(), RepoError> {
    sqlx::query("UPDATE trips SET view_count = view_count + 1 WHERE id = $1")
        .bind(trip_id)
        .execute(db)
        .await?;

    Ok(())
}

/// Every trip regardless of visibility, for the admin listing.
pub async fn list_all(db: &PgPool, page: Pagination) -> Result<(Vec<Trip>, i64), RepoError> {
    let sql = format!(
        r#"
        SELECT {TRIP_COLUMNS}
        FROM trips t
        ORDER BY t.created_at DESC
        LIMIT $1 OFFSET $2
        "#
    );
    let rows = sqlx::query_as::<_, Trip>(&sql)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}
