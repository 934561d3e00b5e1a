/*
 * Responsibility
 * - activities CRUD, ordered by day then start time within a stop
 */
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Activity, ActivityPatch, NewActivity};
use crate::repos::error::RepoError;

const ACTIVITY_COLUMNS: &str = r#"
    id, stop_id, title, description, cost, currency, day_offset,
    start_time, end_time, category, notes, booking_url, created_at, updated_at
"#;

pub async fn create(db: &PgPool, new: &NewActivity) -> Result<Activity, RepoError> {
    let sql = format!(
        r#"
        INSERT INTO activities (
            stop_id, title, description, cost, currency, day_offset,
            start_time, end_time, category, notes, booking_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {ACTIVITY_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Activity>(&sql)
        .bind(new.stop_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.cost)
        .bind(&new.currency)
        .bind(new.day_offset)
        .bind(new.start_time.as_deref())
        .bind(new.end_time.as_deref())
        .bind(&new.category)
        .bind(&new.notes)
        .bind(new.booking_url.as_deref())
        .fetch_one(db)
        .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, activity_id: Uuid) -> Result<Option<Activity>, RepoError> {
    let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1");
    let row = sqlx::query_as::<_, Activity>(&sql)
        .bind(activity_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    activity_id: Uuid,
    patch: &ActivityPatch,
) -> Result<Option<Activity>, RepoError> {
    let sql = format!(
        r#"
        UPDATE activities
        SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            cost = COALESCE($4, cost),
            currency = COALESCE($5, currency),
            day_offset = COALESCE($6, day_offset),
            start_time = CASE WHEN $7 = false THEN start_time ELSE $8 END,
            end_time = CASE WHEN $9 = false THEN end_time ELSE $10 END,
            category = COALESCE($11, category),
            notes = COALESCE($12, notes),
            booking_url = CASE WHEN $13 = false THEN booking_url ELSE $14 END,
            updated_at = now()
        WHERE id = $1
        RETURNING {ACTIVITY_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Activity>(&sql)
        .bind(activity_id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.cost)
        .bind(patch.currency.as_deref())
        .bind(patch.day_offset)
        .bind(patch.start_time.is_some())
        .bind(patch.start_time.clone().flatten())
        .bind(patch.end_time.is_some())
        .bind(patch.end_time.clone().flatten())
        .bind(patch.category.as_deref())
        .bind(patch.notes.as_deref())
        .bind(patch.booking_url.is_some())
        .bind(patch.booking_url.clone().flatten())
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, activity_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1")
        .bind(activity_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_by_stop(db: &PgPool, stop_id: Uuid) -> Result<Vec<Activity>, RepoError> {
    let sql = format!(
        r#"
        SELECT {ACTIVITY_COLUMNS}
        FROM activities
        WHERE stop_id = $1
        ORDER BY day_offset, start_time NULLS LAST, created_at
        "#
    );
    let rows = sqlx::query_as::<_, Activity>(&sql)
        .bind(stop_id)
        .fetch_all(db)
        .await?;

    Ok(rows)
}
