/*
 * Responsibility
 * - stops CRUD, ordered by position within a trip
 * - activities_count is computed per row
 */
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewStop, Stop, StopPatch};
use crate::repos::error::RepoError;

// Expects the stops row aliased as `s`.
const STOP_COLUMNS: &str = r#"
    s.id, s.trip_id, s.city, s.country, s.lat, s.lng,
    s.arrival_date, s.departure_date, s.position, s.notes,
    (SELECT COUNT(*) FROM activities a WHERE a.stop_id = s.id) AS activities_count,
    s.created_at, s.updated_at
"#;

pub async fn create(db: &PgPool, new: &NewStop) -> Result<Stop, RepoError> {
    let sql = format!(
        r#"
        WITH s AS (
            INSERT INTO stops (
                trip_id, city, country, lat, lng,
                arrival_date, departure_date, position, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        )
        SELECT {STOP_COLUMNS} FROM s
        "#
    );
    let row = sqlx::query_as::<_, Stop>(&sql)
        .bind(new.trip_id)
        .bind(&new.city)
        .bind(&new.country)
        .bind(new.lat)
        .bind(new.lng)
        .bind(new.arrival_date)
        .bind(new.departure_date)
        .bind(new.position)
        .bind(&new.notes)
        .fetch_one(db)
        .await?;

    Ok(row)
}

pub async fn get(db: &PgPool, stop_id: Uuid) -> Result<Option<Stop>, RepoError> {
    let sql = format!("SELECT {STOP_COLUMNS} FROM stops s WHERE s.id = $1");
    let row = sqlx::query_as::<_, Stop>(&sql)
        .bind(stop_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    stop_id: Uuid,
    patch: &StopPatch,
) -> Result<Option<Stop>, RepoError> {
    let sql = format!(
        r#"
        WITH s AS (
            UPDATE stops
            SET
                city = COALESCE($2, city),
                country = COALESCE($3, country),
                lat = COALESCE($4, lat),
                lng = COALESCE($5, lng),
                arrival_date = COALESCE($6, arrival_date),
                departure_date = COALESCE($7, departure_date),
                position = COALESCE($8, position),
                notes = COALESCE($9, notes),
                updated_at = now()
            WHERE id = $1
            RETURNING *
        )
        SELECT {STOP_COLUMNS} FROM s
        "#
    );
    let row = sqlx::query_as::<_, Stop>(&sql)
        .bind(stop_id)
        .bind(patch.city.as_deref())
        .bind(patch.country.as_deref())
        .bind(patch.lat)
        .bind(patch.lng)
        .bind(patch.arrival_date)
        .bind(patch.departure_date)
        .bind(patch.position)
        .bind(patch.notes.as_deref())
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, stop_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM stops WHERE id = $1")
        .bind(stop_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_by_trip(db: &PgPool, trip_id: Uuid) -> Result<Vec<Stop>, RepoError> {
    let sql = format!(
        r#"
        SELECT {STOP_COLUMNS}
        FROM stops s
        WHERE s.trip_id = $1
        ORDER BY s.position, s.arrival_date
        "#
    );
    let rows = sqlx::query_as::<_, Stop>(&sql)
        .bind(trip_id)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

/// Stops of public trips within `max_distance_m` of a point, nearest first.
/// Great-circle distance on a 6371 km sphere; LEAST guards acos against
/// rounding just above 1.
pub async fn nearby_public(
    db: &PgPool,
    lat: f64,
    lng: f64,
    max_distance_m: f64,
) -> Result<Vec<Stop>, RepoError> {
    let sql = format!(
        r#"
        SELECT {STOP_COLUMNS}
        FROM (
            SELECT s.*,
                6371000.0 * acos(LEAST(1.0,
                    cos(radians($1)) * cos(radians(s.lat)) * cos(radians(s.lng) - radians($2))
                    + sin(radians($1)) * sin(radians(s.lat))
                )) AS distance_m
            FROM stops s
            JOIN trips t ON t.id = s.trip_id
            WHERE t.is_public
        ) s
        WHERE s.distance_m <= $3
        ORDER BY s.distance_m
        LIMIT {NEARBY_LIMIT}
        "#
    );
    let rows = sqlx::query_as::<_, Stop>(&sql)
        .bind(lat)
        .bind(lng)
        .bind(max_distance_m)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub const NEARBY_LIMIT: usize = 100;
