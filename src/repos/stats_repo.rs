use sqlx::PgPool;

use crate::models::Totals;
use crate::repos::error::RepoError;

pub async fn totals(db: &PgPool) -> Result<Totals, RepoError> {
    let row = sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM trips) AS trips,
            (SELECT COUNT(*) FROM trips WHERE is_public) AS public_trips,
            (SELECT COUNT(*) FROM stops) AS stops,
            (SELECT COUNT(*) FROM activities) AS activities,
            (SELECT AVG(total_budget) FROM trips) AS average_budget
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(row)
}
