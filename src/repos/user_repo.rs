use sqlx::PgPool;

use crate::models::{Pagination, User};
use crate::repos::error::RepoError;

pub async fn list(db: &PgPool, page: Pagination) -> Result<(Vec<User>, i64), RepoError> {
    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, role, created_at
        FROM users
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(i64::from(page.limit))
    .bind(page.offset())
    .fetch_all(db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}
