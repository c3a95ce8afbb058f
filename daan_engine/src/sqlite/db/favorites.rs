use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::Favorite;

pub async fn fetch_favorites(devotee_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Favorite>, sqlx::Error> {
    let favorites = sqlx::query_as("SELECT * FROM favorites WHERE devotee_id = $1 ORDER BY position")
        .bind(devotee_id)
        .fetch_all(conn)
        .await?;
    Ok(favorites)
}

pub async fn is_favorite(devotee_id: i64, org_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM favorites WHERE devotee_id = $1 AND organization_id = $2")
        .bind(devotee_id)
        .bind(org_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

/// Appends a favorite in the next position, provided the devotee has fewer than `cap` favorites.
///
/// The count check and the insert are one statement. Returns `None` when the cap has been reached. A duplicate
/// favorite fails with a unique constraint violation.
pub async fn insert_favorite(
    devotee_id: i64,
    org_id: i64,
    cap: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Favorite>, sqlx::Error> {
    let favorite = sqlx::query_as(
        r#"
            INSERT INTO favorites (devotee_id, organization_id, position)
            SELECT $1, $2, (SELECT COALESCE(MAX(position), 0) + 1 FROM favorites WHERE devotee_id = $1)
            WHERE (SELECT COUNT(*) FROM favorites WHERE devotee_id = $1) < $3
            RETURNING *;
        "#,
    )
    .bind(devotee_id)
    .bind(org_id)
    .bind(cap)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(favorite)
}

/// Deletes the favorite, returning the position it occupied.
pub async fn delete_favorite(
    devotee_id: i64,
    org_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, sqlx::Error> {
    let position: Option<(i64,)> =
        sqlx::query_as("DELETE FROM favorites WHERE devotee_id = $1 AND organization_id = $2 RETURNING position")
            .bind(devotee_id)
            .bind(org_id)
            .fetch_all(conn)
            .await?
            .pop();
    Ok(position.map(|p| p.0))
}

/// Shifts every favorite after `position` up by one, so positions stay contiguous.
pub async fn close_gap(devotee_id: i64, position: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE favorites SET position = position - 1 WHERE devotee_id = $1 AND position > $2")
        .bind(devotee_id)
        .bind(position)
        .execute(conn)
        .await?;
    trace!("🗃️ {} favorites moved up for devotee {devotee_id}", result.rows_affected());
    Ok(result.rows_affected())
}
