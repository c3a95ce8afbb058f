use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Event, MinorUnits, NewEvent};

pub async fn insert_event(event: NewEvent, conn: &mut SqliteConnection) -> Result<Event, sqlx::Error> {
    let event: Event = sqlx::query_as(
        r#"
            INSERT INTO events (
                organization_id,
                event_type,
                title,
                description,
                start_date,
                end_date,
                target_amount
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(event.organization_id)
    .bind(event.event_type)
    .bind(event.title)
    .bind(event.description)
    .bind(event.start_date)
    .bind(event.end_date)
    .bind(event.target_amount)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Event #{} created for organization {}", event.id, event.organization_id);
    Ok(event)
}

pub async fn fetch_event(id: i64, conn: &mut SqliteConnection) -> Result<Option<Event>, sqlx::Error> {
    let event = sqlx::query_as("SELECT * FROM events WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(event)
}

pub async fn fetch_events_for_organization(
    org_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Event>, sqlx::Error> {
    let events = sqlx::query_as("SELECT * FROM events WHERE organization_id = $1 ORDER BY start_date, id")
        .bind(org_id)
        .fetch_all(conn)
        .await?;
    Ok(events)
}

pub async fn set_event_active(id: i64, active: bool, conn: &mut SqliteConnection) -> Result<Option<Event>, sqlx::Error> {
    let event = sqlx::query_as(
        "UPDATE events SET is_active = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(active)
    .bind(id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(event)
}

/// Atomically increments the raised total of an active event.
///
/// The increment happens inside the UPDATE statement itself, so concurrent callers serialise on the row and no update
/// is lost. Returns `None` if the event does not exist or is inactive.
pub async fn add_raised(
    event_id: i64,
    amount: MinorUnits,
    conn: &mut SqliteConnection,
) -> Result<Option<Event>, sqlx::Error> {
    let event = sqlx::query_as(
        r#"
            UPDATE events SET
                raised_amount = raised_amount + $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND is_active = 1
            RETURNING *;
        "#,
    )
    .bind(amount)
    .bind(event_id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(event)
}
