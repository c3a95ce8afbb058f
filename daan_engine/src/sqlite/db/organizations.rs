use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrganization, Organization};

pub async fn insert_organization(
    org: NewOrganization,
    conn: &mut SqliteConnection,
) -> Result<Organization, sqlx::Error> {
    let org: Organization = sqlx::query_as("INSERT INTO organizations (name, org_type) VALUES ($1, $2) RETURNING *")
        .bind(org.name)
        .bind(org.org_type)
        .fetch_all(conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Organization #{} ({}) created", org.id, org.name);
    Ok(org)
}

pub async fn fetch_organization(id: i64, conn: &mut SqliteConnection) -> Result<Option<Organization>, sqlx::Error> {
    let org = sqlx::query_as("SELECT * FROM organizations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(org)
}

pub async fn set_organization_active(
    id: i64,
    active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Organization>, sqlx::Error> {
    let org = sqlx::query_as(
        "UPDATE organizations SET is_active = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(active)
    .bind(id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(org)
}
