use log::{debug, trace};
use sqlx::SqliteConnection;

use super::is_unique_violation;
use crate::{
    db_types::{CaptureDetails, Donation, GatewayOrderId, NewDonation},
    traits::{DonationStats, LedgerError, Pagination},
};

/// Inserts a new pending donation. A second donation for the same gateway order is rejected.
pub async fn insert_donation(donation: NewDonation, conn: &mut SqliteConnection) -> Result<Donation, LedgerError> {
    let order_id = donation.gateway_order_id.clone();
    let result: Result<Donation, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO donations (
                devotee_id,
                organization_id,
                event_id,
                amount,
                currency,
                gateway_order_id
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(donation.devotee_id)
    .bind(donation.organization_id)
    .bind(donation.event_id)
    .bind(donation.amount)
    .bind(donation.currency)
    .bind(donation.gateway_order_id)
    .fetch_all(conn)
    .await
    .and_then(|mut rows| rows.pop().ok_or(sqlx::Error::RowNotFound));
    match result {
        Ok(donation) => {
            debug!("🗃️ Donation #{} opened for gateway order {}", donation.id, donation.gateway_order_id);
            Ok(donation)
        },
        Err(e) if is_unique_violation(&e) => Err(LedgerError::DuplicateGatewayOrder(order_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_donation(id: i64, conn: &mut SqliteConnection) -> Result<Option<Donation>, sqlx::Error> {
    let donation = sqlx::query_as("SELECT * FROM donations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(donation)
}

pub async fn fetch_donation_by_gateway_order(
    order_id: &GatewayOrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Donation>, sqlx::Error> {
    let donation = sqlx::query_as("SELECT * FROM donations WHERE gateway_order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(donation)
}

/// Matches on both the gateway order and the owner, so that a leaked order id is useless to anyone else.
pub async fn fetch_donation_for_order(
    order_id: &GatewayOrderId,
    devotee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Donation>, sqlx::Error> {
    let donation = sqlx::query_as("SELECT * FROM donations WHERE gateway_order_id = $1 AND devotee_id = $2")
        .bind(order_id.as_str())
        .bind(devotee_id)
        .fetch_optional(conn)
        .await?;
    Ok(donation)
}

/// Moves the donation from `pending` to `captured` in a single conditional statement.
///
/// Returns `None` if the donation does not exist or is not pending, in which case nothing was changed.
pub async fn try_capture(
    id: i64,
    details: &CaptureDetails,
    conn: &mut SqliteConnection,
) -> Result<Option<Donation>, sqlx::Error> {
    let enrichment = &details.enrichment;
    let donation = sqlx::query_as(
        r#"
            UPDATE donations SET
                status = 'captured',
                gateway_payment_id = $1,
                gateway_signature = $2,
                payment_method = $3,
                utr = $4,
                bank_transaction_id = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $6 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(&details.payment_id)
    .bind(&details.signature)
    .bind(&enrichment.method)
    .bind(&enrichment.acquirer_reference)
    .bind(&enrichment.bank_transaction_id)
    .bind(id)
    .fetch_all(conn)
    .await?
    .pop();
    trace!("🗃️ Capture of donation #{id} changed a row: {}", donation.is_some());
    Ok(donation)
}

/// Moves the donation from `pending` to `failed`. Returns `None` if the donation was not pending.
pub async fn try_mark_failed(id: i64, conn: &mut SqliteConnection) -> Result<Option<Donation>, sqlx::Error> {
    let donation = sqlx::query_as(
        "UPDATE donations SET status = 'failed', updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND status = 'pending' \
         RETURNING *",
    )
    .bind(id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(donation)
}

/// Fetches a page of donations for the devotee, newest first.
pub async fn fetch_donations_for_devotee(
    devotee_id: i64,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Donation>, sqlx::Error> {
    let donations = sqlx::query_as(
        "SELECT * FROM donations WHERE devotee_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(devotee_id)
    .bind(i64::from(page.limit()))
    .bind(page.offset())
    .fetch_all(conn)
    .await?;
    Ok(donations)
}

pub async fn count_donations_for_devotee(devotee_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM donations WHERE devotee_id = $1").bind(devotee_id).fetch_one(conn).await?;
    Ok(count.0)
}

pub async fn donation_stats(devotee_id: i64, conn: &mut SqliteConnection) -> Result<DonationStats, sqlx::Error> {
    let stats = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'captured' THEN amount ELSE 0 END), 0) AS total_donated,
            COALESCE(SUM(CASE WHEN status = 'captured' THEN 1 ELSE 0 END), 0) AS captured_count,
            COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_count,
            COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) AS failed_count,
            COUNT(DISTINCT CASE WHEN status = 'captured' THEN organization_id END) AS organizations_supported
        FROM donations
        WHERE devotee_id = $1
        "#,
    )
    .bind(devotee_id)
    .fetch_one(conn)
    .await?;
    Ok(stats)
}
