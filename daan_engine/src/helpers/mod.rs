/// The gateway rejects receipts longer than this.
pub const MAX_RECEIPT_LEN: usize = 40;

/// Builds a unique merchant receipt for a donation order, e.g. `dn_12_7_3fa9c01d`.
pub fn donation_receipt(devotee_id: i64, org_id: i64) -> String {
    let mut receipt = format!("dn_{devotee_id}_{org_id}_{:08x}", rand::random::<u32>());
    receipt.truncate(MAX_RECEIPT_LEN);
    receipt
}

/// Expresses `raised` as a percentage of `target` with two decimals, e.g. "37.50". Over-funded events exceed 100.
pub fn percent_funded(raised: i64, target: i64) -> Option<String> {
    if target <= 0 {
        return None;
    }
    let basis_points = i128::from(raised.max(0)) * 10_000 / i128::from(target);
    Some(format!("{}.{:02}", basis_points / 100, basis_points % 100))
}
