use daan_engine::{
    db_types::{
        CaptureDetails,
        Donation,
        Event,
        Favorite,
        GatewayOrderId,
        MinorUnits,
        NewDonation,
        NewEvent,
        NewOrganization,
        Organization,
        PaymentEnrichment,
    },
    traits::{
        CaptureResult,
        DirectoryError,
        DirectoryManagement,
        DonationDatabase,
        DonationLedger,
        DonationPage,
        DonationStats,
        EventFunding,
        FundingOutcome,
        GatewayError,
        GatewayOrder,
        LedgerError,
        Pagination,
        PaymentGateway,
    },
};
use mockall::mock;

mock! {
    pub Db {}
    impl Clone for Db {
        fn clone(&self) -> Self;
    }
    impl DonationLedger for Db {
        async fn open_donation(&self, donation: NewDonation) -> Result<Donation, LedgerError>;
        async fn fetch_donation(&self, id: i64) -> Result<Option<Donation>, LedgerError>;
        async fn fetch_donation_for_order(&self, order_id: &GatewayOrderId, devotee_id: i64) -> Result<Option<Donation>, LedgerError>;
        async fn fetch_donation_by_gateway_order(&self, order_id: &GatewayOrderId) -> Result<Option<Donation>, LedgerError>;
        async fn capture_donation(&self, id: i64, details: CaptureDetails) -> Result<CaptureResult, LedgerError>;
        async fn mark_donation_failed(&self, id: i64) -> Result<(Donation, bool), LedgerError>;
        async fn fetch_donations_for_devotee(&self, devotee_id: i64, page: Pagination) -> Result<DonationPage, LedgerError>;
        async fn fetch_donation_stats(&self, devotee_id: i64) -> Result<DonationStats, LedgerError>;
    }
    impl EventFunding for Db {
        async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, DirectoryError>;
        async fn add_raised(&self, event_id: i64, amount: MinorUnits) -> Result<FundingOutcome, DirectoryError>;
    }
    impl DirectoryManagement for Db {
        async fn insert_organization(&self, org: NewOrganization) -> Result<Organization, DirectoryError>;
        async fn fetch_organization(&self, id: i64) -> Result<Option<Organization>, DirectoryError>;
        async fn set_organization_active(&self, id: i64, active: bool) -> Result<Organization, DirectoryError>;
        async fn insert_event(&self, event: NewEvent) -> Result<Event, DirectoryError>;
        async fn set_event_active(&self, id: i64, active: bool) -> Result<Event, DirectoryError>;
        async fn fetch_events_for_organization(&self, org_id: i64) -> Result<Vec<Event>, DirectoryError>;
        async fn is_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError>;
        async fn fetch_favorites(&self, devotee_id: i64) -> Result<Vec<Favorite>, DirectoryError>;
        async fn add_favorite(&self, devotee_id: i64, org_id: i64) -> Result<Favorite, DirectoryError>;
        async fn remove_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError>;
    }
    impl DonationDatabase for Db {
        fn url(&self) -> &str;
        async fn close(&mut self) -> Result<(), LedgerError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_order(&self, amount: MinorUnits, currency: &str, receipt: &str) -> Result<GatewayOrder, GatewayError>;
        fn verify_signature(&self, order_id: &GatewayOrderId, payment_id: &str, signature: &str) -> Result<bool, GatewayError>;
        async fn fetch_payment_details(&self, payment_id: &str) -> Result<PaymentEnrichment, GatewayError>;
    }
}
