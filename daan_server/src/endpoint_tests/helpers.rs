use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{Duration, TimeZone, Utc};
use daan_engine::{
    db_types::{Donation, DonationStatus, GatewayOrderId, MinorUnits, Organization, OrganizationType},
    events::EventProducers,
    settlement_objects::SettlementConfig,
    SettlementApi,
};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
};
use log::debug;

use super::mocks::{MockDb, MockGateway};
use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::AuthConfig,
    data_objects::CheckoutKey,
    server::{json_config, path_config, query_config},
};

// DO NOT re-use this secret anywhere.
const TEST_JWT_SECRET: &str = "endpoint-tests-only-0123456789abcdef";
pub const TEST_KEY_ID: &str = "rzp_test_endpoint";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_JWT_SECRET).expect("Test secret is long enough")
}

pub fn issue_token(devotee_id: i64, valid_for: Duration) -> String {
    let key = Hs256Key::new(TEST_JWT_SECRET.as_bytes());
    let claims = Claims::new(JwtClaims { devotee_id }).set_duration(&TimeOptions::default(), valid_for);
    Hs256.token(&Header::empty().with_token_type("JWT"), &claims, &key).expect("Failed to sign token")
}

pub fn valid_token(devotee_id: i64) -> String {
    issue_token(devotee_id, Duration::days(1))
}

pub fn settlement_api(db: MockDb, gateway: MockGateway) -> web::Data<SettlementApi<MockDb, MockGateway>> {
    web::Data::new(SettlementApi::new(db, gateway, SettlementConfig::default(), EventProducers::default()))
}

pub fn checkout_key() -> web::Data<CheckoutKey> {
    web::Data::new(CheckoutKey(TEST_KEY_ID.to_string()))
}

/// Sends `req` to an app built by `configure`, authenticating with `token` if it is not empty.
pub async fn send_request<F>(req: TestRequest, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = if token.is_empty() { req } else { req.insert_header(("Authorization", format!("Bearer {token}"))) };
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    // Middleware rejections surface as service errors rather than responses
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default();
    (status, body)
}

pub fn body_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response was not JSON ({e}): {body}"))
}

pub fn temple(id: i64) -> Organization {
    Organization {
        id,
        name: "Sri Venkateswara Temple".to_string(),
        org_type: OrganizationType::Temple,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}

pub fn donation(id: i64, devotee_id: i64, status: DonationStatus) -> Donation {
    let captured = matches!(status, DonationStatus::Captured);
    Donation {
        id,
        devotee_id,
        organization_id: 1,
        event_id: None,
        amount: MinorUnits::from(50_000),
        currency: "INR".to_string(),
        gateway_order_id: GatewayOrderId::from("order_abc"),
        gateway_payment_id: captured.then(|| "pay_xyz".to_string()),
        gateway_signature: captured.then(|| "f00d".to_string()),
        utr: captured.then(|| "UTR123".to_string()),
        bank_transaction_id: None,
        payment_method: captured.then(|| "upi".to_string()),
        status,
        created_at: Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 2, 10, 5, 0).unwrap(),
    }
}
