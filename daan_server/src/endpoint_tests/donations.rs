use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};
use chrono::Duration;
use daan_engine::{
    db_types::{DonationStatus, GatewayOrderId, MinorUnits, PaymentEnrichment},
    traits::{CaptureResult, DonationPage, DonationStats, FundingOutcome, GatewayOrder},
};
use serde_json::json;

use super::{
    helpers::{body_json, checkout_key, donation, issue_token, send_request, settlement_api, temple, valid_token},
    mocks::{MockDb, MockGateway},
};
use crate::routes::{CreateDonationOrderRoute, MyDonationStatsRoute, MyDonationsRoute, VerifyDonationPaymentRoute};

fn configure(db: MockDb, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateDonationOrderRoute::<MockDb, MockGateway>::new())
            .service(VerifyDonationPaymentRoute::<MockDb, MockGateway>::new())
            .service(MyDonationStatsRoute::<MockDb, MockGateway>::new())
            .service(MyDonationsRoute::<MockDb, MockGateway>::new())
            .app_data(settlement_api(db, gateway))
            .app_data(checkout_key());
    }
}

fn order_request(amount: serde_json::Value) -> TestRequest {
    TestRequest::post().uri("/donations/order").set_json(json!({ "organization_id": 1, "amount": amount }))
}

fn verify_request(signature: &str) -> TestRequest {
    TestRequest::post().uri("/donations/verify").set_json(json!({
        "razorpay_order_id": "order_abc",
        "razorpay_payment_id": "pay_xyz",
        "razorpay_signature": signature,
    }))
}

#[actix_web::test]
async fn create_order_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(order_request(json!("500")), "", configure(MockDb::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(&body)["kind"], "AuthenticationError");
}

#[actix_web::test]
async fn create_order_with_an_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Duration::hours(-1));
    let (status, body) =
        send_request(order_request(json!("500")), &token, configure(MockDb::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(&body)["error"], "Authentication Error. Access token has expired.");
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_is_favorite().withf(|devotee, org| *devotee == 7 && *org == 1).returning(|_, _| Ok(true));
    db.expect_fetch_organization().returning(|id| Ok(Some(temple(id))));
    db.expect_open_donation().times(1).returning(|d| {
        assert_eq!(d.devotee_id, 7);
        assert_eq!(d.amount, MinorUnits::from(25_050));
        Ok(donation(3, 7, DonationStatus::Pending))
    });
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().times(1).returning(|amount, currency, receipt| {
        assert_eq!(currency, "INR");
        assert!(receipt.starts_with("dn_7_1_"));
        Ok(GatewayOrder { order_id: GatewayOrderId::from("order_abc"), amount, currency: currency.to_string() })
    });
    let token = valid_token(7);
    let (status, body) = send_request(order_request(json!("250.50")), &token, configure(db, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["donation_id"], 3);
    assert_eq!(body["order_id"], "order_abc");
    assert_eq!(body["amount"], "250.50");
    assert_eq!(body["amount_minor"], 25_050);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key_id"], "rzp_test_endpoint");
}

#[actix_web::test]
async fn create_order_for_an_organization_that_is_not_a_favorite() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_is_favorite().returning(|_, _| Ok(false));
    db.expect_open_donation().never();
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    let (status, body) = send_request(order_request(json!(500)), &valid_token(7), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(&body);
    assert_eq!(body["kind"], "PolicyError");
    assert_eq!(body["error"], "not favorited");
}

#[actix_web::test]
async fn create_order_with_an_invalid_amount() {
    let _ = env_logger::try_init().ok();
    for amount in [json!("0.50"), json!("abc"), json!("1000000.01"), json!(-5)] {
        let (status, body) =
            send_request(order_request(amount), &valid_token(7), configure(MockDb::new(), MockGateway::new())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&body)["kind"], "ValidationError");
    }
}

#[actix_web::test]
async fn create_order_when_the_gateway_is_down() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_is_favorite().returning(|_, _| Ok(true));
    db.expect_fetch_organization().returning(|id| Ok(Some(temple(id))));
    db.expect_open_donation().never();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_order()
        .returning(|_, _, _| Err(daan_engine::traits::GatewayError::Remote("connection refused".into())));
    let (status, body) = send_request(order_request(json!("500")), &valid_token(7), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(&body)["kind"], "GatewayError");
}

#[actix_web::test]
async fn verify_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_for_order()
        .withf(|order, devotee| order.as_str() == "order_abc" && *devotee == 7)
        .returning(|_, devotee| Ok(Some(donation(3, devotee, DonationStatus::Pending))));
    db.expect_capture_donation().times(1).returning(|id, details| {
        assert_eq!(details.payment_id, "pay_xyz");
        assert_eq!(details.enrichment.acquirer_reference.as_deref(), Some("UTR123"));
        Ok(CaptureResult {
            donation: donation(id, 7, DonationStatus::Captured),
            newly_captured: true,
            funding: FundingOutcome::NotApplicable,
        })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().returning(|_, _, sig| Ok(sig == "f00d"));
    gateway.expect_fetch_payment_details().returning(|_| {
        Ok(PaymentEnrichment {
            method: Some("upi".into()),
            acquirer_reference: Some("UTR123".into()),
            bank_transaction_id: None,
        })
    });
    let (status, body) = send_request(verify_request("f00d"), &valid_token(7), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["status"], "captured");
    assert_eq!(body["utr"], "UTR123");
    assert_eq!(body["amount"], "500.00");
    assert!(body.get("gateway_signature").is_none());
}

#[actix_web::test]
async fn verify_payment_that_is_already_captured() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_for_order().returning(|_, devotee| Ok(Some(donation(3, devotee, DonationStatus::Captured))));
    db.expect_capture_donation().never();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().never();
    let (status, body) = send_request(verify_request("f00d"), &valid_token(7), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["status"], "captured");
}

#[actix_web::test]
async fn verify_payment_with_a_bad_signature() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_for_order().returning(|_, devotee| Ok(Some(donation(3, devotee, DonationStatus::Pending))));
    db.expect_mark_donation_failed().times(1).returning(|id| Ok((donation(id, 7, DonationStatus::Failed), true)));
    db.expect_capture_donation().never();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().returning(|_, _, _| Ok(false));
    let (status, body) = send_request(verify_request("deadbeef"), &valid_token(7), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(&body)["error"], "signature mismatch");
}

#[actix_web::test]
async fn verify_payment_for_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_for_order().returning(|_, _| Ok(None));
    let (status, body) = send_request(verify_request("f00d"), &valid_token(8), configure(db, MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body_json(&body)["kind"], "NotFoundError");
}

#[actix_web::test]
async fn verify_payment_with_a_missing_field() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/donations/verify").set_json(json!({ "razorpay_order_id": "order_abc" }));
    let (status, body) = send_request(req, &valid_token(7), configure(MockDb::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&body)["kind"], "ValidationError");
}

#[actix_web::test]
async fn list_my_donations() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donations_for_devotee()
        .withf(|devotee, page| *devotee == 7 && page.page() == 2 && page.limit() == 1)
        .returning(|devotee, _| {
            Ok(DonationPage {
                donations: vec![donation(2, devotee, DonationStatus::Failed)],
                page: 2,
                limit: 1,
                total: 3,
            })
        });
    let req = TestRequest::get().uri("/donations?page=2&limit=1");
    let (status, body) = send_request(req, &valid_token(7), configure(db, MockGateway::new())).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["total"], 3);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["donations"][0]["status"], "failed");
}

#[actix_web::test]
async fn list_my_donations_with_an_oversized_page() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/donations?limit=500");
    let (status, body) = send_request(req, &valid_token(7), configure(MockDb::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&body)["kind"], "ValidationError");
}

#[actix_web::test]
async fn my_donation_stats() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_stats().returning(|_| {
        Ok(DonationStats {
            total_donated: MinorUnits::from(75_050),
            captured_count: 2,
            pending_count: 1,
            failed_count: 1,
            organizations_supported: 2,
        })
    });
    let req = TestRequest::get().uri("/donations/stats");
    let (status, body) = send_request(req, &valid_token(7), configure(db, MockGateway::new())).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["total_donated"], "750.50");
    assert_eq!(body["captured_count"], 2);
    assert_eq!(body["organizations_supported"], 2);
}
