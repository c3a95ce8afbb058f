use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use daan_common::Secret;
use daan_engine::{
    db_types::DonationStatus,
    traits::{CaptureResult, FundingOutcome, LedgerError},
};
use razorpay_tools::calculate_hmac;

use super::{
    helpers::{body_json, donation, send_request, settlement_api},
    mocks::{MockDb, MockGateway},
};
use crate::{
    middleware::{HmacMiddlewareFactory, RAZORPAY_SIGNATURE_HEADER},
    routes::RazorpayWebhookRoute,
};

const WEBHOOK_SECRET: &str = "webhook-secret-for-endpoint-tests";

fn configure(db: MockDb, checks: bool) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let hmac = HmacMiddlewareFactory::new(RAZORPAY_SIGNATURE_HEADER, Secret::new(WEBHOOK_SECRET.into()), checks);
        cfg.service(
            web::scope("/razorpay").wrap(hmac).service(RazorpayWebhookRoute::<MockDb, MockGateway>::new()),
        )
        .app_data(settlement_api(db, MockGateway::new()));
    }
}

fn payment_event(event: &str, amount: i64) -> String {
    serde_json::json!({
        "event": event,
        "payload": { "payment": { "entity": {
            "id": "pay_xyz",
            "amount": amount,
            "currency": "INR",
            "status": if event == "payment.captured" { "captured" } else { "failed" },
            "order_id": "order_abc",
            "method": "upi",
            "acquirer_data": { "rrn": "UTR123" }
        } } }
    })
    .to_string()
}

fn signed(body: String) -> TestRequest {
    let signature = calculate_hmac(WEBHOOK_SECRET, body.as_bytes());
    TestRequest::post()
        .uri("/razorpay/webhook")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((RAZORPAY_SIGNATURE_HEADER, signature))
        .set_payload(body)
}

#[actix_web::test]
async fn captured_webhook() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Ok(Some(donation(3, 7, DonationStatus::Pending))));
    db.expect_capture_donation().times(1).returning(|id, details| {
        assert_eq!(details.payment_id, "pay_xyz");
        assert_eq!(details.enrichment.method.as_deref(), Some("upi"));
        Ok(CaptureResult {
            donation: donation(id, 7, DonationStatus::Captured),
            newly_captured: true,
            funding: FundingOutcome::NotApplicable,
        })
    });
    let (status, body) = send_request(signed(payment_event("payment.captured", 50_000)), "", configure(db, true)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Donation 3 is captured");
}

#[actix_web::test]
async fn webhook_with_a_bad_signature() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().never();
    let req = TestRequest::post()
        .uri("/razorpay/webhook")
        .insert_header((RAZORPAY_SIGNATURE_HEADER, "00ff"))
        .set_payload(payment_event("payment.captured", 50_000));
    let (status, body) = send_request(req, "", configure(db, true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Invalid HMAC signature.");
}

#[actix_web::test]
async fn webhook_without_a_signature() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/razorpay/webhook").set_payload(payment_event("payment.captured", 50_000));
    let (status, body) = send_request(req, "", configure(MockDb::new(), true)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "No HMAC signature found.");
}

#[actix_web::test]
async fn unsigned_webhooks_pass_when_checks_are_disabled() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Ok(None));
    let req = TestRequest::post().uri("/razorpay/webhook").set_payload(payment_event("payment.failed", 50_000));
    let (status, body) = send_request(req, "", configure(db, false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["message"], "Order order_abc is not ours");
}

#[actix_web::test]
async fn failed_webhook_keeps_the_donation_open_for_retry() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Ok(Some(donation(3, 7, DonationStatus::Pending))));
    db.expect_mark_donation_failed().never();
    let (status, body) = send_request(signed(payment_event("payment.failed", 50_000)), "", configure(db, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["message"], "Donation 3 is pending");
}

#[actix_web::test]
async fn failed_webhook_after_capture_leaves_the_donation_alone() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Ok(Some(donation(3, 7, DonationStatus::Captured))));
    db.expect_mark_donation_failed().never();
    let (status, body) = send_request(signed(payment_event("payment.failed", 50_000)), "", configure(db, true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["message"], "Donation 3 is captured");
}

#[actix_web::test]
async fn captured_webhook_with_the_wrong_amount() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Ok(Some(donation(3, 7, DonationStatus::Pending))));
    db.expect_capture_donation().never();
    let (status, body) = send_request(signed(payment_event("payment.captured", 100)), "", configure(db, true)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "amount mismatch");
}

#[actix_web::test]
async fn irrelevant_webhooks_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "event": "order.paid", "payload": {} }).to_string();
    let (status, body) = send_request(signed(body), "", configure(MockDb::new(), true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["message"], "Ignored order.paid event");
}

#[actix_web::test]
async fn storage_errors_ask_the_gateway_to_retry() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_donation_by_gateway_order().returning(|_| Err(LedgerError::DatabaseError("database is locked".into())));
    let (status, body) = send_request(signed(payment_event("payment.captured", 50_000)), "", configure(db, true)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(&body);
    assert_eq!(body["kind"], "StorageError");
    let message = body["error"].as_str().unwrap();
    assert_eq!(message, "The donation could not be saved. Please try again.");
    assert!(!message.contains("database is locked"));
}

#[actix_web::test]
async fn malformed_webhook_body() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(signed("{not json".to_string()), "", configure(MockDb::new(), true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&body)["kind"], "ValidationError");
}
