use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use daan_engine::{
    db_types::{Event, EventType, Favorite, MinorUnits, Organization},
    traits::DirectoryError,
    DirectoryApi,
};

use super::{
    helpers::{body_json, send_request, temple, valid_token},
    mocks::MockDb,
};
use crate::routes::{AddFavoriteRoute, EventProgressRoute, MyFavoritesRoute, RemoveFavoriteRoute};

fn configure(db: MockDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(MyFavoritesRoute::<MockDb>::new())
            .service(AddFavoriteRoute::<MockDb>::new())
            .service(RemoveFavoriteRoute::<MockDb>::new())
            .service(EventProgressRoute::<MockDb>::new())
            .app_data(web::Data::new(DirectoryApi::new(db)));
    }
}

fn favorite(devotee_id: i64, organization_id: i64, position: i64) -> Favorite {
    Favorite { devotee_id, organization_id, position, created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }
}

fn renovation(raised: i64, target: Option<i64>) -> Event {
    Event {
        id: 11,
        organization_id: 1,
        event_type: EventType::Crowdfunding,
        title: "Temple renovation".to_string(),
        description: None,
        start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
        target_amount: target.map(MinorUnits::from),
        raised_amount: MinorUnits::from(raised),
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
    }
}

#[actix_web::test]
async fn list_my_favorites() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_favorites().returning(|devotee| Ok(vec![favorite(devotee, 4, 1), favorite(devotee, 1, 2)]));
    let (status, body) = send_request(TestRequest::get().uri("/favorites"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body[0]["organization_id"], 4);
    assert_eq!(body[1]["position"], 2);
}

#[actix_web::test]
async fn add_favorite() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_organization().returning(|id| Ok(Some(temple(id))));
    db.expect_add_favorite().times(1).returning(|devotee, org| Ok(favorite(devotee, org, 3)));
    let (status, body) = send_request(TestRequest::post().uri("/favorites/1"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body_json(&body)["position"], 3);
}

#[actix_web::test]
async fn add_a_sixth_favorite() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_organization().returning(|id| Ok(Some(temple(id))));
    db.expect_add_favorite().returning(|_, _| Err(DirectoryError::FavoritesLimitReached));
    let (status, body) = send_request(TestRequest::post().uri("/favorites/6"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(&body)["error"], "favorites limit reached");
}

#[actix_web::test]
async fn add_an_inactive_organization() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_organization().returning(|id| Ok(Some(Organization { is_active: false, ..temple(id) })));
    db.expect_add_favorite().never();
    let (status, _) = send_request(TestRequest::post().uri("/favorites/2"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn add_favorite_with_a_bad_path() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        send_request(TestRequest::post().uri("/favorites/temple"), &valid_token(7), configure(MockDb::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(&body)["kind"], "ValidationError");
}

#[actix_web::test]
async fn remove_favorite() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_remove_favorite().withf(|devotee, org| *devotee == 7 && *org == 4).times(1).returning(|_, _| Ok(true));
    let (status, body) = send_request(TestRequest::delete().uri("/favorites/4"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json(&body)["success"], true);
}

#[actix_web::test]
async fn remove_something_that_is_not_a_favorite() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_remove_favorite().returning(|_, _| Ok(false));
    let (status, body) = send_request(TestRequest::delete().uri("/favorites/9"), &valid_token(7), configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body_json(&body)["error"], "Organization 9 is not a favorite");
}

#[actix_web::test]
async fn event_progress_is_public() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_event().returning(|_| Ok(Some(renovation(37_500, Some(100_000)))));
    let (status, body) = send_request(TestRequest::get().uri("/events/11/progress"), "", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert_eq!(body["raised"], "375.00");
    assert_eq!(body["target"], "1000.00");
    assert_eq!(body["percent_funded"], "37.50");
}

#[actix_web::test]
async fn progress_for_an_event_without_a_target() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_event().returning(|_| Ok(Some(renovation(2_500, None))));
    let (status, body) = send_request(TestRequest::get().uri("/events/11/progress"), "", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body = body_json(&body);
    assert!(body["target"].is_null());
    assert!(body["percent_funded"].is_null());
}

#[actix_web::test]
async fn progress_for_a_missing_event() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDb::new();
    db.expect_fetch_event().returning(|_| Ok(None));
    let (status, _) = send_request(TestRequest::get().uri("/events/99/progress"), "", configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
