#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use reserve_rust_back::test_utils::CAFE_A;
use reserve_rust_back::types::PARAM_ERROR_MSG;
use serde_json::{json, Value};

fn names(rows: &Value) -> Vec<&str> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|row| row["name"].as_str().expect("name"))
        .collect()
}

#[actix_web::test]
async fn home_page_is_up() {
    let db = common::setup_pool();
    let app = api_app!(&db.pool);

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;

    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn info_lists_and_fetches_restaurants() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let app = api_app!(&db.pool);

    let all: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/info").to_request()).await;
    assert_eq!(names(&all), vec![CAFE_A, "Noodle Bar", "Pasta Piazza"]);

    let req = TestRequest::get().uri("/info/Cafe%20A").to_request();
    let cafe: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        cafe,
        json!({
            "name": CAFE_A,
            "address": "12 Pine St",
            "cuisine": "Cafe",
            "img": "cafe-a.jpg",
            "capacity": 5,
            "minGuests": 2
        })
    );

    let resp = test::call_service(&app, TestRequest::get().uri("/info/Nowhere").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test::read_body(resp).await, "Restaurant does not exist");
}

#[actix_web::test]
async fn filter_search_and_cuisines() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let app = api_app!(&db.pool);

    let chinese: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/filter/Chinese").to_request())
            .await;
    assert_eq!(names(&chinese), vec!["Noodle Bar"]);

    let found: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/search?search=pasta").to_request(),
    )
    .await;
    assert_eq!(names(&found), vec!["Pasta Piazza"]);

    let cuisines: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/cuisine").to_request()).await;
    assert_eq!(
        cuisines,
        json!([{ "cuisine": "Cafe" }, { "cuisine": "Chinese" }, { "cuisine": "Italian" }])
    );

    for uri in ["/search", "/search?search="] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(test::read_body(resp).await, PARAM_ERROR_MSG);
    }
}

#[actix_web::test]
async fn rating_defaults_to_zero() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let app = api_app!(&db.pool);

    let body = test::call_and_read_body(
        &app,
        TestRequest::get().uri("/rating/Noodle%20Bar").to_request(),
    )
    .await;

    assert_eq!(body, "0");
}
