//! Test conventions:
//! - Every test owns a fresh SQLite file inside a `tempfile::TempDir`.
//! - Fixtures come from `reserve_rust_back::test_utils`.
//! - API tests build the app through `api_app!`, which needs a running actix system.
#![allow(dead_code)]

use actix_web::test::TestRequest;
use actix_web::web::Data;
use reserve_rust_back::services::db_utils::{AppState, DbPool};
use reserve_rust_back::start_db_actor;
use reserve_rust_back::test_utils::{build_test_pool, seed_basic_fixtures, TestFixtures};
use tempfile::TempDir;

pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

pub fn setup_pool() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = build_test_pool(&dir.path().join("reservation.db"));
    TestDb { pool, _dir: dir }
}

pub fn setup_pool_with_fixtures() -> (TestDb, TestFixtures) {
    let db = setup_pool();
    let fixtures = seed_basic_fixtures(&db.pool).expect("seed fixtures");
    (db, fixtures)
}

/// Two workers so concurrent requests really run in parallel.
pub fn app_state(pool: &DbPool) -> Data<AppState> {
    Data::new(AppState {
        db: start_db_actor(pool.clone(), 2),
    })
}

/// A POST shaped like a browser `FormData` submission.
pub fn multipart_post(uri: &str, fields: &[(&str, &str)]) -> TestRequest {
    const BOUNDARY: &str = "XBOUNDARY";

    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

#[allow(unused_macros)]
macro_rules! api_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(common::app_state($pool))
                .configure(reserve_rust_back::services::configure),
        )
        .await
    };
}
