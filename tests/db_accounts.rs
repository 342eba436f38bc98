mod common;

use reserve_rust_back::services::insertable::{NewReview, NewUser};
use reserve_rust_back::services::messages::{
    AddReview, CheckCredentials, DeleteAccount, FetchUserProfile, RegisterUser, Reserve,
    ReviewOutcome,
};
use reserve_rust_back::services::reservation::ReservationOutcome;
use reserve_rust_back::start_db_actor;
use reserve_rust_back::test_utils::{history_len, restaurant_capacity, reviews_count, CAFE_A};
use reserve_rust_back::types::{Entity, RepositoryError};
use serde_json::Value;

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        phone: "206-555-0199".to_string(),
        password: "hunter2".to_string(),
    }
}

#[actix_web::test]
async fn register_then_check_credentials() {
    let db = common::setup_pool();
    let actor = start_db_actor(db.pool.clone(), 1);

    actor
        .send(RegisterUser(new_user("maya")))
        .await
        .expect("mailbox")
        .expect("register");

    let valid = actor
        .send(CheckCredentials {
            username: "maya".into(),
            password: "hunter2".into(),
        })
        .await
        .expect("mailbox")
        .expect("check credentials");
    let invalid = actor
        .send(CheckCredentials {
            username: "maya".into(),
            password: "wrong".into(),
        })
        .await
        .expect("mailbox")
        .expect("check credentials");

    assert!(valid);
    assert!(!invalid);
}

#[actix_web::test]
async fn register_duplicate_username_conflicts() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let actor = start_db_actor(db.pool.clone(), 1);

    let err = actor
        .send(RegisterUser(new_user("u1")))
        .await
        .expect("mailbox")
        .expect_err("duplicate username");

    assert!(matches!(err, RepositoryError::Conflict(Entity::Account, _)));
}

#[actix_web::test]
async fn profile_history_is_an_encoded_list() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let actor = start_db_actor(db.pool.clone(), 1);

    let outcome = actor
        .send(Reserve {
            username: "u1".into(),
            restaurant: CAFE_A.into(),
            num_guests: 3,
        })
        .await
        .expect("mailbox")
        .expect("reserve");
    let ReservationOutcome::Confirmed(confirm_num) = outcome else {
        panic!("expected confirmation, got {:?}", outcome);
    };

    let profile = actor
        .send(FetchUserProfile("u1".into()))
        .await
        .expect("mailbox")
        .expect("profile");

    assert_eq!(profile.email, "u1@example.com");
    let history: Value = serde_json::from_str(&profile.history).expect("history json");
    assert_eq!(
        history,
        serde_json::json!([{ "restaurant": CAFE_A, "numGuest": 3, "confirmNum": confirm_num }])
    );
}

#[actix_web::test]
async fn profile_of_unknown_user_is_not_found() {
    let db = common::setup_pool();
    let actor = start_db_actor(db.pool.clone(), 1);

    let err = actor
        .send(FetchUserProfile("nobody".into()))
        .await
        .expect("mailbox")
        .expect_err("unknown user");

    assert!(matches!(err, RepositoryError::NotFound(Entity::Account, _)));
}

#[actix_web::test]
async fn delete_account_drops_history_but_keeps_reviews_and_capacity() {
    let (db, _fixtures) = common::setup_pool_with_fixtures();
    let actor = start_db_actor(db.pool.clone(), 1);

    actor
        .send(Reserve {
            username: "u1".into(),
            restaurant: CAFE_A.into(),
            num_guests: 2,
        })
        .await
        .expect("mailbox")
        .expect("reserve");
    let review = actor
        .send(AddReview(NewReview {
            restaurant: CAFE_A.into(),
            username: "u1".into(),
            rating: 5.0,
            comment: "cozy".into(),
        }))
        .await
        .expect("mailbox")
        .expect("review");
    assert_eq!(review, ReviewOutcome::Added);

    actor
        .send(DeleteAccount("u1".into()))
        .await
        .expect("mailbox")
        .expect("delete");

    let mut conn = db.pool.get().expect("db connection");
    assert_eq!(history_len(&mut conn, "u1"), 0);
    assert_eq!(reviews_count(&mut conn), 1);
    assert_eq!(restaurant_capacity(&mut conn, CAFE_A), 3);

    let err = actor
        .send(DeleteAccount("u1".into()))
        .await
        .expect("mailbox")
        .expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound(Entity::Account, _)));
}
