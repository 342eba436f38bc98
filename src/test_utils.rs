use std::path::Path;
use std::time::Duration;

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::services::db_models::Review;
use crate::services::db_utils::{get_db_pool, run_migrations, DbPool};
use crate::services::insertable::{NewRestaurant, NewUser};
use crate::types::RepositoryError;

// Fixture strategy:
// - Every test gets its own SQLite file, so tests never share rows.
// - "Cafe A" mirrors the reference scenario: min 2 guests, 5 seats.
pub const CAFE_A: &str = "Cafe A";

pub fn build_test_pool(db_file: &Path) -> DbPool {
    let url = db_file.to_string_lossy().into_owned();
    let pool = get_db_pool(&url, 4, Duration::from_secs(5)).expect("build test pool");
    run_migrations(&pool).expect("Unable to run migrations");
    pool
}

pub struct TestFixtures {
    pub usernames: Vec<String>,
    pub restaurants: Vec<String>,
}

/// Users u1..u3 and three restaurants, "Cafe A" among them.
pub fn seed_basic_fixtures(pool: &DbPool) -> Result<TestFixtures, RepositoryError> {
    let mut conn = pool.get()?;

    let mut usernames = Vec::new();
    for name in ["u1", "u2", "u3"] {
        insert_user(&mut conn, name)?;
        usernames.push(name.to_string());
    }

    let restaurants = vec![
        seed_restaurant(&mut conn, CAFE_A, "Cafe", "12 Pine St", 5, 2)?,
        seed_restaurant(&mut conn, "Noodle Bar", "Chinese", "400 Jackson St", 20, 1)?,
        seed_restaurant(&mut conn, "Pasta Piazza", "Italian", "9 Pine St", 10, 4)?,
    ];

    Ok(TestFixtures {
        usernames,
        restaurants,
    })
}

pub fn insert_user(conn: &mut SqliteConnection, name: &str) -> Result<(), RepositoryError> {
    use crate::schema::users::dsl::users;

    diesel::insert_into(users)
        .values(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            phone: "206-555-0100".to_string(),
            password: format!("{name}-secret"),
        })
        .execute(conn)?;
    Ok(())
}

pub fn seed_restaurant(
    conn: &mut SqliteConnection,
    name_val: &str,
    cuisine_val: &str,
    address_val: &str,
    capacity_val: i32,
    min_guests_val: i32,
) -> Result<String, RepositoryError> {
    use crate::schema::restaurants::dsl::restaurants;

    diesel::insert_into(restaurants)
        .values(NewRestaurant {
            name: name_val.to_string(),
            address: address_val.to_string(),
            cuisine: cuisine_val.to_string(),
            img: format!("{}.jpg", name_val.to_lowercase().replace(' ', "-")),
            capacity: capacity_val,
            min_guests: min_guests_val,
        })
        .execute(conn)?;
    Ok(name_val.to_string())
}

pub fn restaurant_capacity(conn: &mut SqliteConnection, name_val: &str) -> i32 {
    use crate::schema::restaurants::dsl::{capacity, restaurants};

    restaurants
        .find(name_val)
        .select(capacity)
        .first(conn)
        .expect("restaurant capacity")
}

pub fn history_len(conn: &mut SqliteConnection, user: &str) -> i64 {
    use crate::schema::reservations::dsl::{reservations, username};

    reservations
        .filter(username.eq(user))
        .count()
        .get_result(conn)
        .expect("history length")
}

pub fn reviews_count(conn: &mut SqliteConnection) -> i64 {
    crate::schema::reviews::table
        .count()
        .get_result(conn)
        .expect("reviews count")
}

pub fn reviews_for(conn: &mut SqliteConnection, restaurant_val: &str) -> Vec<Review> {
    use crate::schema::reviews::dsl::{id, restaurant, reviews};

    reviews
        .filter(restaurant.eq(restaurant_val))
        .order(id.asc())
        .select(Review::as_select())
        .load(conn)
        .expect("reviews for restaurant")
}
