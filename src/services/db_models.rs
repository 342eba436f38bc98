use chrono::NaiveDateTime;
use diesel::{Queryable, Selectable};
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = crate::schema::restaurants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub cuisine: String,
    pub img: String,
    pub capacity: i32,
    pub min_guests: i32,
}

#[derive(Queryable, Selectable, Debug, Clone, Serialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(skip)]
    pub password: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::reservations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Reservation {
    pub id: i32,
    pub username: String,
    pub restaurant: String,
    pub num_guests: i32,
    pub confirm_num: i64,
    pub reserved_at: NaiveDateTime,
}

/// One entry of a user's history, in the shape the front end reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationRecord {
    pub restaurant: String,
    #[serde(rename = "numGuest")]
    pub num_guest: i32,
    #[serde(rename = "confirmNum")]
    pub confirm_num: i64,
}

impl From<Reservation> for ReservationRecord {
    fn from(row: Reservation) -> Self {
        Self {
            restaurant: row.restaurant,
            num_guest: row.num_guests,
            confirm_num: row.confirm_num,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone, Serialize)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Review {
    pub id: i32,
    pub restaurant: String,
    pub username: String,
    pub rating: f64,
    pub comment: String,
}

/// `GET /user/{username}` payload. `history` stays a JSON-encoded string.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub history: String,
}

impl UserProfile {
    pub fn new(user: User, history: &[ReservationRecord]) -> serde_json::Result<Self> {
        Ok(Self {
            username: user.username,
            email: user.email,
            phone: user.phone,
            history: serde_json::to_string(history)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cuisine {
    pub cuisine: String,
}
