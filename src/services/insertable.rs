use chrono::NaiveDateTime;
use diesel::Insertable;
use serde::Serialize;

use crate::schema::reservations;
use crate::schema::restaurants;
use crate::schema::reviews;
use crate::schema::users;

#[derive(Insertable, Serialize, Clone)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub cuisine: String,
    pub img: String,
    pub capacity: i32,
    pub min_guests: i32,
}

#[derive(Insertable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Insertable, Serialize, Clone)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub username: String,
    pub restaurant: String,
    pub num_guests: i32,
    pub confirm_num: i64,
    pub reserved_at: NaiveDateTime,
}

#[derive(Insertable, Serialize, Clone)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub restaurant: String,
    pub username: String,
    pub rating: f64,
    pub comment: String,
}
