use actix::Message;

use crate::services::db_models::{Cuisine, Restaurant, UserProfile};
use crate::services::insertable::{NewReview, NewUser};
use crate::services::reservation::ReservationOutcome;
use crate::types::RepositoryError;

#[derive(Message)]
#[rtype(result = "Result<Vec<Restaurant>, RepositoryError>")]
pub struct FetchRestaurants;

#[derive(Message)]
#[rtype(result = "Result<Restaurant, RepositoryError>")]
pub struct FetchRestaurant(pub String);

#[derive(Message)]
#[rtype(result = "Result<Vec<Restaurant>, RepositoryError>")]
pub struct FilterByCuisine(pub String);

#[derive(Message)]
#[rtype(result = "Result<Vec<Restaurant>, RepositoryError>")]
pub struct SearchRestaurants(pub String);

#[derive(Message)]
#[rtype(result = "Result<Vec<Cuisine>, RepositoryError>")]
pub struct FetchCuisines;

/// Average rating rounded to one decimal, `None` when nobody reviewed yet.
#[derive(Message)]
#[rtype(result = "Result<Option<f64>, RepositoryError>")]
pub struct FetchAverageRating(pub String);

#[derive(Message)]
#[rtype(result = "Result<UserProfile, RepositoryError>")]
pub struct FetchUserProfile(pub String);

#[derive(Message)]
#[rtype(result = "Result<(), RepositoryError>")]
pub struct RegisterUser(pub NewUser);

#[derive(Message)]
#[rtype(result = "Result<bool, RepositoryError>")]
pub struct CheckCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Message)]
#[rtype(result = "Result<(), RepositoryError>")]
pub struct DeleteAccount(pub String);

#[derive(Message)]
#[rtype(result = "Result<ReviewOutcome, RepositoryError>")]
pub struct AddReview(pub NewReview);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Added,
    NotVisited,
}

#[derive(Message)]
#[rtype(result = "Result<ReservationOutcome, RepositoryError>")]
pub struct Reserve {
    pub username: String,
    pub restaurant: String,
    pub num_guests: i32,
}
