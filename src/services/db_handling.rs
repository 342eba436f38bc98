use actix::Handler;
use diesel::dsl::avg;
use diesel::result::{DatabaseErrorKind, Error};
use diesel::prelude::*;
use log::{debug, error, info};

use crate::services::db_models::{Cuisine, Restaurant, User, UserProfile};
use crate::services::db_utils::{establish_connection, DbActor};
use crate::services::messages::{
    AddReview, CheckCredentials, DeleteAccount, FetchAverageRating, FetchCuisines,
    FetchRestaurant, FetchRestaurants, FetchUserProfile, FilterByCuisine, RegisterUser, Reserve,
    ReviewOutcome, SearchRestaurants,
};
use crate::services::reservation::{self, ReservationOutcome};
use crate::types::{Entity, RepositoryError};

fn round_to_tenth(val: f64) -> f64 {
    (val * 10.0).round() / 10.0
}

impl Handler<FetchRestaurants> for DbActor {
    type Result = Result<Vec<Restaurant>, RepositoryError>;

    fn handle(&mut self, _msg: FetchRestaurants, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::restaurants::dsl::{name, restaurants};

        let mut conn = establish_connection(&self.0)?;

        Ok(restaurants
            .order(name.asc())
            .select(Restaurant::as_select())
            .load(&mut conn)?)
    }
}

impl Handler<FetchRestaurant> for DbActor {
    type Result = Result<Restaurant, RepositoryError>;

    fn handle(&mut self, msg: FetchRestaurant, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::restaurants::dsl::restaurants;

        let mut conn = establish_connection(&self.0)?;

        restaurants
            .find(&msg.0)
            .select(Restaurant::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound(Entity::Restaurant, msg.0.clone()))
    }
}

impl Handler<FilterByCuisine> for DbActor {
    type Result = Result<Vec<Restaurant>, RepositoryError>;

    fn handle(&mut self, msg: FilterByCuisine, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::restaurants::dsl::{cuisine, name, restaurants};

        let mut conn = establish_connection(&self.0)?;

        Ok(restaurants
            .filter(cuisine.eq(&msg.0))
            .order(name.asc())
            .select(Restaurant::as_select())
            .load(&mut conn)?)
    }
}

impl Handler<SearchRestaurants> for DbActor {
    type Result = Result<Vec<Restaurant>, RepositoryError>;

    fn handle(&mut self, msg: SearchRestaurants, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::restaurants::dsl::{address, cuisine, name, restaurants};

        let mut conn = establish_connection(&self.0)?;
        let pattern = format!("%{}%", msg.0);

        let found = restaurants
            .filter(
                name.like(&pattern)
                    .or(cuisine.like(&pattern))
                    .or(address.like(&pattern)),
            )
            .order(name.asc())
            .select(Restaurant::as_select())
            .load(&mut conn)?;

        debug!("search_restaurants: '{}' matched {} rows", msg.0, found.len());
        Ok(found)
    }
}

impl Handler<FetchCuisines> for DbActor {
    type Result = Result<Vec<Cuisine>, RepositoryError>;

    fn handle(&mut self, _msg: FetchCuisines, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::restaurants::dsl::{cuisine, restaurants};

        let mut conn = establish_connection(&self.0)?;

        let names = restaurants
            .select(cuisine)
            .distinct()
            .order(cuisine.asc())
            .load::<String>(&mut conn)?;

        Ok(names.into_iter().map(|c| Cuisine { cuisine: c }).collect())
    }
}

impl Handler<FetchAverageRating> for DbActor {
    type Result = Result<Option<f64>, RepositoryError>;

    fn handle(&mut self, msg: FetchAverageRating, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::reviews::dsl::{rating, restaurant, reviews};

        let mut conn = establish_connection(&self.0)?;

        let average = reviews
            .filter(restaurant.eq(&msg.0))
            .select(avg(rating))
            .first::<Option<f64>>(&mut conn)?;

        Ok(average.map(round_to_tenth))
    }
}

impl Handler<FetchUserProfile> for DbActor {
    type Result = Result<UserProfile, RepositoryError>;

    fn handle(&mut self, msg: FetchUserProfile, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::users::dsl::users;

        let mut conn = establish_connection(&self.0)?;

        let user = users
            .find(&msg.0)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound(Entity::Account, msg.0.clone()))?;
        let history = reservation::load_history(&mut conn, &msg.0)?;

        Ok(UserProfile::new(user, &history)?)
    }
}

impl Handler<RegisterUser> for DbActor {
    type Result = Result<(), RepositoryError>;

    fn handle(&mut self, msg: RegisterUser, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::users::dsl::users;

        let mut conn = establish_connection(&self.0)?;

        match diesel::insert_into(users).values(&msg.0).execute(&mut conn) {
            Ok(_) => {
                info!("register_user: created account '{}'", msg.0.username);
                Ok(())
            }
            Err(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(
                RepositoryError::Conflict(Entity::Account, msg.0.username.clone()),
            ),
            Err(err) => {
                error!("register_user: insert for '{}' failed: {}", msg.0.username, err);
                Err(err.into())
            }
        }
    }
}

impl Handler<CheckCredentials> for DbActor {
    type Result = Result<bool, RepositoryError>;

    fn handle(&mut self, msg: CheckCredentials, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::users::dsl::{password, username, users};

        let mut conn = establish_connection(&self.0)?;

        let matches = users
            .filter(username.eq(&msg.username))
            .filter(password.eq(&msg.password))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(matches > 0)
    }
}

impl Handler<DeleteAccount> for DbActor {
    type Result = Result<(), RepositoryError>;

    fn handle(&mut self, msg: DeleteAccount, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::{reservations, users};

        let mut conn = establish_connection(&self.0)?;

        conn.immediate_transaction(|trx_conn| {
            let history = diesel::delete(
                reservations::table.filter(reservations::username.eq(&msg.0)),
            )
            .execute(trx_conn)?;

            let removed = diesel::delete(users::table.find(&msg.0)).execute(trx_conn)?;
            if removed == 0 {
                return Err(RepositoryError::NotFound(Entity::Account, msg.0.clone()));
            }

            info!(
                "delete_account: removed '{}' and {} history records",
                msg.0, history
            );
            Ok(())
        })
    }
}

impl Handler<AddReview> for DbActor {
    type Result = Result<ReviewOutcome, RepositoryError>;

    fn handle(&mut self, msg: AddReview, _ctx: &mut Self::Context) -> Self::Result {
        use crate::schema::reviews::dsl::reviews;

        let mut conn = establish_connection(&self.0)?;
        let review = msg.0;

        conn.immediate_transaction(|trx_conn| {
            if !reservation::has_visited(trx_conn, &review.username, &review.restaurant)? {
                return Ok(ReviewOutcome::NotVisited);
            }

            diesel::insert_into(reviews)
                .values(&review)
                .execute(trx_conn)?;

            Ok(ReviewOutcome::Added)
        })
    }
}

impl Handler<Reserve> for DbActor {
    type Result = Result<ReservationOutcome, RepositoryError>;

    fn handle(&mut self, msg: Reserve, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let outcome = reservation::reserve(&mut conn, &msg.username, &msg.restaurant, msg.num_guests)?;
        info!(
            "reserve: {} guests for '{}' at '{}' -> {:?}",
            msg.num_guests, msg.username, msg.restaurant, outcome
        );
        Ok(outcome)
    }
}
