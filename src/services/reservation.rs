//! Reservation flow: conditional capacity decrement, history append, and the
//! orchestration that runs both in one `BEGIN IMMEDIATE` transaction.
//!
//! All functions take a bare connection so they can be composed inside a
//! caller's transaction. Only [`reserve`] opens a transaction itself.

use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use crate::services::db_models::ReservationRecord;
use crate::services::insertable::NewReservation;
use crate::types::{Entity, Rejection, RepositoryError};

pub type ConfirmationId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityCheck {
    Accepted,
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationOutcome {
    Confirmed(ConfirmationId),
    Rejected(Rejection),
}

/// Accepts iff `party_size >= min_guests` and `capacity >= party_size`, and on
/// acceptance decrements capacity in the same statement. Nothing is written on
/// rejection. Unknown restaurants are an error, not a rejection.
pub fn check_capacity(
    conn: &mut SqliteConnection,
    restaurant_name: &str,
    party_size: i32,
) -> Result<CapacityCheck, RepositoryError> {
    use crate::schema::restaurants::dsl::{capacity, min_guests, name, restaurants};

    let updated = diesel::update(
        restaurants
            .filter(name.eq(restaurant_name))
            .filter(min_guests.le(party_size))
            .filter(capacity.ge(party_size)),
    )
    .set(capacity.eq(capacity - party_size))
    .execute(conn)?;

    let check = if updated == 1 {
        CapacityCheck::Accepted
    } else {
        let minimum = restaurants
            .find(restaurant_name)
            .select(min_guests)
            .first::<i32>(conn)
            .optional()?
            .ok_or_else(|| {
                RepositoryError::NotFound(Entity::Restaurant, restaurant_name.to_owned())
            })?;

        if party_size < minimum {
            CapacityCheck::Rejected(Rejection::PartyTooSmall)
        } else {
            CapacityCheck::Rejected(Rejection::InsufficientCapacity)
        }
    };

    debug!(
        "check_capacity: {} guests at '{}' -> {:?}",
        party_size, restaurant_name, check
    );
    Ok(check)
}

/// Milliseconds since the epoch, bumped past the newest existing id so ids are
/// unique and strictly increasing even when the clock stalls or steps back.
fn next_confirmation_id(conn: &mut SqliteConnection) -> Result<ConfirmationId, RepositoryError> {
    use crate::schema::reservations::dsl::{confirm_num, reservations};

    let now = Utc::now().timestamp_millis();
    let latest = reservations
        .select(max(confirm_num))
        .first::<Option<i64>>(conn)?;

    Ok(latest.map_or(now, |last| now.max(last + 1)))
}

/// Appends one record to the user's history and returns it.
pub fn append_history(
    conn: &mut SqliteConnection,
    user: &str,
    restaurant_name: &str,
    party_size: i32,
) -> Result<ReservationRecord, RepositoryError> {
    use crate::schema::reservations::dsl::reservations;
    use crate::schema::users::dsl::users;

    let known_user = users
        .find(user)
        .count()
        .get_result::<i64>(conn)?
        > 0;
    if !known_user {
        return Err(RepositoryError::NotFound(Entity::Account, user.to_owned()));
    }

    let confirm_num = next_confirmation_id(conn)?;
    diesel::insert_into(reservations)
        .values(NewReservation {
            username: user.to_owned(),
            restaurant: restaurant_name.to_owned(),
            num_guests: party_size,
            confirm_num,
            reserved_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;

    Ok(ReservationRecord {
        restaurant: restaurant_name.to_owned(),
        num_guest: party_size,
        confirm_num,
    })
}

/// The user's reservations, oldest first.
pub fn load_history(
    conn: &mut SqliteConnection,
    user: &str,
) -> Result<Vec<ReservationRecord>, RepositoryError> {
    use crate::schema::reservations::dsl::{id, reservations, username};
    use crate::services::db_models::Reservation;

    let rows = reservations
        .filter(username.eq(user))
        .order(id.asc())
        .select(Reservation::as_select())
        .load::<Reservation>(conn)?;

    Ok(rows.into_iter().map(ReservationRecord::from).collect())
}

pub fn has_visited(
    conn: &mut SqliteConnection,
    user: &str,
    restaurant_name: &str,
) -> Result<bool, RepositoryError> {
    use crate::schema::reservations::dsl::{reservations, restaurant, username};

    let visits = reservations
        .filter(username.eq(user))
        .filter(restaurant.eq(restaurant_name))
        .count()
        .get_result::<i64>(conn)?;

    Ok(visits > 0)
}

/// Capacity check and history append as one unit of work. The write lock is
/// taken up front, so concurrent callers are serialized and a failed append
/// rolls the capacity decrement back.
pub fn reserve(
    conn: &mut SqliteConnection,
    user: &str,
    restaurant_name: &str,
    party_size: i32,
) -> Result<ReservationOutcome, RepositoryError> {
    conn.immediate_transaction(|conn| {
        match check_capacity(conn, restaurant_name, party_size)? {
            CapacityCheck::Rejected(reason) => Ok(ReservationOutcome::Rejected(reason)),
            CapacityCheck::Accepted => {
                let record = append_history(conn, user, restaurant_name, party_size)?;
                Ok(ReservationOutcome::Confirmed(record.confirm_num))
            }
        }
    })
}
