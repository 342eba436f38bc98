use std::fmt::{Debug, Display, Formatter};

use actix::MailboxError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Deserialize;
use thiserror::Error;

pub const PARAM_ERROR_MSG: &str = "Missing one or more of the required params.";
pub const SERVER_ERROR_MSG: &str = "An error occurred on the server. Try again later.";

#[derive(Debug)]
pub struct PoolInitializationError(pub String);

impl Display for PoolInitializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl std::error::Error for PoolInitializationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Restaurant,
    Account,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Restaurant => f.pad("restaurant"),
            Entity::Account => f.pad("account"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found: {1}")]
    NotFound(Entity, String),
    #[error("{0} already exists: {1}")]
    Conflict(Entity, String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(#[from] diesel::r2d2::PoolError),
    #[error("Encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),
}

/// Business-rule failures. Each one is reported to the caller as a 400 with its
/// display text as the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Your party is too small!")]
    PartyTooSmall,
    #[error("Not enough seats left!")]
    InsufficientCapacity,
    #[error("User has not been to this restaurant before")]
    NotVisited,
    #[error("Restaurant does not exist")]
    UnknownRestaurant,
    #[error("Account does not exist")]
    UnknownAccount,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Wrong username or password!")]
    WrongCredentials,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", PARAM_ERROR_MSG)]
    MissingParameter,
    #[error("{0}")]
    Rejected(#[from] Rejection),
    #[error("{}", SERVER_ERROR_MSG)]
    ServerFailure,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::ServerFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(Entity::Restaurant, _) => {
                ApiError::Rejected(Rejection::UnknownRestaurant)
            }
            RepositoryError::NotFound(Entity::Account, _) => {
                ApiError::Rejected(Rejection::UnknownAccount)
            }
            RepositoryError::Conflict(Entity::Account, _) => {
                ApiError::Rejected(Rejection::UsernameTaken)
            }
            other => {
                error!("store failure: {}", other);
                ApiError::ServerFailure
            }
        }
    }
}

impl From<MailboxError> for ApiError {
    fn from(err: MailboxError) -> Self {
        error!("db actor unreachable: {}", err);
        ApiError::ServerFailure
    }
}

/// A request field that may arrive as a JSON number or as text (form bodies).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumericField {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            NumericField::Int(val) => i32::try_from(*val).ok(),
            NumericField::Float(val) if val.fract() == 0.0 => {
                i32::try_from(*val as i64).ok()
            }
            NumericField::Float(_) => None,
            NumericField::Text(val) => val.trim().parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericField::Int(val) => Some(*val as f64),
            NumericField::Float(val) => Some(*val),
            NumericField::Text(val) => val.trim().parse::<f64>().ok(),
        }
        .filter(|val| val.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::Error as DieselError;

    #[test]
    fn numeric_field_accepts_numbers_and_text() {
        let from_json: NumericField = serde_json::from_str("3").unwrap();
        assert_eq!(from_json.as_i32(), Some(3));

        let from_text: NumericField = serde_json::from_str("\" 4 \"").unwrap();
        assert_eq!(from_text.as_i32(), Some(4));

        let rating: NumericField = serde_json::from_str("4.5").unwrap();
        assert_eq!(rating.as_i32(), None);
        assert_eq!(rating.as_f64(), Some(4.5));
    }

    #[test]
    fn numeric_field_rejects_garbage() {
        assert_eq!(NumericField::Text("many".into()).as_i32(), None);
        assert_eq!(NumericField::Text("NaN".into()).as_f64(), None);
        assert_eq!(NumericField::Int(i64::MAX).as_i32(), None);
    }

    #[test]
    fn api_errors_map_to_statuses() {
        assert_eq!(ApiError::MissingParameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Rejected(Rejection::PartyTooSmall).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ServerFailure.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::ServerFailure.to_string(), SERVER_ERROR_MSG);
    }

    #[test]
    fn repository_errors_hide_store_detail() {
        let not_found: ApiError = RepositoryError::NotFound(Entity::Account, "u1".into()).into();
        assert!(matches!(not_found, ApiError::Rejected(Rejection::UnknownAccount)));

        let taken: ApiError = RepositoryError::Conflict(Entity::Account, "u1".into()).into();
        assert_eq!(taken.to_string(), "Username is already taken");

        let store: ApiError = RepositoryError::DatabaseError(DieselError::RollbackTransaction).into();
        assert!(matches!(store, ApiError::ServerFailure));
    }
}
