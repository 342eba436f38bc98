use actix_multipart::Multipart;
use actix_web::http::header::ContentType;
use actix_web::web::{Form, Json};
use actix_web::{get, web, Either, HttpResponse, Responder};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::{ApiError, PARAM_ERROR_MSG};

pub mod db_handling;
pub mod db_models;
pub mod db_utils;
pub mod insertable;
pub mod messages;
pub mod reservation;

#[get("/")]
pub async fn home_page() -> impl Responder {
    HttpResponse::Ok().body("Reservation service up")
}

fn text(body: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body.into())
}

/// Returns `Some` only when the field is present and not blank.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|val| !val.trim().is_empty())
}

/// POST bodies arrive as JSON, urlencoded forms, or `multipart/form-data` text
/// fields. Anything that is neither JSON nor urlencoded falls through to the
/// multipart arm, which reports unparseable payloads as missing parameters.
pub type PostBody<T> = Either<Either<Json<T>, Form<T>>, Multipart>;

async fn read_body<T: DeserializeOwned>(body: PostBody<T>) -> Result<T, ApiError> {
    match body {
        Either::Left(body) => Ok(body.into_inner()),
        Either::Right(multipart) => multipart_fields(multipart).await,
    }
}

/// Collects the text fields of a multipart body into `T`, the same way a form
/// body would be deserialized. Unnamed parts are skipped.
async fn multipart_fields<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, ApiError> {
    let mut fields = Map::new();

    while let Some(mut field) = multipart.try_next().await.map_err(malformed_payload)? {
        let Some(name) = field.content_disposition().get_name().map(str::to_owned) else {
            continue;
        };

        let mut raw = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed_payload)? {
            raw.extend_from_slice(&chunk);
        }
        let text = String::from_utf8(raw).map_err(malformed_payload)?;
        fields.insert(name, Value::String(text));
    }

    serde_json::from_value(Value::Object(fields)).map_err(malformed_payload)
}

fn malformed_payload(err: impl std::fmt::Display) -> ApiError {
    log::debug!("multipart_fields: rejecting payload: {}", err);
    ApiError::MissingParameter
}

/// Malformed bodies get the same answer as bodies with missing fields.
fn payload_error_handler(err: impl std::fmt::Display) -> actix_web::Error {
    log::debug!("rejecting request payload: {}", err);
    actix_web::error::InternalError::from_response(
        PARAM_ERROR_MSG,
        HttpResponse::BadRequest()
            .content_type(ContentType::plaintext())
            .body(PARAM_ERROR_MSG),
    )
    .into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| payload_error_handler(err)))
        .app_data(web::FormConfig::default().error_handler(|err, _req| payload_error_handler(err)))
        .service(home_page)
        .service(restaurant_route::fetch_restaurants)
        .service(restaurant_route::fetch_restaurant)
        .service(restaurant_route::filter_by_cuisine)
        .service(restaurant_route::search_restaurants)
        .service(restaurant_route::average_rating)
        .service(restaurant_route::fetch_cuisines)
        .service(account_route::fetch_user)
        .service(account_route::register)
        .service(account_route::login)
        .service(account_route::delete_account)
        .service(reservation_route::reserve)
        .service(reservation_route::review);
}

// "/info", "/filter", "/search", "/rating", "/cuisine"
pub mod restaurant_route {
    use actix_web::web::{Data, Path, Query};
    use actix_web::{get, HttpResponse};
    use serde::Deserialize;

    use super::{required, text};
    use crate::services::db_utils::AppState;
    use crate::services::messages::{
        FetchAverageRating, FetchCuisines, FetchRestaurant, FetchRestaurants, FilterByCuisine,
        SearchRestaurants,
    };
    use crate::types::ApiError;

    #[get("/info")]
    pub async fn fetch_restaurants(state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        match state.db.send(FetchRestaurants).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[get("/info/{restaurant}")]
    pub async fn fetch_restaurant(
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        match state.db.send(FetchRestaurant(path.into_inner())).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[get("/filter/{cuisine}")]
    pub async fn filter_by_cuisine(
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        match state.db.send(FilterByCuisine(path.into_inner())).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[derive(Deserialize)]
    pub struct SearchQuery {
        pub search: Option<String>,
    }

    #[get("/search")]
    pub async fn search_restaurants(
        state: Data<AppState>,
        query: Query<SearchQuery>,
    ) -> Result<HttpResponse, ApiError> {
        let search = required(query.into_inner().search).ok_or(ApiError::MissingParameter)?;

        match state.db.send(SearchRestaurants(search)).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[get("/rating/{restaurant}")]
    pub async fn average_rating(
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        match state.db.send(FetchAverageRating(path.into_inner())).await {
            Ok(Ok(Some(avg))) => Ok(text(avg.to_string())),
            Ok(Ok(None)) => Ok(text("0")),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[get("/cuisine")]
    pub async fn fetch_cuisines(state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        match state.db.send(FetchCuisines).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }
}

// "/user", "/register", "/login", "/deleteAccount"
pub mod account_route {
    use actix_web::web::{Data, Path};
    use actix_web::{get, post, HttpResponse};
    use log::debug;
    use serde::Deserialize;

    use super::{read_body, required, text, PostBody};
    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewUser;
    use crate::services::messages::{CheckCredentials, DeleteAccount, FetchUserProfile, RegisterUser};
    use crate::types::{ApiError, Rejection};

    #[get("/user/{username}")]
    pub async fn fetch_user(
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        match state.db.send(FetchUserProfile(path.into_inner())).await {
            Ok(Ok(resp)) => Ok(HttpResponse::Ok().json(resp)),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct RegisterBody {
        pub email: Option<String>,
        pub phone: Option<String>,
        pub username: Option<String>,
        pub password: Option<String>,
    }

    #[post("/register")]
    pub async fn register(
        state: Data<AppState>,
        body: PostBody<RegisterBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = read_body(body).await?;
        let new_user = match (
            required(body.email),
            required(body.phone),
            required(body.username),
            required(body.password),
        ) {
            (Some(email), Some(phone), Some(username), Some(password)) => NewUser {
                username,
                email,
                phone,
                password,
            },
            _ => return Err(ApiError::MissingParameter),
        };

        match state.db.send(RegisterUser(new_user)).await {
            Ok(Ok(())) => Ok(text("Account Successfully Registered!")),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct LoginBody {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    #[post("/login")]
    pub async fn login(
        state: Data<AppState>,
        body: PostBody<LoginBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = read_body(body).await?;
        let (Some(username), Some(password)) = (required(body.username), required(body.password))
        else {
            return Err(ApiError::MissingParameter);
        };

        match state
            .db
            .send(CheckCredentials {
                username: username.clone(),
                password,
            })
            .await
        {
            Ok(Ok(true)) => Ok(text(format!("Welcome, {username}!"))),
            Ok(Ok(false)) => {
                debug!("login: rejected credentials for '{}'", username);
                Err(Rejection::WrongCredentials.into())
            }
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct DeleteAccountBody {
        pub username: Option<String>,
    }

    #[post("/deleteAccount")]
    pub async fn delete_account(
        state: Data<AppState>,
        body: PostBody<DeleteAccountBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = read_body(body).await?;
        let username = required(body.username).ok_or(ApiError::MissingParameter)?;

        match state.db.send(DeleteAccount(username)).await {
            Ok(Ok(())) => Ok(text("Account Successfully Deleted")),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }
}

// "/reserve", "/review"
pub mod reservation_route {
    use actix_web::web::Data;
    use actix_web::{post, HttpResponse};
    use serde::Deserialize;

    use super::{read_body, required, text, PostBody};
    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewReview;
    use crate::services::messages::{AddReview, Reserve, ReviewOutcome};
    use crate::services::reservation::ReservationOutcome;
    use crate::types::{ApiError, NumericField, Rejection};

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct ReserveBody {
        pub username: Option<String>,
        pub restaurant: Option<String>,
        #[serde(rename = "numGuests")]
        pub num_guests: Option<NumericField>,
    }

    #[post("/reserve")]
    pub async fn reserve(
        state: Data<AppState>,
        body: PostBody<ReserveBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = read_body(body).await?;
        let num_guests = body
            .num_guests
            .as_ref()
            .and_then(NumericField::as_i32)
            .filter(|n| *n > 0);
        let msg = match (required(body.username), required(body.restaurant), num_guests) {
            (Some(username), Some(restaurant), Some(num_guests)) => Reserve {
                username,
                restaurant,
                num_guests,
            },
            _ => return Err(ApiError::MissingParameter),
        };

        match state.db.send(msg).await {
            Ok(Ok(ReservationOutcome::Confirmed(confirm_num))) => Ok(text(confirm_num.to_string())),
            Ok(Ok(ReservationOutcome::Rejected(reason))) => Err(reason.into()),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct ReviewBody {
        pub restaurant: Option<String>,
        pub username: Option<String>,
        pub rating: Option<NumericField>,
        pub comment: Option<String>,
    }

    #[post("/review")]
    pub async fn review(
        state: Data<AppState>,
        body: PostBody<ReviewBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = read_body(body).await?;
        let rating = body.rating.as_ref().and_then(NumericField::as_f64);
        let new_review = match (
            required(body.restaurant),
            required(body.username),
            rating,
            required(body.comment),
        ) {
            (Some(restaurant), Some(username), Some(rating), Some(comment)) => NewReview {
                restaurant,
                username,
                rating,
                comment,
            },
            _ => return Err(ApiError::MissingParameter),
        };

        match state.db.send(AddReview(new_review)).await {
            Ok(Ok(ReviewOutcome::Added)) => Ok(text("Review Successfully Added")),
            Ok(Ok(ReviewOutcome::NotVisited)) => Err(Rejection::NotVisited.into()),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(err.into()),
        }
    }
}
