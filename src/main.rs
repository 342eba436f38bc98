use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use log::info;

use reserve_rust_back::config::Settings;
use reserve_rust_back::services::db_utils::{
    apply_seed_file, get_db_pool, run_migrations, AppState, DbPool,
};
use reserve_rust_back::{services, start_db_actor};

fn init_db(settings: &Settings) -> DbPool {
    let pool = get_db_pool(
        &settings.database_url,
        settings.pool_size,
        Duration::from_millis(settings.busy_timeout_ms),
    )
    .expect("Unable to build database pool");

    run_migrations(&pool).expect("Unable to run migrations");
    if let Some(seed) = &settings.seed_file {
        apply_seed_file(&pool, seed).expect("Unable to apply seed file");
    }

    pool
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let settings = Settings::load().expect("Invalid configuration");
    info!("Opening database at {}", settings.database_url);
    let pool = init_db(&settings);
    let db = start_db_actor(pool, settings.db_workers);

    info!("Starting server at http://{}:{}", settings.host, settings.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(Data::new(AppState { db: db.clone() }))
            .configure(services::configure)
    })
        .bind(settings.bind_addr())?
        .run()
        .await
}
