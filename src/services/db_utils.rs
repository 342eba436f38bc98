use std::time::Duration;

use actix::{Actor, Addr, SyncContext};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use crate::types::{PoolInitializationError, RepositoryError};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub struct DbActor(pub DbPool);

pub struct AppState {
    pub db: Addr<DbActor>,
}

impl Actor for DbActor {
    type Context = SyncContext<Self>;
}

/// Per-connection pragmas. SQLite keeps these per handle, so they are applied
/// every time r2d2 opens a new connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
        .and_then(|_| {
            conn.batch_execute(
                "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;",
            )
        })
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn get_db_pool(
    db_url: &str,
    max_size: u32,
    busy_timeout: Duration,
) -> Result<DbPool, PoolInitializationError> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_url);
    match Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions { busy_timeout }))
        .build(manager)
    {
        Ok(val) => Ok(val),
        Err(err) => Err(PoolInitializationError(err.to_string())),
    }
}

pub fn establish_connection(
    pool: &DbPool,
) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, RepositoryError> {
    Ok(pool.get()?)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), PoolInitializationError> {
    let mut conn = pool
        .get()
        .map_err(|err| PoolInitializationError(err.to_string()))?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolInitializationError(err.to_string()))?;
    for version in applied {
        info!("run_migrations: applied {}", version);
    }

    Ok(())
}

/// Executes a SQL script (e.g. the restaurant catalogue) against the store.
pub fn apply_seed_file(pool: &DbPool, path: &str) -> Result<(), PoolInitializationError> {
    let script = std::fs::read_to_string(path)
        .map_err(|err| PoolInitializationError(format!("Unable to read seed file {path}: {err}")))?;

    let mut conn = pool
        .get()
        .map_err(|err| PoolInitializationError(err.to_string()))?;
    conn.batch_execute(&script)
        .map_err(|err| PoolInitializationError(format!("Seed file {path} failed: {err}")))?;

    info!("apply_seed_file: executed {}", path);
    Ok(())
}
