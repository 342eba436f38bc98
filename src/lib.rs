pub mod config;
pub mod schema;
pub mod services;
pub mod test_utils;
pub mod types;

use actix::{Addr, SyncArbiter};

use crate::services::db_utils::{DbActor, DbPool};

/// Starts `workers` blocking `DbActor` threads sharing one pool. Must be called
/// from inside a running actix system.
pub fn start_db_actor(pool: DbPool, workers: usize) -> Addr<DbActor> {
    SyncArbiter::start(workers.max(1), move || DbActor(pool.clone()))
}
