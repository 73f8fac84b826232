mod from_row;
mod schema;
pub mod queries;

pub use from_row::{LICENSE_COLS, USER_COLS};
pub use schema::{init_db, verify_schema};

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::email::Mailer;
use crate::maintenance::MaintenanceGate;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state passed to every handler. No module-level singletons:
/// everything a request needs travels through here.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Process-wide maintenance flag, cached in memory and persisted in
    /// the app_config table.
    pub maintenance: MaintenanceGate,
    pub mailer: Arc<Mailer>,
    /// Validity applied when /generate-license omits validityDays.
    pub default_validity_days: i64,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    // WAL mode: readers never block the writer; synchronous=NORMAL is safe
    // with WAL. busy_timeout makes a second redeemer queue on the write
    // lock instead of failing with SQLITE_BUSY.
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            "#,
        )
    });
    Pool::builder().max_size(10).build(manager)
}
