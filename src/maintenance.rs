//! Process-wide maintenance flag.
//!
//! The flag lives in the app_config table and is cached in an atomic so
//! request handling never pays a store round-trip to read it. Writes go to
//! the store first, then the cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;

const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

#[derive(Clone)]
pub struct MaintenanceGate {
    flag: Arc<AtomicBool>,
}

impl MaintenanceGate {
    /// Initialize from the store. When the key is absent the default
    /// (false) is persisted back, so the row exists from then on.
    pub fn load(conn: &Connection) -> Result<Self> {
        let enabled = match queries::get_config_value(conn, MAINTENANCE_MODE_KEY)? {
            Some(value) => value == "true",
            None => {
                queries::set_config_value(conn, MAINTENANCE_MODE_KEY, "false")?;
                false
            }
        };
        Ok(Self {
            flag: Arc::new(AtomicBool::new(enabled)),
        })
    }

    /// Memory-only read; no store round-trip per request.
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Persist the new mode, then update the in-memory cache.
    pub fn set(&self, conn: &Connection, enabled: bool) -> Result<()> {
        queries::set_config_value(
            conn,
            MAINTENANCE_MODE_KEY,
            if enabled { "true" } else { "false" },
        )?;
        self.flag.store(enabled, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn
    }

    #[test]
    fn load_persists_default_when_absent() {
        let conn = test_conn();
        let gate = MaintenanceGate::load(&conn).unwrap();
        assert!(!gate.get());
        assert_eq!(
            queries::get_config_value(&conn, MAINTENANCE_MODE_KEY)
                .unwrap()
                .as_deref(),
            Some("false")
        );
    }

    #[test]
    fn set_updates_store_and_cache() {
        let conn = test_conn();
        let gate = MaintenanceGate::load(&conn).unwrap();

        gate.set(&conn, true).unwrap();
        assert!(gate.get());
        assert_eq!(
            queries::get_config_value(&conn, MAINTENANCE_MODE_KEY)
                .unwrap()
                .as_deref(),
            Some("true")
        );

        // A fresh gate against the same store picks up the persisted value.
        let reloaded = MaintenanceGate::load(&conn).unwrap();
        assert!(reloaded.get());
    }
}
