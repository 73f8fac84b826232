use rusqlite::Connection;

use super::from_row::{LICENSE_COLS, USER_COLS};

/// Initialize the database schema. The three tables mirror the sheets the
/// service replaces: Licenses, Users and AppConfig.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Licenses (one row per issued key)
        -- activated_identities is a JSON array of the identities that have
        -- consumed a slot; its length never exceeds max_activations.
        CREATE TABLE IF NOT EXISTS licenses (
            license_key TEXT PRIMARY KEY,
            max_activations INTEGER NOT NULL,
            activated_identities TEXT NOT NULL DEFAULT '[]',
            used INTEGER NOT NULL DEFAULT 0,
            valid INTEGER NOT NULL DEFAULT 1,
            issued_at INTEGER NOT NULL,
            expires_at INTEGER,
            last_used_by TEXT,
            last_used_at INTEGER
        );

        -- Users (readers, keyed by email)
        CREATE TABLE IF NOT EXISTS users (
            email TEXT PRIMARY KEY,
            display_name TEXT,
            license_key TEXT,
            first_seen_at INTEGER NOT NULL,
            last_seen_at INTEGER NOT NULL
        );

        -- AppConfig (flat key/value map, holds the maintenance flag)
        CREATE TABLE IF NOT EXISTS app_config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
}

/// Confirm every column the queries rely on exists. Runs once at startup so
/// a schema drift fails fast instead of surfacing per request.
pub fn verify_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.prepare(&format!("SELECT {} FROM licenses LIMIT 0", LICENSE_COLS))?;
    conn.prepare(&format!("SELECT {} FROM users LIMIT 0", USER_COLS))?;
    conn.prepare("SELECT key, value FROM app_config LIMIT 0")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_tables_that_pass_verification() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        verify_schema(&conn).unwrap();
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        verify_schema(&conn).unwrap();
    }

    #[test]
    fn verify_fails_on_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE licenses (license_key TEXT PRIMARY KEY);")
            .unwrap();
        assert!(verify_schema(&conn).is_err());
    }
}
