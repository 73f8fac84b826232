use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CreateLicense, License, UserRecord};

use super::from_row::{query_all, query_one, LICENSE_COLS, USER_COLS};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Generate a fresh license key. UUID v4 gives collision odds low enough
/// that no uniqueness check against existing rows is performed.
pub fn generate_license_key() -> String {
    Uuid::new_v4().to_string()
}

// ============ Licenses ============

pub fn insert_license(conn: &Connection, input: &CreateLicense) -> Result<License> {
    let license = License {
        license_key: generate_license_key(),
        max_activations: input.max_activations,
        activated_identities: Vec::new(),
        used: false,
        valid: true,
        issued_at: now(),
        expires_at: input.expires_at,
        last_used_by: None,
        last_used_at: None,
    };

    conn.execute(
        "INSERT INTO licenses (license_key, max_activations, activated_identities, used, valid, issued_at, expires_at)
         VALUES (?1, ?2, '[]', 0, 1, ?3, ?4)",
        params![
            license.license_key,
            license.max_activations,
            license.issued_at,
            license.expires_at,
        ],
    )?;

    Ok(license)
}

pub fn get_license_by_key(conn: &Connection, key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_key = ?1", LICENSE_COLS),
        &[&key],
    )
}

pub fn list_licenses(conn: &Connection) -> Result<Vec<License>> {
    query_all(
        conn,
        &format!("SELECT {} FROM licenses ORDER BY issued_at", LICENSE_COLS),
        &[],
    )
}

/// Persist a new activation: the grown identity set, the used marker, and
/// the last-used bookkeeping.
pub fn record_activation(
    conn: &Connection,
    key: &str,
    identities: &[String],
    identity: &str,
    at: i64,
) -> Result<()> {
    let identities_json = serde_json::to_string(identities)
        .map_err(|e| crate::error::AppError::Internal(format!("serialize identities: {e}")))?;
    conn.execute(
        "UPDATE licenses
         SET activated_identities = ?2, used = 1, last_used_by = ?3, last_used_at = ?4
         WHERE license_key = ?1",
        params![key, identities_json, identity, at],
    )?;
    Ok(())
}

/// Refresh last-used bookkeeping only; the identity set is untouched.
pub fn record_reaccess(conn: &Connection, key: &str, identity: &str, at: i64) -> Result<()> {
    conn.execute(
        "UPDATE licenses SET last_used_by = ?2, last_used_at = ?3 WHERE license_key = ?1",
        params![key, identity, at],
    )?;
    Ok(())
}

/// Set valid = false. Returns false when no row matched the key.
pub fn revoke_license(conn: &Connection, key: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE licenses SET valid = 0 WHERE license_key = ?1",
        params![key],
    )?;
    Ok(affected > 0)
}

// ============ Users ============

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRecord>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

pub fn insert_user(
    conn: &Connection,
    email: &str,
    display_name: Option<&str>,
    license_key: &str,
    at: i64,
) -> Result<UserRecord> {
    conn.execute(
        "INSERT INTO users (email, display_name, license_key, first_seen_at, last_seen_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![email, display_name, license_key, at],
    )?;
    Ok(UserRecord {
        email: email.to_string(),
        display_name: display_name.map(String::from),
        license_key: Some(license_key.to_string()),
        first_seen_at: at,
        last_seen_at: at,
    })
}

/// Merge a new sighting onto an existing record. first_seen_at is never
/// touched; display_name is only overwritten when a new one is provided.
pub fn update_user_sighting(
    conn: &Connection,
    email: &str,
    display_name: Option<&str>,
    license_key: &str,
    at: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE users
         SET display_name = COALESCE(?2, display_name), license_key = ?3, last_seen_at = ?4
         WHERE email = ?1",
        params![email, display_name, license_key, at],
    )?;
    Ok(())
}

pub fn list_users(conn: &Connection) -> Result<Vec<UserRecord>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY first_seen_at", USER_COLS),
        &[],
    )
}

// ============ AppConfig ============

pub fn get_config_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn set_config_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO app_config (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
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
    fn insert_and_fetch_license_round_trips() {
        let conn = test_conn();
        let created = insert_license(
            &conn,
            &CreateLicense {
                max_activations: 3,
                expires_at: Some(now() + 86400),
            },
        )
        .unwrap();

        let fetched = get_license_by_key(&conn, &created.license_key)
            .unwrap()
            .unwrap();
        assert_eq!(fetched.max_activations, 3);
        assert!(fetched.valid);
        assert!(!fetched.used);
        assert!(fetched.activated_identities.is_empty());
    }

    #[test]
    fn unknown_key_is_none() {
        let conn = test_conn();
        assert!(get_license_by_key(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn revoke_reports_missing_rows() {
        let conn = test_conn();
        assert!(!revoke_license(&conn, "missing").unwrap());

        let license = insert_license(
            &conn,
            &CreateLicense {
                max_activations: 1,
                expires_at: None,
            },
        )
        .unwrap();
        assert!(revoke_license(&conn, &license.license_key).unwrap());
        let fetched = get_license_by_key(&conn, &license.license_key)
            .unwrap()
            .unwrap();
        assert!(!fetched.valid);
    }

    #[test]
    fn config_values_upsert() {
        let conn = test_conn();
        assert_eq!(get_config_value(&conn, "maintenance_mode").unwrap(), None);
        set_config_value(&conn, "maintenance_mode", "true").unwrap();
        set_config_value(&conn, "maintenance_mode", "false").unwrap();
        assert_eq!(
            get_config_value(&conn, "maintenance_mode").unwrap().as_deref(),
            Some("false")
        );
    }
}
