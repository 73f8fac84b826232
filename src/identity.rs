//! Reader identity bookkeeping, keyed by email.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::UserRecord;

/// Upsert a reader record after a granted redemption. Idempotent: a repeat
/// call with identical input refreshes `last_seen_at` and leaves
/// `first_seen_at` untouched.
pub fn upsert_on_redemption(
    conn: &Connection,
    email: &str,
    display_name: Option<&str>,
    license_key: &str,
) -> Result<UserRecord> {
    let now = queries::now();

    match queries::get_user_by_email(conn, email)? {
        Some(existing) => {
            queries::update_user_sighting(conn, email, display_name, license_key, now)?;
            Ok(UserRecord {
                email: existing.email,
                display_name: display_name
                    .map(String::from)
                    .or(existing.display_name),
                license_key: Some(license_key.to_string()),
                first_seen_at: existing.first_seen_at,
                last_seen_at: now,
            })
        }
        None => queries::insert_user(conn, email, display_name, license_key, now),
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
    fn repeat_upsert_keeps_one_record_and_first_seen() {
        let conn = test_conn();

        let first = upsert_on_redemption(&conn, "alice@x.com", Some("Alice"), "KEY-1").unwrap();
        let second = upsert_on_redemption(&conn, "alice@x.com", Some("Alice"), "KEY-1").unwrap();

        assert_eq!(second.first_seen_at, first.first_seen_at);
        assert!(second.last_seen_at >= first.last_seen_at);

        let all = queries::list_users(&conn).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn upsert_merges_new_name_and_license() {
        let conn = test_conn();

        upsert_on_redemption(&conn, "alice@x.com", Some("Alice"), "KEY-1").unwrap();
        let updated = upsert_on_redemption(&conn, "alice@x.com", Some("Alice B"), "KEY-2").unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Alice B"));
        assert_eq!(updated.license_key.as_deref(), Some("KEY-2"));
    }

    #[test]
    fn missing_name_preserves_existing_one() {
        let conn = test_conn();

        upsert_on_redemption(&conn, "alice@x.com", Some("Alice"), "KEY-1").unwrap();
        upsert_on_redemption(&conn, "alice@x.com", None, "KEY-1").unwrap();

        let record = queries::get_user_by_email(&conn, "alice@x.com")
            .unwrap()
            .unwrap();
        assert_eq!(record.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let conn = test_conn();

        upsert_on_redemption(&conn, "alice@x.com", None, "KEY-1").unwrap();
        upsert_on_redemption(&conn, "Alice@x.com", None, "KEY-1").unwrap();

        assert_eq!(queries::list_users(&conn).unwrap().len(), 2);
    }
}
