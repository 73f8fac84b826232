//! Row mapping for the typed record types.
//!
//! Each model implements `FromRow` against a fixed column list, so field
//! access is validated at startup (see `schema::verify_schema`) instead of
//! resolved dynamically per request.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::{License, UserRecord};

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub const LICENSE_COLS: &str = "license_key, max_activations, activated_identities, used, valid, issued_at, expires_at, last_used_by, last_used_at";

pub const USER_COLS: &str = "email, display_name, license_key, first_seen_at, last_seen_at";

/// Parse the JSON identity array, treating corrupt data as a column error
/// rather than panicking.
fn parse_identities(row: &Row, col: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(col)?;
    serde_json::from_str(&raw).map_err(|_| {
        rusqlite::Error::InvalidColumnType(
            col,
            "activated_identities".to_string(),
            rusqlite::types::Type::Text,
        )
    })
}

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            license_key: row.get(0)?,
            max_activations: row.get(1)?,
            activated_identities: parse_identities(row, 2)?,
            used: row.get(3)?,
            valid: row.get(4)?,
            issued_at: row.get(5)?,
            expires_at: row.get(6)?,
            last_used_by: row.get(7)?,
            last_used_at: row.get(8)?,
        })
    }
}

impl FromRow for UserRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(UserRecord {
            email: row.get(0)?,
            display_name: row.get(1)?,
            license_key: row.get(2)?,
            first_seen_at: row.get(3)?,
            last_seen_at: row.get(4)?,
        })
    }
}
