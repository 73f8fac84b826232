//! Bookkey - license issuance and redemption server for ebook access
//!
//! Gates a digital product behind activation-limited license keys. A key is
//! issued with a quota of distinct identities (emails or IP addresses) and an
//! expiry date; redemption binds an identity to the key, and re-access by an
//! already-bound identity is always free.

pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod maintenance;
pub mod middleware;
pub mod models;
pub mod registry;
