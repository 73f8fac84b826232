//! The license state machine: issuance, redemption, revocation.
//!
//! A license moves from issued (empty identity set) through partially to
//! fully activated as distinct identities consume slots. Revocation is
//! terminal; expiry is derived from `expires_at` at read time, never stored
//! as a separate status. Revocation and expiry are checked before the
//! re-access shortcut, so they block previously-bound identities too.

use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{CreateLicense, License};

const SECONDS_PER_DAY: i64 = 86400;

/// How a redemption was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The identity consumed a fresh slot.
    NewActivation,
    /// The identity was already bound; no slot consumed.
    Reaccess,
}

#[derive(Debug)]
pub struct Redemption {
    pub grant: Grant,
    pub license: License,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    /// Revoking twice is a success, not an error.
    AlreadyRevoked,
}

/// Issue a fresh license key. Negative or zero validity produces an
/// already-expired key, which the issuing tooling uses for testing.
/// `validity_days` comes straight off the wire, so the expiry arithmetic
/// is checked rather than trusted.
pub fn issue(conn: &Connection, max_activations: u32, validity_days: i64) -> Result<License> {
    let expires_at = validity_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| queries::now().checked_add(secs))
        .ok_or_else(|| AppError::BadRequest("validityDays is out of range".into()))?;

    let input = CreateLicense {
        max_activations,
        expires_at: Some(expires_at),
    };
    queries::insert_license(conn, &input)
}

/// Evaluate a redemption request and persist its outcome.
///
/// Runs inside an IMMEDIATE transaction: the read-decide-write sequence
/// takes the store's write lock up front, so two requests racing on the
/// same key cannot both observe the last free slot and over-admit.
///
/// Check order is significant: re-access must be tested before the quota,
/// otherwise an already-bound identity would be rejected once other
/// identities fill the quota. Re-access is always free.
pub fn redeem(conn: &mut Connection, key: &str, identity: &str) -> Result<Redemption> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut license = queries::get_license_by_key(&tx, key)?
        .ok_or_else(|| AppError::NotFound("License key not found".into()))?;

    if !license.valid {
        return Err(AppError::Revoked);
    }

    let now = queries::now();
    if license.is_expired(now) {
        return Err(AppError::Expired);
    }

    let grant = if license.is_bound(identity) {
        queries::record_reaccess(&tx, key, identity, now)?;
        Grant::Reaccess
    } else if (license.activated_identities.len() as u32) < license.max_activations {
        license.activated_identities.push(identity.to_string());
        queries::record_activation(&tx, key, &license.activated_identities, identity, now)?;
        license.used = true;
        Grant::NewActivation
    } else {
        return Err(AppError::QuotaExhausted {
            max: license.max_activations,
        });
    };

    tx.commit()?;

    license.last_used_by = Some(identity.to_string());
    license.last_used_at = Some(now);

    Ok(Redemption { grant, license })
}

/// Set `valid = false`. Idempotent.
pub fn revoke(conn: &Connection, key: &str) -> Result<RevokeOutcome> {
    let license = queries::get_license_by_key(conn, key)?
        .ok_or_else(|| AppError::NotFound("License key not found".into()))?;

    if !license.valid {
        return Ok(RevokeOutcome::AlreadyRevoked);
    }

    queries::revoke_license(conn, key)?;
    Ok(RevokeOutcome::Revoked)
}
