//! Healing lease rules applied to a single node record.
//!
//! The lease is a time-bound advisory lock: a crashed healer never strands a
//! node because `locked_until` eventually passes. The plain API
//! (`try_lock`/`extend`/`release`) trusts its caller. The token API checks
//! that the caller presents the token issued on acquisition.
//!
//! These functions take `now` explicitly and never read the clock themselves.

use crate::ClusterError;
use chrono::{DateTime, Utc};
use hangar_schema::{HealingData, LeaseToken, Node, NodeAddress};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static LEASE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Proof of a token-checked healing lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealingLease {
    pub address: NodeAddress,
    pub token: LeaseToken,
    pub locked_until: DateTime<Utc>,
    pub is_failure: bool,
}

pub fn deadline(now: DateTime<Utc>, timeout: Duration) -> Result<DateTime<Utc>, ClusterError> {
    let offset = chrono::Duration::from_std(timeout)
        .map_err(|e| ClusterError::InvalidTimeout(format!("{timeout:?}: {e}")))?;
    now.checked_add_signed(offset)
        .ok_or_else(|| ClusterError::InvalidTimeout(format!("{timeout:?} overflows the clock")))
}

fn new_token(address: &str, now: DateTime<Utc>) -> LeaseToken {
    let seq = LEASE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = now.timestamp_nanos_opt().unwrap_or_default();
    let digest = blake3::hash(format!("{address}:{nanos}:{seq}").as_bytes());
    LeaseToken::new(digest.to_hex().to_string())
}

/// Acquire the lease if it is free at `now`. Returns `false` without touching
/// the node when someone else still holds it.
pub fn try_lock(
    node: &mut Node,
    now: DateTime<Utc>,
    is_failure: bool,
    timeout: Duration,
) -> Result<bool, ClusterError> {
    if node.is_locked_at(now) {
        return Ok(false);
    }
    node.healing = HealingData {
        locked_until: Some(deadline(now, timeout)?),
        is_failure,
        token: None,
    };
    Ok(true)
}

/// Push the deadline to `now + timeout` regardless of who holds the lease.
pub fn extend(node: &mut Node, now: DateTime<Utc>, timeout: Duration) -> Result<(), ClusterError> {
    node.healing.locked_until = Some(deadline(now, timeout)?);
    Ok(())
}

pub fn release(node: &mut Node) {
    node.healing = HealingData::default();
}

pub fn acquire(
    node: &mut Node,
    now: DateTime<Utc>,
    is_failure: bool,
    timeout: Duration,
) -> Result<Option<HealingLease>, ClusterError> {
    if node.is_locked_at(now) {
        return Ok(None);
    }
    let locked_until = deadline(now, timeout)?;
    let token = new_token(&node.address, now);
    node.healing = HealingData {
        locked_until: Some(locked_until),
        is_failure,
        token: Some(token.clone()),
    };
    Ok(Some(HealingLease {
        address: node.address.clone(),
        token,
        locked_until,
        is_failure,
    }))
}

fn check_holder(node: &Node, lease: &HealingLease) -> Result<(), ClusterError> {
    if node.healing.token.as_ref() == Some(&lease.token) {
        Ok(())
    } else {
        Err(ClusterError::LeaseMismatch(node.address.to_string()))
    }
}

/// Extend a token-checked lease. An expired lease cannot be extended, even by
/// its former holder.
pub fn extend_lease(
    node: &mut Node,
    lease: &HealingLease,
    now: DateTime<Utc>,
    timeout: Duration,
) -> Result<HealingLease, ClusterError> {
    check_holder(node, lease)?;
    if !node.is_locked_at(now) {
        return Err(ClusterError::LeaseMismatch(node.address.to_string()));
    }
    let locked_until = deadline(now, timeout)?;
    node.healing.locked_until = Some(locked_until);
    Ok(HealingLease {
        locked_until,
        ..lease.clone()
    })
}

pub fn release_lease(node: &mut Node, lease: &HealingLease) -> Result<(), ClusterError> {
    check_holder(node, lease)?;
    release(node);
    Ok(())
}
