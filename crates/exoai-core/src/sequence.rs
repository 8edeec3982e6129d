//! # Request Sequencing
//!
//! Latest-wins bookkeeping for operations a user can re-trigger quickly
//! (changing the mission filter, paging). Each request takes a `Ticket`
//! carrying a per-key monotonic number; when its response arrives the caller
//! asks whether the ticket is still current and drops the response if a
//! newer request on the same key has been issued since.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Proof of issue for one request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub key: String,
    pub seq: u64,
}

/// Per-key monotonic counters.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Mutex<BTreeMap<String, u64>>,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn latest(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue the next ticket for `key`, superseding all earlier ones.
    pub fn issue(&self, key: &str) -> Ticket {
        let mut latest = self.latest();
        let seq = latest
            .get(key)
            .copied()
            .unwrap_or(0)
            .saturating_add(1);
        latest.insert(key.to_string(), seq);
        Ticket {
            key: key.to_string(),
            seq,
        }
    }

    /// Whether no newer ticket has been issued for the ticket's key.
    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest().get(&ticket.key).copied() == Some(ticket.seq)
    }
}
