//! Request tokens for discarding superseded responses
//!
//! Each result slot (market page, chart history) owns a sequencer. Starting
//! a request issues a ticket carrying the next sequence number; a response
//! may only be committed while its ticket is still the latest one issued.
//! Callers check and commit under the slot's write lock so a newer request
//! cannot slip in between.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// What happened to a fetched result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commit {
    /// The result replaced the slot's contents
    Applied,
    /// A newer request was issued meanwhile; the result was dropped
    Superseded,
    /// Nothing was requested (e.g. previous page while on page 1)
    Unchanged,
}

/// Proof of a started request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    /// Logical key of the request (page number or asset id)
    pub key: String,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier one
    pub fn issue(&self, key: impl Into<String>) -> RequestTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            seq,
            key: key.into(),
        }
    }

    /// True if no newer ticket has been issued
    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }
}
