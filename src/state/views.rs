//! Per-event view de-duplication
//!
//! Tracks which IP addresses have already been counted for each event so a
//! repeat visit from the same address does not inflate the view counter.
//! The tracker lives for the lifetime of the process and is injected into
//! the event service at construction time; restarting the service clears it.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, RwLock};

/// Process-lifetime set of already-counted viewer addresses, keyed by event id.
///
/// Entries are never evicted automatically; memory use grows with the number
/// of distinct (event, ip) pairs until `clear` or `clear_event` is called or
/// the process restarts.
#[derive(Debug, Clone, Default)]
pub struct ViewTracker {
    seen: Arc<RwLock<HashMap<i64, HashSet<IpAddr>>>>,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a view attempt; returns true only the first time the address
    /// is seen for this event.
    pub fn first_view(&self, event_id: i64, ip: IpAddr) -> bool {
        let mut seen = self.seen.write().expect("view tracker lock poisoned");
        seen.entry(event_id).or_default().insert(ip)
    }

    /// Number of distinct addresses counted for an event
    pub fn seen_count(&self, event_id: i64) -> usize {
        let seen = self.seen.read().expect("view tracker lock poisoned");
        seen.get(&event_id).map(|ips| ips.len()).unwrap_or(0)
    }

    /// Drop the tracked addresses for a single event
    pub fn clear_event(&self, event_id: i64) {
        let mut seen = self.seen.write().expect("view tracker lock poisoned");
        seen.remove(&event_id);
    }

    /// Drop all tracked addresses
    pub fn clear(&self) {
        let mut seen = self.seen.write().expect("view tracker lock poisoned");
        seen.clear();
    }
}
