// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-capacity counter store with per-entry TTL and LRU eviction.
//!
//! Entries expire `ttl` after their last write. Reads refresh recency but
//! not the TTL. When more than `capacity` keys are held, the least recently
//! used key is evicted first.
//!
//! The store is not synchronized. Callers that share it across requests
//! wrap it in a lock and run each read-modify-write under that lock.

use crate::clock::Clock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A single tracked counter.
#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    expires_at: Instant,
    /// Recency stamp; higher means more recently used.
    tick: u64,
}

/// Capacity- and time-bounded map from key to request count.
pub struct CounterStore {
    entries: HashMap<String, Entry>,
    /// Recency index: tick -> key, oldest first.
    recency: BTreeMap<u64, String>,
    next_tick: u64,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CounterStore {
    pub const DEFAULT_CAPACITY: usize = 50;
    pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

    /// Create a store holding at most `capacity` keys (minimum 1), each
    /// living for `ttl` after its last write.
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            capacity: capacity.max(1),
            ttl,
            clock,
        }
    }

    /// Create a store with 50 keys and a one-minute TTL.
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self::new(Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL, clock)
    }

    /// Look up a live count, marking the key as recently used.
    pub fn get(&mut self, key: &str) -> Option<u32> {
        let now = self.clock.now();
        let entry = *self.entries.get(key)?;

        if entry.expires_at <= now {
            debug!(key, "Counter expired");
            self.remove(key);
            return None;
        }

        let tick = self.bump_tick();
        self.recency.remove(&entry.tick);
        self.recency.insert(tick, key.to_string());
        if let Some(e) = self.entries.get_mut(key) {
            e.tick = tick;
        }

        Some(entry.count)
    }

    /// Read a live count without touching recency.
    pub fn peek(&self, key: &str) -> Option<u32> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.count)
    }

    /// Store a count, restarting its TTL and marking it most recently used.
    pub fn set(&mut self, key: &str, count: u32) {
        let expires_at = self.clock.now() + self.ttl;
        let tick = self.bump_tick();

        if let Some(old) = self.entries.insert(
            key.to_string(),
            Entry {
                count,
                expires_at,
                tick,
            },
        ) {
            self.recency.remove(&old.tick);
        }
        self.recency.insert(tick, key.to_string());

        while self.entries.len() > self.capacity {
            self.evict_lru();
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.expires_at <= now)
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Number of keys held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn bump_tick(&mut self) -> u64 {
        self.next_tick += 1;
        self.next_tick
    }

    fn remove(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.recency.remove(&entry.tick);
        }
    }

    fn evict_lru(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            debug!(key = %key, "Evicting least recently used counter");
            self.entries.remove(&key);
        }
    }
}

impl fmt::Debug for CounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterStore")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
