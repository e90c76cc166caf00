//! Recency list with per-entry TTL
//!
//! Slot arena with intrusive `prev`/`next` indices. The head is the
//! least recently touched entry, the tail the most recently touched one.
//! Nothing in here locks; [`crate::BoundedCache`] wraps it.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use ahash::RandomState;
use chrono::{DateTime, Utc};

/// Node in the recency list
struct Node<K, V> {
    key: K,
    value: V,
    last_touched: DateTime<Utc>,
    ttl: Duration,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K, V> Node<K, V> {
    /// Expiry is decided on whole seconds: the entry outlives
    /// `last_touched + ttl` by the rest of that second.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let deadline = self.last_touched.timestamp().saturating_add(ttl);
        now.timestamp() > deadline
    }
}

/// Entries removed by one eviction pass, split by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Evicted {
    pub capacity: u64,
    pub expired: u64,
}

impl Evicted {
    pub fn total(&self) -> u64 {
        self.capacity + self.expired
    }
}

/// Whether a touch created a new entry or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Touch {
    Inserted,
    Refreshed,
}

/// Recency-ordered entries with a fixed capacity
pub(crate) struct TtlLru<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> TtlLru<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty list; callers guarantee `capacity > 0`
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);

        Self {
            // One spare slot: an insert may overshoot before the eviction pass.
            map: HashMap::with_capacity_and_hasher(capacity + 1, RandomState::new()),
            nodes: Vec::with_capacity(capacity + 1),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Insert `key` at the tail, or overwrite it and move it there
    pub fn touch(&mut self, now: DateTime<Utc>, key: K, value: V, ttl: Duration) -> Touch {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = &mut self.nodes[idx] {
                node.value = value;
                node.last_touched = now;
                node.ttl = ttl;
            }
            self.move_to_tail(idx);
            return Touch::Refreshed;
        }

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            last_touched: now,
            ttl,
            prev: None,
            next: None,
        });
        self.link_tail(idx);
        self.map.insert(key, idx);

        Touch::Inserted
    }

    /// Look up `key`, marking it as touched at `now` on a hit
    pub fn get(&mut self, now: DateTime<Utc>, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        if let Some(node) = &mut self.nodes[idx] {
            node.last_touched = now;
        }
        self.move_to_tail(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Remove `key` from the list
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        self.free_node(idx);
        self.nodes[idx].take().map(|node| node.value)
    }

    /// Drop entries from the head while the list is over capacity or the
    /// head itself has expired. Entries behind a live head are not checked.
    pub fn evict(&mut self, now: DateTime<Utc>) -> Evicted {
        let mut evicted = Evicted::default();

        while let Some(head_idx) = self.head {
            let over_capacity = self.map.len() > self.capacity;
            let expired = self.nodes[head_idx]
                .as_ref()
                .is_some_and(|node| node.is_expired(now));

            if !over_capacity && !expired {
                break;
            }

            self.unlink(head_idx);
            self.free_node(head_idx);
            if let Some(node) = self.nodes[head_idx].take() {
                self.map.remove(&node.key);
                tracing::trace!(
                    last_touched = %node.last_touched,
                    ttl_secs = node.ttl.as_secs(),
                    over_capacity,
                    "evicted cache entry"
                );
            }

            if over_capacity {
                evicted.capacity += 1;
            } else {
                evicted.expired += 1;
            }
        }

        evicted
    }

    /// Number of entries, expired or not
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn move_to_tail(&mut self, idx: usize) {
        if self.tail == Some(idx) {
            return; // Already most recent
        }

        self.unlink(idx);
        self.link_tail(idx);
    }

    fn link_tail(&mut self, idx: usize) {
        let tail = self.tail.replace(idx);
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = tail;
            node.next = None;
        }

        match tail.and_then(|i| self.nodes[i].as_mut()) {
            Some(tail_node) => tail_node.next = Some(idx),
            None => self.head = Some(idx),
        }
    }

    /// Splice `idx` out of the list. Its own links go stale; `link_tail`
    /// overwrites them and removal drops the node.
    fn unlink(&mut self, idx: usize) {
        let Some(node) = &self.nodes[idx] else {
            return;
        };
        let (prev, next) = (node.prev, node.next);

        match prev.and_then(|i| self.nodes[i].as_mut()) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }

        match next.and_then(|i| self.nodes[i].as_mut()) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }

    fn alloc_node(&mut self) -> usize {
        self.free_list.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            self.nodes.len() - 1
        })
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}
