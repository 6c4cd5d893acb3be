//! Bounded token cache.
//!
//! ## Learning: Injectable Time
//!
//! Every method that depends on the clock takes `now: Instant` instead of
//! calling `Instant::now()` itself. Production code passes the real time;
//! tests pass `start + Duration::from_secs(61)` and check the idle sweep
//! without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::SyntaxToken;
use crate::highlighter::SyntaxConfig;

#[derive(Debug, Clone)]
struct Entry {
    tokens: Vec<SyntaxToken>,
    /// Insertion order, used for capacity eviction
    seq: u64,
    last_used: Instant,
}

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub sweeps: u64,
}

/// Token cache keyed by `(filename, line text)`.
///
/// Two policies bound its size:
/// - **Capacity**: inserting into a full cache first drops the oldest
///   `evict_ratio` share of entries
/// - **Idle sweep**: every `sweep_interval` the entries unused for at least
///   `idle_ttl` are dropped
#[derive(Debug)]
pub struct SyntaxCache {
    entries: HashMap<String, HashMap<String, Entry>>,
    len: usize,
    capacity: usize,
    evict_ratio: f64,
    sweep_interval: Duration,
    idle_ttl: Duration,
    next_seq: u64,
    last_sweep: Option<Instant>,
    stats: CacheStats,
}

impl SyntaxCache {
    /// Creates an empty cache with the limits from `config`.
    pub fn new(config: &SyntaxConfig) -> Self {
        Self {
            entries: HashMap::new(),
            len: 0,
            capacity: config.cache_capacity.max(1),
            evict_ratio: config.evict_ratio.clamp(0.0, 1.0),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
            next_seq: 0,
            last_sweep: None,
            stats: CacheStats::default(),
        }
    }

    /// Looks up cached tokens, refreshing the entry's last-use time.
    pub fn get(&mut self, filename: &str, text: &str, now: Instant) -> Option<Vec<SyntaxToken>> {
        let entry = self
            .entries
            .get_mut(filename)
            .and_then(|file| file.get_mut(text));
        match entry {
            Some(entry) => {
                entry.last_used = now;
                self.stats.hits += 1;
                Some(entry.tokens.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Stores tokens for a line, evicting first if the cache is full.
    pub fn insert(&mut self, filename: &str, text: &str, tokens: Vec<SyntaxToken>, now: Instant) {
        let exists = self
            .entries
            .get(filename)
            .is_some_and(|file| file.contains_key(text));
        if !exists && self.len >= self.capacity {
            self.evict_oldest();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let previous = self
            .entries
            .entry(filename.to_string())
            .or_default()
            .insert(
                text.to_string(),
                Entry {
                    tokens,
                    seq,
                    last_used: now,
                },
            );
        if previous.is_none() {
            self.len += 1;
        }
    }

    /// Drops the oldest `ceil(len * evict_ratio)` entries (at least one).
    fn evict_oldest(&mut self) {
        let count = ((self.len as f64 * self.evict_ratio).ceil() as usize).clamp(1, self.len);

        let mut order: Vec<(u64, String, String)> = self
            .entries
            .iter()
            .flat_map(|(file, lines)| {
                lines
                    .iter()
                    .map(move |(text, entry)| (entry.seq, file.clone(), text.clone()))
            })
            .collect();
        order.sort_unstable_by_key(|(seq, _, _)| *seq);

        for (_, file, text) in order.into_iter().take(count) {
            self.remove(&file, &text);
        }
        self.stats.evictions += count as u64;
        tracing::debug!("Syntax cache full, evicted {} entries", count);
    }

    fn remove(&mut self, filename: &str, text: &str) {
        if let Some(file) = self.entries.get_mut(filename) {
            if file.remove(text).is_some() {
                self.len -= 1;
            }
            if file.is_empty() {
                self.entries.remove(filename);
            }
        }
    }

    /// Removes every entry idle for at least `idle_ttl`. Returns the count.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let ttl = self.idle_ttl;
        let before = self.len;
        for file in self.entries.values_mut() {
            file.retain(|_, entry| now.saturating_duration_since(entry.last_used) < ttl);
        }
        self.entries.retain(|_, file| !file.is_empty());
        self.len = self.entries.values().map(HashMap::len).sum();
        self.last_sweep = Some(now);
        self.stats.sweeps += 1;

        let removed = before - self.len;
        if removed > 0 {
            tracing::debug!("Syntax cache sweep removed {} idle entries", removed);
        }
        removed
    }

    /// Sweeps if `sweep_interval` has elapsed since the last sweep.
    ///
    /// The first call only starts the interval.
    pub fn maybe_sweep(&mut self, now: Instant) -> usize {
        match self.last_sweep {
            None => {
                self.last_sweep = Some(now);
                0
            }
            Some(last) if now.saturating_duration_since(last) >= self.sweep_interval => {
                self.sweep(now)
            }
            Some(_) => 0,
        }
    }

    /// Number of cached lines across all files.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of entries before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenKind;

    fn config(capacity: usize) -> SyntaxConfig {
        SyntaxConfig {
            cache_capacity: capacity,
            ..SyntaxConfig::default()
        }
    }

    fn token() -> Vec<SyntaxToken> {
        vec![SyntaxToken::new(0, 1, TokenKind::Identifier)]
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = SyntaxCache::new(&config(10));
        let now = Instant::now();
        assert!(cache.get("a.ts", "x", now).is_none());
        cache.insert("a.ts", "x", token(), now);
        assert_eq!(cache.get("a.ts", "x", now), Some(token()));
        // Same text, different file: separate entry
        assert!(cache.get("b.ts", "x", now).is_none());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_capacity_evicts_oldest_share() {
        let mut cache = SyntaxCache::new(&config(10));
        let now = Instant::now();
        for i in 0..10 {
            cache.insert("a.ts", &format!("line {i}"), token(), now);
        }
        assert_eq!(cache.len(), 10);

        cache.insert("a.ts", "line 10", token(), now);
        // ceil(10 * 0.7) = 7 evicted, then one inserted
        assert_eq!(cache.len(), 4);
        assert!(cache.get("a.ts", "line 6", now).is_none());
        assert!(cache.get("a.ts", "line 7", now).is_some());
        assert!(cache.get("a.ts", "line 10", now).is_some());
        assert_eq!(cache.stats().evictions, 7);
    }

    #[test]
    fn test_reinsert_does_not_grow() {
        let mut cache = SyntaxCache::new(&config(2));
        let now = Instant::now();
        cache.insert("a.ts", "x", token(), now);
        cache.insert("a.ts", "x", token(), now);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_drops_idle_entries() {
        let mut cache = SyntaxCache::new(&config(10));
        let start = Instant::now();
        cache.insert("a.ts", "old", token(), start);
        cache.insert("a.ts", "fresh", token(), start);

        // Touch "fresh" halfway through the TTL
        cache.get("a.ts", "fresh", start + Duration::from_secs(30));

        let removed = cache.sweep(start + Duration::from_secs(61));
        assert_eq!(removed, 1);
        assert!(cache.get("a.ts", "old", start).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_maybe_sweep_respects_interval() {
        let mut cache = SyntaxCache::new(&config(10));
        let start = Instant::now();
        cache.insert("a.ts", "x", token(), start);

        assert_eq!(cache.maybe_sweep(start), 0);
        assert_eq!(cache.maybe_sweep(start + Duration::from_secs(10)), 0);
        assert_eq!(cache.stats().sweeps, 0);

        assert_eq!(cache.maybe_sweep(start + Duration::from_secs(90)), 1);
        assert_eq!(cache.stats().sweeps, 1);
        assert!(cache.is_empty());
    }
}
