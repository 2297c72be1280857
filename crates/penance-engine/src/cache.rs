//! Shared evaluation memo.
//!
//! Identical positions recur within a game (and across games when the
//! cache outlives one), so every evaluator call goes through this memo
//! first. A missing entry only costs an extra engine call; it can never
//! change a classification outcome.
//!
//! The cache is shared between analysis workers. A check-then-insert
//! race between two workers requesting the same uncached position is
//! benign: both evaluate, the second store wins, and both results are
//! identical by engine determinism at fixed depth.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::debug;

use crate::{position::Fingerprint, score::EngineEval};

/// Cache key: position identity plus search depth.
///
/// Depth is part of the key because the tactical detector evaluates at
/// a shallower depth than the main pass; answering a deep query with a
/// shallow entry would let cache state leak into classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvalKey {
    pub position: Fingerprint,
    pub depth: u32,
}

/// Concurrent position → evaluation memo. No eviction at game scope.
#[derive(Debug, Default)]
pub struct EvalCache {
    entries: Mutex<HashMap<EvalKey, EngineEval>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvalCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized evaluation for `key`, if present.
    ///
    /// # Panics
    ///
    /// Panics if another thread panicked while holding the cache lock.
    #[must_use]
    pub fn lookup(&self, key: &EvalKey) -> Option<EngineEval> {
        let entries = self.entries.lock().unwrap();
        let found = entries.get(key).cloned();
        drop(entries);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Memoizes an evaluation. Last write wins on concurrent stores of
    /// the same key.
    pub fn store(&self, key: EvalKey, eval: EngineEval) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, eval);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Emits hit/miss counters at debug level.
    pub fn log_stats(&self) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        debug!(hits, misses, entries = self.len(), "eval cache stats");
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc, thread};

    use crate::score::Score;

    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn key(depth: u32) -> EvalKey {
        EvalKey {
            position: Fingerprint::from_str(START_FEN).unwrap(),
            depth,
        }
    }

    fn eval(cp: i32) -> EngineEval {
        EngineEval {
            score: Score::Centipawns(cp),
            best_move: Some("e2e4".to_string()),
            pv: vec!["e2e4".to_string()],
        }
    }

    #[test]
    fn lookup_after_store() {
        let cache = EvalCache::new();
        assert_eq!(cache.lookup(&key(12)), None);
        cache.store(key(12), eval(30));
        assert_eq!(cache.lookup(&key(12)), Some(eval(30)));
    }

    #[test]
    fn depth_splits_entries() {
        let cache = EvalCache::new();
        cache.store(key(12), eval(30));
        assert_eq!(cache.lookup(&key(2)), None);
    }

    #[test]
    fn concurrent_stores_do_not_corrupt() {
        let cache = Arc::new(EvalCache::new());
        thread::scope(|s| {
            for cp in 0..8 {
                let cache = Arc::clone(&cache);
                s.spawn(move || {
                    for _ in 0..100 {
                        cache.store(key(12), eval(cp));
                        let _ = cache.lookup(&key(12));
                    }
                });
            }
        });
        // Whatever won the race, the entry is one of the stored values.
        let got = cache.lookup(&key(12)).unwrap();
        assert!(matches!(got.score, Score::Centipawns(cp) if (0..8).contains(&cp)));
        assert_eq!(cache.len(), 1);
    }
}
