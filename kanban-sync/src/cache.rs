//! Board cache staleness tracking
//!
//! A board is marked stale whenever a remote write settles successfully. The
//! session refetches a stale board the next time it is read while nothing is
//! in flight.

use crate::types::BoardId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cache state of one board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Local state may differ from the server
    pub stale: bool,
    /// Last successful refetch
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Shared staleness map keyed by board
#[derive(Debug, Clone, Default)]
pub struct SyncCache {
    entries: Arc<Mutex<HashMap<BoardId, CacheEntry>>>,
}

impl SyncCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a board for refetch
    pub fn mark_stale(&self, board_id: &BoardId) {
        self.lock().entry(board_id.clone()).or_default().stale = true;
    }

    /// Record a completed refetch
    pub fn mark_fresh(&self, board_id: &BoardId) {
        let mut entries = self.lock();
        let entry = entries.entry(board_id.clone()).or_default();
        entry.stale = false;
        entry.refreshed_at = Some(Utc::now());
    }

    /// Boards never fetched count as stale
    pub fn is_stale(&self, board_id: &BoardId) -> bool {
        self.lock()
            .get(board_id)
            .map(|entry| entry.stale || entry.refreshed_at.is_none())
            .unwrap_or(true)
    }

    pub fn entry(&self, board_id: &BoardId) -> Option<CacheEntry> {
        self.lock().get(board_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BoardId, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_board_is_stale() {
        let cache = SyncCache::new();
        assert!(cache.is_stale(&"b".into()));
        assert!(cache.entry(&"b".into()).is_none());
    }

    #[test]
    fn test_stale_fresh_cycle() {
        let cache = SyncCache::new();
        let board: BoardId = "b".into();

        cache.mark_fresh(&board);
        assert!(!cache.is_stale(&board));
        assert!(cache.entry(&board).unwrap().refreshed_at.is_some());

        cache.mark_stale(&board);
        assert!(cache.is_stale(&board));
    }

    #[test]
    fn test_clones_share_state() {
        let cache = SyncCache::new();
        let other = cache.clone();
        cache.mark_fresh(&"b".into());
        assert!(!other.is_stale(&"b".into()));
    }
}
