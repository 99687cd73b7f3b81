//! Reconciliation of optimistic mutations with the remote store
//!
//! Every remote write runs through [`ReconciliationManager::settle`]. The
//! local change has already been applied when the write starts. On success
//! the board is marked stale so the next read can refetch it. On failure the
//! store is restored from the mutation's own snapshot and the error is both
//! returned and broadcast. Nothing is retried.

use crate::cache::SyncCache;
use crate::error::{Result, SyncError};
use crate::gateway::GatewayResult;
use crate::store::{BoardStore, Snapshot};
use crate::types::BoardId;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 256;

/// What a mutation changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    ReorderList,
    ReorderCard,
    MoveCard,
    CreateList,
    RenameList,
    DeleteList,
    CreateCard,
    UpdateCard,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReorderList => "reorder list",
            Self::ReorderCard => "reorder card",
            Self::MoveCard => "move card",
            Self::CreateList => "create list",
            Self::RenameList => "rename list",
            Self::DeleteList => "delete list",
            Self::CreateCard => "create card",
            Self::UpdateCard => "update card",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    OptimisticApplied,
    AwaitingServer,
    Confirmed,
    RolledBack,
}

/// Sequence number of a mutation within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MutationId(u64);

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m-{}", self.0)
    }
}

/// A locally applied mutation awaiting its remote outcome
#[derive(Debug, Clone)]
pub struct PendingMutation {
    pub id: MutationId,
    pub kind: MutationKind,
    /// Pre-mutation state of the affected collection
    pub snapshot: Snapshot,
    /// Logical target used for debouncing and duplicate suppression
    pub key: Option<String>,
    pub state: MutationState,
}

impl PendingMutation {
    /// Tag the mutation with its logical target
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Broadcast whenever a mutation settles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEvent {
    pub board_id: BoardId,
    pub mutation_id: MutationId,
    pub kind: MutationKind,
    pub state: MutationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decrements the in-flight count even when the settling future is dropped
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Applies the confirm/rollback half of every optimistic mutation
#[derive(Debug, Clone)]
pub struct ReconciliationManager {
    store: BoardStore,
    cache: SyncCache,
    events: broadcast::Sender<SyncEvent>,
    in_flight: Arc<AtomicUsize>,
    next_id: Arc<AtomicU64>,
    /// Bumped whenever a mutation begins, settles or is discarded
    generation: Arc<AtomicU64>,
}

impl ReconciliationManager {
    pub fn new(store: BoardStore, cache: SyncCache) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            cache,
            events,
            in_flight: Arc::new(AtomicUsize::new(0)),
            next_id: Arc::new(AtomicU64::new(1)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a mutation whose local change has just been applied
    pub fn begin(&self, kind: MutationKind, snapshot: Snapshot) -> PendingMutation {
        let id = MutationId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.bump();
        debug!(mutation_id = %id, %kind, scope = snapshot.scope(), "optimistic change applied");
        PendingMutation {
            id,
            kind,
            snapshot,
            key: None,
            state: MutationState::OptimisticApplied,
        }
    }

    /// Drop a mutation that never reached the remote
    pub fn discard(&self, pending: PendingMutation) {
        self.bump();
        debug!(
            mutation_id = %pending.id,
            kind = %pending.kind,
            "mutation discarded without a write"
        );
    }

    /// Await the remote write for `pending` and confirm or roll back.
    pub async fn settle<T, F>(&self, mut pending: PendingMutation, write: F) -> Result<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        pending.state = MutationState::AwaitingServer;
        let outcome = {
            let _guard = InFlight::enter(&self.in_flight);
            write.await
        };
        let board_id = self.store.board_id();
        self.bump();

        match outcome {
            Ok(value) => {
                pending.state = MutationState::Confirmed;
                self.cache.mark_stale(&board_id);
                info!(
                    mutation_id = %pending.id,
                    kind = %pending.kind,
                    key = pending.key.as_deref(),
                    "remote write confirmed"
                );
                self.emit(SyncEvent {
                    board_id,
                    mutation_id: pending.id,
                    kind: pending.kind,
                    state: pending.state,
                    error: None,
                });
                Ok(value)
            }
            Err(source) => {
                warn!(
                    mutation_id = %pending.id,
                    kind = %pending.kind,
                    error = %source,
                    "remote write failed, rolling back"
                );
                self.store.restore(pending.snapshot);
                self.emit(SyncEvent {
                    board_id,
                    mutation_id: pending.id,
                    kind: pending.kind,
                    state: MutationState::RolledBack,
                    error: Some(source.to_string()),
                });
                Err(SyncError::Rejected {
                    kind: pending.kind,
                    source,
                })
            }
        }
    }

    /// Number of remote writes currently awaiting the server
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Changes whenever local mutation activity happens.
    ///
    /// A remote read taken while this value moved may predate a write that
    /// has since been applied.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Subscribe to settle events
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn cache(&self) -> &SyncCache {
        &self.cache
    }

    fn emit(&self, event: SyncEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::types::{Board, List};

    fn manager() -> (BoardStore, ReconciliationManager) {
        let store = BoardStore::new(Board::new("b").with_lists(vec![
            List::new("a", "A", 0),
            List::new("b", "B", 1),
        ]));
        let manager = ReconciliationManager::new(store.clone(), SyncCache::new());
        (store, manager)
    }

    fn swap_lists(store: &BoardStore) {
        let mut lists = store.get_board().lists;
        crate::position::reorder(&mut lists, 0, 1);
        store.apply_list_order(lists);
    }

    #[test_log::test(tokio::test)]
    async fn test_confirm_marks_stale_and_keeps_change() {
        let (store, manager) = manager();
        let mut events = manager.events();
        manager.cache().mark_fresh(&"b".into());

        let pending = manager.begin(MutationKind::ReorderList, store.snapshot_list_order());
        swap_lists(&store);

        let value = manager
            .settle(pending, async { Ok::<_, GatewayError>(7) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(store.get_board().lists[0].title, "B");
        assert!(manager.cache().is_stale(&"b".into()));
        let event = events.recv().await.unwrap();
        assert_eq!(event.state, MutationState::Confirmed);
        assert_eq!(manager.in_flight(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_failure_restores_snapshot() {
        let (store, manager) = manager();
        let before = store.get_board();
        let mut events = manager.events();

        let pending = manager.begin(MutationKind::ReorderList, store.snapshot_list_order());
        swap_lists(&store);

        let err = manager
            .settle(pending, async { Err::<(), _>(GatewayError::Timeout) })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Rejected {
                kind: MutationKind::ReorderList,
                ..
            }
        ));
        assert_eq!(store.get_board(), before);
        let event = events.recv().await.unwrap();
        assert_eq!(event.state, MutationState::RolledBack);
        assert_eq!(event.error.as_deref(), Some("request timed out"));
    }

    #[test]
    fn test_mutation_ids_increase() {
        let (store, manager) = manager();
        let first = manager.begin(MutationKind::RenameList, store.snapshot_list_order());
        let second = manager.begin(MutationKind::RenameList, store.snapshot_list_order());
        assert!(second.id > first.id);
        assert_eq!(first.state, MutationState::OptimisticApplied);
        assert_eq!(second.keyed("list:a").key.as_deref(), Some("list:a"));
    }

    #[test_log::test(tokio::test)]
    async fn test_generation_moves_on_begin_and_settle() {
        let (store, manager) = manager();
        let start = manager.generation();

        let pending = manager.begin(MutationKind::RenameList, store.snapshot_list_order());
        let begun = manager.generation();
        assert!(begun > start);

        manager
            .settle(pending, async { Ok::<_, GatewayError>(()) })
            .await
            .unwrap();
        assert!(manager.generation() > begun);
    }
}
