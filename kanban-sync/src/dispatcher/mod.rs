//! Mutation dispatcher
//!
//! Turns drag gestures into an immediate local change plus a remote write.
//! List reorders are debounced and coalesced into a single batch write. Card
//! moves are written right away, one outstanding write per card.

mod debounce;

use crate::error::{Result, SyncError};
use crate::gateway::{CardUpdate, CollectionGateway, ListInput, ReorderEntry};
use crate::position::{self, Placement};
use crate::reconcile::{MutationKind, PendingMutation, ReconciliationManager};
use crate::store::BoardStore;
use crate::types::{CardId, List, ListId};
use debounce::DebounceTimer;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

/// Why a gesture produced no change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ListNotFound,
    CardNotFound,
    /// The item would land where it already is
    Unchanged,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ListNotFound => "list not found",
            Self::CardNotFound => "card not found",
            Self::Unchanged => "position unchanged",
        })
    }
}

/// What happened to a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Applied locally; the remote write is waiting for the debounce window
    Scheduled,
    /// Applied locally and confirmed by the remote
    Confirmed,
    /// Nothing to do
    Skipped(SkipReason),
    /// Same as a gesture that has not settled yet
    Suppressed,
}

/// `(dragged, target)` of the last list gesture that has not settled
#[derive(Debug, Clone, PartialEq, Eq)]
struct SuppressionKey {
    dragged: ListId,
    target: ListId,
    seq: u64,
}

/// A list reorder waiting for its debounce window to close
#[derive(Debug)]
struct PendingListWrite {
    mutation: PendingMutation,
    dragged: ListId,
    seq: u64,
}

#[derive(Debug, Default)]
struct ListWriteState {
    seq: u64,
    last_key: Option<SuppressionKey>,
    pending: Option<PendingListWrite>,
    timer: DebounceTimer,
    writes: Vec<JoinHandle<()>>,
}

struct DispatcherInner {
    store: BoardStore,
    gateway: Arc<dyn CollectionGateway>,
    reconciler: ReconciliationManager,
    debounce: Duration,
    lists: Mutex<ListWriteState>,
    /// Serializes list order writes so at most one is outstanding
    list_write: tokio::sync::Mutex<()>,
    /// List writes spawned and not yet finished, queued ones included
    list_writes: Arc<AtomicUsize>,
    cards_in_flight: Arc<Mutex<HashSet<CardId>>>,
}

/// Removes a card from the in-flight set when its write settles
struct CardWriteGuard {
    cards: Arc<Mutex<HashSet<CardId>>>,
    id: CardId,
}

impl Drop for CardWriteGuard {
    fn drop(&mut self) {
        lock(&self.cards).remove(&self.id);
    }
}

/// Counts a list write from spawn until its task ends
struct ListWriteGuard(Arc<AtomicUsize>);

impl ListWriteGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ListWriteGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Dispatches drag gestures for one board
#[derive(Clone)]
pub struct MutationDispatcher {
    inner: Arc<DispatcherInner>,
}

impl fmt::Debug for MutationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationDispatcher")
            .field("debounce", &self.inner.debounce)
            .finish_non_exhaustive()
    }
}

impl MutationDispatcher {
    pub fn new(
        store: BoardStore,
        gateway: Arc<dyn CollectionGateway>,
        reconciler: ReconciliationManager,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                store,
                gateway,
                reconciler,
                debounce,
                lists: Mutex::new(ListWriteState::default()),
                list_write: tokio::sync::Mutex::new(()),
                list_writes: Arc::new(AtomicUsize::new(0)),
                cards_in_flight: Arc::new(Mutex::new(HashSet::new())),
            }),
        }
    }

    /// Debounce window for list reorders
    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    /// Move `dragged_id` to the index currently held by `target_id`.
    ///
    /// The new order is visible immediately. The remote write is sent once
    /// no further list gesture arrives within the debounce window. Must be
    /// called from within a Tokio runtime.
    #[instrument(skip_all, fields(dragged = %dragged_id, target = %target_id))]
    pub fn move_list(&self, dragged_id: &ListId, target_id: &ListId) -> MoveOutcome {
        let inner = &self.inner;
        let mut guard = lock(&inner.lists);
        let state = &mut *guard;

        let board = inner.store.get_board();
        let (from, to) = match (board.list_index(dragged_id), board.list_index(target_id)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                debug!("list gesture skipped: list not found");
                return MoveOutcome::Skipped(SkipReason::ListNotFound);
            }
        };
        if from == to {
            debug!("list gesture skipped: same index");
            return MoveOutcome::Skipped(SkipReason::Unchanged);
        }

        if let Some(key) = &state.last_key {
            if &key.dragged == dragged_id && &key.target == target_id {
                debug!(seq = key.seq, "list gesture suppressed: duplicate of unsettled move");
                return MoveOutcome::Suppressed;
            }
        }

        let snapshot = inner.store.snapshot_list_order();
        let mut lists = board.lists;
        if position::reorder(&mut lists, from, to) == Placement::Unchanged {
            return MoveOutcome::Skipped(SkipReason::Unchanged);
        }
        inner.store.apply_list_order(lists);

        state.seq += 1;
        let seq = state.seq;
        state.last_key = Some(SuppressionKey {
            dragged: dragged_id.clone(),
            target: target_id.clone(),
            seq,
        });

        match state.pending.as_mut() {
            // Coalesce: keep the snapshot taken before the first gesture
            Some(pending) => {
                pending.dragged = dragged_id.clone();
                pending.seq = seq;
            }
            None => {
                let mutation = inner
                    .reconciler
                    .begin(MutationKind::ReorderList, snapshot)
                    .keyed(format!("list-order:{}", inner.store.board_id()));
                state.pending = Some(PendingListWrite {
                    mutation,
                    dragged: dragged_id.clone(),
                    seq,
                });
            }
        }

        let timer_inner = Arc::clone(inner);
        state.timer.restart(inner.debounce, async move {
            timer_inner.fire_list_write();
        });
        debug!(from, to, seq, "list reorder scheduled");
        MoveOutcome::Scheduled
    }

    /// Move a card within its list or into another list.
    ///
    /// `drop_index` defaults to the end of the target list. The remote write
    /// is awaited; on failure both lists are restored and the error returned.
    #[instrument(
        skip_all,
        fields(card = %card_id, source = %source_list_id, target = %target_list_id, ?drop_index)
    )]
    pub async fn move_card(
        &self,
        card_id: &CardId,
        source_list_id: &ListId,
        target_list_id: &ListId,
        drop_index: Option<usize>,
    ) -> Result<MoveOutcome> {
        let inner = &self.inner;

        let check = inner.store.read(|board| {
            let source = board.find_list(source_list_id)?;
            let target = board.find_list(target_list_id);
            Some((source.card_index(card_id), target.map(|t| t.cards.len())))
        });
        let (from, target_len) = match check {
            None | Some((_, None)) => {
                debug!("card gesture skipped: list not found");
                return Ok(MoveOutcome::Skipped(SkipReason::ListNotFound));
            }
            Some((None, _)) => {
                debug!("card gesture skipped: card not in source list");
                return Ok(MoveOutcome::Skipped(SkipReason::CardNotFound));
            }
            Some((Some(from), Some(target_len))) => (from, target_len),
        };

        let same_list = source_list_id == target_list_id;
        if same_list {
            let to = drop_index
                .unwrap_or(target_len)
                .min(target_len.saturating_sub(1));
            if to == from {
                debug!("card gesture skipped: same index");
                return Ok(MoveOutcome::Skipped(SkipReason::Unchanged));
            }
        }

        let _guard = {
            let mut cards = lock(&inner.cards_in_flight);
            if !cards.insert(card_id.clone()) {
                debug!("card gesture suppressed: write already in flight");
                return Ok(MoveOutcome::Suppressed);
            }
            CardWriteGuard {
                cards: Arc::clone(&inner.cards_in_flight),
                id: card_id.clone(),
            }
        };

        let snapshot = inner
            .store
            .snapshot_lists(&[source_list_id, target_list_id])?;
        let placement =
            inner
                .store
                .apply_card_move(card_id, source_list_id, target_list_id, drop_index)?;
        if !placement.is_moved() {
            return Ok(MoveOutcome::Skipped(SkipReason::Unchanged));
        }

        let kind = if same_list {
            MutationKind::ReorderCard
        } else {
            MutationKind::MoveCard
        };
        let mutation = inner
            .reconciler
            .begin(kind, snapshot)
            .keyed(format!("card:{}", card_id));

        let card = inner
            .store
            .read(|board| board.find_card(card_id).cloned())
            .ok_or_else(|| SyncError::card_not_found(card_id))?;
        let update = CardUpdate::from(&card);
        trace!(position = update.position, list_id = %update.list_id, "sending card update");

        inner
            .reconciler
            .settle(mutation, inner.gateway.update_card(card_id, update))
            .await?;
        Ok(MoveOutcome::Confirmed)
    }

    /// Send any debounced write now and wait for every list write to settle
    pub async fn flush(&self) {
        let writes = {
            let mut state = lock(&self.inner.lists);
            state.timer.cancel();
            if let Some(pending) = state.pending.take() {
                let handle = self.inner.spawn_list_write(pending);
                state.writes.push(handle);
            }
            std::mem::take(&mut state.writes)
        };
        for handle in writes {
            if let Err(err) = handle.await {
                warn!(error = %err, "list write task failed");
            }
        }
    }

    /// Whether a list write is waiting or in flight, or a card write is in flight
    pub fn has_pending(&self) -> bool {
        let state = lock(&self.inner.lists);
        state.pending.is_some()
            || self.inner.list_writes.load(Ordering::SeqCst) > 0
            || !lock(&self.inner.cards_in_flight).is_empty()
    }
}

impl DispatcherInner {
    /// Debounce window closed: hand the pending reorder to its own task
    fn fire_list_write(self: Arc<Self>) {
        let mut state = lock(&self.lists);
        let Some(pending) = state.pending.take() else {
            return;
        };
        state.writes.retain(|h| !h.is_finished());
        let handle = self.spawn_list_write(pending);
        state.writes.push(handle);
    }

    fn spawn_list_write(self: &Arc<Self>, pending: PendingListWrite) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        let guard = ListWriteGuard::enter(&self.list_writes);
        tokio::spawn(async move {
            let _guard = guard;
            inner.write_list_order(pending).await
        })
    }

    async fn write_list_order(&self, pending: PendingListWrite) {
        let _serial = self.list_write.lock().await;
        let PendingListWrite {
            mutation,
            dragged,
            seq,
        } = pending;

        let (carrier, batch) = self.store.read(|board| {
            let carrier = board
                .find_list(&dragged)
                .or_else(|| board.lists.iter().find(|l| !l.id.is_placeholder()))
                .cloned();
            (carrier, ReorderEntry::batch(&board.lists))
        });

        match carrier.and_then(|list: List| list.id.persisted().cloned().map(|id| (id, list))) {
            Some((list_id, list)) => {
                debug!(list_id = %list_id, entries = batch.len(), "sending list reorder batch");
                let write = self
                    .gateway
                    .update_list(&list_id, ListInput::from(&list), Some(batch));
                if let Err(err) = self.reconciler.settle(mutation, write).await {
                    warn!(error = %err, "list reorder rolled back");
                }
            }
            None => self.reconciler.discard(mutation),
        }

        let mut state = lock(&self.lists);
        if state.last_key.as_ref().is_some_and(|key| key.seq == seq) {
            state.last_key = None;
        }
    }
}
