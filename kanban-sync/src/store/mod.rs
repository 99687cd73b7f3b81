//! Local board state store
//!
//! In-memory mirror of the server's lists and cards for one board. Every
//! mutation is synchronous, applies completely or not at all, and is
//! published to subscribers before the call returns.

mod snapshot;

pub use snapshot::{ListSlot, Snapshot};

use crate::error::{Result, SyncError};
use crate::position::{self, Placement};
use crate::types::{Board, BoardId, Card, CardId, List, ListId, PlaceholderSlot, TempId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

/// A server record replacing a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    List(List),
    Card(Card),
}

/// Shared handle to the board graph. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct BoardStore {
    state: Arc<watch::Sender<Board>>,
}

impl BoardStore {
    /// Create a store holding `board`
    pub fn new(board: Board) -> Self {
        let (state, _) = watch::channel(board);
        Self {
            state: Arc::new(state),
        }
    }

    /// Create a store with an empty board
    pub fn empty(board_id: impl Into<BoardId>) -> Self {
        Self::new(Board::new(board_id))
    }

    /// The board this store mirrors
    pub fn board_id(&self) -> BoardId {
        self.state.borrow().id.clone()
    }

    /// Current list/card graph
    pub fn get_board(&self) -> Board {
        self.state.borrow().clone()
    }

    /// Read the graph without cloning it.
    ///
    /// The closure must not call back into the store.
    pub fn read<R>(&self, f: impl FnOnce(&Board) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Receive a fresh board after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Board> {
        self.state.subscribe()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Capture the order of the list collection
    pub fn snapshot_list_order(&self) -> Snapshot {
        self.read(Snapshot::list_order)
    }

    /// Capture full copies of the given lists
    pub fn snapshot_lists(&self, ids: &[&ListId]) -> Result<Snapshot> {
        self.read(|board| {
            let mut lists = Vec::with_capacity(ids.len());
            for id in ids {
                if lists.iter().any(|l: &List| l.id.is(id)) {
                    continue;
                }
                let list = board
                    .find_list(id)
                    .ok_or_else(|| SyncError::list_not_found(id))?;
                lists.push(list.clone());
            }
            Ok(Snapshot::Lists(lists))
        })
    }

    /// Return the affected collections to a captured state
    pub fn restore(&self, snapshot: Snapshot) {
        debug!(scope = snapshot.scope(), "restoring snapshot");
        self.state.send_modify(|board| snapshot.restore_into(board));
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace the board contents with server state
    pub fn load(&self, lists: Vec<List>) {
        debug!(lists = lists.len(), "loading board from server");
        self.state.send_modify(|board| {
            let id = board.id.clone();
            *board = Board::new(id).with_lists(lists);
        });
    }

    /// Replace the list collection with a new ordering
    pub fn apply_list_order(&self, lists: Vec<List>) {
        trace!(lists = lists.len(), "applying list order");
        self.state.send_modify(|board| board.lists = lists);
    }

    /// Move a card within a list or across lists.
    ///
    /// `new_index` defaults to the end of the target list. Returns
    /// [`Placement::Unchanged`] without notifying when nothing moved.
    pub fn apply_card_move(
        &self,
        card_id: &CardId,
        source_list_id: &ListId,
        target_list_id: &ListId,
        new_index: Option<usize>,
    ) -> Result<Placement> {
        self.mutate(|board| {
            let source = board
                .list_index(source_list_id)
                .ok_or_else(|| SyncError::list_not_found(source_list_id))?;
            let target = board
                .list_index(target_list_id)
                .ok_or_else(|| SyncError::list_not_found(target_list_id))?;
            let from = board.lists[source]
                .card_index(card_id)
                .ok_or_else(|| SyncError::card_not_found(card_id))?;

            let placement = if source == target {
                let cards = &mut board.lists[source].cards;
                let to = new_index.unwrap_or(cards.len().saturating_sub(1));
                position::reorder(cards, from, to)
            } else {
                let (source_list, target_list) = pair_mut(&mut board.lists, source, target);
                let placement = position::transfer(
                    &mut source_list.cards,
                    &mut target_list.cards,
                    from,
                    new_index,
                );
                if let Placement::Moved { index } = placement {
                    target_list.cards[index].list_id = target_list_id.clone();
                }
                placement
            };

            Ok((placement, placement.is_moved()))
        })
    }

    /// Swap a placeholder for the server record, keeping its slot
    pub fn replace_placeholder(&self, temp_id: TempId, entity: Entity) -> Result<()> {
        self.mutate(|board| {
            match (board.locate_placeholder(temp_id), entity) {
                (Some(PlaceholderSlot::List(li)), Entity::List(server)) => {
                    let list = &mut board.lists[li];
                    list.id = server.id;
                    list.title = server.title;
                    list.position = server.position;
                    if !server.cards.is_empty() {
                        list.cards = server.cards;
                    }
                }
                (Some(PlaceholderSlot::Card(li, ci)), Entity::Card(server)) => {
                    board.lists[li].cards[ci] = server;
                }
                (Some(_), _) => {
                    return Err(SyncError::invalid_value(
                        "entity",
                        format!("server record kind does not match placeholder {}", temp_id),
                    ))
                }
                (None, _) => {
                    return Err(SyncError::PlaceholderNotFound {
                        id: temp_id.to_string(),
                    })
                }
            }
            Ok(((), true))
        })
    }

    /// Append a list
    pub fn insert_list(&self, list: List) {
        trace!(list = %list.id, "inserting list");
        self.state.send_modify(|board| board.lists.push(list));
    }

    /// Append a card to a persisted list
    pub fn insert_card(&self, list_id: &ListId, card: Card) -> Result<()> {
        self.mutate(|board| {
            let index = board
                .list_index(list_id)
                .ok_or_else(|| SyncError::list_not_found(list_id))?;
            board.lists[index].cards.push(card);
            Ok(((), true))
        })
    }

    /// Edit a list in place, returning the edited copy
    pub fn update_list(&self, id: &ListId, f: impl FnOnce(&mut List)) -> Result<List> {
        self.mutate(|board| {
            let index = board
                .list_index(id)
                .ok_or_else(|| SyncError::list_not_found(id))?;
            let list = &mut board.lists[index];
            f(list);
            Ok((list.clone(), true))
        })
    }

    /// Edit a card in place, returning the edited copy
    pub fn update_card(&self, id: &CardId, f: impl FnOnce(&mut Card)) -> Result<Card> {
        self.mutate(|board| {
            let (li, ci) = board
                .locate_card(id)
                .ok_or_else(|| SyncError::card_not_found(id))?;
            let card = &mut board.lists[li].cards[ci];
            f(card);
            Ok((card.clone(), true))
        })
    }

    /// Remove a list, returning it
    pub fn remove_list(&self, id: &ListId) -> Result<List> {
        self.mutate(|board| {
            let index = board
                .list_index(id)
                .ok_or_else(|| SyncError::list_not_found(id))?;
            Ok((board.lists.remove(index), true))
        })
    }

    /// Run a fallible mutation; subscribers are notified only when the
    /// closure succeeds and reports a change. The closure must validate
    /// before it writes.
    fn mutate<R>(&self, f: impl FnOnce(&mut Board) -> Result<(R, bool)>) -> Result<R> {
        let mut outcome = None;
        self.state.send_if_modified(|board| {
            let result = f(board);
            let modified = matches!(result, Ok((_, true)));
            outcome = Some(result.map(|(value, _)| value));
            modified
        });
        outcome.unwrap_or_else(|| unreachable!("send_if_modified runs its closure once"))
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::is_dense;

    fn store() -> BoardStore {
        BoardStore::new(Board::new("board-1").with_lists(vec![
            List::new("x", "X", 0).with_cards(vec![
                Card::new("c1", "x", "One", 0),
                Card::new("c2", "x", "Two", 1),
                Card::new("c3", "x", "Three", 2),
            ]),
            List::new("y", "Y", 1).with_cards(vec![
                Card::new("c4", "y", "Four", 0),
                Card::new("c5", "y", "Five", 1),
            ]),
        ]))
    }

    #[test]
    fn test_cross_list_move() {
        let store = store();
        let placement = store
            .apply_card_move(&"c2".into(), &"x".into(), &"y".into(), Some(1))
            .unwrap();
        assert_eq!(placement, Placement::Moved { index: 1 });

        let board = store.get_board();
        let x = &board.lists[0];
        let y = &board.lists[1];
        assert_eq!(x.cards.len(), 2);
        assert_eq!(y.cards.len(), 3);
        assert!(is_dense(&x.cards));
        assert!(is_dense(&y.cards));
        assert_eq!(y.cards[1].title, "Two");
        assert_eq!(y.cards[1].list_id, ListId::from("y"));
    }

    #[test]
    fn test_same_list_noop_does_not_notify() {
        let store = store();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let placement = store
            .apply_card_move(&"c1".into(), &"x".into(), &"x".into(), Some(0))
            .unwrap();

        assert_eq!(placement, Placement::Unchanged);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_unknown_card_leaves_state_untouched() {
        let store = store();
        let before = store.get_board();

        let err = store
            .apply_card_move(&"nope".into(), &"x".into(), &"y".into(), None)
            .unwrap_err();

        assert!(matches!(err, SyncError::CardNotFound { .. }));
        assert_eq!(store.get_board(), before);
    }

    #[test]
    fn test_card_must_be_in_source_list() {
        let store = store();
        let err = store
            .apply_card_move(&"c4".into(), &"x".into(), &"y".into(), None)
            .unwrap_err();
        assert!(matches!(err, SyncError::CardNotFound { .. }));
    }

    #[test]
    fn test_restore_round_trip_after_move() {
        let store = store();
        let before = store.get_board();
        let snapshot = store.snapshot_lists(&[&"x".into(), &"y".into()]).unwrap();

        store
            .apply_card_move(&"c3".into(), &"x".into(), &"y".into(), Some(0))
            .unwrap();
        assert_ne!(store.get_board(), before);

        store.restore(snapshot);
        assert_eq!(store.get_board(), before);
    }

    #[test]
    fn test_snapshot_lists_deduplicates() {
        let store = store();
        let snapshot = store.snapshot_lists(&[&"x".into(), &"x".into()]).unwrap();
        assert!(matches!(snapshot, Snapshot::Lists(ref lists) if lists.len() == 1));
    }

    #[test]
    fn test_mutation_notifies_subscribers() {
        let store = store();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store
            .update_list(&"y".into(), |l| l.title = "Done".into())
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().lists[1].title, "Done");
    }

    #[test]
    fn test_replace_placeholder_keeps_slot() {
        let store = store();
        let placeholder = Card::placeholder("x".into(), "Draft", 3);
        let temp = placeholder.id.temp_id().unwrap();
        store.insert_card(&"x".into(), placeholder).unwrap();

        store
            .replace_placeholder(temp, Entity::Card(Card::new("c9", "x", "Draft", 3)))
            .unwrap();

        let board = store.get_board();
        assert!(board.lists[0].cards[3].id.is(&CardId::from("c9")));
        assert_eq!(board.card_count(), 6);
    }

    #[test]
    fn test_replace_placeholder_kind_mismatch() {
        let store = store();
        let placeholder = List::placeholder("Later", 2);
        let temp = placeholder.id.temp_id().unwrap();
        store.insert_list(placeholder);

        let err = store
            .replace_placeholder(temp, Entity::Card(Card::new("c9", "x", "Draft", 0)))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidValue { .. }));
        assert!(store.get_board().lists[2].id.is_placeholder());
    }

    #[test]
    fn test_replace_missing_placeholder() {
        let store = store();
        let err = store
            .replace_placeholder(TempId::new(), Entity::List(List::new("z", "Z", 2)))
            .unwrap_err();
        assert!(matches!(err, SyncError::PlaceholderNotFound { .. }));
    }

    #[test]
    fn test_remove_and_restore_list() {
        let store = store();
        let before = store.get_board();
        let snapshot = store.snapshot_lists(&[&"x".into()]).unwrap();

        store.remove_list(&"x".into()).unwrap();
        assert_eq!(store.get_board().lists.len(), 1);

        store.restore(snapshot);
        assert_eq!(store.get_board(), before);
    }

    #[test]
    fn test_load_sorts_server_state() {
        let store = store();
        store.load(vec![List::new("b", "B", 7), List::new("a", "A", 3)]);

        let board = store.get_board();
        assert_eq!(board.id, BoardId::from("board-1"));
        assert_eq!(board.lists[0].title, "A");
    }
}
