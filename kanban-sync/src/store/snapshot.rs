//! Pre-mutation snapshots
//!
//! A snapshot covers only the collection a mutation touches, so rolling one
//! mutation back never erases an unrelated change that confirmed meanwhile.

use crate::types::{Board, Identity, List, ListId, TempId};
use serde::Serialize;

/// Order slot of one list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSlot {
    pub id: Identity<ListId>,
    pub position: i64,
}

/// State captured before an optimistic mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "state", rename_all = "snake_case")]
pub enum Snapshot {
    /// Order and positions of the list collection; list contents untouched
    ListOrder(Vec<ListSlot>),
    /// Full copies of the affected lists, cards included
    Lists(Vec<List>),
    /// The placeholder with this id did not exist yet
    Placeholder(TempId),
}

impl Snapshot {
    /// Capture the list order of a board
    pub fn list_order(board: &Board) -> Self {
        Self::ListOrder(
            board
                .lists
                .iter()
                .map(|l| ListSlot {
                    id: l.id.clone(),
                    position: l.position,
                })
                .collect(),
        )
    }

    /// Short label for logs
    pub fn scope(&self) -> &'static str {
        match self {
            Self::ListOrder(_) => "list_order",
            Self::Lists(_) => "lists",
            Self::Placeholder(_) => "placeholder",
        }
    }

    /// Apply this snapshot onto `board`
    pub(crate) fn restore_into(self, board: &mut Board) {
        match self {
            Self::ListOrder(slots) => restore_list_order(board, slots),
            Self::Lists(lists) => {
                for list in lists {
                    restore_list(board, list);
                }
            }
            Self::Placeholder(temp) => remove_placeholder(board, temp),
        }
    }
}

fn restore_list_order(board: &mut Board, slots: Vec<ListSlot>) {
    let mut remaining = std::mem::take(&mut board.lists);
    let mut ordered = Vec::with_capacity(remaining.len());

    for slot in slots {
        if let Some(index) = remaining.iter().position(|l| l.id == slot.id) {
            let mut list = remaining.remove(index);
            list.position = slot.position;
            ordered.push(list);
        }
    }
    // Lists created after the capture keep their relative order at the end
    ordered.extend(remaining);
    board.lists = ordered;
}

fn restore_list(board: &mut Board, list: List) {
    match board.list_index_by_identity(&list.id) {
        Some(index) => board.lists[index] = list,
        None => {
            let index = board
                .lists
                .iter()
                .position(|l| l.position > list.position)
                .unwrap_or(board.lists.len());
            board.lists.insert(index, list);
        }
    }
}

fn remove_placeholder(board: &mut Board, temp: TempId) {
    use crate::types::PlaceholderSlot;

    match board.locate_placeholder(temp) {
        Some(PlaceholderSlot::List(li)) => {
            board.lists.remove(li);
        }
        Some(PlaceholderSlot::Card(li, ci)) => {
            board.lists[li].cards.remove(ci);
        }
        None => tracing::debug!(%temp, "placeholder already gone"),
    }
}
