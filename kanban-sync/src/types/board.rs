//! Board-level types: Board and List

use super::card::Card;
use super::ids::{BoardId, CardId, Identity, ListId, TempId};
use crate::position::Positioned;
use serde::{Deserialize, Serialize};

/// The local mirror of one board: its lists in display order.
///
/// This is also the read model handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub lists: Vec<List>,
}

impl Board {
    /// Create an empty board
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self {
            id: id.into(),
            lists: Vec::new(),
        }
    }

    /// Set the lists, sorted by position
    pub fn with_lists(mut self, mut lists: Vec<List>) -> Self {
        lists.sort_by_key(|l| l.position);
        for list in &mut lists {
            list.cards.sort_by_key(|c| c.position);
        }
        self.lists = lists;
        self
    }

    /// Index of a persisted list
    pub fn list_index(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| l.id.is(id))
    }

    /// Index of a list by identity (placeholder or persisted)
    pub fn list_index_by_identity(&self, id: &Identity<ListId>) -> Option<usize> {
        self.lists.iter().position(|l| &l.id == id)
    }

    /// Find a persisted list
    pub fn find_list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| l.id.is(id))
    }

    /// Locate a persisted card: `(list index, card index)`
    pub fn locate_card(&self, id: &CardId) -> Option<(usize, usize)> {
        self.lists.iter().enumerate().find_map(|(li, list)| {
            list.card_index(id).map(|ci| (li, ci))
        })
    }

    /// Find a persisted card anywhere on the board
    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.locate_card(id)
            .map(|(li, ci)| &self.lists[li].cards[ci])
    }

    /// Locate any entity carrying the given placeholder id
    pub(crate) fn locate_placeholder(&self, temp: TempId) -> Option<PlaceholderSlot> {
        for (li, list) in self.lists.iter().enumerate() {
            if list.id.temp_id() == Some(temp) {
                return Some(PlaceholderSlot::List(li));
            }
            if let Some(ci) = list.cards.iter().position(|c| c.id.temp_id() == Some(temp)) {
                return Some(PlaceholderSlot::Card(li, ci));
            }
        }
        None
    }

    /// Next dense position for a new list
    pub fn next_list_position(&self) -> i64 {
        self.lists.len() as i64
    }

    /// Total number of cards on the board
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }
}

/// Where a placeholder entity currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaceholderSlot {
    List(usize),
    Card(usize, usize),
}

/// An ordered list of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: Identity<ListId>,
    pub title: String,
    /// Dense index within the board
    pub position: i64,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl List {
    /// Create a persisted, empty list
    pub fn new(id: impl Into<ListId>, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: Identity::Persisted(id.into()),
            title: title.into(),
            position,
            cards: Vec::new(),
        }
    }

    /// Create a placeholder list awaiting its server identity
    pub fn placeholder(title: impl Into<String>, position: i64) -> Self {
        Self {
            id: Identity::placeholder(),
            title: title.into(),
            position,
            cards: Vec::new(),
        }
    }

    /// Set the cards
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Index of a persisted card in this list
    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id.is(id))
    }

    /// Next dense position for a new card
    pub fn next_card_position(&self) -> i64 {
        self.cards.len() as i64
    }
}

impl Positioned for List {
    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new("b").with_lists(vec![
            List::new("l2", "Doing", 1).with_cards(vec![Card::new("c3", "l2", "Three", 0)]),
            List::new("l1", "To Do", 0).with_cards(vec![
                Card::new("c2", "l1", "Two", 1),
                Card::new("c1", "l1", "One", 0),
            ]),
        ])
    }

    #[test]
    fn test_with_lists_sorts_by_position() {
        let board = board();
        assert_eq!(board.lists[0].title, "To Do");
        assert_eq!(board.lists[0].cards[0].title, "One");
    }

    #[test]
    fn test_locate_card() {
        let board = board();
        assert_eq!(board.locate_card(&CardId::from("c3")), Some((1, 0)));
        assert_eq!(board.locate_card(&CardId::from("missing")), None);
        assert_eq!(board.find_card(&CardId::from("c2")).unwrap().title, "Two");
    }

    #[test]
    fn test_locate_placeholder() {
        let mut board = board();
        let placeholder = List::placeholder("New", 2);
        let temp = placeholder.id.temp_id().unwrap();
        board.lists.push(placeholder);

        assert_eq!(
            board.locate_placeholder(temp),
            Some(PlaceholderSlot::List(2))
        );
        assert_eq!(board.locate_placeholder(TempId::new()), None);
    }

    #[test]
    fn test_board_serialization_shape() {
        let json = serde_json::to_value(board()).unwrap();
        assert_eq!(json["lists"][0]["cards"][1]["title"], "Two");
        assert_eq!(json["lists"][1]["id"]["id"], "l2");
    }
}
