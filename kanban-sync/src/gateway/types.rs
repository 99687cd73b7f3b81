//! Wire types exchanged with the remote store.
//!
//! Field names are camelCase on the wire.

use crate::types::{Card, CardId, List, ListId};
use serde::{Deserialize, Serialize};

/// A list as returned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteList {
    pub id: ListId,
    pub title: String,
    pub position: i64,
    #[serde(default)]
    pub cards: Vec<RemoteCard>,
}

/// A card as returned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCard {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub position: i64,
    pub list_id: ListId,
}

/// Body of a list create or update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInput {
    pub title: String,
    pub position: i64,
}

/// Body of a card create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    pub title: String,
    pub position: i64,
}

/// Full card update, carrying its owning list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub list_id: ListId,
    pub position: i64,
}

/// One entry of a list reorder batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: ListId,
    pub position: i64,
}

impl ReorderEntry {
    /// Batch covering every persisted list in current order
    pub fn batch(lists: &[List]) -> Vec<Self> {
        lists
            .iter()
            .filter_map(|l| {
                l.id.persisted().map(|id| Self {
                    id: id.clone(),
                    position: l.position,
                })
            })
            .collect()
    }
}

impl From<&List> for ListInput {
    fn from(list: &List) -> Self {
        Self {
            title: list.title.clone(),
            position: list.position,
        }
    }
}

impl From<&Card> for CardInput {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            position: card.position,
        }
    }
}

impl From<&Card> for CardUpdate {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone(),
            completed: card.completed,
            list_id: card.list_id.clone(),
            position: card.position,
        }
    }
}

impl From<RemoteCard> for Card {
    fn from(remote: RemoteCard) -> Self {
        Card::new(remote.id, remote.list_id, remote.title, remote.position)
            .with_description(remote.description)
            .with_completed(remote.completed)
    }
}

impl From<RemoteList> for List {
    fn from(remote: RemoteList) -> Self {
        let mut cards: Vec<Card> = remote.cards.into_iter().map(Card::from).collect();
        cards.sort_by_key(|c| c.position);
        List::new(remote.id, remote.title, remote.position).with_cards(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_update_wire_shape() {
        let card = Card::new("c1", "l2", "Ship it", 4).with_completed(true);
        let value = serde_json::to_value(CardUpdate::from(&card)).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Ship it",
                "description": "",
                "completed": true,
                "listId": "l2",
                "position": 4
            })
        );
    }

    #[test]
    fn test_remote_list_conversion_sorts_cards() {
        let remote: RemoteList = serde_json::from_value(json!({
            "id": "l1",
            "title": "To Do",
            "position": 0,
            "cards": [
                {"id": "c2", "title": "B", "position": 1, "listId": "l1"},
                {"id": "c1", "title": "A", "position": 0, "listId": "l1", "completed": true}
            ]
        }))
        .unwrap();

        let list = List::from(remote);
        assert!(list.id.is(&ListId::from("l1")));
        assert_eq!(list.cards[0].title, "A");
        assert!(list.cards[0].completed);
    }

    #[test]
    fn test_reorder_batch_skips_placeholders() {
        let lists = vec![
            List::new("a", "A", 0),
            List::placeholder("New", 1),
            List::new("b", "B", 2),
        ];
        let batch = ReorderEntry::batch(&lists);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].id, ListId::from("b"));
        assert_eq!(batch[1].position, 2);
    }
}
