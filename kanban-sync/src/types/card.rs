//! Card type

use super::ids::{CardId, Identity, ListId};
use crate::position::Positioned;
use serde::{Deserialize, Serialize};

/// A card on the board. Belongs to exactly one list at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Identity<CardId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Dense index within the owning list
    pub position: i64,
    /// Owning list
    pub list_id: ListId,
}

impl Card {
    /// Create a persisted card
    pub fn new(
        id: impl Into<CardId>,
        list_id: impl Into<ListId>,
        title: impl Into<String>,
        position: i64,
    ) -> Self {
        Self {
            id: Identity::Persisted(id.into()),
            title: title.into(),
            description: String::new(),
            completed: false,
            position,
            list_id: list_id.into(),
        }
    }

    /// Create a placeholder card awaiting its server identity
    pub fn placeholder(list_id: ListId, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: Identity::placeholder(),
            title: title.into(),
            description: String::new(),
            completed: false,
            position,
            list_id,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set completion
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

impl Positioned for Card {
    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}
