//! MoveCard command

use crate::error::{Result, SyncError};
use crate::operation::{operation, Execute};
use crate::session::BoardSession;
use crate::types::{CardId, ListId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Move a card within its list or into another list
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveCard {
    pub id: CardId,
    /// The list the card is dragged from
    pub source: ListId,
    /// The list the card is dropped into
    pub target: ListId,
    /// Drop index in the target list; end of the list when absent
    pub index: Option<usize>,
}

operation!(
    MoveCard,
    verb = "move",
    noun = "card",
    description = "Move a card within or across lists"
);

impl MoveCard {
    /// Move to the end of `target`
    pub fn new(
        id: impl Into<CardId>,
        source: impl Into<ListId>,
        target: impl Into<ListId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            index: None,
        }
    }

    /// Drop at a specific index
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for MoveCard {
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let outcome = ctx
            .dispatcher()
            .move_card(&self.id, &self.source, &self.target, self.index)
            .await?;
        Ok(serde_json::to_value(outcome)?)
    }
}
