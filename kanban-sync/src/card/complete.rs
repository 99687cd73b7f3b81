//! CompleteCard command

use crate::error::{Result, SyncError};
use crate::gateway::CardUpdate;
use crate::operation::{operation, Execute};
use crate::reconcile::MutationKind;
use crate::session::BoardSession;
use crate::types::CardId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

/// Set or clear a card's completed flag
#[derive(Debug, Deserialize, Serialize)]
pub struct CompleteCard {
    pub id: CardId,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

operation!(
    CompleteCard,
    verb = "complete",
    noun = "card",
    description = "Mark a card as complete"
);

impl CompleteCard {
    /// Mark the card complete
    pub fn new(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            completed: true,
        }
    }

    /// Mark the card incomplete
    pub fn reopen(id: impl Into<CardId>) -> Self {
        Self {
            id: id.into(),
            completed: false,
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for CompleteCard {
    #[instrument(skip_all, fields(card_id = %self.id, completed = self.completed))]
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let store = ctx.store();

        let list_id = store
            .read(|b| b.find_card(&self.id).map(|c| c.list_id.clone()))
            .ok_or_else(|| SyncError::card_not_found(&self.id))?;
        let snapshot = store.snapshot_lists(&[&list_id])?;
        let completed = self.completed;
        let card = store.update_card(&self.id, |card| card.completed = completed)?;

        let mutation = ctx.reconciler().begin(MutationKind::UpdateCard, snapshot);
        ctx.reconciler()
            .settle(
                mutation,
                ctx.gateway().update_card(&self.id, CardUpdate::from(&card)),
            )
            .await?;
        Ok(serde_json::to_value(&card)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remote_list, session, BOARD};

    #[test_log::test(tokio::test)]
    async fn test_complete_and_reopen() {
        let (gateway, session) = session(vec![remote_list("todo", 0, &["c1"])]).await;

        let result = CompleteCard::new("c1").execute(&session).await.unwrap();
        assert_eq!(result["completed"], true);
        assert!(gateway.lists(&BOARD.into())[0].cards[0].completed);

        CompleteCard::reopen("c1").execute(&session).await.unwrap();
        assert!(!session.read_model().lists[0].cards[0].completed);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_completion_rolls_back() {
        let (gateway, session) = session(vec![remote_list("todo", 0, &["c1"])]).await;
        gateway.fail_next(1);

        let err = CompleteCard::new("c1").execute(&session).await.unwrap_err();

        assert!(matches!(err, SyncError::Rejected { kind: MutationKind::UpdateCard, .. }));
        assert!(!session.read_model().lists[0].cards[0].completed);
    }
}
