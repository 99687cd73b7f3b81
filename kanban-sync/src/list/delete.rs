//! DeleteList command

use crate::error::{Result, SyncError};
use crate::operation::{operation, Execute};
use crate::reconcile::MutationKind;
use crate::session::BoardSession;
use crate::types::ListId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

/// Remove a list and its cards
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteList {
    pub id: ListId,
}

operation!(
    DeleteList,
    verb = "delete",
    noun = "list",
    description = "Remove a list and its cards"
);

impl DeleteList {
    pub fn new(id: impl Into<ListId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for DeleteList {
    #[instrument(skip_all, fields(list_id = %self.id))]
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let store = ctx.store();

        let snapshot = store.snapshot_lists(&[&self.id])?;
        let removed = store.remove_list(&self.id)?;

        let mutation = ctx.reconciler().begin(MutationKind::DeleteList, snapshot);
        ctx.reconciler()
            .settle(mutation, ctx.gateway().delete_list(&self.id))
            .await?;
        Ok(json!({ "deleted": self.id, "cards": removed.cards.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remote_list, session, BOARD};

    #[test_log::test(tokio::test)]
    async fn test_delete_list() {
        let (gateway, session) =
            session(vec![remote_list("a", 0, &["c1", "c2"]), remote_list("b", 1, &[])]).await;

        let result = DeleteList::new("a").execute(&session).await.unwrap();

        assert_eq!(result["deleted"], "a");
        assert_eq!(result["cards"], 2);
        assert_eq!(session.read_model().lists.len(), 1);
        assert_eq!(gateway.lists(&BOARD.into()).len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_delete_reinserts_in_place() {
        let (gateway, session) = session(vec![
            remote_list("a", 0, &[]),
            remote_list("b", 1, &["c1"]),
            remote_list("c", 2, &[]),
        ])
        .await;
        let before = session.read_model();
        gateway.fail_next(1);

        let err = DeleteList::new("b").execute(&session).await.unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(session.read_model(), before);
    }
}
