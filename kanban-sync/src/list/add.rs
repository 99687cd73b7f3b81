//! AddList command

use crate::error::{Result, SyncError};
use crate::gateway::ListInput;
use crate::operation::{operation, require_title, Execute};
use crate::reconcile::MutationKind;
use crate::session::BoardSession;
use crate::store::{Entity, Snapshot};
use crate::types::{Identity, List, TempId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

/// Append a new list to the board
#[derive(Debug, Deserialize, Serialize)]
pub struct AddList {
    /// The list title
    pub title: String,
}

operation!(
    AddList,
    verb = "add",
    noun = "list",
    description = "Append a new list to the board"
);

impl AddList {
    /// Create a new AddList command
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for AddList {
    #[instrument(skip_all, fields(title = %self.title))]
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let title = require_title(&self.title)?;
        let store = ctx.store();

        // The placeholder is visible right away, at the end of the board
        let temp = TempId::new();
        let placeholder = List {
            id: Identity::Placeholder(temp),
            title,
            position: store.read(|b| b.next_list_position()),
            cards: Vec::new(),
        };
        let input = ListInput::from(&placeholder);
        store.insert_list(placeholder);

        let mutation = ctx
            .reconciler()
            .begin(MutationKind::CreateList, Snapshot::Placeholder(temp));
        let remote = ctx
            .reconciler()
            .settle(mutation, ctx.gateway().create_list(ctx.board_id(), input))
            .await?;

        let list = List::from(remote);
        if let Err(err) = store.replace_placeholder(temp, Entity::List(list.clone())) {
            warn!(%temp, error = %err, "created list no longer on the board");
            ctx.cache().mark_stale(ctx.board_id());
        }
        Ok(serde_json::to_value(&list)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remote_list, session, BOARD};
    use crate::types::ListId;

    #[test_log::test(tokio::test)]
    async fn test_add_list_replaces_placeholder() {
        let (gateway, session) = session(vec![remote_list("todo", 0, &[])]).await;

        let result = AddList::new("Doing").execute(&session).await.unwrap();
        let id = ListId::from_string(result["id"]["id"].as_str().unwrap());

        let board = session.read_model();
        assert_eq!(board.lists.len(), 2);
        assert!(board.lists[1].id.is(&id));
        assert_eq!(board.lists[1].position, 1);
        assert_eq!(gateway.lists(&BOARD.into())[1].title, "Doing");
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_create_removes_placeholder() {
        let (gateway, session) = session(vec![remote_list("todo", 0, &[])]).await;
        let before = session.read_model();
        gateway.fail_next(1);

        let err = AddList::new("Doing").execute(&session).await.unwrap_err();

        assert!(matches!(err, SyncError::Rejected { kind: MutationKind::CreateList, .. }));
        assert_eq!(session.read_model(), before);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let (gateway, session) = session(vec![]).await;
        let err = AddList::new("  ").execute(&session).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidValue { .. }));
        assert!(gateway.calls().is_empty());
    }
}
