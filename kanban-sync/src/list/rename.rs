//! RenameList command

use crate::error::{Result, SyncError};
use crate::gateway::ListInput;
use crate::operation::{operation, require_title, Execute};
use crate::reconcile::MutationKind;
use crate::session::BoardSession;
use crate::types::ListId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

/// Change a list's title
#[derive(Debug, Deserialize, Serialize)]
pub struct RenameList {
    pub id: ListId,
    /// The new title
    pub title: String,
}

operation!(
    RenameList,
    verb = "rename",
    noun = "list",
    description = "Change a list's title"
);

impl RenameList {
    pub fn new(id: impl Into<ListId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for RenameList {
    #[instrument(skip_all, fields(list_id = %self.id))]
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let title = require_title(&self.title)?;
        let store = ctx.store();

        let snapshot = store.snapshot_lists(&[&self.id])?;
        let list = store.update_list(&self.id, |list| list.title = title)?;

        let mutation = ctx.reconciler().begin(MutationKind::RenameList, snapshot);
        ctx.reconciler()
            .settle(
                mutation,
                ctx.gateway()
                    .update_list(&self.id, ListInput::from(&list), None),
            )
            .await?;
        Ok(serde_json::to_value(&list)?)
    }
}
