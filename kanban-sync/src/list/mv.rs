//! MoveList command

use crate::error::{Result, SyncError};
use crate::operation::{operation, Execute};
use crate::session::BoardSession;
use crate::types::ListId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Drop a list onto another list's slot
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveList {
    /// The list being dragged
    pub dragged: ListId,
    /// The list whose index the dragged list takes
    pub target: ListId,
}

operation!(
    MoveList,
    verb = "move",
    noun = "list",
    description = "Drop a list onto another list's slot"
);

impl MoveList {
    pub fn new(dragged: impl Into<ListId>, target: impl Into<ListId>) -> Self {
        Self {
            dragged: dragged.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for MoveList {
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let outcome = ctx.dispatcher().move_list(&self.dragged, &self.target);
        Ok(serde_json::to_value(outcome)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{remote_list, session};

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_move_list_reports_outcome() {
        let (_gateway, session) =
            session(vec![remote_list("a", 0, &[]), remote_list("b", 1, &[])]).await;

        let result = MoveList::new("a", "b").execute(&session).await.unwrap();
        assert_eq!(result["outcome"], "scheduled");

        let result = MoveList::new("a", "missing")
            .execute(&session)
            .await
            .unwrap();
        assert_eq!(result["outcome"], "skipped");
        assert_eq!(result["reason"], "list_not_found");

        session.flush().await;
    }
}
