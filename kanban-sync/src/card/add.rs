//! AddCard command

use crate::error::{Result, SyncError};
use crate::gateway::CardInput;
use crate::operation::{operation, require_title, Execute};
use crate::reconcile::MutationKind;
use crate::session::BoardSession;
use crate::store::{Entity, Snapshot};
use crate::types::{Card, Identity, ListId, TempId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

/// Append a card to the end of a list
#[derive(Debug, Deserialize, Serialize)]
pub struct AddCard {
    /// The owning list; must already be known to the server
    pub list: Identity<ListId>,
    /// The card title
    pub title: String,
}

operation!(
    AddCard,
    verb = "add",
    noun = "card",
    description = "Append a card to a list"
);

impl AddCard {
    /// Create a new AddCard command for a persisted list
    pub fn new(list_id: impl Into<ListId>, title: impl Into<String>) -> Self {
        Self::for_list(Identity::Persisted(list_id.into()), title)
    }

    /// Create a new AddCard command for any list identity
    pub fn for_list(list: Identity<ListId>, title: impl Into<String>) -> Self {
        Self {
            list,
            title: title.into(),
        }
    }
}

#[async_trait]
impl Execute<BoardSession, SyncError> for AddCard {
    #[instrument(skip_all, fields(list = %self.list, title = %self.title))]
    async fn execute(&self, ctx: &BoardSession) -> Result<Value> {
        let title = require_title(&self.title)?;
        let list_id = self
            .list
            .persisted()
            .ok_or_else(|| SyncError::not_persisted("list", &self.list))?;
        let store = ctx.store();

        let position = store
            .read(|b| b.find_list(list_id).map(|l| l.next_card_position()))
            .ok_or_else(|| SyncError::list_not_found(list_id))?;

        let temp = TempId::new();
        let mut placeholder = Card::placeholder(list_id.clone(), title, position);
        placeholder.id = Identity::Placeholder(temp);
        let input = CardInput::from(&placeholder);
        store.insert_card(list_id, placeholder)?;

        let mutation = ctx
            .reconciler()
            .begin(MutationKind::CreateCard, Snapshot::Placeholder(temp));
        let remote = ctx
            .reconciler()
            .settle(mutation, ctx.gateway().create_card(list_id, input))
            .await?;

        let card = Card::from(remote);
        if let Err(err) = store.replace_placeholder(temp, Entity::Card(card.clone())) {
            warn!(%temp, error = %err, "created card no longer on the board");
            ctx.cache().mark_stale(ctx.board_id());
        }
        Ok(serde_json::to_value(&card)?)
    }
}
