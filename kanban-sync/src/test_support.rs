//! Fixtures shared by unit tests

use crate::gateway::{InMemoryGateway, RemoteCard, RemoteList};
use crate::session::BoardSession;
use kanban_sync_config::SyncSettings;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const BOARD: &str = "board-1";

/// A remote list with cards titled after their ids
pub(crate) fn remote_list(id: &str, position: i64, cards: &[&str]) -> RemoteList {
    RemoteList {
        id: id.into(),
        title: id.to_uppercase(),
        position,
        cards: cards
            .iter()
            .enumerate()
            .map(|(i, card)| RemoteCard {
                id: (*card).into(),
                title: card.to_uppercase(),
                description: String::new(),
                completed: false,
                position: i as i64,
                list_id: id.into(),
            })
            .collect(),
    }
}

/// Open a session over an in-memory remote seeded with `lists`
pub(crate) async fn session(lists: Vec<RemoteList>) -> (Arc<InMemoryGateway>, BoardSession) {
    let gateway = Arc::new(InMemoryGateway::new().with_board(BOARD, lists));
    let settings = SyncSettings::default().with_list_debounce(Duration::from_millis(300));
    let session = BoardSession::open(BOARD, gateway.clone(), settings)
        .await
        .expect("session should open");
    gateway.clear_calls();
    (gateway, session)
}
