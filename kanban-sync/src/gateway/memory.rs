//! In-process remote store
//!
//! Behaves like the real remote: assigns identifiers, applies reorder
//! batches and keeps positions dense. Every call is recorded and failures
//! can be injected, which makes it the backbone of offline sessions and
//! tests.

use super::error::GatewayError;
use super::types::{CardInput, CardUpdate, ListInput, RemoteCard, RemoteList, ReorderEntry};
use super::{CollectionGateway, GatewayResult};
use crate::types::{BoardId, CardId, ListId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace};
use ulid::Ulid;

/// A call received by [`InMemoryGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    FetchBoard(BoardId),
    CreateList {
        board_id: BoardId,
        input: ListInput,
    },
    UpdateList {
        list_id: ListId,
        input: ListInput,
        reorder: Option<Vec<ReorderEntry>>,
    },
    DeleteList(ListId),
    CreateCard {
        list_id: ListId,
        input: CardInput,
    },
    UpdateCard {
        card_id: CardId,
        update: CardUpdate,
    },
}

impl GatewayCall {
    /// Whether this call writes to the remote
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::FetchBoard(_))
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    boards: HashMap<BoardId, Vec<RemoteList>>,
    calls: Vec<GatewayCall>,
    failures: usize,
    latency: Duration,
}

impl RemoteState {
    fn board_of(&self, list_id: &ListId) -> Option<BoardId> {
        self.boards
            .iter()
            .find(|(_, lists)| lists.iter().any(|l| &l.id == list_id))
            .map(|(board_id, _)| board_id.clone())
    }

    fn list_mut(&mut self, list_id: &ListId) -> Option<&mut RemoteList> {
        self.boards
            .values_mut()
            .flat_map(|lists| lists.iter_mut())
            .find(|l| &l.id == list_id)
    }

    fn locate_card(&self, card_id: &CardId) -> Option<(BoardId, usize, usize)> {
        self.boards.iter().find_map(|(board_id, lists)| {
            lists.iter().enumerate().find_map(|(li, list)| {
                list.cards
                    .iter()
                    .position(|c| &c.id == card_id)
                    .map(|ci| (board_id.clone(), li, ci))
            })
        })
    }
}

fn renumber_lists(lists: &mut [RemoteList]) {
    lists.sort_by_key(|l| l.position);
    for (index, list) in lists.iter_mut().enumerate() {
        list.position = index as i64;
    }
}

fn renumber_cards(cards: &mut [RemoteCard]) {
    for (index, card) in cards.iter_mut().enumerate() {
        card.position = index as i64;
    }
}

fn slot(position: i64, len: usize) -> usize {
    usize::try_from(position).unwrap_or(0).min(len)
}

/// Remote store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<RemoteState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a board with lists and cards
    pub fn with_board(self, board_id: impl Into<BoardId>, lists: Vec<RemoteList>) -> Self {
        self.seed(board_id, lists);
        self
    }

    /// Replace the remote contents of a board
    pub fn seed(&self, board_id: impl Into<BoardId>, mut lists: Vec<RemoteList>) {
        renumber_lists(&mut lists);
        for list in &mut lists {
            list.cards.sort_by_key(|c| c.position);
            renumber_cards(&mut list.cards);
        }
        self.lock().boards.insert(board_id.into(), lists);
    }

    /// Fail the next `count` calls with [`GatewayError::Injected`]
    pub fn fail_next(&self, count: usize) {
        self.lock().failures = count;
    }

    /// Delay every call by `latency` before it takes effect
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Calls that write to the remote
    pub fn writes(&self) -> Vec<GatewayCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current remote contents of a board
    pub fn lists(&self, board_id: &BoardId) -> Vec<RemoteList> {
        self.lock()
            .boards
            .get(board_id)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and return the configured latency
    fn record(&self, call: GatewayCall) -> Duration {
        trace!(?call, "in-memory remote received call");
        let mut state = self.lock();
        state.calls.push(call);
        state.latency
    }

    /// Wait out the latency, then consume an injected failure if one is armed
    async fn settle(&self, latency: Duration, operation: &str) -> GatewayResult<()> {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        if state.failures > 0 {
            state.failures -= 1;
            debug!(operation, remaining = state.failures, "injecting failure");
            return Err(GatewayError::Injected(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionGateway for InMemoryGateway {
    async fn fetch_board(&self, board_id: &BoardId) -> GatewayResult<Vec<RemoteList>> {
        let latency = self.record(GatewayCall::FetchBoard(board_id.clone()));
        self.settle(latency, "fetch_board").await?;
        Ok(self.lists(board_id))
    }

    async fn create_list(&self, board_id: &BoardId, input: ListInput) -> GatewayResult<RemoteList> {
        let latency = self.record(GatewayCall::CreateList {
            board_id: board_id.clone(),
            input: input.clone(),
        });
        self.settle(latency, "create_list").await?;

        let mut state = self.lock();
        let lists = state.boards.entry(board_id.clone()).or_default();
        let list = RemoteList {
            id: ListId::from_string(Ulid::new().to_string()),
            title: input.title,
            position: input.position,
            cards: Vec::new(),
        };
        let index = slot(input.position, lists.len());
        lists.insert(index, list.clone());
        for (i, l) in lists.iter_mut().enumerate() {
            l.position = i as i64;
        }
        Ok(RemoteList {
            position: index as i64,
            ..list
        })
    }

    async fn update_list(
        &self,
        list_id: &ListId,
        input: ListInput,
        reorder: Option<Vec<ReorderEntry>>,
    ) -> GatewayResult<RemoteList> {
        let latency = self.record(GatewayCall::UpdateList {
            list_id: list_id.clone(),
            input: input.clone(),
            reorder: reorder.clone(),
        });
        self.settle(latency, "update_list").await?;

        let mut state = self.lock();
        let board_id = state
            .board_of(list_id)
            .ok_or_else(|| GatewayError::NotFound(format!("list {}", list_id)))?;
        let lists = state.boards.entry(board_id).or_default();

        if let Some(batch) = reorder {
            for entry in batch {
                if let Some(list) = lists.iter_mut().find(|l| l.id == entry.id) {
                    list.position = entry.position;
                }
            }
        }
        if let Some(list) = lists.iter_mut().find(|l| &l.id == list_id) {
            list.title = input.title;
            list.position = input.position;
        }
        renumber_lists(lists);

        lists
            .iter()
            .find(|l| &l.id == list_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("list {}", list_id)))
    }

    async fn delete_list(&self, list_id: &ListId) -> GatewayResult<()> {
        let latency = self.record(GatewayCall::DeleteList(list_id.clone()));
        self.settle(latency, "delete_list").await?;

        let mut state = self.lock();
        let board_id = state
            .board_of(list_id)
            .ok_or_else(|| GatewayError::NotFound(format!("list {}", list_id)))?;
        let lists = state.boards.entry(board_id).or_default();
        lists.retain(|l| &l.id != list_id);
        renumber_lists(lists);
        Ok(())
    }

    async fn create_card(&self, list_id: &ListId, input: CardInput) -> GatewayResult<RemoteCard> {
        let latency = self.record(GatewayCall::CreateCard {
            list_id: list_id.clone(),
            input: input.clone(),
        });
        self.settle(latency, "create_card").await?;

        let mut state = self.lock();
        let list = state
            .list_mut(list_id)
            .ok_or_else(|| GatewayError::NotFound(format!("list {}", list_id)))?;
        let index = slot(input.position, list.cards.len());
        let card = RemoteCard {
            id: CardId::from_string(Ulid::new().to_string()),
            title: input.title,
            description: String::new(),
            completed: false,
            position: index as i64,
            list_id: list_id.clone(),
        };
        list.cards.insert(index, card.clone());
        renumber_cards(&mut list.cards);
        Ok(card)
    }

    async fn update_card(&self, card_id: &CardId, update: CardUpdate) -> GatewayResult<RemoteCard> {
        let latency = self.record(GatewayCall::UpdateCard {
            card_id: card_id.clone(),
            update: update.clone(),
        });
        self.settle(latency, "update_card").await?;

        let mut state = self.lock();
        let (board_id, li, ci) = state
            .locate_card(card_id)
            .ok_or_else(|| GatewayError::NotFound(format!("card {}", card_id)))?;
        let lists = state.boards.entry(board_id).or_default();
        let target = lists
            .iter()
            .position(|l| l.id == update.list_id)
            .ok_or_else(|| GatewayError::NotFound(format!("list {}", update.list_id)))?;

        let mut card = lists[li].cards.remove(ci);
        renumber_cards(&mut lists[li].cards);

        card.title = update.title;
        card.description = update.description;
        card.completed = update.completed;
        card.list_id = update.list_id;

        let cards = &mut lists[target].cards;
        let index = slot(update.position, cards.len());
        card.position = index as i64;
        cards.insert(index, card.clone());
        renumber_cards(cards);
        Ok(card)
    }
}
