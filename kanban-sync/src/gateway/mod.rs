//! Remote collection gateway
//!
//! The CRUD contract for lists and cards on the remote store. The engine only
//! talks to the remote through [`CollectionGateway`]; [`HttpGateway`] speaks
//! JSON over HTTP and [`InMemoryGateway`] keeps everything in process.

mod error;
mod http;
mod memory;
mod types;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use memory::{GatewayCall, InMemoryGateway};
pub use types::{CardInput, CardUpdate, ListInput, RemoteCard, RemoteList, ReorderEntry};

use crate::types::{BoardId, CardId, ListId};
use async_trait::async_trait;

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Asynchronous CRUD access to the remote list and card collections
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// All lists of a board with their cards
    async fn fetch_board(&self, board_id: &BoardId) -> GatewayResult<Vec<RemoteList>>;

    async fn create_list(&self, board_id: &BoardId, input: ListInput) -> GatewayResult<RemoteList>;

    /// Update one list. When `reorder` is present the remote applies the
    /// whole batch of positions in the same request.
    async fn update_list(
        &self,
        list_id: &ListId,
        input: ListInput,
        reorder: Option<Vec<ReorderEntry>>,
    ) -> GatewayResult<RemoteList>;

    async fn delete_list(&self, list_id: &ListId) -> GatewayResult<()>;

    async fn create_card(&self, list_id: &ListId, input: CardInput) -> GatewayResult<RemoteCard>;

    async fn update_card(&self, card_id: &CardId, update: CardUpdate) -> GatewayResult<RemoteCard>;
}
