//! Optimistic list and card ordering for kanban boards
//!
//! This crate keeps a local mirror of one board's lists and cards and lets a
//! user reorder lists, reorder cards within a list and move cards across
//! lists with zero perceived latency. The authoritative order lives on a
//! remote store reached only through slow, fallible calls.
//!
//! ## Overview
//!
//! - **Optimistic** - Every gesture changes the local board immediately
//! - **Debounced** - Rapid list reorders coalesce into one batch write
//! - **Suppressed** - A repeated unsettled gesture sends nothing
//! - **Rolled back** - A failed write restores only the collection it touched
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_sync::{card::MoveCard, list::MoveList, BoardSession, Execute};
//! use kanban_sync_config::load_configuration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_configuration()?;
//! let session = BoardSession::from_config("board-1", &config)?;
//! session.refresh().await?;
//!
//! // Visible at once; written after the debounce window
//! MoveList::new("list-todo", "list-done").execute(&session).await?;
//!
//! // Written immediately; rolled back on failure
//! MoveCard::new("card-1", "list-todo", "list-doing").at(0).execute(&session).await?;
//!
//! session.flush().await;
//! # Ok(())
//! # }
//! ```
//!
//! Positions are dense: after any move every item's `position` equals its
//! index in the collection.

pub mod cache;
pub mod dispatcher;
mod error;
pub mod gateway;
pub mod logging;
pub mod operation;
pub mod position;
pub mod reconcile;
mod session;
pub mod store;
pub mod types;

// Command modules
pub mod card;
pub mod list;

#[cfg(test)]
mod test_support;

pub use async_trait::async_trait;
pub use cache::{CacheEntry, SyncCache};
pub use dispatcher::{MoveOutcome, MutationDispatcher, SkipReason};
pub use error::{Result, SyncError};
pub use gateway::{CollectionGateway, GatewayCall, GatewayError, HttpGateway, InMemoryGateway};
pub use logging::Pretty;
pub use operation::{Execute, Operation};
pub use position::{Placement, Positioned};
pub use reconcile::{
    MutationId, MutationKind, MutationState, PendingMutation, ReconciliationManager, SyncEvent,
};
pub use session::BoardSession;
pub use store::{BoardStore, Entity, ListSlot, Snapshot};
pub use types::{Board, BoardId, BoardView, Card, CardId, Identity, List, ListId, TempId};
