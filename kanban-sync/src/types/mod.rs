//! Core types for the sync engine

mod board;
mod card;
mod ids;

pub(crate) use board::PlaceholderSlot;
pub use board::{Board, List};
pub use card::Card;
pub use ids::{BoardId, CardId, Identity, ListId, TempId};

/// Read model handed to the rendering layer
pub type BoardView = Board;
