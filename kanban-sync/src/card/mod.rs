//! Card commands

mod add;
mod complete;
mod mv;

pub use add::AddCard;
pub use complete::CompleteCard;
pub use mv::MoveCard;
