//! List commands

mod add;
mod delete;
mod mv;
mod rename;

pub use add::AddList;
pub use delete::DeleteList;
pub use mv::MoveList;
pub use rename::RenameList;
