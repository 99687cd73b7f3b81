//! Command plumbing
//!
//! Each user action is a struct whose fields are its parameters. It names
//! itself through [`Operation`] and runs against a context through
//! [`Execute`], returning the affected record as JSON.

use async_trait::async_trait;
use serde_json::Value;

/// Identity of a command
pub trait Operation {
    /// Action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Target, e.g. "list"
    fn noun(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// "verb noun"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run a command against a context
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> Result<Value, E>;
}

/// Implement [`Operation`] for a command struct.
///
/// Declarative counterpart of an `#[operation(verb = .., noun = .., description = ..)]`
/// attribute: one invocation next to each command struct.
///
/// ```ignore
/// operation!(RenameList, verb = "rename", noun = "list", description = "Change a list's title");
/// ```
macro_rules! operation {
    ($ty:ty, verb = $verb:literal, noun = $noun:literal, description = $desc:literal) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }

            fn noun(&self) -> &'static str {
                $noun
            }

            fn description(&self) -> &'static str {
                $desc
            }
        }
    };
}

pub(crate) use operation;

/// Reject blank titles before anything is changed
pub(crate) fn require_title(title: &str) -> crate::Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(crate::SyncError::invalid_value("title", "must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ArchiveList;
    operation!(
        ArchiveList,
        verb = "archive",
        noun = "list",
        description = "Archive a list"
    );

    #[test]
    fn test_op_string() {
        assert_eq!(ArchiveList.op_string(), "archive list");
        assert_eq!(ArchiveList.description(), "Archive a list");
    }

    #[test]
    fn test_require_title() {
        assert_eq!(require_title("  Doing ").unwrap(), "Doing");
        assert!(matches!(
            require_title("   "),
            Err(crate::SyncError::InvalidValue { .. })
        ));
    }
}
