//! Identifier types
//!
//! Server identifiers are opaque strings. Locally created entities carry a
//! ULID [`TempId`] until the server assigns their permanent identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a server-assigned identifier
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a board, supplied by the caller
    BoardId
);
define_id!(
    /// Server-assigned list identifier
    ListId
);
define_id!(
    /// Server-assigned card identifier
    CardId
);

/// Temporary identifier for a placeholder entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(Ulid);

impl TempId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TempId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmp-{}", self.0)
    }
}

/// Identity of a list or card: either a local placeholder or a server record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Identity<T> {
    /// Created locally, server response pending
    Placeholder(TempId),
    /// Known to the server
    Persisted(T),
}

impl<T> Identity<T> {
    /// Fresh placeholder identity
    pub fn placeholder() -> Self {
        Self::Placeholder(TempId::new())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// The server identifier, if persisted
    pub fn persisted(&self) -> Option<&T> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Placeholder(_) => None,
        }
    }

    /// The temporary identifier, if still a placeholder
    pub fn temp_id(&self) -> Option<TempId> {
        match self {
            Self::Placeholder(temp) => Some(*temp),
            Self::Persisted(_) => None,
        }
    }
}

impl<T: PartialEq> Identity<T> {
    /// Whether this identity refers to the given server record
    pub fn is(&self, id: &T) -> bool {
        self.persisted() == Some(id)
    }
}

impl<T: fmt::Display> fmt::Display for Identity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder(temp) => temp.fmt(f),
            Self::Persisted(id) => id.fmt(f),
        }
    }
}

impl<T> From<T> for Identity<T> {
    fn from(id: T) -> Self {
        Self::Persisted(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is() {
        let id: Identity<ListId> = ListId::from("l-1").into();
        assert!(id.is(&ListId::from("l-1")));
        assert!(!id.is(&ListId::from("l-2")));
        assert!(!Identity::<ListId>::placeholder().is(&ListId::from("l-1")));
    }

    #[test]
    fn test_placeholder_ids_are_unique() {
        let a = Identity::<CardId>::placeholder();
        let b = Identity::<CardId>::placeholder();
        assert_ne!(a, b);
        assert!(a.temp_id().is_some());
        assert!(a.persisted().is_none());
    }

    #[test]
    fn test_identity_serialization() {
        let id: Identity<CardId> = CardId::from("c-9").into();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["state"], "persisted");
        assert_eq!(json["id"], "c-9");
    }

    #[test]
    fn test_temp_id_display() {
        let temp = TempId::new();
        assert!(temp.to_string().starts_with("tmp-"));
        // ULID should be 26 chars
        assert_eq!(temp.to_string().len(), 30);
    }
}
