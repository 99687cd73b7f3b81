//! Logging helpers

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper that renders a payload as compact JSON in log fields:
///
/// ```ignore
/// trace!(body = %Pretty(&update), "PATCH {}", url);
/// ```
///
/// Debug is used as a fallback if serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Payload {
        id: &'static str,
        position: i64,
    }

    #[test]
    fn test_pretty_renders_json() {
        let rendered = Pretty(&Payload {
            id: "l1",
            position: 2,
        })
        .to_string();
        assert_eq!(rendered, r#"{"id":"l1","position":2}"#);
    }
}
