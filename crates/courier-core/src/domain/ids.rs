//! Task identifier.
//!
//! プロトコル上の ID はただの文字列（通常は UUID）なので、
//! 他言語の producer が生成した ID もそのまま受け取れるように String をラップします。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a submitted task (header `id`, property `correlation_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_serializes_as_plain_string() {
        let id = TaskId::new("2f1c5d0e-1111-4c4c-9d9d-000000000001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2f1c5d0e-1111-4c4c-9d9d-000000000001\"");

        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), id.as_str());
    }
}
