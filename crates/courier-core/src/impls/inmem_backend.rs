//! InMemoryResultBackend - 開発用の結果ストア
//!
//! consumer 役（テストや CLI のデモ）が store_* で結果を書き込み、
//! AsyncResult が get_result で読みます。

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::TaskId;
use crate::ports::{ResultBackend, ResultError, TaskResult};

#[derive(Default)]
pub struct InMemoryResultBackend {
    results: Mutex<HashMap<TaskId, TaskResult>>,
}

impl InMemoryResultBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store_success(&self, task_id: &TaskId, value: Value) {
        self.results
            .lock()
            .await
            .insert(task_id.clone(), TaskResult::Success(value));
    }

    pub async fn store_failure(&self, task_id: &TaskId, reason: impl Into<String>) {
        self.results
            .lock()
            .await
            .insert(task_id.clone(), TaskResult::Failure(reason.into()));
    }
}

#[async_trait]
impl ResultBackend for InMemoryResultBackend {
    async fn get_result(&self, task_id: &TaskId) -> Result<TaskResult, ResultError> {
        Ok(self
            .results
            .lock()
            .await
            .get(task_id)
            .cloned()
            .unwrap_or(TaskResult::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_task_is_pending() {
        let backend = InMemoryResultBackend::new();
        let result = backend.get_result(&TaskId::from("missing")).await.unwrap();
        assert_eq!(result, TaskResult::Pending);
        assert!(!result.is_ready());
    }

    #[tokio::test]
    async fn stored_results_are_returned() {
        let backend = InMemoryResultBackend::new();
        let ok = TaskId::from("ok");
        let bad = TaskId::from("bad");

        backend.store_success(&ok, json!(5)).await;
        backend.store_failure(&bad, "ZeroDivisionError").await;

        assert_eq!(
            backend.get_result(&ok).await.unwrap(),
            TaskResult::Success(json!(5))
        );
        assert_eq!(
            backend.get_result(&bad).await.unwrap(),
            TaskResult::Failure("ZeroDivisionError".to_string())
        );
    }
}
