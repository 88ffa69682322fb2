//! ResultBackend port - タスク結果の参照
//!
//! header の task id をキーに、consumer が書き込んだ結果を引きます。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::TaskId;

/// TaskResult は 1 回の参照結果
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    Pending,
    Success(Value),
    Failure(String),
}

impl TaskResult {
    pub fn is_ready(&self) -> bool {
        !matches!(self, TaskResult::Pending)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("timed out after {waited:?} waiting for task {task_id}")]
    Timeout { task_id: TaskId, waited: Duration },

    #[error("task {task_id} failed: {reason}")]
    TaskFailed { task_id: TaskId, reason: String },

    #[error("result backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ResultBackend: Send + Sync {
    /// 未登録の task id は `Pending` を返す
    async fn get_result(&self, task_id: &TaskId) -> Result<TaskResult, ResultError>;
}
