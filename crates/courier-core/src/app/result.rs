//! AsyncResult - 送信済みタスクの結果ハンドル
//!
//! task id と ResultBackend だけを持ち、結果は毎回 backend に問い合わせます。

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::domain::TaskId;
use crate::ports::{ResultBackend, ResultError, TaskResult};

pub struct AsyncResult {
    task_id: TaskId,
    backend: Arc<dyn ResultBackend>,
}

impl AsyncResult {
    pub fn new(task_id: TaskId, backend: Arc<dyn ResultBackend>) -> Self {
        Self { task_id, backend }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// backend に 1 回だけ問い合わせる
    pub async fn state(&self) -> Result<TaskResult, ResultError> {
        self.backend.get_result(&self.task_id).await
    }

    pub async fn ready(&self) -> Result<bool, ResultError> {
        Ok(self.state().await?.is_ready())
    }

    /// 結果が出るまで `interval` ごとにポーリングする
    ///
    /// - Success: 値を返す
    /// - Failure: `ResultError::TaskFailed`
    /// - timeout を過ぎても Pending: `ResultError::Timeout`
    pub async fn get(&self, timeout: Duration, interval: Duration) -> Result<Value, ResultError> {
        let start = Instant::now();
        loop {
            match self.state().await? {
                TaskResult::Success(value) => return Ok(value),
                TaskResult::Failure(reason) => {
                    return Err(ResultError::TaskFailed {
                        task_id: self.task_id.clone(),
                        reason,
                    });
                }
                TaskResult::Pending => {}
            }

            let waited = start.elapsed();
            if waited >= timeout {
                return Err(ResultError::Timeout {
                    task_id: self.task_id.clone(),
                    waited,
                });
            }
            tokio::time::sleep(interval.min(timeout - waited)).await;
        }
    }
}
