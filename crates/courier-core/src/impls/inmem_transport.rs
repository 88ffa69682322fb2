//! InMemoryTransport - 開発用の transport
//!
//! # 学習ポイント
//! - tokio::sync::Mutex + routing key ごとの Notify による待ち合わせ
//! - 送信時にシリアライズして保持する（借用した envelope を持ち続けない）
//! - AtomicBool による障害注入

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::Envelope;
use crate::ports::{Transport, TransportError};

/// InMemoryTransport は routing key ごとに JSON 化した envelope を保持する
///
/// # 使用例
/// ```ignore
/// let transport = InMemoryTransport::new();
/// transport.send(&envelope).await?;
/// let raw = transport.pop("celery", Duration::from_secs(1)).await;
/// let envelope = Envelope::from_json(&raw.unwrap())?;
/// ```
pub struct InMemoryTransport {
    /// routing key ごとのキュー
    queues: Mutex<HashMap<String, VecDeque<String>>>,
    /// send 時の通知用（routing key ごと。別の key の待機者を起こさない）
    notifiers: Mutex<HashMap<String, Arc<Notify>>>,
    /// true なら次の send を 1 回だけ失敗させる
    fail_next: AtomicBool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            notifiers: Mutex::new(HashMap::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// 次の send を `TransportError::Rejected` で失敗させる
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    async fn notifier(&self, routing_key: &str) -> Arc<Notify> {
        self.notifiers
            .lock()
            .await
            .entry(routing_key.to_string())
            .or_default()
            .clone()
    }

    /// 先頭の envelope（JSON）を取り出す。timeout までに届かなければ None
    pub async fn pop(&self, routing_key: &str, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        let notify = self.notifier(routing_key).await;
        loop {
            {
                let mut queues = self.queues.lock().await;
                if let Some(raw) = queues.get_mut(routing_key).and_then(VecDeque::pop_front) {
                    return Some(raw);
                }
            }
            if tokio::time::timeout_at(deadline, notify.notified())
                .await
                .is_err()
            {
                return None;
            }
        }
    }

    pub async fn len(&self, routing_key: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(routing_key)
            .map_or(0, VecDeque::len)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Rejected("injected failure".to_string()));
        }
        let raw = envelope
            .to_json()
            .map_err(|e| TransportError::OperationFailed(e.to_string()))?;

        let routing_key = &envelope.properties.delivery_info.routing_key;
        self.queues
            .lock()
            .await
            .entry(routing_key.clone())
            .or_default()
            .push_back(raw);

        // 同じ routing key で待機中の pop を起こす（待機者がいなければ permit が残る）
        self.notifier(routing_key).await.notify_one();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_for(routing_key: &str, id: &str) -> Envelope {
        let mut envelope = Envelope::default();
        envelope.headers.id = id.to_string();
        envelope.properties.correlation_id = id.to_string();
        envelope.properties.delivery_info.routing_key = routing_key.to_string();
        envelope
    }

    #[tokio::test]
    async fn test_send_pop_roundtrip() {
        let transport = InMemoryTransport::new();
        let envelope = envelope_for("celery", "id-1");

        transport.send(&envelope).await.unwrap();
        let raw = transport.pop("celery", Duration::from_secs(1)).await.unwrap();

        assert_eq!(Envelope::from_json(&raw).unwrap(), envelope);
        assert_eq!(transport.len("celery").await, 0);
    }

    #[tokio::test]
    async fn test_pop_timeout() {
        let transport = InMemoryTransport::new();
        let start = Instant::now();

        let popped = transport.pop("celery", Duration::from_millis(200)).await;

        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(popped, None);
    }

    #[tokio::test]
    async fn test_routing_keys_are_separate() {
        let transport = InMemoryTransport::new();
        transport.send(&envelope_for("a", "1")).await.unwrap();
        transport.send(&envelope_for("b", "2")).await.unwrap();

        assert_eq!(transport.len("a").await, 1);
        assert_eq!(transport.len("b").await, 1);
        let raw = transport.pop("b", Duration::from_secs(1)).await.unwrap();
        assert_eq!(Envelope::from_json(&raw).unwrap().headers.id, "2");
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let transport = InMemoryTransport::new();
        transport.fail_next();

        let first = transport.send(&envelope_for("celery", "1")).await;
        let second = transport.send(&envelope_for("celery", "2")).await;

        assert!(matches!(first, Err(TransportError::Rejected(_))));
        assert!(second.is_ok());
        assert_eq!(transport.len("celery").await, 1);
    }

    #[tokio::test]
    async fn test_send_wakes_pop_on_its_own_routing_key() {
        let transport = Arc::new(InMemoryTransport::new());

        // "a" の待機者が先に登録されていても、"b" への send は "b" の待機者を起こす
        let pop_a = tokio::spawn({
            let transport = transport.clone();
            async move { transport.pop("a", Duration::from_millis(500)).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let pop_b = tokio::spawn({
            let transport = transport.clone();
            async move { transport.pop("b", Duration::from_secs(2)).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let start = Instant::now();
        transport.send(&envelope_for("b", "for-b")).await.unwrap();

        let raw = pop_b.await.unwrap().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(Envelope::from_json(&raw).unwrap().headers.id, "for-b");
        assert_eq!(transport.len("b").await, 0);
        assert_eq!(pop_a.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_wakes_pop() {
        let transport = Arc::new(InMemoryTransport::new());

        let pop_future = tokio::spawn({
            let transport = transport.clone();
            async move { transport.pop("celery", Duration::from_secs(5)).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        transport.send(&envelope_for("celery", "late")).await.unwrap();

        let raw = pop_future.await.unwrap().unwrap();
        assert_eq!(Envelope::from_json(&raw).unwrap().headers.id, "late");
    }
}
