//! Transport port - broker への配送
//!
//! 組み立て済みの Envelope を broker に渡し、成功か失敗かだけを返します。
//! 配送保証やリトライは実装側（またはその外側）の責務です。

use async_trait::async_trait;

use crate::domain::{Envelope, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("broker rejected message: {0}")]
    Rejected(String),

    #[error("transport connection closed")]
    Closed,

    #[error("transport operation failed: {0}")]
    OperationFailed(String),
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Closed => ErrorKind::Infrastructure,
            TransportError::Rejected(_) | TransportError::OperationFailed(_) => {
                ErrorKind::Transient
            }
        }
    }
}

/// Transport は Envelope を broker に送る
///
/// # 設計原則
/// - envelope は借用で受け取る（プールへの返却は呼び出し側が行う）
/// - 送信後に envelope を保持してはいけない（必要ならシリアライズしてコピーする）
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, envelope: &Envelope) -> Result<(), TransportError>;
}
