//! ProducerBuilder - Producer の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 省略可能な collaborator には既定の実装を入れる

use std::sync::Arc;

use super::config::ProducerConfig;
use super::producer::Producer;
use crate::pool::Pools;
use crate::ports::{Clock, IdGenerator, ResultBackend, SystemClock, Transport, UuidGenerator};

/// ProducerBuilder は Producer を構築
///
/// # 使用例
/// ```ignore
/// let producer = ProducerBuilder::new()
///     .transport(transport)
///     .result_backend(backend)
///     .config(ProducerConfig::from_env()?)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - transport と result backend は必須（未設定なら BuildError）
/// - id generator / clock / pools は省略すると UUID v4 / システム時刻 / プロセス共有プール
pub struct ProducerBuilder {
    transport: Option<Arc<dyn Transport>>,
    backend: Option<Arc<dyn ResultBackend>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    config: ProducerConfig,
    pools: &'static Pools,
}

/// BuildError は Producer 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("transport is not configured")]
    MissingTransport,

    #[error("result backend is not configured")]
    MissingResultBackend,
}

impl ProducerBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            backend: None,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
            config: ProducerConfig::default(),
            pools: Pools::global(),
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn result_backend(mut self, backend: Arc<dyn ResultBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: ProducerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pools(mut self, pools: &'static Pools) -> Self {
        self.pools = pools;
        self
    }

    pub fn build(self) -> Result<Producer, BuildError> {
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        let backend = self.backend.ok_or(BuildError::MissingResultBackend)?;
        Ok(Producer::new(
            transport,
            backend,
            self.ids,
            self.clock,
            self.config,
            self.pools,
        ))
    }
}

impl Default for ProducerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryResultBackend, InMemoryTransport};

    #[test]
    fn test_build_success() {
        let producer = ProducerBuilder::new()
            .transport(Arc::new(InMemoryTransport::new()))
            .result_backend(Arc::new(InMemoryResultBackend::new()))
            .build();
        assert!(producer.is_ok());
    }

    #[test]
    fn test_build_missing_transport() {
        let producer = ProducerBuilder::new()
            .result_backend(Arc::new(InMemoryResultBackend::new()))
            .build();
        assert!(matches!(producer, Err(BuildError::MissingTransport)));
    }

    #[test]
    fn test_build_missing_backend() {
        let producer = ProducerBuilder::new()
            .transport(Arc::new(InMemoryTransport::new()))
            .build();
        assert!(matches!(producer, Err(BuildError::MissingResultBackend)));
    }
}
