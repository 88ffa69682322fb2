//! Producer - task の組み立てと送信
//!
//! submit 1 回の流れ:
//! 1. Headers を組み立てる（ID 生成、origin、argsrepr）
//! 2. TaskBody を組み立てる（args / kwargs をコピー）
//! 3. TaskBody をエンコードする
//! 4. Envelope を組み立てる（correlation_id = headers.id）
//! 5. Transport に送る
//! 6. 成否にかかわらず、借りたオブジェクトをすべてプールに返す
//!
//! 6 はガードの drop で行われるので、途中の `?` で抜けても返却漏れは起きません。

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::config::ProducerConfig;
use super::result::AsyncResult;
use crate::codec;
use crate::domain::{CodecError, Envelope, ErrorKind, Headers, Kwargs, SubmitOptions, TaskBody, TaskId};
use crate::pool::{Pooled, Pools};
use crate::ports::{Clock, IdGenerator, ResultBackend, Transport, TransportError};

/// SubmitError は submit 全体のエラー
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SubmitError {
    /// リトライ判断のための分類（このクレート自身はリトライしない）
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::Codec(e) => e.kind(),
            SubmitError::Transport(e) => e.kind(),
        }
    }
}

pub struct Producer {
    transport: Arc<dyn Transport>,
    backend: Arc<dyn ResultBackend>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    config: ProducerConfig,
    pools: &'static Pools,
}

impl Producer {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        backend: Arc<dyn ResultBackend>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        config: ProducerConfig,
        pools: &'static Pools,
    ) -> Self {
        Self {
            transport,
            backend,
            ids,
            clock,
            config,
            pools,
        }
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// 送信可能な Envelope と task id を返す
    ///
    /// Envelope はプールから借りたガードなので、使い終わったら drop してください。
    pub fn build_and_encode(
        &self,
        task: &str,
        args: &[Value],
        kwargs: Option<&Kwargs>,
    ) -> Result<(Pooled<'static, Envelope>, TaskId), CodecError> {
        self.build_with_options(task, args, kwargs, &SubmitOptions::default())
    }

    pub fn build_with_options(
        &self,
        task: &str,
        args: &[Value],
        kwargs: Option<&Kwargs>,
        options: &SubmitOptions,
    ) -> Result<(Pooled<'static, Envelope>, TaskId), CodecError> {
        let mut headers = Headers::build(&self.pools.headers, self.ids.as_ref(), task, args, kwargs);
        options.apply_to_headers(&mut headers, self.clock.now(), &self.config)?;

        let body = TaskBody::build(&self.pools.bodies, args, kwargs);
        let encoded = codec::encode(&body)?;

        let mut envelope =
            Envelope::assemble(&self.pools.envelopes, self.ids.as_ref(), encoded, &headers);
        options.apply_to_properties(&mut envelope.properties, &self.config);

        let task_id = TaskId::from(headers.id.clone());
        debug!(%task_id, task, routing_key = %envelope.properties.delivery_info.routing_key, "built task message");
        Ok((envelope, task_id))
    }

    /// 既定のオプションで送信する
    pub async fn delay(
        &self,
        task: &str,
        args: &[Value],
        kwargs: Option<&Kwargs>,
    ) -> Result<AsyncResult, SubmitError> {
        self.apply_async(task, args, kwargs, &SubmitOptions::default())
            .await
    }

    /// オプション付きで送信する
    pub async fn apply_async(
        &self,
        task: &str,
        args: &[Value],
        kwargs: Option<&Kwargs>,
        options: &SubmitOptions,
    ) -> Result<AsyncResult, SubmitError> {
        let (envelope, task_id) = self.build_with_options(task, args, kwargs, options)?;

        if let Err(e) = self.transport.send(&envelope).await {
            warn!(%task_id, task, error = %e, "failed to send task message");
            return Err(e.into());
        }
        debug!(%task_id, task, "sent task message");

        Ok(AsyncResult::new(task_id, self.backend.clone()))
    }
}
