//! courier-core
//!
//! Producer-side building blocks for the task message protocol v2.
//!
//! # モジュール構成
//! - **domain**: メッセージモデル（TaskBody, Headers, Envelope, SubmitOptions, errors）
//! - **pool**: 一時オブジェクトの再利用プール（Pool, Pooled, Pools）
//! - **codec**: `base64(JSON([args, kwargs, embed]))` のエンコード / デコードと受信側検証
//! - **ports**: 抽象化レイヤー（Transport, ResultBackend, IdGenerator, Clock）
//! - **impls**: 実装（InMemoryTransport / InMemoryResultBackend など開発用）
//! - **app**: submit の流れ（ProducerBuilder, Producer, AsyncResult, ProducerConfig）

pub mod app;
pub mod codec;
pub mod domain;
pub mod impls;
pub mod pool;
pub mod ports;

pub use app::{AsyncResult, Producer, ProducerBuilder, ProducerConfig, SubmitError};
pub use domain::{CodecError, Envelope, Headers, Kwargs, SubmitOptions, TaskBody, TaskId};
pub use pool::{Pool, Pooled, Pools};
