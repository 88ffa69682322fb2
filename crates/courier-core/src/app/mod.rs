//! App - アプリケーション層
//!
//! このモジュールは、domain / codec / ports を組み合わせて submit の流れを実装します。
//!
//! # 主要コンポーネント
//! - **ProducerBuilder**: collaborator のワイヤリングと起動時検証
//! - **Producer**: build_and_encode / delay / apply_async
//! - **AsyncResult**: task id から結果をポーリングするハンドル
//! - **ProducerConfig**: 既定の routing key / priority / time limit

pub mod builder;
pub mod config;
pub mod producer;
pub mod result;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ProducerBuilder};
pub use self::config::{ConfigError, ProducerConfig};
pub use self::producer::{Producer, SubmitError};
pub use self::result::AsyncResult;
