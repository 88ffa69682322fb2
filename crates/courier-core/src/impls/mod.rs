//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTransport**: routing key ごとの FIFO に envelope を積む
//! - **InMemoryResultBackend**: HashMap に結果を保持する
//!
//! # 本番用実装
//! Redis / AMQP の transport や backend は別クレートに配置します。

pub mod inmem_backend;
pub mod inmem_transport;

// 主要な型を再エクスポート
pub use self::inmem_backend::InMemoryResultBackend;
pub use self::inmem_transport::InMemoryTransport;
