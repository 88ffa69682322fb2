//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! broker への配送（Transport）と結果の参照（ResultBackend）はこのクレートの外側の責務で、
//! ここではインターフェースだけを決めます。
//!
//! ID 生成と時刻もテストで差し替えられるように trait にしています。

pub mod clock;
pub mod id_generator;
pub mod result_backend;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequenceGenerator, UlidGenerator, UuidGenerator};
pub use self::result_backend::{ResultBackend, ResultError, TaskResult};
pub use self::transport::{Transport, TransportError};
