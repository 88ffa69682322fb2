//! Domain model - task protocol v2 のメッセージ構造
//!
//! - body: `[args, kwargs, embed]` の 3 要素ボディ
//! - headers: ルーティング / 識別子 / 観測用メタデータ
//! - envelope: body + headers + properties の送信単位
//! - options: submit ごとの上書き設定
//! - errors: codec のエラー分類

pub mod body;
pub mod envelope;
pub mod errors;
pub mod headers;
pub mod ids;
pub mod options;

pub use body::{Embed, Kwargs, TaskBody};
pub use envelope::{DeliveryInfo, Envelope, Properties};
pub use errors::{CodecError, ErrorKind};
pub use headers::{Headers, TimeLimit};
pub use ids::TaskId;
pub use options::SubmitOptions;
