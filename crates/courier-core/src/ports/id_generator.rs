//! IdGenerator port - ID 生成の抽象化
//!
//! task id / reply_to / delivery_tag はすべてここから払い出します。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UuidGenerator**: UUID v4（既定。consumer 側の慣習に合わせる）
//! - **UlidGenerator**: ULID ベース（時刻でソート可能）
//! - **SequenceGenerator**: 連番（テスト用の決定的な ID）

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;
use uuid::Uuid;

use crate::ports::Clock;

/// IdGenerator はグローバルに一意な文字列 ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数の submit から同時に使われる）
pub trait IdGenerator: Send + Sync {
    /// 空でない一意な ID を返す
    fn generate(&self) -> String;
}

/// UUID v4（ハイフン区切りの小文字表記）
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// これにより、テスト時に FixedClock を使ってタイムスタンプ部分を固定できます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate(&self) -> String {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random()).to_string()
    }
}

/// `{prefix}-1`, `{prefix}-2`, ... を順に返す
pub struct SequenceGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
