//! Pool - 一時オブジェクトの再利用プール
//!
//! TaskBody / Headers / Envelope は 1 回の submit の間だけ使われる一時オブジェクトです。
//! submit ごとにアロケートせず、free list から取り出して使い回します。
//!
//! # 返却の保証
//! `acquire()` は RAII ガード [`Pooled`] を返し、ガードの drop が唯一の返却経路です。
//! - エラーで早期 return しても必ず返却される
//! - 返却は 1 回だけ（ガードは Clone できない）
//! - 返却後に触ることはコンパイル時に禁止される
//!
//! # 学習ポイント
//! - `const fn` による `static` 初期化（LazyLock 不要）
//! - `std::mem::take` で Drop 中に中身を取り出す
//! - Mutex の poison からの回復（`PoisonError::into_inner`）

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{Envelope, Headers, TaskBody};

/// プールごとに保持する待機オブジェクトの上限
pub const DEFAULT_MAX_IDLE: usize = 256;

/// Poolable はプールに格納できる型
///
/// - `Default`: 構築直後の状態
/// - `reset`: 構築直後の状態に戻す（確保済みの容量は残してよい）
pub trait Poolable: Default + Send {
    fn reset(&mut self);
}

/// Pool は free list による汎用オブジェクトプール
///
/// 取り出し順の保証はありません。ロックは push / pop の間だけ保持します。
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    max_idle: usize,
}

impl<T: Poolable> Pool<T> {
    pub const fn new(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// 待機中のオブジェクトを取り出す（なければ新規に構築する）
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.lock().pop().unwrap_or_default();
        Pooled { item, pool: self }
    }

    /// 待機中のオブジェクト数
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, mut item: T) {
        item.reset();
        let mut free = self.lock();
        if free.len() < self.max_idle {
            free.push(item);
        } else {
            tracing::trace!(max_idle = self.max_idle, "pool is full, dropping released object");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pooled はプールから借りたオブジェクトの所有権ガード
///
/// drop 時に reset してプールに返却します。
pub struct Pooled<'p, T: Poolable> {
    item: T,
    pool: &'p Pool<T>,
}

impl<T: Poolable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Poolable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Poolable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.pool.release(item);
    }
}

impl<T: Poolable + fmt::Debug> fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.item.fmt(f)
    }
}

/// Pools は 3 種類の一時オブジェクトのプールをまとめたもの
pub struct Pools {
    pub bodies: Pool<TaskBody>,
    pub headers: Pool<Headers>,
    pub envelopes: Pool<Envelope>,
}

impl Pools {
    pub const fn new(max_idle: usize) -> Self {
        Self {
            bodies: Pool::new(max_idle),
            headers: Pool::new(max_idle),
            envelopes: Pool::new(max_idle),
        }
    }

    /// プロセス全体で共有するプール（初回アクセス時に空で始まり、破棄はしない）
    pub fn global() -> &'static Pools {
        &GLOBAL_POOLS
    }
}

static GLOBAL_POOLS: Pools = Pools::new(DEFAULT_MAX_IDLE);
