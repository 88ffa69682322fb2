//! TaskBody - `[args, kwargs, embed]` の 3 要素ボディ
//!
//! 引数の値は serde_json::Value（null/bool/number/string/array/object の閉じた直和型）で保持します。
//!
//! # コピー隔離
//! build() は呼び出し側のコンテナを一切参照せず、要素ごとにコピーします。
//! 呼び出し側が build() 後に自分の map を書き換えても、構築済みの TaskBody には影響しません。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pool::{Pool, Poolable, Pooled};

/// Named arguments (key は一意、順序は意味を持たない)
pub type Kwargs = serde_json::Map<String, Value>;

/// Embed は chain / chord / callback のメタデータ
///
/// 合成機能はこのクレートの範囲外なので、producer 側では常に全スロットが null です。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    pub callbacks: Option<Value>,
    pub errbacks: Option<Value>,
    pub chain: Option<Value>,
    pub chord: Option<Value>,
}

impl Embed {
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_none()
            && self.errbacks.is_none()
            && self.chain.is_none()
            && self.chord.is_none()
    }
}

/// TaskBody はワイヤ上の `[args, kwargs, embed]` に対応する
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBody {
    pub args: Vec<Value>,
    pub kwargs: Kwargs,
    pub embed: Embed,
}

impl TaskBody {
    /// プールから TaskBody を取得し、args / kwargs をコピーして埋める
    ///
    /// 返り値のガードを drop するとプールに返却されます。
    pub fn build<'p>(
        pool: &'p Pool<TaskBody>,
        args: &[Value],
        kwargs: Option<&Kwargs>,
    ) -> Pooled<'p, TaskBody> {
        let mut body = pool.acquire();
        body.fill(args, kwargs);
        body
    }

    /// 既存の中身を捨ててから args / kwargs をコピーする
    pub fn fill(&mut self, args: &[Value], kwargs: Option<&Kwargs>) {
        self.args.clear();
        self.args.extend_from_slice(args);

        self.kwargs.clear();
        if let Some(kwargs) = kwargs {
            self.kwargs
                .extend(kwargs.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        self.embed = Embed::default();
    }
}

impl Poolable for TaskBody {
    fn reset(&mut self) {
        // Vec の容量は残して次の借り手で再利用する
        self.args.clear();
        self.kwargs.clear();
        self.embed = Embed::default();
    }
}
