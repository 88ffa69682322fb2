//! Headers - ルーティング / 識別子 / 観測用メタデータ
//!
//! フィールドの宣言順はワイヤ上のキー順
//! （lang, task, id, root_id, parent_id, group, expires, shadow, retries, eta, argsrepr, timelimit, origin）
//! と一致させています。

use std::ffi::OsString;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::body::Kwargs;
use crate::pool::{Pool, Poolable, Pooled};
use crate::ports::IdGenerator;

/// consumer 側が前提にする実行ランタイムのラベル（相互運用のための固定値）
pub const LANG: &str = "py";

pub const DEFAULT_SOFT_TIME_LIMIT: u64 = 60;

/// argsrepr の fail-soft 値
pub const EMPTY_ARGSREPR: &str = "[]";

/// `[soft, hard]` の 2 要素配列としてシリアライズされる time limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimit(pub Option<u64>, pub Option<u64>);

impl TimeLimit {
    pub fn soft(&self) -> Option<u64> {
        self.0
    }

    pub fn hard(&self) -> Option<u64> {
        self.1
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self(Some(DEFAULT_SOFT_TIME_LIMIT), None)
    }
}

/// Headers は task protocol v2 のヘッダ
///
/// # 不変条件
/// - build() 直後は `id == root_id` かつ両方とも空でない
/// - `lang` は常に [`LANG`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headers {
    pub lang: String,
    pub task: String,
    pub id: String,
    pub root_id: String,
    pub parent_id: Option<String>,
    pub group: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub shadow: Option<String>,
    pub retries: u32,
    pub eta: Option<DateTime<Utc>>,
    pub argsrepr: String,
    pub timelimit: TimeLimit,
    pub origin: String,
}

impl Default for Headers {
    fn default() -> Self {
        Self {
            lang: LANG.to_string(),
            task: String::new(),
            id: String::new(),
            root_id: String::new(),
            parent_id: None,
            group: None,
            expires: None,
            shadow: None,
            retries: 0,
            eta: None,
            argsrepr: String::new(),
            timelimit: TimeLimit::default(),
            origin: String::new(),
        }
    }
}

impl Headers {
    /// プールから Headers を取得し、root task としてのヘッダを組み立てる
    ///
    /// ID は 1 回だけ生成して `id` と `root_id` の両方に入れます。
    /// それ以外のフィールド（retries, timelimit, eta など）はプールの既定値のままです。
    pub fn build<'p>(
        pool: &'p Pool<Headers>,
        ids: &dyn IdGenerator,
        task: &str,
        args: &[Value],
        kwargs: Option<&Kwargs>,
    ) -> Pooled<'p, Headers> {
        let mut headers = pool.acquire();
        headers.origin = origin();

        let task_id = ids.generate();
        headers.root_id.clone_from(&task_id);
        headers.id = task_id;

        headers.task.push_str(task);
        headers.argsrepr = format_argsrepr(args, kwargs);
        headers
    }
}

impl Poolable for Headers {
    fn reset(&mut self) {
        self.lang.clear();
        self.lang.push_str(LANG);
        self.task.clear();
        self.id.clear();
        self.root_id.clear();
        self.parent_id = None;
        self.group = None;
        self.expires = None;
        self.shadow = None;
        self.retries = 0;
        self.eta = None;
        self.argsrepr.clear();
        self.timelimit = TimeLimit::default();
        self.origin.clear();
    }
}

/// `<pid>@<hostname>` 形式の origin
///
/// ホスト名が取れない場合は空文字にフォールバックします（エラーにはしない）。
pub fn origin() -> String {
    format_origin(std::process::id(), hostname::get().ok())
}

fn format_origin(pid: u32, host: Option<OsString>) -> String {
    let host = host.and_then(|h| h.into_string().ok()).unwrap_or_default();
    format!("{pid}@{host}")
}

#[derive(Serialize)]
struct ArgsRepr<'a> {
    args: &'a [Value],
    kwargs: &'a Kwargs,
}

/// 人間向けの引数表現（consumer 側のログ・監視用）
///
/// - kwargs なし: args を JSON 配列で
/// - kwargs あり: `{"args": ..., "kwargs": ...}` の JSON オブジェクトで
/// - args が空、またはシリアライズに失敗した場合は `"[]"`（決してエラーにしない）
pub fn format_argsrepr(args: &[Value], kwargs: Option<&Kwargs>) -> String {
    let rendered = match kwargs {
        Some(kwargs) if !kwargs.is_empty() => serde_json::to_string(&ArgsRepr { args, kwargs }),
        _ if args.is_empty() => return EMPTY_ARGSREPR.to_string(),
        _ => serde_json::to_string(args),
    };
    rendered.unwrap_or_else(|_| EMPTY_ARGSREPR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{SequenceGenerator, UuidGenerator};
    use rstest::rstest;
    use serde_json::json;

    fn kwargs_of(value: Value) -> Kwargs {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn build_sets_identity_and_defaults() {
        let pool = Pool::new(4);
        let task_name = "account.tasks.visit_notify";

        let headers = Headers::build(&pool, &UuidGenerator, task_name, &[], None);

        assert!(!headers.id.is_empty());
        assert_eq!(headers.id, headers.root_id);
        assert_eq!(headers.lang, LANG);
        assert_eq!(headers.task, task_name);
        assert_eq!(headers.retries, 0);
        assert_eq!(headers.timelimit, TimeLimit(Some(60), None));
        assert_eq!(headers.parent_id, None);
        assert_eq!(headers.group, None);
        assert_eq!(headers.eta, None);
        assert_eq!(headers.argsrepr, EMPTY_ARGSREPR);
    }

    #[test]
    fn build_uses_injected_id_generator_once() {
        let pool = Pool::new(4);
        let ids = SequenceGenerator::new("task");

        let first = Headers::build(&pool, &ids, "t", &[], None);
        let second = Headers::build(&pool, &ids, "t", &[], None);

        assert_eq!(first.id, "task-1");
        assert_eq!(first.root_id, "task-1");
        assert_eq!(second.id, "task-2");
        assert_eq!(second.root_id, "task-2");
    }

    #[test]
    fn origin_has_pid_prefix() {
        let origin = origin();
        let (pid, _host) = origin.split_once('@').unwrap();
        assert_eq!(pid, std::process::id().to_string());
    }

    #[test]
    fn origin_keeps_pid_when_hostname_is_unavailable() {
        assert_eq!(format_origin(4242, None), "4242@");
        assert_eq!(
            format_origin(4242, Some(OsString::from("worker-1"))),
            "4242@worker-1"
        );
    }

    #[cfg(unix)]
    #[test]
    fn origin_drops_non_utf8_hostname() {
        use std::os::unix::ffi::OsStringExt;

        let host = OsString::from_vec(vec![0x77, 0xff, 0x6b]);
        assert_eq!(format_origin(7, Some(host)), "7@");
    }

    #[test]
    fn released_headers_are_reset_before_reuse() {
        let pool = Pool::new(1);
        let ids = SequenceGenerator::new("task");
        {
            let mut headers = Headers::build(&pool, &ids, "t", &[json!(1), json!(2)], None);
            headers.retries = 3;
            headers.group = Some("g".to_string());
            headers.timelimit = TimeLimit(Some(5), Some(10));
            assert_eq!(headers.task, "t");
            assert!(!headers.id.is_empty());
        }

        let reused = pool.acquire();
        assert_eq!(*reused, Headers::default());
        assert!(reused.task.is_empty());
        assert!(reused.id.is_empty());
    }

    #[rstest]
    #[case::no_args_no_kwargs(vec![], None)]
    #[case::empty_args_empty_kwargs(vec![], Some(json!({})))]
    fn argsrepr_falls_back_to_empty_list(#[case] args: Vec<Value>, #[case] kwargs: Option<Value>) {
        let kwargs = kwargs.map(kwargs_of);
        assert_eq!(format_argsrepr(&args, kwargs.as_ref()), "[]");
    }

    #[test]
    fn argsrepr_renders_args_only() {
        let args = vec![json!(1965), json!("1")];
        assert_eq!(format_argsrepr(&args, None), r#"[1965,"1"]"#);
    }

    #[test]
    fn argsrepr_renders_args_and_kwargs_object() {
        let args = vec![json!(1), json!(2)];
        let kwargs = kwargs_of(json!({ "key": "value" }));

        let repr = format_argsrepr(&args, Some(&kwargs));

        let parsed: Value = serde_json::from_str(&repr).unwrap();
        assert_eq!(parsed["args"], json!([1, 2]));
        assert_eq!(parsed["kwargs"], json!({ "key": "value" }));
    }

    #[test]
    fn headers_serialize_with_wire_keys_in_order() {
        let pool = Pool::new(1);
        let ids = SequenceGenerator::new("task");
        let headers = Headers::build(&pool, &ids, "t", &[json!(1)], None);

        let json = serde_json::to_string(&*headers).unwrap();

        let keys = [
            "lang", "task", "id", "root_id", "parent_id", "group", "expires", "shadow", "retries",
            "eta", "argsrepr", "timelimit", "origin",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains(r#""timelimit":[60,null]"#));
        assert!(json.contains(r#""parent_id":null"#));
    }
}
