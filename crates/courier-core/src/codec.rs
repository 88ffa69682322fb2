//! Codec - TaskBody とワイヤ文字列の相互変換
//!
//! ワイヤ形式: `base64(JSON([args, kwargs, embed]))`（標準アルファベット、パディングあり）
//!
//! # デコード時のエラー分類
//! 1. base64 として読めない → `MalformedEncoding`
//! 2. JSON として読めない / 3 要素の配列ではない → `MalformedPayload`
//! 3. 各スロットが期待する形ではない → `MalformedField`

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::envelope::{BODY_ENCODING_BASE64, CONTENT_ENCODING_UTF8, CONTENT_TYPE_JSON};
use crate::domain::{CodecError, Embed, Envelope, Kwargs, TaskBody};
use crate::pool::{Pool, Pooled, Pools};

/// TaskBody をワイヤ文字列にエンコードする
pub fn encode(body: &TaskBody) -> Result<String, CodecError> {
    // args は Vec なので null にはならない（空なら `[]`）
    let payload = (&body.args, &body.kwargs, &body.embed);
    let json = serde_json::to_vec(&payload).map_err(CodecError::Serialization)?;
    Ok(STANDARD.encode(json))
}

/// ワイヤ文字列をデコードし、プロセス共有プールの TaskBody に格納する
pub fn decode(wire: &str) -> Result<Pooled<'static, TaskBody>, CodecError> {
    decode_in(&Pools::global().bodies, wire)
}

/// ワイヤ文字列をデコードし、指定したプールの TaskBody に格納する
///
/// 検証がすべて通ってからプールに触るので、失敗時に返却漏れは起きません。
pub fn decode_in<'p>(
    pool: &'p Pool<TaskBody>,
    wire: &str,
) -> Result<Pooled<'p, TaskBody>, CodecError> {
    if wire.is_empty() {
        return Err(CodecError::MalformedEncoding("empty body".to_string()));
    }
    let raw = STANDARD
        .decode(wire)
        .map_err(|e| CodecError::MalformedEncoding(e.to_string()))?;

    let payload: Value =
        serde_json::from_slice(&raw).map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
    let Value::Array(slots) = payload else {
        return Err(CodecError::MalformedPayload(format!(
            "expected a JSON array, got {}",
            json_type(&payload)
        )));
    };
    let [args, kwargs, embed]: [Value; 3] = slots.try_into().map_err(|slots: Vec<Value>| {
        CodecError::MalformedPayload(format!(
            "unexpected task message payload length {}",
            slots.len()
        ))
    })?;

    // null は空として扱う（他の producer が null を送ってくることがある）
    let args: Option<Vec<Value>> = slot("args", args)?;
    let kwargs: Option<Kwargs> = slot("kwargs", kwargs)?;
    let embed: Option<Embed> = slot("embed", embed)?;

    let mut body = pool.acquire();
    body.args.extend(args.unwrap_or_default());
    if let Some(kwargs) = kwargs {
        body.kwargs.extend(kwargs);
    }
    body.embed = embed.unwrap_or_default();
    Ok(body)
}

/// 受信した envelope が JSON / base64 / utf-8 であることを確認する
pub fn validate_envelope(envelope: &Envelope) -> Result<(), CodecError> {
    let checks = [
        ("content-type", envelope.content_type.as_str(), CONTENT_TYPE_JSON),
        (
            "body_encoding",
            envelope.properties.body_encoding.as_str(),
            BODY_ENCODING_BASE64,
        ),
        (
            "content-encoding",
            envelope.content_encoding.as_str(),
            CONTENT_ENCODING_UTF8,
        ),
    ];
    for (field, actual, expected) in checks {
        if actual != expected {
            tracing::warn!(task_id = %envelope.headers.id, field, value = actual, "unsupported envelope format");
            return Err(CodecError::UnsupportedFormat {
                field,
                value: actual.to_string(),
            });
        }
    }
    Ok(())
}

fn slot<T: DeserializeOwned>(slot: &'static str, value: Value) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|source| CodecError::MalformedField { slot, source })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
