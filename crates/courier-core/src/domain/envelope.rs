//! Envelope - transport に渡す最終メッセージ
//!
//! body（base64 化済みの TaskBody）+ headers + properties + content metadata。
//!
//! # 固定値
//! - `content-type`: `application/json`
//! - `content-encoding`: `utf-8`
//! - `properties.body_encoding`: `base64`
//! - `properties.delivery_mode`: 2（persistent）

use serde::{Deserialize, Serialize};

use super::body::TaskBody;
use super::errors::CodecError;
use super::headers::Headers;
use crate::codec;
use crate::pool::{Pool, Poolable, Pooled};
use crate::ports::IdGenerator;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_ENCODING_UTF8: &str = "utf-8";
pub const BODY_ENCODING_BASE64: &str = "base64";
pub const DELIVERY_MODE_PERSISTENT: u8 = 2;
pub const DEFAULT_ROUTING_KEY: &str = "celery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryInfo {
    pub routing_key: String,
    pub exchange: String,
}

impl Default for DeliveryInfo {
    fn default() -> Self {
        Self {
            routing_key: DEFAULT_ROUTING_KEY.to_string(),
            exchange: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub priority: u8,
    pub body_encoding: String,
    /// 常に `headers.id` と同じ値
    pub correlation_id: String,
    pub reply_to: String,
    pub delivery_info: DeliveryInfo,
    pub delivery_mode: u8,
    pub delivery_tag: String,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            priority: 0,
            body_encoding: BODY_ENCODING_BASE64.to_string(),
            correlation_id: String::new(),
            reply_to: String::new(),
            delivery_info: DeliveryInfo::default(),
            delivery_mode: DELIVERY_MODE_PERSISTENT,
            delivery_tag: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub body: String,
    pub headers: Headers,
    pub properties: Properties,
    #[serde(rename = "content-type")]
    pub content_type: String,
    #[serde(rename = "content-encoding")]
    pub content_encoding: String,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            body: String::new(),
            headers: Headers::default(),
            properties: Properties::default(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            content_encoding: CONTENT_ENCODING_UTF8.to_string(),
        }
    }
}

impl Envelope {
    /// エンコード済み body と headers から Envelope を組み立てる
    ///
    /// reply_to / delivery_tag はプールから取り出すたびに新しい ID を振ります。
    /// headers は envelope 自身のスロットにコピーされるので、
    /// 呼び出し側の Headers ガードは独立して返却できます。
    pub fn assemble<'p>(
        pool: &'p Pool<Envelope>,
        ids: &dyn IdGenerator,
        encoded_body: String,
        headers: &Headers,
    ) -> Pooled<'p, Envelope> {
        let mut envelope = pool.acquire();
        envelope.properties.reply_to = ids.generate();
        envelope.properties.delivery_tag = ids.generate();

        envelope.body = encoded_body;
        envelope.headers.clone_from(headers);
        envelope.properties.correlation_id.clone_from(&headers.id);
        envelope
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Serialization)
    }

    /// transport から受け取った JSON を Envelope に戻す
    pub fn from_json(raw: &str) -> Result<Self, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::MalformedPayload(e.to_string()))
    }

    /// 受信側の検証をしてから body をデコードする
    ///
    /// content-type / body_encoding / content-encoding のどれかが想定外なら
    /// `UnsupportedFormat` を返します（プロセスを止めるようなエラーではない）。
    pub fn task_body(&self) -> Result<Pooled<'static, TaskBody>, CodecError> {
        codec::validate_envelope(self)?;
        codec::decode(&self.body).inspect_err(|e| {
            tracing::warn!(task_id = %self.headers.id, error = %e, "failed to decode task body");
        })
    }
}

impl Poolable for Envelope {
    fn reset(&mut self) {
        self.headers.reset();
        self.body.clear();
        self.content_type.clear();
        self.content_type.push_str(CONTENT_TYPE_JSON);
        self.content_encoding.clear();
        self.content_encoding.push_str(CONTENT_ENCODING_UTF8);
        self.properties = Properties::default();
    }
}
