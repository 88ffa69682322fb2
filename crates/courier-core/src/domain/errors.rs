//! Errors - エラー型と分類
//!
//! ErrorKind は運用上の分類で、リトライするかどうかの判断材料として外側に渡します。
//! このクレート自身はリトライしません。

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（リトライ推奨）
/// - Permanent: 恒久的なエラー（同じ入力ならリトライ無意味）
/// - Infrastructure: インフラエラー（broker / backend の障害）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// CodecError は body / envelope のエンコード・デコードのエラー
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// base64 として読めない（空文字を含む）
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// JSON として読めない、または 3 要素の配列ではない
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// 要素はあるが期待する形（配列 / オブジェクト / embed）ではない
    #[error("malformed field `{slot}`: {source}")]
    MalformedField {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// envelope が対応していない content-type / body_encoding / content-encoding を宣言している
    #[error("unsupported {field} `{value}`")]
    UnsupportedFormat { field: &'static str, value: String },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// submit オプションからヘッダを組み立てられない（countdown のオーバーフローなど）
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}

impl CodecError {
    /// 同じ入力を送り直しても結果は変わらない
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Permanent
    }
}
