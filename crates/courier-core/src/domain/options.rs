//! SubmitOptions - submit ごとの上書き設定
//!
//! 指定しなかった項目は Producer の設定（ProducerConfig）の値が使われます。

use chrono::{DateTime, Duration, Utc};

use super::envelope::Properties;
use super::errors::CodecError;
use super::headers::{Headers, TimeLimit};
use crate::app::config::ProducerConfig;

/// SubmitOptions は apply_async に渡すオプション
///
/// # 使用例
/// ```ignore
/// let options = SubmitOptions::default()
///     .with_countdown(Duration::seconds(10))
///     .with_routing_key("priority.high");
/// producer.apply_async("tasks.add", &args, None, &options).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOptions {
    /// 今から何秒後に実行するか（`eta` が指定されていればそちらが優先）
    pub countdown: Option<Duration>,
    pub eta: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub priority: Option<u8>,
    pub routing_key: Option<String>,
    pub exchange: Option<String>,
    /// `None` は設定値を使う、`Some(None)` は制限なし
    pub soft_time_limit: Option<Option<u64>>,
    pub time_limit: Option<Option<u64>>,
    pub shadow: Option<String>,
}

impl SubmitOptions {
    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = Some(countdown);
        self
    }

    pub fn with_eta(mut self, eta: DateTime<Utc>) -> Self {
        self.eta = Some(eta);
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_routing_key(mut self, routing_key: impl Into<String>) -> Self {
        self.routing_key = Some(routing_key.into());
        self
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// time limit を明示する。`None` を渡すとその制限は外れる（設定値も使わない）
    pub fn with_time_limits(mut self, soft: Option<u64>, hard: Option<u64>) -> Self {
        self.soft_time_limit = Some(soft);
        self.time_limit = Some(hard);
        self
    }

    pub fn with_shadow(mut self, shadow: impl Into<String>) -> Self {
        self.shadow = Some(shadow.into());
        self
    }

    /// eta / expires / time limit / shadow を headers に反映する
    ///
    /// countdown が日時の範囲を超える場合はエラー（即時実行に化けさせない）
    pub(crate) fn apply_to_headers(
        &self,
        headers: &mut Headers,
        now: DateTime<Utc>,
        config: &ProducerConfig,
    ) -> Result<(), CodecError> {
        headers.eta = match (self.eta, self.countdown) {
            (Some(eta), _) => Some(eta),
            (None, Some(countdown)) => Some(now.checked_add_signed(countdown).ok_or_else(|| {
                CodecError::InvalidOption {
                    option: "countdown",
                    reason: format!("{countdown} from {now} is out of range"),
                }
            })?),
            (None, None) => None,
        };
        headers.expires = self.expires;
        headers.shadow.clone_from(&self.shadow);
        headers.timelimit = TimeLimit(
            self.soft_time_limit.unwrap_or(config.default_soft_time_limit),
            self.time_limit.unwrap_or(config.default_time_limit),
        );
        Ok(())
    }

    /// priority / routing_key / exchange を properties に反映する
    pub(crate) fn apply_to_properties(&self, properties: &mut Properties, config: &ProducerConfig) {
        properties.priority = self.priority.unwrap_or(config.default_priority);

        let routing_key = self
            .routing_key
            .as_deref()
            .unwrap_or(&config.default_routing_key);
        properties.delivery_info.routing_key.clear();
        properties.delivery_info.routing_key.push_str(routing_key);

        let exchange = self.exchange.as_deref().unwrap_or(&config.default_exchange);
        properties.delivery_info.exchange.clear();
        properties.delivery_info.exchange.push_str(exchange);
    }
}
