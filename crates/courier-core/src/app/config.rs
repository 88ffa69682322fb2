//! ProducerConfig - producer の既定値
//!
//! 環境変数（`COURIER_*`）または JSON から読み込みます。
//! 指定のない項目はプロトコルの既定値（routing key `celery`, priority 0, soft time limit 60）です。

use serde::Deserialize;

use crate::domain::envelope::DEFAULT_ROUTING_KEY;
use crate::domain::headers::DEFAULT_SOFT_TIME_LIMIT;

pub const ENV_ROUTING_KEY: &str = "COURIER_ROUTING_KEY";
pub const ENV_EXCHANGE: &str = "COURIER_EXCHANGE";
pub const ENV_PRIORITY: &str = "COURIER_PRIORITY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    pub default_routing_key: String,
    pub default_exchange: String,
    pub default_priority: u8,
    pub default_soft_time_limit: Option<u64>,
    pub default_time_limit: Option<u64>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            default_routing_key: DEFAULT_ROUTING_KEY.to_string(),
            default_exchange: String::new(),
            default_priority: 0,
            default_soft_time_limit: Some(DEFAULT_SOFT_TIME_LIMIT),
            default_time_limit: None,
        }
    }
}

impl ProducerConfig {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の key → value 関数から読み込む（テストでは HashMap を渡す）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(routing_key) = lookup(ENV_ROUTING_KEY) {
            if routing_key.is_empty() {
                return Err(ConfigError::Invalid {
                    key: ENV_ROUTING_KEY,
                    value: routing_key,
                });
            }
            config.default_routing_key = routing_key;
        }
        if let Some(exchange) = lookup(ENV_EXCHANGE) {
            config.default_exchange = exchange;
        }
        if let Some(priority) = lookup(ENV_PRIORITY) {
            config.default_priority = priority.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PRIORITY,
                value: priority.clone(),
            })?;
        }
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ProducerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProducerConfig::default());
        assert_eq!(config.default_routing_key, "celery");
        assert_eq!(config.default_soft_time_limit, Some(60));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ProducerConfig::from_lookup(lookup(&[
            (ENV_ROUTING_KEY, "video"),
            (ENV_EXCHANGE, "media"),
            (ENV_PRIORITY, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.default_routing_key, "video");
        assert_eq!(config.default_exchange, "media");
        assert_eq!(config.default_priority, 5);
    }

    #[test]
    fn invalid_priority_is_rejected() {
        let err = ProducerConfig::from_lookup(lookup(&[(ENV_PRIORITY, "high")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_PRIORITY, .. }));
    }

    #[test]
    fn empty_routing_key_is_rejected() {
        let err = ProducerConfig::from_lookup(lookup(&[(ENV_ROUTING_KEY, "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_ROUTING_KEY, .. }));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config =
            ProducerConfig::from_json(r#"{ "default_priority": 3, "default_time_limit": 120 }"#)
                .unwrap();
        assert_eq!(config.default_priority, 3);
        assert_eq!(config.default_time_limit, Some(120));
        assert_eq!(config.default_routing_key, "celery");
    }
}
