//! JSON 序列化器
//!
//! 线上格式：
//!
//! ```json
//! {"issued":"2026-10-18T05:35:00.123456789Z","expires":"2026-10-18T05:36:00.123456789Z","data":{"user":"42"}}
//! ```
//!
//! 时间使用 RFC 3339 格式，保留纳秒精度。未知字段会被拒绝。

use chrono::{DateTime, Utc};
use serde::de::{Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{TokenSerializer, deserialize_unique_map};
use crate::error::{Error, Result};
use crate::token::SecureToken;

#[derive(Serialize)]
struct TokenContractRef<'a> {
    issued: DateTime<Utc>,
    expires: DateTime<Utc>,
    data: &'a HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenContract {
    issued: DateTime<Utc>,
    expires: DateTime<Utc>,
    // 缺失字段视为格式错误，显式 null 视为参数错误
    #[serde(deserialize_with = "deserialize_nullable_data")]
    data: Option<HashMap<String, String>>,
}

fn deserialize_nullable_data<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NullableData;

    impl<'de> Visitor<'de> for NullableData {
        type Value = Option<HashMap<String, String>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of strings or null")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserialize_unique_map(deserializer).map(Some)
        }
    }

    deserializer.deserialize_option(NullableData)
}

/// 基于 JSON 的 Token 序列化器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTokenSerializer;

impl JsonTokenSerializer {
    /// 创建 JSON 序列化器
    pub fn new() -> Self {
        Self
    }
}

impl TokenSerializer for JsonTokenSerializer {
    fn serialize(&self, token: &SecureToken) -> Result<Vec<u8>> {
        let contract = TokenContractRef {
            issued: token.issued(),
            expires: token.expires(),
            data: token.data(),
        };

        serde_json::to_vec(&contract)
            .map_err(|e| Error::internal(format!("json token encoding failed: {}", e)))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<SecureToken> {
        let contract: TokenContract = serde_json::from_slice(bytes)
            .map_err(|e| Error::malformed(format!("invalid json token: {}", e)))?;

        let data = contract
            .data
            .ok_or_else(|| Error::invalid_argument("token data cannot be null"))?;

        SecureToken::create(contract.issued, contract.expires, data)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
