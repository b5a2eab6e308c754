//! 紧凑二进制序列化器
//!
//! 使用 bincode（变长整数编码）编码 `{issued, expires, data}`。
//! 时间以 tick 表示：自 0001-01-01T00:00:00Z 起的 100 纳秒间隔数，
//! 因此精度为 100 纳秒，不足部分会被截断。
//!
//! 需启用 `binary` feature（默认启用）。

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{TokenSerializer, deserialize_unique_map};
use crate::error::{Error, Result};
use crate::token::SecureToken;

/// 0001-01-01 到 Unix 纪元之间的 tick 数
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// 每秒 tick 数
const TICKS_PER_SECOND: i64 = 10_000_000;

/// 反序列化时允许的最大输入长度
const MAX_TOKEN_SIZE: u64 = 1024 * 1024;

#[derive(Serialize)]
struct TokenContractRef<'a> {
    issued: i64,
    expires: i64,
    data: &'a HashMap<String, String>,
}

#[derive(Deserialize)]
struct TokenContract {
    issued: i64,
    expires: i64,
    #[serde(deserialize_with = "deserialize_unique_map")]
    data: HashMap<String, String>,
}

/// 基于 bincode 的紧凑二进制 Token 序列化器
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryTokenSerializer;

impl BinaryTokenSerializer {
    /// 创建二进制序列化器
    pub fn new() -> Self {
        Self
    }
}

impl TokenSerializer for BinaryTokenSerializer {
    fn serialize(&self, token: &SecureToken) -> Result<Vec<u8>> {
        let contract = TokenContractRef {
            issued: to_ticks(token.issued())?,
            expires: to_ticks(token.expires())?,
            data: token.data(),
        };

        bincode::DefaultOptions::new()
            .reject_trailing_bytes()
            .serialize(&contract)
            .map_err(|e| Error::internal(format!("binary token encoding failed: {}", e)))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<SecureToken> {
        let contract: TokenContract = bincode::DefaultOptions::new()
            .with_limit(MAX_TOKEN_SIZE)
            .reject_trailing_bytes()
            .deserialize(bytes)
            .map_err(|e| Error::malformed(format!("invalid binary token: {}", e)))?;

        let issued = from_ticks(contract.issued)?;
        let expires = from_ticks(contract.expires)?;

        SecureToken::create(issued, expires, contract.data)
    }

    fn name(&self) -> &'static str {
        "binary"
    }
}

fn to_ticks(instant: DateTime<Utc>) -> Result<i64> {
    instant
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(i64::from(instant.timestamp_subsec_nanos() / 100)))
        .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
        .ok_or_else(|| {
            Error::internal(format!(
                "instant {} is outside the binary timestamp range",
                instant.to_rfc3339()
            ))
        })
}

fn from_ticks(ticks: i64) -> Result<DateTime<Utc>> {
    let since_epoch = ticks
        .checked_sub(UNIX_EPOCH_TICKS)
        .ok_or_else(|| Error::malformed("timestamp out of range"))?;

    let secs = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * 100) as u32;

    DateTime::from_timestamp(secs, nanos).ok_or_else(|| Error::malformed("timestamp out of range"))
}
