//! Token 序列化模块
//!
//! 定义 [`TokenSerializer`] trait，负责在 [`SecureToken`] 与字节序列之间转换。
//! 只要签发方和验证方使用相同的实现，各实现之间可以互换，Provider 不关心具体格式。
//!
//! ## 内置实现
//!
//! - [`JsonTokenSerializer`]: 结构化文本格式（默认）
//! - [`BinaryTokenSerializer`]: 紧凑二进制格式（需启用 `binary` feature）
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::serializer::{JsonTokenSerializer, TokenSerializer};
//! use securetoken::token::SecureToken;
//! use chrono::{Duration, Utc};
//! use std::collections::HashMap;
//!
//! let now = Utc::now();
//! let token = SecureToken::create(now, now + Duration::seconds(60), HashMap::new()).unwrap();
//!
//! let serializer = JsonTokenSerializer::new();
//! let bytes = serializer.serialize(&token).unwrap();
//! let restored = serializer.deserialize(&bytes).unwrap();
//! assert_eq!(restored, token);
//! ```

#[cfg(feature = "binary")]
pub mod binary;
pub mod json;

#[cfg(feature = "binary")]
pub use binary::BinaryTokenSerializer;
pub use json::JsonTokenSerializer;

use serde::de::{Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::error::Result;
use crate::token::SecureToken;

/// Token 序列化器 trait
///
/// 实现必须可以被多个线程并发只读使用。
pub trait TokenSerializer: Send + Sync {
    /// 将 Token 序列化为字节序列
    ///
    /// 必须无损地编码签发时间、过期时间以及全部附加数据。
    fn serialize(&self, token: &SecureToken) -> Result<Vec<u8>>;

    /// 将字节序列反序列化为 Token
    ///
    /// 字节无法解析为预期结构时返回 `Error::MalformedToken`；
    /// 解析成功后通过 [`SecureToken::create`] 重建，因此 `issued > expires`
    /// 的数据会返回 `Error::InvalidArgument`。
    fn deserialize(&self, bytes: &[u8]) -> Result<SecureToken>;

    /// 序列化器名称，用于日志
    fn name(&self) -> &'static str;
}

/// 反序列化附加数据映射，重复的键视为格式错误
pub(crate) fn deserialize_unique_map<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(UniqueKeyMap)
}

struct UniqueKeyMap;

impl<'de> Visitor<'de> for UniqueKeyMap {
    type Value = HashMap<String, String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of strings with unique keys")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = HashMap::with_capacity(access.size_hint().unwrap_or(0).min(64));

        while let Some((key, value)) = access.next_entry::<String, String>()? {
            match map.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(serde::de::Error::custom(format_args!(
                        "duplicate data key '{}'",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }

        Ok(map)
    }
}
