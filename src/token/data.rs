//! Token 附加数据转换
//!
//! Provider 只接受 `HashMap<String, String>` 形式的数据。本模块提供
//! [`ToTokenData`] trait，让业务结构体通过显式列举字段的方式转换为数据映射，
//! 以及一个按 `Display` 格式化值的 [`TokenData`] 构建器。
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::token::{ToTokenData, TokenData};
//! use std::collections::HashMap;
//!
//! struct Download {
//!     file_id: u64,
//!     owner: String,
//! }
//!
//! impl ToTokenData for Download {
//!     fn to_token_data(&self) -> HashMap<String, String> {
//!         TokenData::new()
//!             .with("file_id", self.file_id)
//!             .with("owner", &self.owner)
//!             .into()
//!     }
//! }
//!
//! let data = Download { file_id: 12, owner: "alice".into() }.to_token_data();
//! assert_eq!(data["file_id"], "12");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// 可转换为 Token 附加数据的类型
pub trait ToTokenData {
    /// 转换为字符串键值映射
    fn to_token_data(&self) -> HashMap<String, String>;
}

impl ToTokenData for HashMap<String, String> {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.clone()
    }
}

impl ToTokenData for HashMap<&str, &str> {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl ToTokenData for BTreeMap<String, String> {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl ToTokenData for Vec<(String, String)> {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.iter().cloned().collect()
    }
}

impl<const N: usize> ToTokenData for [(&str, &str); N] {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Token 数据构建器
///
/// 值通过 `Display` 格式化，结果与区域设置无关。重复的键以最后一次为准。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenData {
    entries: HashMap<String, String>,
}

impl TokenData {
    /// 创建空的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个数据项
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.entries.insert(key.into(), value.to_string());
        self
    }

    /// 添加一个可选数据项，`None` 时跳过
    pub fn with_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// 数据项数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ToTokenData for TokenData {
    fn to_token_data(&self) -> HashMap<String, String> {
        self.entries.clone()
    }
}

impl From<TokenData> for HashMap<String, String> {
    fn from(data: TokenData) -> Self {
        data.entries
    }
}
