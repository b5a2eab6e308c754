//! 安全 Token 值类型
//!
//! [`SecureToken`] 是一个不可变的记录，包含签发时间、过期时间和字符串键值对数据。
//! 构造时强制 `issued <= expires`，构造完成后任何字段都不能再被修改。
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::token::SecureToken;
//! use chrono::{Duration, Utc};
//! use std::collections::HashMap;
//!
//! let now = Utc::now();
//! let mut data = HashMap::new();
//! data.insert("user".to_string(), "42".to_string());
//!
//! let token = SecureToken::create(now, now + Duration::seconds(60), data).unwrap();
//! assert_eq!(token.get("user"), Some("42"));
//! assert!(!token.is_expired());
//!
//! // 签发时间晚于过期时间会被拒绝
//! assert!(SecureToken::create(now + Duration::seconds(10), now, HashMap::new()).is_err());
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::random::constant_time_compare_str;

/// 反序列化后的 Token 信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureToken {
    issued: DateTime<Utc>,
    expires: DateTime<Utc>,
    data: HashMap<String, String>,
}

impl SecureToken {
    /// 创建新的 Token
    ///
    /// # 参数
    ///
    /// * `issued` - 签发时间
    /// * `expires` - 过期时间
    /// * `data` - 附加数据（允许为空）
    ///
    /// # Errors
    ///
    /// 当 `issued` 晚于 `expires` 时返回 `Error::InvalidArgument`
    pub fn create(
        issued: DateTime<Utc>,
        expires: DateTime<Utc>,
        data: HashMap<String, String>,
    ) -> Result<Self> {
        if issued > expires {
            return Err(Error::invalid_argument(format!(
                "issued ({}) cannot be after expires ({})",
                issued.to_rfc3339(),
                expires.to_rfc3339()
            )));
        }

        Ok(Self {
            issued,
            expires,
            data,
        })
    }

    /// 签发时间
    pub fn issued(&self) -> DateTime<Utc> {
        self.issued
    }

    /// 过期时间
    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    /// 附加数据（只读）
    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// 获取单个数据项
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// 检查 Token 是否已过期
    ///
    /// 每次调用都读取当前时间，不做缓存。
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 检查 Token 在给定时刻是否已过期
    pub fn is_expired_at(&self, instant: DateTime<Utc>) -> bool {
        instant > self.expires
    }

    /// 获取剩余有效时间（秒）
    pub fn time_to_live(&self) -> i64 {
        let remaining = self.expires - Utc::now();
        remaining.num_seconds().max(0)
    }

    /// 以常量时间比较数据项与期望值
    ///
    /// 数据项不存在时返回 `false`。
    pub fn matches(&self, key: &str, expected: &str) -> bool {
        self.get(key)
            .is_some_and(|value| constant_time_compare_str(value, expected))
    }

    /// 取出附加数据
    pub fn into_data(self) -> HashMap<String, String> {
        self.data
    }
}
