//! 统一错误类型模块
//!
//! 提供 securetoken 库中所有操作的错误类型定义。
//!
//! ## 错误分类
//!
//! - `InvalidArgument`: 调用方误用（空 token、非正 TTL、签发时间晚于过期时间）
//! - `MalformedToken`: 字节或文本无法解析为预期结构
//! - `DecryptionFailed`: 解密失败（密钥错误、篡改、填充错误），不区分具体原因
//! - `ProtectionFailed`: 保护器没有产生可用输出
//! - `Expired`: 成功解密解析，但已过期
//!
//! 对外暴露时，适配层应当把后四种统一映射为 "unauthorized"，
//! 参见 [`Error::is_unauthorized`]。

use thiserror::Error;

/// securetoken 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// securetoken 库的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 调用参数无效
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Token 格式无效
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// 解密失败
    ///
    /// 不携带细节：密钥错误、填充错误与篡改不可区分。
    #[error("unable to decrypt token")]
    DecryptionFailed,

    /// 保护器未产生可用输出
    #[error("token protection failed: {0}")]
    ProtectionFailed(String),

    /// Token 已过期
    #[error("token has expired")]
    Expired,

    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 加密原语错误
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// 内部错误
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 创建一个参数错误
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// 创建一个格式错误
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedToken(msg.into())
    }

    /// 创建一个保护失败错误
    pub fn protection_failed(msg: impl Into<String>) -> Self {
        Error::ProtectionFailed(msg.into())
    }

    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 是否属于应当统一映射为 "unauthorized" 的验证失败
    ///
    /// `MalformedToken`、`DecryptionFailed`、`ProtectionFailed`、`Expired`
    /// 对外不可区分；参数错误和配置错误属于调用方问题，不在此列。
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::MalformedToken(_)
                | Error::DecryptionFailed
                | Error::ProtectionFailed(_)
                | Error::Expired
        )
    }
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 缺少必需的配置
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    /// 无效的配置值
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// 创建一个无效值错误
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// 随机数生成失败
    #[error("random number generation failed: {0}")]
    RngFailed(String),
}
