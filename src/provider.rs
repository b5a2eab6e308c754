//! Token Provider
//!
//! [`SecureTokenProvider`] 负责组织 Token 的签发与验证：
//!
//! - **签发**: 数据 + TTL → [`SecureToken`] → 序列化 → 加密 → Base64 文本
//! - **验证**: Base64 文本 → 解密 → 反序列化 → 过期检查 → [`SecureToken`]
//!
//! Provider 通过组合持有一个序列化器和一个保护器，没有全局状态。
//! 在进程启动时创建一次，之后以引用或克隆的方式传给各个调用点；
//! 需要轮换密钥时创建新的实例即可。
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::protector::{AesConfig, KeySize, generate_key};
//! use securetoken::provider::SecureTokenProvider;
//! use securetoken::token::TokenData;
//!
//! let key = generate_key(KeySize::Aes256).unwrap();
//! let provider = SecureTokenProvider::with_aes(AesConfig::from_base64(&key, 256).unwrap());
//!
//! // 签发
//! let data = TokenData::new().with("user", 42).with("role", "admin");
//! let token = provider.issue(data, 60).unwrap();
//!
//! // 验证
//! let validated = provider.validate(&token).unwrap();
//! assert_eq!(validated.get("user"), Some("42"));
//! assert!(!validated.is_expired());
//! ```

use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{ConfigError, Error, Result};
use crate::protector::{AesConfig, AesTokenProtector, TokenProtector};
use crate::serializer::{JsonTokenSerializer, TokenSerializer};
use crate::token::{SecureToken, ToTokenData};

/// 默认 TTL（秒）
pub const DEFAULT_TTL_SECONDS: i64 = 60;

/// 可签发的最晚过期时间（9999-12-31T23:59:59Z 的 Unix 秒数）
///
/// 所有内置序列化器都能无损表示不晚于此刻的时间。
pub const MAX_EXPIRES_TIMESTAMP: i64 = 253_402_300_799;

/// 默认 TTL 环境变量
pub const ENV_DEFAULT_TTL: &str = "SECURETOKEN_DEFAULT_TTL";
/// 传输编码环境变量
pub const ENV_TRANSPORT: &str = "SECURETOKEN_TRANSPORT";

/// Token 字符串的传输编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportEncoding {
    /// 标准 Base64（带填充，默认）
    #[default]
    Standard,
    /// URL 安全的 Base64（无填充），可直接放入查询参数和 Cookie
    UrlSafe,
}

impl TransportEncoding {
    fn encode(&self, bytes: &[u8]) -> String {
        match self {
            TransportEncoding::Standard => STANDARD.encode(bytes),
            TransportEncoding::UrlSafe => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    fn decode(&self, text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        match self {
            TransportEncoding::Standard => STANDARD.decode(text),
            TransportEncoding::UrlSafe => URL_SAFE_NO_PAD.decode(text),
        }
    }
}

impl fmt::Display for TransportEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEncoding::Standard => write!(f, "standard"),
            TransportEncoding::UrlSafe => write!(f, "url-safe"),
        }
    }
}

impl FromStr for TransportEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TransportEncoding::Standard),
            "url-safe" | "urlsafe" => Ok(TransportEncoding::UrlSafe),
            _ => Err(ConfigError::invalid(
                "transport",
                format!("unsupported transport encoding '{}'", s),
            )
            .into()),
        }
    }
}

/// Provider 配置
///
/// 默认 TTL 始终大于 0。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    default_ttl: i64,
    transport: TransportEncoding,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECONDS,
            transport: TransportEncoding::default(),
        }
    }
}

impl ProviderConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置默认 TTL（秒）
    ///
    /// # Errors
    ///
    /// `seconds <= 0` 时返回 `ConfigError::InvalidValue`
    pub fn with_default_ttl(mut self, seconds: i64) -> Result<Self> {
        if seconds <= 0 {
            return Err(ConfigError::invalid(
                "default_ttl",
                format!("must be greater than 0, got {}", seconds),
            )
            .into());
        }
        self.default_ttl = seconds;
        Ok(self)
    }

    /// 设置传输编码
    pub fn with_transport(mut self, transport: TransportEncoding) -> Self {
        self.transport = transport;
        self
    }

    /// 默认 TTL（秒），用于 [`SecureTokenProvider::issue_default`]
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }

    /// Token 字符串的传输编码
    pub fn transport(&self) -> TransportEncoding {
        self.transport
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过自定义查找函数加载配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEFAULT_TTL) {
            let ttl = value.trim().parse::<i64>().map_err(|_| {
                ConfigError::invalid(ENV_DEFAULT_TTL, format!("'{}' is not a number", value))
            })?;
            if ttl <= 0 {
                return Err(ConfigError::invalid(ENV_DEFAULT_TTL, "must be greater than 0").into());
            }
            config.default_ttl = ttl;
        }

        if let Some(value) = lookup(ENV_TRANSPORT) {
            config.transport = value.parse()?;
        }

        Ok(config)
    }
}

/// 安全 Token Provider
///
/// 可在多个线程间共享，克隆成本很低。
#[derive(Clone)]
pub struct SecureTokenProvider {
    serializer: Arc<dyn TokenSerializer>,
    protector: Arc<dyn TokenProtector>,
    config: ProviderConfig,
}

impl SecureTokenProvider {
    /// 使用给定的序列化器和保护器创建 Provider
    pub fn new<S, P>(serializer: S, protector: P) -> Self
    where
        S: TokenSerializer + 'static,
        P: TokenProtector + 'static,
    {
        Self::with_config(serializer, protector, ProviderConfig::default())
    }

    /// 使用自定义配置创建 Provider
    pub fn with_config<S, P>(serializer: S, protector: P, config: ProviderConfig) -> Self
    where
        S: TokenSerializer + 'static,
        P: TokenProtector + 'static,
    {
        Self::from_parts(Arc::new(serializer), Arc::new(protector), config)
    }

    /// 使用共享的序列化器和保护器创建 Provider
    pub fn from_parts(
        serializer: Arc<dyn TokenSerializer>,
        protector: Arc<dyn TokenProtector>,
        config: ProviderConfig,
    ) -> Self {
        debug!(
            serializer = serializer.name(),
            protector = protector.name(),
            default_ttl = config.default_ttl,
            transport = %config.transport,
            "secure token provider created"
        );

        Self {
            serializer,
            protector,
            config,
        }
    }

    /// 默认组合：JSON 序列化器 + AES 保护器
    pub fn with_aes(config: AesConfig) -> Self {
        Self::new(JsonTokenSerializer::new(), AesTokenProtector::new(config))
    }

    /// 从环境变量创建默认组合的 Provider
    ///
    /// 读取 [`AesConfig::from_env`] 与 [`ProviderConfig::from_env`] 使用的全部变量。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过自定义查找函数创建默认组合的 Provider
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let aes = AesConfig::from_lookup(&lookup)?;
        let config = ProviderConfig::from_lookup(&lookup)?;

        Ok(Self::with_config(
            JsonTokenSerializer::new(),
            AesTokenProtector::new(aes),
            config,
        ))
    }

    /// 当前配置
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// 签发 Token
    ///
    /// # 参数
    ///
    /// * `payload` - 附加数据（允许为空）
    /// * `ttl_seconds` - 有效期（秒），必须大于 0
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: `ttl_seconds <= 0`，或过期时间晚于 [`MAX_EXPIRES_TIMESTAMP`]
    /// - `ProtectionFailed`: 保护器没有产生输出
    pub fn issue(
        &self,
        payload: impl Into<HashMap<String, String>>,
        ttl_seconds: i64,
    ) -> Result<String> {
        if ttl_seconds <= 0 {
            return Err(Error::invalid_argument(format!(
                "ttl must be greater than 0, got {}",
                ttl_seconds
            )));
        }

        let now = Utc::now();
        let expires = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .filter(|expires| expires.timestamp() <= MAX_EXPIRES_TIMESTAMP)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "ttl {} expires after 9999-12-31T23:59:59Z",
                    ttl_seconds
                ))
            })?;

        let token = SecureToken::create(now, expires, payload.into())?;

        let serialized = self.serializer.serialize(&token)?;

        let protected = self.protector.protect(&serialized)?;
        if protected.is_empty() {
            return Err(Error::protection_failed("token encryption produced no output"));
        }

        trace!(
            keys = token.data().len(),
            ttl_seconds,
            "secure token issued"
        );

        Ok(self.config.transport.encode(&protected))
    }

    /// 使用默认 TTL 签发 Token
    pub fn issue_default(&self, payload: impl Into<HashMap<String, String>>) -> Result<String> {
        self.issue(payload, self.config.default_ttl)
    }

    /// 签发 Token，数据来自实现了 [`ToTokenData`] 的类型
    pub fn issue_data<T>(&self, data: &T, ttl_seconds: i64) -> Result<String>
    where
        T: ToTokenData + ?Sized,
    {
        self.issue(data.to_token_data(), ttl_seconds)
    }

    /// 验证 Token 并返回其内容
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: Token 为空
    /// - `MalformedToken`: 不是有效的 Base64，或解密后的数据无法解析
    /// - `DecryptionFailed`: 解密失败（不区分具体原因）
    /// - `ProtectionFailed`: 解密没有产生输出
    /// - `Expired`: Token 已过期
    pub fn validate(&self, token: &str) -> Result<SecureToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::invalid_argument("token cannot be empty"));
        }

        let decoded = self
            .config
            .transport
            .decode(token)
            .map_err(|e| Error::malformed(format!("invalid base64 token: {}", e)))?;

        let unprotected = self
            .protector
            .unprotect(&decoded)
            .map_err(|_| Error::DecryptionFailed)?;

        if unprotected.is_empty() {
            return Err(Error::protection_failed("token decryption produced no output"));
        }

        let token = self.serializer.deserialize(&unprotected)?;

        if token.is_expired() {
            return Err(Error::Expired);
        }

        trace!(keys = token.data().len(), "secure token validated");

        Ok(token)
    }
}

impl fmt::Debug for SecureTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureTokenProvider")
            .field("serializer", &self.serializer.name())
            .field("protector", &self.protector.name())
            .field("config", &self.config)
            .finish()
    }
}
