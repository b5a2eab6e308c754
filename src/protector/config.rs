//! AES 加密配置
//!
//! [`AesConfig`] 在构造时立即校验：密钥必须存在，长度必须恰好等于
//! `key_size / 8` 字节，且 `key_size` 必须是 AES 支持的长度（128/192/256）。
//! 不存在处于无效状态的配置对象。
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::protector::{AesConfig, CipherMode, KeySize, PaddingMode, generate_key};
//!
//! let key = generate_key(KeySize::Aes256).unwrap();
//! let config = AesConfig::from_base64(&key, 256)
//!     .unwrap()
//!     .with_cipher_mode(CipherMode::Cbc)
//!     .with_padding(PaddingMode::Pkcs7);
//!
//! assert_eq!(config.key_size(), KeySize::Aes256);
//!
//! // 密钥长度与 key_size 不匹配会被拒绝
//! assert!(AesConfig::from_base64(&key, 128).is_err());
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Error, Result};
use crate::random::generate_random_base64;

/// 加密密钥（标准 Base64）
pub const ENV_ENCRYPTION_KEY: &str = "SECURETOKEN_ENCRYPTION_KEY";
/// 密钥长度（位）
pub const ENV_KEY_SIZE: &str = "SECURETOKEN_KEY_SIZE";
/// 分组密码模式
pub const ENV_CIPHER_MODE: &str = "SECURETOKEN_CIPHER_MODE";
/// 填充模式
pub const ENV_PADDING: &str = "SECURETOKEN_PADDING";

/// AES 密钥长度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeySize {
    /// AES-128
    Aes128,
    /// AES-192
    Aes192,
    /// AES-256（默认）
    #[default]
    Aes256,
}

impl KeySize {
    /// 从位数创建，只接受 128、192、256
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(KeySize::Aes128),
            192 => Ok(KeySize::Aes192),
            256 => Ok(KeySize::Aes256),
            other => Err(ConfigError::invalid(
                "key_size",
                format!("{} is not a legal AES key size, use 128, 192 or 256", other),
            )
            .into()),
        }
    }

    /// 密钥位数
    pub fn bits(&self) -> u32 {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }

    /// 密钥字节数
    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for KeySize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::invalid("key_size", format!("'{}' is not a number", s)))?;
        KeySize::from_bits(bits)
    }
}

/// 分组密码模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherMode {
    /// 密码分组链接模式（默认）
    #[default]
    Cbc,
    /// 电子密码本模式，不使用 IV（仍会生成并随密文传输）
    Ecb,
    /// 128 位反馈的密文反馈模式
    Cfb,
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherMode::Cbc => write!(f, "cbc"),
            CipherMode::Ecb => write!(f, "ecb"),
            CipherMode::Cfb => write!(f, "cfb"),
        }
    }
}

impl FromStr for CipherMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbc" => Ok(CipherMode::Cbc),
            "ecb" => Ok(CipherMode::Ecb),
            "cfb" => Ok(CipherMode::Cfb),
            _ => Err(ConfigError::invalid(
                "cipher_mode",
                format!("unsupported cipher mode '{}'", s),
            )
            .into()),
        }
    }
}

/// 填充模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    /// 不填充，明文长度必须是分组长度的整数倍
    None,
    /// PKCS#7（默认）
    #[default]
    Pkcs7,
    /// 零填充
    Zeros,
    /// ANSI X9.23
    AnsiX923,
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaddingMode::None => write!(f, "none"),
            PaddingMode::Pkcs7 => write!(f, "pkcs7"),
            PaddingMode::Zeros => write!(f, "zeros"),
            PaddingMode::AnsiX923 => write!(f, "ansix923"),
        }
    }
}

impl FromStr for PaddingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PaddingMode::None),
            "pkcs7" => Ok(PaddingMode::Pkcs7),
            "zeros" => Ok(PaddingMode::Zeros),
            "ansix923" => Ok(PaddingMode::AnsiX923),
            _ => Err(
                ConfigError::invalid("padding", format!("unsupported padding '{}'", s)).into(),
            ),
        }
    }
}

/// AES 加密配置
#[derive(Clone)]
pub struct AesConfig {
    key: Vec<u8>,
    key_size: KeySize,
    cipher_mode: CipherMode,
    padding: PaddingMode,
}

impl AesConfig {
    /// 使用原始密钥字节创建配置
    ///
    /// # 参数
    ///
    /// * `key` - 密钥字节，长度必须为 `key_size_bits / 8`
    /// * `key_size_bits` - 密钥位数（128、192 或 256）
    pub fn new(key: impl Into<Vec<u8>>, key_size_bits: u32) -> Result<Self> {
        let key = key.into();
        let key_size = KeySize::from_bits(key_size_bits)?;

        if key.is_empty() {
            return Err(ConfigError::MissingRequired("encryption key".into()).into());
        }

        if key.len() != key_size.bytes() {
            return Err(ConfigError::invalid(
                "encryption_key",
                format!(
                    "key must be exactly {} bits ({} bytes), got {} bytes",
                    key_size.bits(),
                    key_size.bytes(),
                    key.len()
                ),
            )
            .into());
        }

        Ok(Self {
            key,
            key_size,
            cipher_mode: CipherMode::default(),
            padding: PaddingMode::default(),
        })
    }

    /// 使用标准 Base64 编码的密钥创建配置
    pub fn from_base64(key: &str, key_size_bits: u32) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingRequired("encryption key".into()).into());
        }

        let bytes = STANDARD
            .decode(key)
            .map_err(|e| ConfigError::invalid("encryption_key", format!("invalid base64: {}", e)))?;

        Self::new(bytes, key_size_bits)
    }

    /// 从环境变量加载配置
    ///
    /// | 变量 | 默认值 |
    /// |---|---|
    /// | `SECURETOKEN_ENCRYPTION_KEY` | 必需 |
    /// | `SECURETOKEN_KEY_SIZE` | `256` |
    /// | `SECURETOKEN_CIPHER_MODE` | `cbc` |
    /// | `SECURETOKEN_PADDING` | `pkcs7` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过自定义查找函数加载配置
    ///
    /// 变量名与 [`AesConfig::from_env`] 相同，便于从密钥存储等来源读取。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(ENV_ENCRYPTION_KEY)
            .ok_or_else(|| ConfigError::MissingRequired(ENV_ENCRYPTION_KEY.into()))?;

        let key_size = match lookup(ENV_KEY_SIZE) {
            Some(value) => value.parse::<KeySize>()?,
            None => KeySize::default(),
        };

        let mut config = Self::from_base64(&key, key_size.bits())?;

        if let Some(value) = lookup(ENV_CIPHER_MODE) {
            config.cipher_mode = value.parse()?;
        }
        if let Some(value) = lookup(ENV_PADDING) {
            config.padding = value.parse()?;
        }

        Ok(config)
    }

    /// 设置分组密码模式
    pub fn with_cipher_mode(mut self, mode: CipherMode) -> Self {
        self.cipher_mode = mode;
        self
    }

    /// 设置填充模式
    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// 密钥长度
    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// 分组密码模式
    pub fn cipher_mode(&self) -> CipherMode {
        self.cipher_mode
    }

    /// 填充模式
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }
}

impl fmt::Debug for AesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesConfig")
            .field("key", &"[REDACTED]")
            .field("key_size", &self.key_size)
            .field("cipher_mode", &self.cipher_mode)
            .field("padding", &self.padding)
            .finish()
    }
}

/// 生成指定长度的新密钥
///
/// 返回标准 Base64 文本，可直接用于 [`AesConfig::from_base64`] 或环境变量。
pub fn generate_key(key_size: KeySize) -> Result<String> {
    generate_random_base64(key_size.bytes())
}
