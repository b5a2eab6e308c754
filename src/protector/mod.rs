//! Token 保护模块
//!
//! 定义 [`TokenProtector`] trait，负责把不透明字节加密为不透明字节，以及反向解密。
//!
//! ## 内置实现
//!
//! - [`AesTokenProtector`]: AES 对称加密，每次调用使用新的随机 IV
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::protector::{AesConfig, AesTokenProtector, KeySize, TokenProtector, generate_key};
//!
//! let key = generate_key(KeySize::Aes256).unwrap();
//! let protector = AesTokenProtector::new(AesConfig::from_base64(&key, 256).unwrap());
//!
//! let protected = protector.protect(b"secret bytes").unwrap();
//! let restored = protector.unprotect(&protected).unwrap();
//! assert_eq!(restored, b"secret bytes");
//! ```

pub mod aes;
pub mod config;

pub use self::aes::{AesTokenProtector, BLOCK_SIZE, CIPHERTEXT_IV_SEPARATOR};
pub use self::config::{AesConfig, CipherMode, KeySize, PaddingMode, generate_key};

use crate::error::Result;

/// Token 保护器 trait
///
/// 实现必须可以被多个线程并发只读使用。
pub trait TokenProtector: Send + Sync {
    /// 加密字节序列
    fn protect(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// 解密字节序列
    ///
    /// 输入格式错误、密钥不匹配或数据被篡改时返回 `Error::DecryptionFailed`。
    fn unprotect(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// 保护器名称，用于日志
    fn name(&self) -> &'static str;
}
