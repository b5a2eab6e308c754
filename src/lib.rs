//! # SecureToken
//!
//! 自包含的加密 Token 库：签发不透明、带时效的 Token，并在之后验证它们。
//!
//! ## 功能特性
//!
//! - **不可变 Token**: [`SecureToken`] 包含签发时间、过期时间和字符串键值数据
//! - **可插拔序列化**: JSON（默认）与紧凑二进制格式
//! - **可插拔保护**: AES（CBC / ECB / CFB），每个 Token 使用新的随机 IV
//! - **Provider**: 组合序列化器和保护器，负责签发与验证
//! - **统一错误**: 验证失败不会泄露具体的解密失败原因
//!
//! ## Features
//!
//! - `binary` - 启用 bincode 二进制序列化器（默认启用）
//! - `full` - 启用所有功能
//!
//! ## 签发与验证
//!
//! ```rust
//! use securetoken::{AesConfig, KeySize, SecureTokenProvider, TokenData, generate_key};
//!
//! // 生成密钥（通常只做一次，然后放入配置）
//! let key = generate_key(KeySize::Aes256).unwrap();
//!
//! let provider = SecureTokenProvider::with_aes(AesConfig::from_base64(&key, 256).unwrap());
//!
//! let token = provider
//!     .issue(TokenData::new().with("user", 42).with("role", "admin"), 60)
//!     .unwrap();
//!
//! let validated = provider.validate(&token).unwrap();
//! assert_eq!(validated.get("role"), Some("admin"));
//! ```
//!
//! ## 自定义组合
//!
#![cfg_attr(feature = "binary", doc = "```rust")]
#![cfg_attr(not(feature = "binary"), doc = "```rust,ignore")]
//! use securetoken::{
//!     AesConfig, AesTokenProtector, BinaryTokenSerializer, CipherMode, KeySize, PaddingMode,
//!     ProviderConfig, SecureTokenProvider, TransportEncoding, generate_key,
//! };
//! use std::collections::HashMap;
//!
//! let key = generate_key(KeySize::Aes128).unwrap();
//! let aes = AesConfig::from_base64(&key, 128)
//!     .unwrap()
//!     .with_cipher_mode(CipherMode::Cfb)
//!     .with_padding(PaddingMode::AnsiX923);
//!
//! let provider = SecureTokenProvider::with_config(
//!     BinaryTokenSerializer::new(),
//!     AesTokenProtector::new(aes),
//!     ProviderConfig::new()
//!         .with_default_ttl(300)
//!         .unwrap()
//!         .with_transport(TransportEncoding::UrlSafe),
//! );
//!
//! let token = provider
//!     .issue_default(HashMap::from([("session".to_string(), "abc".to_string())]))
//!     .unwrap();
//! assert!(provider.validate(&token).is_ok());
//! ```
//!
//! ## 错误处理
//!
//! ```rust
//! use securetoken::{AesConfig, Error, SecureTokenProvider};
//!
//! let key = [7u8; 32];
//! let provider = SecureTokenProvider::with_aes(AesConfig::new(key.to_vec(), 256).unwrap());
//!
//! match provider.validate("not-base64!!") {
//!     Err(Error::MalformedToken(_)) => {}
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

pub mod error;
pub mod protector;
pub mod provider;
pub mod random;
pub mod serializer;
pub mod token;

pub use error::{ConfigError, CryptoError, Error, Result};

// ============================================================================
// Token 相关导出
// ============================================================================

pub use token::{SecureToken, ToTokenData, TokenData};

// ============================================================================
// 序列化相关导出
// ============================================================================

#[cfg(feature = "binary")]
pub use serializer::BinaryTokenSerializer;
pub use serializer::{JsonTokenSerializer, TokenSerializer};

// ============================================================================
// 保护相关导出
// ============================================================================

pub use protector::{
    AesConfig, AesTokenProtector, CipherMode, KeySize, PaddingMode, TokenProtector, generate_key,
};

// ============================================================================
// Provider 相关导出
// ============================================================================

pub use provider::{ProviderConfig, SecureTokenProvider, TransportEncoding};

// ============================================================================
// 随机数生成函数导出
// ============================================================================

pub use random::{
    constant_time_compare, constant_time_compare_str, generate_random_base64,
    generate_random_bytes,
};
