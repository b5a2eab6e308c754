//! 安全随机数生成模块
//!
//! 提供密码学安全的随机数生成功能，用于生成初始化向量 (IV) 和加密密钥，
//! 以及防止时序攻击的常量时间比较。

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Arguments
///
/// * `length` - 要生成的字节数
///
/// # Example
///
/// ```rust
/// use securetoken::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(16).unwrap();
/// assert_eq!(bytes.len(), 16);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成指定字节数的标准 Base64 随机字符串（带填充）
///
/// 用于生成可直接写入配置或环境变量的密钥文本
///
/// # Example
///
/// ```rust
/// use securetoken::random::generate_random_base64;
///
/// let text = generate_random_base64(32).unwrap();
/// assert_eq!(text.len(), 44);
/// ```
pub fn generate_random_base64(byte_length: usize) -> Result<String> {
    let bytes = generate_random_bytes(byte_length)?;
    Ok(STANDARD.encode(&bytes))
}

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击
///
/// # Example
///
/// ```rust
/// use securetoken::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"secret_value", b"secret_value"));
/// assert!(!constant_time_compare(b"secret_value", b"other_value!"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

/// 常量时间比较两个字符串
pub fn constant_time_compare_str(a: &str, b: &str) -> bool {
    constant_time_compare(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_bytes() {
        let bytes = generate_random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);

        // 两次生成不应相同
        let bytes2 = generate_random_bytes(32).unwrap();
        assert_ne!(bytes, bytes2);
    }

    #[test]
    fn test_generate_random_bytes_empty() {
        assert!(generate_random_bytes(0).unwrap().is_empty());
    }

    #[test]
    fn test_generate_random_base64() {
        let text = generate_random_base64(16).unwrap();
        let decoded = STANDARD.decode(&text).unwrap();
        assert_eq!(decoded.len(), 16);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hell"));
    }

    #[test]
    fn test_constant_time_compare_str() {
        assert!(constant_time_compare_str("secret", "secret"));
        assert!(!constant_time_compare_str("secret", "Secret"));
    }
}
