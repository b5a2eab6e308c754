//! AES Token 保护器
//!
//! 每次 `protect` 都从操作系统 CSPRNG 生成新的 16 字节 IV，IV 以明文形式
//! 随密文一起传输（IV 不需要保密，只需要不可预测且不重复）。
//!
//! ## 输出格式
//!
//! ```text
//! base64(ciphertext) + "??" + base64(iv)
//! ```
//!
//! 送入分组密码的明文是输入字节的标准 Base64 文本。解密后会再次校验 Base64，
//! 错误密钥解出的乱码因此在保护器内部即被拒绝。
//!
//! ## 空输入
//!
//! 空输入直接返回空输出，不调用密码算法。
//! 空 Token 不具备任何保护属性。

use base64::{Engine, engine::general_purpose::STANDARD};
use cipher::{
    BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyInit, KeyIvInit,
    block_padding::{AnsiX923, NoPadding, Padding, Pkcs7, ZeroPadding},
    consts::U16,
};
use tracing::debug;

use super::TokenProtector;
use super::config::{AesConfig, CipherMode, KeySize, PaddingMode};
use crate::error::{Error, Result};
use crate::random::generate_random_bytes;

/// 密文与 IV 之间的分隔符
pub const CIPHERTEXT_IV_SEPARATOR: &str = "??";

/// AES 分组长度（字节），同时也是 IV 长度
pub const BLOCK_SIZE: usize = 16;

/// 按密钥长度选择具体的 AES 类型
macro_rules! with_aes {
    ($key_size:expr, |$cipher:ident| $body:block) => {
        match $key_size {
            KeySize::Aes128 => {
                type $cipher = ::aes::Aes128;
                $body
            }
            KeySize::Aes192 => {
                type $cipher = ::aes::Aes192;
                $body
            }
            KeySize::Aes256 => {
                type $cipher = ::aes::Aes256;
                $body
            }
        }
    };
}

/// 基于 AES 的 Token 保护器
#[derive(Debug, Clone)]
pub struct AesTokenProtector {
    config: AesConfig,
}

impl AesTokenProtector {
    /// 使用已校验的配置创建保护器
    pub fn new(config: AesConfig) -> Self {
        debug!(
            key_size = %config.key_size(),
            cipher_mode = %config.cipher_mode(),
            padding = %config.padding(),
            "AES token protector configured"
        );
        Self { config }
    }

    /// 当前配置
    pub fn config(&self) -> &AesConfig {
        &self.config
    }

    /// 使用给定 IV 加密
    fn encrypt(&self, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        if self.config.padding() == PaddingMode::None && plaintext.len() % BLOCK_SIZE != 0 {
            return Err(Error::protection_failed(format!(
                "plaintext length {} is not a multiple of the block size without padding",
                plaintext.len()
            )));
        }

        let result = match self.config.padding() {
            PaddingMode::None => self.encrypt_padded::<NoPadding>(plaintext, iv),
            PaddingMode::Pkcs7 => self.encrypt_padded::<Pkcs7>(plaintext, iv),
            PaddingMode::Zeros => self.encrypt_padded::<ZeroPadding>(plaintext, iv),
            PaddingMode::AnsiX923 => self.encrypt_padded::<AnsiX923>(plaintext, iv),
        };

        result.map_err(|_| Error::protection_failed("invalid key or iv length"))
    }

    fn encrypt_padded<P: Padding<U16>>(
        &self,
        plaintext: &[u8],
        iv: &[u8],
    ) -> std::result::Result<Vec<u8>, InvalidLength> {
        let key = self.config.key();

        with_aes!(self.config.key_size(), |C| {
            match self.config.cipher_mode() {
                CipherMode::Cbc => cbc::Encryptor::<C>::new_from_slices(key, iv)
                    .map(|c| c.encrypt_padded_vec_mut::<P>(plaintext)),
                CipherMode::Ecb => ecb::Encryptor::<C>::new_from_slice(key)
                    .map(|c| c.encrypt_padded_vec_mut::<P>(plaintext)),
                CipherMode::Cfb => cfb_mode::Encryptor::<C>::new_from_slices(key, iv)
                    .map(|c| c.encrypt_padded_vec_mut::<P>(plaintext)),
            }
        })
    }

    /// 使用给定 IV 解密，任何失败都返回 `None`
    fn decrypt(&self, ciphertext: &[u8], iv: &[u8]) -> Option<Vec<u8>> {
        if iv.len() != BLOCK_SIZE || ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return None;
        }

        match self.config.padding() {
            PaddingMode::None => self.decrypt_padded::<NoPadding>(ciphertext, iv),
            PaddingMode::Pkcs7 => self.decrypt_padded::<Pkcs7>(ciphertext, iv),
            PaddingMode::Zeros => self.decrypt_padded::<ZeroPadding>(ciphertext, iv),
            PaddingMode::AnsiX923 => self.decrypt_padded::<AnsiX923>(ciphertext, iv),
        }
    }

    fn decrypt_padded<P: Padding<U16>>(&self, ciphertext: &[u8], iv: &[u8]) -> Option<Vec<u8>> {
        let key = self.config.key();

        with_aes!(self.config.key_size(), |C| {
            match self.config.cipher_mode() {
                CipherMode::Cbc => cbc::Decryptor::<C>::new_from_slices(key, iv)
                    .ok()?
                    .decrypt_padded_vec_mut::<P>(ciphertext)
                    .ok(),
                CipherMode::Ecb => ecb::Decryptor::<C>::new_from_slice(key)
                    .ok()?
                    .decrypt_padded_vec_mut::<P>(ciphertext)
                    .ok(),
                CipherMode::Cfb => cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
                    .ok()?
                    .decrypt_padded_vec_mut::<P>(ciphertext)
                    .ok(),
            }
        })
    }
}

impl TokenProtector for AesTokenProtector {
    fn protect(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let plaintext = STANDARD.encode(data);
        let iv = generate_random_bytes(BLOCK_SIZE)?;
        let ciphertext = self.encrypt(plaintext.as_bytes(), &iv)?;

        let framed = format!(
            "{}{}{}",
            STANDARD.encode(&ciphertext),
            CIPHERTEXT_IV_SEPARATOR,
            STANDARD.encode(&iv)
        );

        Ok(framed.into_bytes())
    }

    fn unprotect(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let framed = std::str::from_utf8(data).map_err(|_| Error::DecryptionFailed)?;

        let segments: Vec<&str> = framed
            .split(CIPHERTEXT_IV_SEPARATOR)
            .filter(|s| !s.is_empty())
            .collect();

        let [ciphertext, iv] = segments.as_slice() else {
            return Err(Error::DecryptionFailed);
        };

        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|_| Error::DecryptionFailed)?;
        let iv = STANDARD.decode(iv).map_err(|_| Error::DecryptionFailed)?;

        let plaintext = self
            .decrypt(&ciphertext, &iv)
            .ok_or(Error::DecryptionFailed)?;

        STANDARD
            .decode(&plaintext)
            .map_err(|_| Error::DecryptionFailed)
    }

    fn name(&self) -> &'static str {
        "aes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_256: &str = "3q2+796tvu/erb7v3q2+796tvu/erb7v3q2+796tvu8=";

    fn protector() -> AesTokenProtector {
        AesTokenProtector::new(AesConfig::from_base64(KEY_256, 256).unwrap())
    }

    fn split_frame(framed: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let text = std::str::from_utf8(framed).unwrap();
        let (ct, iv) = text.split_once(CIPHERTEXT_IV_SEPARATOR).unwrap();
        (STANDARD.decode(ct).unwrap(), STANDARD.decode(iv).unwrap())
    }

    #[test]
    fn test_protect_unprotect_roundtrip() {
        let protector = protector();
        let data = b"{\"user\":\"42\"}";

        let protected = protector.protect(data).unwrap();
        assert_ne!(protected.as_slice(), data.as_slice());

        let unprotected = protector.unprotect(&protected).unwrap();
        assert_eq!(unprotected, data);
    }

    #[test]
    fn test_framing_format() {
        let protected = protector().protect(b"payload").unwrap();
        let text = String::from_utf8(protected.clone()).unwrap();
        assert_eq!(text.matches(CIPHERTEXT_IV_SEPARATOR).count(), 1);

        let (ciphertext, iv) = split_frame(&protected);
        assert_eq!(iv.len(), BLOCK_SIZE);
        assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let protector = protector();
        let first = protector.protect(b"same plaintext").unwrap();
        let second = protector.protect(b"same plaintext").unwrap();

        assert_ne!(first, second);
        let (ct1, iv1) = split_frame(&first);
        let (ct2, iv2) = split_frame(&second);
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let protector = protector();
        assert!(protector.protect(&[]).unwrap().is_empty());
        assert!(protector.unprotect(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_framing() {
        let protector = protector();
        let cases: &[&[u8]] = &[
            b"no separator here",
            b"??",
            b"AAAA??",
            b"??AAAA",
            b"AAAA??AAAA??AAAA",
            b"not base64!??AAAAAAAAAAAAAAAAAAAAAA==",
            b"AAAAAAAAAAAAAAAAAAAAAA==??not base64!",
            b"\xff\xfe??\xff",
        ];

        for case in cases {
            assert!(
                matches!(protector.unprotect(case), Err(Error::DecryptionFailed)),
                "expected decryption failure for {:?}",
                String::from_utf8_lossy(case)
            );
        }
    }

    #[test]
    fn test_wrong_iv_length() {
        let protector = protector();
        let protected = protector.protect(b"payload").unwrap();
        let (ciphertext, _) = split_frame(&protected);

        let framed = format!(
            "{}??{}",
            STANDARD.encode(&ciphertext),
            STANDARD.encode([0u8; 8])
        );
        assert!(matches!(
            protector.unprotect(framed.as_bytes()),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let protected = protector().protect(b"some secret payload").unwrap();

        let other_key = super::super::generate_key(KeySize::Aes256).unwrap();
        let other = AesTokenProtector::new(AesConfig::from_base64(&other_key, 256).unwrap());

        assert!(matches!(
            other.unprotect(&protected),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_all_modes_and_paddings() {
        let data = b"The quick brown fox jumps over the lazy dog";

        for (bits, key_len) in [(128, 16), (192, 24), (256, 32)] {
            for mode in [CipherMode::Cbc, CipherMode::Ecb, CipherMode::Cfb] {
                for padding in [PaddingMode::Pkcs7, PaddingMode::Zeros, PaddingMode::AnsiX923] {
                    let config = AesConfig::new(vec![7u8; key_len], bits)
                        .unwrap()
                        .with_cipher_mode(mode)
                        .with_padding(padding);
                    let protector = AesTokenProtector::new(config);

                    let protected = protector.protect(data).unwrap();
                    let unprotected = protector.unprotect(&protected).unwrap();
                    assert_eq!(
                        unprotected, data,
                        "roundtrip failed for {bits}/{mode}/{padding}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_no_padding_requires_aligned_plaintext() {
        let config = AesConfig::from_base64(KEY_256, 256)
            .unwrap()
            .with_padding(PaddingMode::None);
        let protector = AesTokenProtector::new(config);

        // 12 字节 -> 16 个 Base64 字符，恰好一个分组
        let aligned = b"twelve bytes";
        let protected = protector.protect(aligned).unwrap();
        assert_eq!(protector.unprotect(&protected).unwrap(), aligned);

        // 3 字节 -> 4 个 Base64 字符，无法对齐
        assert!(matches!(
            protector.protect(b"abc"),
            Err(Error::ProtectionFailed(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let protector = protector();
        let protected = protector
            .protect(b"a payload long enough to span several cipher blocks")
            .unwrap();
        let (mut ciphertext, iv) = split_frame(&protected);

        // 翻转倒数第二个分组的末字节，使最后一个填充字节必然无效
        let index = ciphertext.len() - 1 - BLOCK_SIZE;
        ciphertext[index] ^= 0x80;

        let framed = format!("{}??{}", STANDARD.encode(&ciphertext), STANDARD.encode(&iv));
        assert!(matches!(
            protector.unprotect(framed.as_bytes()),
            Err(Error::DecryptionFailed)
        ));
    }
}
