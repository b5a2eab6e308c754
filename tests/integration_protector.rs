//! 集成测试：序列化器与保护器
//!
//! 单独测试两个可插拔组件之间的组合，以及自定义实现接入 Provider。

use std::collections::HashMap;

use chrono::{Duration, Utc};
use securetoken::{
    AesConfig, AesTokenProtector, Error, JsonTokenSerializer, KeySize, PaddingMode, Result,
    SecureToken, SecureTokenProvider, TokenProtector, TokenSerializer, generate_key,
};

fn protector() -> AesTokenProtector {
    let key = generate_key(KeySize::Aes128).expect("key generation should succeed");
    AesTokenProtector::new(AesConfig::from_base64(&key, 128).expect("key should be valid"))
}

/// 测试序列化 → 加密 → 解密 → 反序列化
#[test]
fn test_serializer_protector_pipeline() {
    let now = Utc::now();
    let token = SecureToken::create(
        now,
        now + Duration::minutes(5),
        HashMap::from([("scope".to_string(), "read write".to_string())]),
    )
    .expect("Token creation should succeed");

    let serializer = JsonTokenSerializer::new();
    let protector = protector();

    let bytes = serializer.serialize(&token).expect("Serialize should succeed");
    let protected = protector.protect(&bytes).expect("Protect should succeed");
    assert_ne!(protected, bytes, "Protected bytes should differ from input");

    let unprotected = protector
        .unprotect(&protected)
        .expect("Unprotect should succeed");
    let restored = serializer
        .deserialize(&unprotected)
        .expect("Deserialize should succeed");

    assert_eq!(restored, token);
}

/// 测试加密输出的帧格式：`<密文 base64>??<IV base64>`
#[test]
fn test_protected_framing() {
    let protected = protector()
        .protect(b"{\"hello\":\"world\"}")
        .expect("Protect should succeed");
    let text = String::from_utf8(protected).expect("Protected output should be text");

    let segments: Vec<&str> = text.split("??").collect();
    assert_eq!(segments.len(), 2, "Output should contain exactly one separator");
    assert!(!segments[0].is_empty());
    assert!(!segments[1].is_empty());
}

/// 测试各种格式错误的输入都统一返回 DecryptionFailed
#[test]
fn test_invalid_protected_inputs() {
    let protector = protector();
    let valid = String::from_utf8(protector.protect(b"payload").expect("Protect should succeed"))
        .expect("Protected output should be text");
    let (ciphertext, iv) = valid.split_once("??").expect("Output should be framed");

    let cases = [
        "no separator at all".to_string(),
        format!("{}??{}??{}", ciphertext, iv, iv),
        format!("{}??", ciphertext),
        format!("{}??not base64!", ciphertext),
        format!("{}??{}", ciphertext, "AAAA"),
    ];

    for case in cases {
        let result = protector.unprotect(case.as_bytes());
        assert!(
            matches!(result, Err(Error::DecryptionFailed)),
            "Input {:?} should fail with DecryptionFailed, got {:?}",
            case,
            result
        );
    }
}

/// 测试 NoPadding 模式只接受块对齐的输入
#[test]
fn test_no_padding_requires_block_alignment() {
    let key = generate_key(KeySize::Aes256).expect("key generation should succeed");
    let protector = AesTokenProtector::new(
        AesConfig::from_base64(&key, 256)
            .expect("key should be valid")
            .with_padding(PaddingMode::None),
    );

    // 12 字节 → 16 个 base64 字符，恰好一个块
    let aligned = b"exactly12byt";
    let protected = protector.protect(aligned).expect("Aligned input should succeed");
    assert_eq!(
        protector.unprotect(&protected).expect("Unprotect should succeed"),
        aligned
    );

    assert!(matches!(
        protector.protect(b"short"),
        Err(Error::ProtectionFailed(_))
    ));
}

/// 测试自定义保护器接入 Provider
#[test]
fn test_custom_protector() {
    /// 仅用于测试的可逆变换
    struct ReversingProtector;

    impl TokenProtector for ReversingProtector {
        fn protect(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }

        fn unprotect(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }

        fn name(&self) -> &'static str {
            "reversing"
        }
    }

    let provider = SecureTokenProvider::new(JsonTokenSerializer::new(), ReversingProtector);
    let token = provider
        .issue(HashMap::from([("k".to_string(), "v".to_string())]), 60)
        .expect("Issue should succeed");
    let validated = provider.validate(&token).expect("Validation should succeed");
    assert_eq!(validated.get("k"), Some("v"));
}

/// 测试密钥配置错误
#[test]
fn test_invalid_key_configuration() {
    assert!(matches!(
        AesConfig::new(Vec::new(), 256),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        AesConfig::new(vec![0u8; 16], 256),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        AesConfig::new(vec![0u8; 16], 100),
        Err(Error::Config(_))
    ));
    assert!(AesConfig::new(vec![0u8; 24], 192).is_ok());
}
