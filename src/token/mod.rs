//! Token 模块
//!
//! 提供安全 Token 值类型以及附加数据的转换工具。
//!
//! ## 子模块
//!
//! - **secure**: 不可变的 [`SecureToken`] 值类型
//! - **data**: [`ToTokenData`] trait 与 [`TokenData`] 构建器
//!
//! ## 示例
//!
//! ```rust
//! use securetoken::token::{SecureToken, TokenData};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let data = TokenData::new().with("user", 42).with("role", "admin");
//!
//! let token = SecureToken::create(now, now + Duration::minutes(5), data.into()).unwrap();
//! assert!(token.matches("role", "admin"));
//! ```

pub mod data;
pub mod secure;

pub use data::{ToTokenData, TokenData};
pub use secure::SecureToken;
