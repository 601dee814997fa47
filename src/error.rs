//! 统一错误处理模型
//!
//! 聚合 Token 核心、配置以及系统级错误

use thiserror::Error;

/// 顶层错误枚举
#[derive(Debug, Error)]
pub enum Error {
    /// 配置相关错误
    #[error("Configuration error: {0}")]
    Config(#[from] ssotoken_common::ConfigError),

    /// Token 操作错误
    #[error("Token error: {0}")]
    Token(#[from] ssotoken_core::TokenError),

    /// I/O 操作错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;
