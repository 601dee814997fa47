//! Token 错误类型定义
//!
//! 定义了 Token 操作以及外部协作方（会话服务、目录绑定服务）的错误类型

use crate::types::SessionState;
use thiserror::Error;

/// 会话服务返回的错误
///
/// 会话服务本身不在本 crate 范围内，这里只约定它对外暴露的错误形态
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is not valid: {0}")]
    InvalidSession(String),

    #[error("Session has been destroyed")]
    Destroyed,

    #[error("Restricted token id not found: {0}")]
    RestrictedTokenNotFound(String),

    #[error("Listener registration rejected: {0}")]
    ListenerRejected(String),

    #[error("Session service error: {0}")]
    Service(String),
}

/// 目录绑定服务返回的错误
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid authentication context: {0}")]
    InvalidContext(String),
}

/// Token 操作错误
#[derive(Debug, Error)]
pub enum TokenError {
    /// 在目录绑定 Token 上调用了仅会话 Token 支持的操作
    ///
    /// 这是调用方的编程错误，不应捕获后重试
    #[error("{operation} is an unsupported operation for tokens created by direct directory bind")]
    UnsupportedCapability { operation: String },

    #[error("Client host address is missing from the session")]
    InvalidHost,

    #[error("Client host name is missing from the session")]
    InvalidHostName,

    #[error("Token is not in a valid state: {state}")]
    InvalidToken { state: SessionState },

    /// 会话状态无法查询，按无效处理并保留原因
    #[error("Token is not in a valid state: state lookup failed: {source}")]
    UnverifiedToken {
        #[source]
        source: SessionError,
    },

    #[error("Property {name} is not set")]
    MissingProperty { name: String },

    #[error("Invalid authentication level: {value}")]
    InvalidAuthLevel {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Failed to resolve host {host}: {source}")]
    AddressResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read local host name: {0}")]
    LocalHost(#[source] std::io::Error),

    #[error("Directory authentication failed for {principal}")]
    Authentication {
        principal: String,
        #[source]
        source: DirectoryError,
    },

    #[error("{operation} requires a session backed token")]
    NotSessionBacked { operation: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl TokenError {
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            operation: operation.into(),
        }
    }

    pub fn not_session_backed(operation: impl Into<String>) -> Self {
        Self::NotSessionBacked {
            operation: operation.into(),
        }
    }

    /// 是否表示 Token 无效（状态无效或状态无法确认）
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::UnverifiedToken { .. })
    }

    /// 是否为不可恢复的能力错误
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedCapability { .. })
    }
}

pub type TokenResult<T> = std::result::Result<T, TokenError>;

pub type SessionResult<T> = std::result::Result<T, SessionError>;
