//! Token 核心数据类型
//!
//! 主体、Token 标识、会话状态以及事件类型

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// 会话中约定的属性名
pub mod property_names {
    pub const PRINCIPAL: &str = "Principal";
    pub const AUTH_TYPE: &str = "AuthType";
    pub const AUTH_LEVEL: &str = "AuthLevel";
    pub const HOST: &str = "Host";
    pub const HOST_NAME: &str = "HostName";
    /// 目录绑定 Token 构造时生成的上下文 ID
    pub const AM_CTX_ID: &str = "AM_CTX_ID";
}

/// 目录绑定 Token 的认证类型
pub const DIRECT_BIND_AUTH_TYPE: &str = "LDAP";

/// 认证主体
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Token 标识
///
/// 会话 Token 的标识由会话 ID 确定性地派生
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    pub fn from_session_id(session_id: &str) -> Self {
        Self(session_id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token 来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Origin {
    SessionBacked,
    DirectBind,
}

/// 会话状态（由会话服务维护）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Invalid,
    Valid,
    Inactive,
    Destroyed,
}

impl SessionState {
    /// VALID 与 INACTIVE 视为有效，其余均视为无效
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Valid | SessionState::Inactive)
    }
}

/// 会话服务原生事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum SessionEventType {
    Creation,
    IdleTimeout,
    MaxTimeout,
    Logout,
    Reactivation,
    Destroy,
    PropertyChanged,
    QuotaExhausted,
    ProtectedProperty,
}

/// Token 层事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum TokenEventType {
    IdleTimeout,
    MaxTimeout,
    Destroy,
    PropertyChanged,
}

impl SessionEventType {
    /// 映射到 Token 层事件类型
    ///
    /// 登出与销毁都归为 `Destroy`；创建、重新激活等没有 Token 层对应类型
    pub fn token_event_type(self) -> Option<TokenEventType> {
        match self {
            SessionEventType::IdleTimeout => Some(TokenEventType::IdleTimeout),
            SessionEventType::MaxTimeout => Some(TokenEventType::MaxTimeout),
            SessionEventType::Logout | SessionEventType::Destroy => Some(TokenEventType::Destroy),
            SessionEventType::PropertyChanged => Some(TokenEventType::PropertyChanged),
            SessionEventType::Creation
            | SessionEventType::Reactivation
            | SessionEventType::QuotaExhausted
            | SessionEventType::ProtectedProperty => None,
        }
    }
}
