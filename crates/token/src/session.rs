//! 会话服务协作接口
//!
//! 会话的存储、复制、过期与时钟均由外部会话服务负责，
//! Token 只持有会话句柄并通过此 trait 访问

use crate::error::SessionResult;
use crate::types::{SessionEventType, SessionState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// 会话句柄
///
/// 实现方需保证单次属性读写与状态查询是原子的
#[async_trait]
pub trait Session: Send + Sync {
    /// 会话 ID
    fn id(&self) -> &str;

    /// 读取属性，要求会话当前有效
    async fn property(&self, name: &str) -> SessionResult<Option<String>>;

    /// 不做有效性校验地读取属性
    ///
    /// 用于登出等需要读取已失效会话的场景
    async fn property_without_validation(&self, name: &str) -> Option<String>;

    async fn set_property(&self, name: &str, value: &str) -> SessionResult<()>;

    /// 剩余有效时间（秒）
    async fn time_left(&self) -> SessionResult<u64>;

    /// 最大会话时间（分钟）
    async fn max_session_time(&self) -> SessionResult<u64>;

    /// 空闲时间（秒）
    async fn idle_time(&self) -> SessionResult<u64>;

    /// 最大空闲时间（分钟）
    async fn max_idle_time(&self) -> SessionResult<u64>;

    /// 查询会话状态
    ///
    /// `reset_idle` 为 false 时不得产生副作用（不刷新空闲计时）
    async fn state(&self, reset_idle: bool) -> SessionResult<SessionState>;

    async fn add_session_listener(&self, listener: Arc<dyn SessionListener>) -> SessionResult<()>;

    async fn is_restricted(&self) -> SessionResult<bool>;

    /// 在 `master_session` 的上下文中，将受限 Token ID 映射回主 Token ID
    async fn dereference_restricted_token_id(
        &self,
        master_session: &dyn Session,
        restricted_id: &str,
    ) -> SessionResult<String>;
}

/// 会话服务原生监听接口
pub trait SessionListener: Send + Sync {
    fn session_changed(&self, event: &SessionEvent);
}

/// 会话服务原生事件
#[derive(Clone)]
pub struct SessionEvent {
    event_type: SessionEventType,
    session: Arc<dyn Session>,
    time: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(event_type: SessionEventType, session: Arc<dyn Session>) -> Self {
        Self::at(event_type, session, Utc::now())
    }

    pub fn at(event_type: SessionEventType, session: Arc<dyn Session>, time: DateTime<Utc>) -> Self {
        Self {
            event_type,
            session,
            time,
        }
    }

    pub fn event_type(&self) -> SessionEventType {
        self.event_type
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvent")
            .field("event_type", &self.event_type)
            .field("session_id", &self.session.id())
            .field("time", &self.time)
            .finish()
    }
}
